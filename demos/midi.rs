//! Drive an oscillator voice from raw MIDI bytes.
//!
//! A short phrase is written as timed MIDI messages, decoded with
//! [`MidiEvent::parse`], routed to voice 0 and rendered to `midi.wav`.
//! Note-on with velocity 0 releases, as running-status keyboards send it.
//!
//! Run with: cargo run --example midi

use std::path::Path;

use color_eyre::eyre::Result as EyreResult;
use synthvoice::{
    io::{midi_to_synth, wav, MidiEvent, Route},
    voice::Oscillator,
    SynthConfig, Synthesizer, Voice,
};

/// (seconds, raw message) on channel 1
const PHRASE: &[(f32, &[u8])] = &[
    (0.00, &[0x90, 60, 100]),
    (0.40, &[0x80, 60, 0]),
    (0.50, &[0x90, 64, 90]),
    (0.90, &[0x90, 64, 0]),
    (1.00, &[0x90, 67, 110]),
    // Bend up a whole step and back
    (1.20, &[0xE0, 0x7F, 0x7F]),
    (1.60, &[0xE0, 0x00, 0x40]),
    (1.90, &[0x80, 67, 0]),
    (2.00, &[0x90, 72, 127]),
    (2.80, &[0xB0, 123, 0]),
];

const LENGTH: f32 = 4.0;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let config = SynthConfig::new(44_100, 1)?;
    let mut synth = Synthesizer::new(config);

    let mut osc = Oscillator::new(&config);
    osc.set_amplitude(0.4);
    osc.set_release_time(0.2);
    osc.set_bend_range(2.0 / 12.0);
    synth.add_voice(osc);

    let rate = config.sample_rate() as f32;
    let mut out = vec![0.0; (LENGTH * rate) as usize];
    let mut cursor = 0;

    for &(time, bytes) in PHRASE {
        let at = ((time * rate) as usize).min(out.len());
        synth.render(&mut out[cursor..at]);
        cursor = at;

        let Some(event) = MidiEvent::parse(bytes) else {
            continue;
        };
        if let Some(msg) = midi_to_synth(event, 0, Route::Single(0)) {
            println!("{time:>5.2}s  {event:?} -> {msg:?}");
            synth.handle(msg)?;
        }
    }
    synth.render(&mut out[cursor..]);

    wav::save(Path::new("midi.wav"), &out, config.sample_rate(), 1)?;
    println!("wrote midi.wav");
    Ok(())
}
