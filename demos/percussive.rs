//! A drum machine from the percussive voices.
//!
//! Kick, snare, closed hat and open hat sit on voices 0-3. As with a MIDI
//! drum pad, note `n` triggers voice `n % 4`. Two bars of a basic beat are
//! rendered to `percussive.wav`, followed by the three toms.
//!
//! Run with: cargo run --example percussive

use std::path::Path;

use color_eyre::eyre::Result as EyreResult;
use synthvoice::{
    io::{midi_to_synth, wav, MidiEvent, Route},
    voice::{Cymbal, Drum, Tom, Velocity},
    SynthConfig, Synthesizer,
};

const BPM: f32 = 110.0;

// Notes 36..=39 land on kick, snare, closed hat, open hat
const KICK: u8 = 36;
const SNARE: u8 = 37;
const CLOSED: u8 = 38;
const OPEN: u8 = 39;

/// One bar of sixteenths
const BAR: [&[u8]; 16] = [
    &[KICK, CLOSED],
    &[],
    &[CLOSED],
    &[],
    &[SNARE, CLOSED],
    &[],
    &[CLOSED],
    &[KICK],
    &[KICK, CLOSED],
    &[],
    &[CLOSED],
    &[],
    &[SNARE, CLOSED],
    &[],
    &[OPEN],
    &[],
];

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let config = SynthConfig::new(44_100, 1)?;
    let mut synth = Synthesizer::new(config);
    synth.add_voice(Drum::kick(&config));
    synth.add_voice(Drum::snare(&config));
    synth.add_voice(Cymbal::closed_hat(&config));
    synth.add_voice(Cymbal::open_hat(&config));

    let step = (60.0 / BPM / 4.0 * config.sample_rate() as f32) as usize;
    let route = Route::Modulo(4);
    let mut out = Vec::new();

    for _ in 0..2 {
        for hits in BAR {
            for &key in hits {
                let event = MidiEvent::NoteOn {
                    channel: 9,
                    key,
                    velocity: 110,
                };
                if let Some(msg) = midi_to_synth(event, 9, route) {
                    synth.handle(msg)?;
                }
            }
            let mut block = vec![0.0; step];
            synth.render(&mut block);
            out.extend(block);
        }
    }

    // Tom fill, high to floor
    let toms = [
        synth.add_voice(Tom::high(&config)),
        synth.add_voice(Tom::mid(&config)),
        synth.add_voice(Tom::floor(&config)),
    ];
    for id in toms {
        for _ in 0..2 {
            if let Some(voice) = synth.voice_mut(id) {
                voice.press(0, Velocity::from(100u8));
            }
            let mut block = vec![0.0; step];
            synth.render(&mut block);
            out.extend(block);
        }
    }

    let mut tail = vec![0.0; step * 8];
    synth.render(&mut tail);
    out.extend(tail);

    // Several voices can hit at once
    let peak = out.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 1.0 {
        out.iter_mut().for_each(|s| *s /= peak);
    }

    wav::save(Path::new("percussive.wav"), &out, config.sample_rate(), 1)?;
    println!("wrote percussive.wav");
    Ok(())
}
