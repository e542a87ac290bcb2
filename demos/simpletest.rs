//! Press and release middle C on a default oscillator voice.
//!
//! Renders four half-second on/off cycles to `simpletest.wav`.
//!
//! Run with: cargo run --example simpletest

use std::path::Path;

use color_eyre::eyre::Result as EyreResult;
use synthvoice::{io::wav, voice::Oscillator, SynthConfig, SynthMessage, Synthesizer};

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let config = SynthConfig::default();
    let mut synth = Synthesizer::new(config);
    let voice = synth.add_voice(Oscillator::new(&config)).index();

    let half_second = config.sample_rate() as usize / 2 * config.channel_count() as usize;
    let mut out = Vec::new();
    let mut block = vec![0.0; half_second];

    for _ in 0..4 {
        synth.handle(SynthMessage::Press {
            voice,
            note: 60,
            velocity: 1.0,
        })?;
        synth.render(&mut block);
        out.extend_from_slice(&block);

        synth.handle(SynthMessage::Release { voice })?;
        synth.render(&mut block);
        out.extend_from_slice(&block);
    }

    // The default oscillator plays a full-scale square wave
    for s in &mut out {
        *s *= 0.5;
    }

    wav::save(
        Path::new("simpletest.wav"),
        &out,
        config.sample_rate(),
        config.channel_count(),
    )?;
    println!("wrote simpletest.wav ({} frames)", out.len() / config.channel_count() as usize);
    Ok(())
}
