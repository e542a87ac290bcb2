//! Play a WAV file as a pitched, looping voice.
//!
//! Loads the file given on the command line. Without one, a plucked-string
//! tone is written to `sample-source.wav` and loaded back. Pressing the
//! detected root note plays the recording at its own speed; other notes
//! transpose it. Renders to `sample.wav`.
//!
//! Run with: cargo run --example sample -- path/to/file.wav

use std::{
    f32::consts::TAU,
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use synthvoice::{
    io::wav,
    voice::{Sample, Velocity},
    SynthConfig, Synthesizer,
};

const NOTES: &[u8] = &[57, 60, 64, 69];

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => write_source()?,
    };

    let config = SynthConfig::new(44_100, 1)?;
    let mut sample = Sample::new(&config);
    sample
        .load_file(&path)
        .wrap_err_with(|| format!("failed to load {}", path.display()))?;
    sample.set_waveform_loop(0.65, 0.96);
    sample.oscillator_mut().set_release_time(0.5);

    println!(
        "{}: root {:.1} Hz, {} frames",
        path.display(),
        sample.root(),
        sample.waveform().map(|w| w.len()).unwrap_or(0)
    );

    let mut synth = Synthesizer::new(config);
    let id = synth.add_voice(sample);

    let rate = config.sample_rate() as usize;
    let mut out = Vec::new();
    for &note in NOTES {
        if let Some(voice) = synth.voice_mut(id) {
            voice.press(note, Velocity::FULL);
        }
        let mut held = vec![0.0; rate / 2];
        synth.render(&mut held);
        out.extend(held);

        if let Some(voice) = synth.voice_mut(id) {
            voice.release();
        }
        let mut gap = vec![0.0; rate / 4];
        synth.render(&mut gap);
        out.extend(gap);
    }

    wav::save(Path::new("sample.wav"), &out, config.sample_rate(), 1)?;
    println!("wrote sample.wav");
    Ok(())
}

/// A decaying 220 Hz tone with a few harmonics.
fn write_source() -> EyreResult<PathBuf> {
    let rate = 22_050;
    let path = PathBuf::from("sample-source.wav");

    let tone: Vec<f32> = (0..4096)
        .map(|i| {
            let t = i as f32 / rate as f32;
            let partials = (1..=4)
                .map(|h| (TAU * 220.0 * h as f32 * t).sin() / h as f32)
                .sum::<f32>();
            0.5 * partials * (-3.0 * t).exp()
        })
        .collect();

    wav::save(&path, &tone, rate, 1)?;
    Ok(path)
}
