//! A fully dressed oscillator voice.
//!
//! Two saws an octave apart with glide, vibrato, tremolo and a resonant
//! low-pass that opens on each press. Plays a legato line (notes overlap, so
//! the pitch glides) and renders it in stereo to `oscillator.wav`.
//!
//! Run with: cargo run --example oscillator

use std::path::Path;

use color_eyre::eyre::Result as EyreResult;
use synthvoice::{
    dsp::{
        waveform::{mix, Shape, WaveformBuilder},
        FilterType, Waveform,
    },
    voice::{Oscillator, Velocity},
    SynthConfig, Synthesizer, Voice,
};

/// (note, seconds held)
const LINE: &[(u8, f32)] = &[(48, 1.0), (55, 0.5), (53, 0.5), (51, 1.0), (48, 2.0)];

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let config = SynthConfig::new(44_100, 2)?;
    let mut synth = Synthesizer::new(config);
    let id = synth.add_voice(pad(&config));

    let frames_per_second = config.sample_rate() as usize;
    let channels = config.channel_count() as usize;
    let mut out = Vec::new();

    for &(note, seconds) in LINE {
        // Press the next note without releasing: the voice glides to it
        if let Some(voice) = synth.voice_mut(id) {
            voice.press(note, Velocity::from(100u8));
        }
        let mut block = vec![0.0; (seconds * frames_per_second as f32) as usize * channels];
        synth.render(&mut block);
        out.extend(block);
    }

    // Release tail
    if let Some(voice) = synth.voice_mut(id) {
        voice.release();
    }
    let mut tail = vec![0.0; frames_per_second * channels];
    synth.render(&mut tail);
    out.extend(tail);

    if let Some(osc) = synth.voice_as_mut::<Oscillator>(id) {
        println!("ended at {:.2} Hz", osc.frequency());
    }

    synthvoice::io::wav::save(
        Path::new("oscillator.wav"),
        &out,
        config.sample_rate(),
        config.channel_count(),
    )?;
    println!("wrote oscillator.wav");
    Ok(())
}

fn pad(config: &SynthConfig) -> Oscillator {
    let mut osc = Oscillator::new(config);
    osc.set_waveform(Some(mix(&[
        (Waveform::saw(), 1.0),
        (WaveformBuilder::new(Shape::Saw).frequency(2.0).build(), 1.0),
    ])));

    // Frequency
    osc.set_glide(0.5);
    osc.set_coarse_tune(-1.0);
    osc.set_fine_tune(5.0);
    osc.set_vibrato_depth(1.0 / 12.0);
    osc.set_vibrato_rate(8.0);

    // Envelope
    osc.set_attack_time(0.0);
    osc.set_attack_level(1.0);
    osc.set_decay_time(0.75);
    osc.set_sustain_level(0.5);
    osc.set_release_time(1.0);

    // Amplitude
    osc.set_amplitude(0.75);
    osc.set_tremolo_depth(0.1);
    osc.set_tremolo_rate(2.0);
    osc.set_pan_depth(0.5);
    osc.set_pan_rate(0.25);

    // Filter
    osc.set_filter_type(FilterType::LowPass);
    osc.set_filter_frequency(200.0);
    osc.set_filter_resonance(1.75);
    osc.set_filter_attack_time(0.25);
    osc.set_filter_amount(1200.0);
    osc.set_filter_release_time(0.75);
    osc.set_filter_rate(0.5);
    osc.set_filter_depth(1000.0);
    osc
}
