//! Voice setups for each subcommand

use std::{path::PathBuf, time::Duration};

use color_eyre::eyre::{Result as EyreResult, WrapErr};

use synthvoice::{
    dsp::{
        waveform::{mix, Shape, WaveformBuilder},
        FilterType, Waveform,
    },
    io::Route,
    voice::{Cymbal, Drum, Oscillator, Sample},
    SynthConfig, Synthesizer, Voice,
};

#[derive(Debug, Clone)]
pub enum Demo {
    SimpleTest,
    Midi,
    Oscillator,
    Sample(PathBuf),
    Percussive,
}

/// Repeatedly press and release one note on voice 0.
#[derive(Debug, Clone, Copy)]
pub struct Autoplay {
    pub note: u8,
    pub period: Duration,
}

pub struct Setup {
    pub synth: Synthesizer,
    pub route: Route,
    pub autoplay: Option<Autoplay>,
    /// One label per voice, for the status bar
    pub labels: Vec<&'static str>,
}

impl Demo {
    pub fn name(&self) -> &'static str {
        match self {
            Demo::SimpleTest => "simpletest",
            Demo::Midi => "midi",
            Demo::Oscillator => "oscillator",
            Demo::Sample(_) => "sample",
            Demo::Percussive => "percussive",
        }
    }

    pub fn build(&self, config: SynthConfig) -> EyreResult<Setup> {
        let mut synth = Synthesizer::new(config);

        let setup = match self {
            Demo::SimpleTest => {
                synth.add_voice(Oscillator::new(&config));
                Setup {
                    synth,
                    route: Route::Single(0),
                    autoplay: Some(Autoplay {
                        note: 60,
                        period: Duration::from_millis(500),
                    }),
                    labels: vec!["oscillator"],
                }
            }
            Demo::Midi => {
                let mut osc = Oscillator::new(&config);
                osc.set_bend_range(2.0 / 12.0);
                osc.set_release_time(0.2);
                synth.add_voice(osc);
                Setup {
                    synth,
                    route: Route::Single(0),
                    autoplay: None,
                    labels: vec!["oscillator"],
                }
            }
            Demo::Oscillator => {
                synth.add_voice(pad(&config));
                Setup {
                    synth,
                    route: Route::Single(0),
                    autoplay: None,
                    labels: vec!["pad"],
                }
            }
            Demo::Sample(path) => {
                let mut sample = Sample::new(&config);
                sample
                    .load_file(path)
                    .wrap_err_with(|| format!("failed to load {}", path.display()))?;
                sample.set_waveform_loop(0.65, 0.96);
                sample.oscillator_mut().set_release_time(0.5);

                synth.add_voice(sample);
                Setup {
                    synth,
                    route: Route::Single(0),
                    autoplay: None,
                    labels: vec!["sample"],
                }
            }
            Demo::Percussive => {
                synth.add_voice(Drum::kick(&config));
                synth.add_voice(Drum::snare(&config));
                synth.add_voice(Cymbal::closed_hat(&config));
                synth.add_voice(Cymbal::open_hat(&config));
                Setup {
                    synth,
                    route: Route::Modulo(4),
                    autoplay: None,
                    labels: vec!["kick", "snare", "closed hat", "open hat"],
                }
            }
        };

        Ok(setup)
    }
}

/// Two saws an octave apart, tuned down a fifth, with a slow filter sweep.
fn pad(config: &SynthConfig) -> Oscillator {
    let mut osc = Oscillator::new(config);
    osc.set_waveform(Some(saw_octaves()));

    osc.set_glide(0.5);
    osc.set_coarse_tune(-1.0);
    osc.set_fine_tune(5.0);
    osc.set_vibrato_depth(1.0 / 12.0);
    osc.set_vibrato_rate(8.0);

    osc.set_attack_time(0.0);
    osc.set_attack_level(1.0);
    osc.set_decay_time(0.75);
    osc.set_sustain_level(0.5);
    osc.set_release_time(1.0);

    osc.set_amplitude(0.75);
    osc.set_tremolo_depth(0.1);
    osc.set_tremolo_rate(2.0);

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

fn saw_octaves() -> Waveform {
    mix(&[
        (Waveform::saw(), 1.0),
        (WaveformBuilder::new(Shape::Saw).frequency(2.0).build(), 1.0),
    ])
}
