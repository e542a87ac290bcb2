//! Benchmarks for the synthesizer render loop with a full drum kit and a
//! lead voice, as in the percussive and oscillator demos.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use synthvoice::{
    voice::{Cymbal, Drum, Oscillator, Tom},
    SynthConfig, SynthMessage, Synthesizer,
};

use crate::BLOCK_SIZES;

fn kit(config: SynthConfig) -> Synthesizer {
    let mut synth = Synthesizer::new(config);
    synth.add_voice(Drum::kick(&config));
    synth.add_voice(Drum::snare(&config));
    synth.add_voice(Cymbal::closed_hat(&config));
    synth.add_voice(Cymbal::open_hat(&config));
    synth.add_voice(Tom::mid(&config));
    synth.add_voice(Oscillator::new(&config));
    synth
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");
    let config = SynthConfig::default();
    let channels = config.channel_count() as usize;

    for &size in BLOCK_SIZES {
        let mut synth = kit(config);
        let mut buffer = vec![0.0f32; size * channels];
        let mut queue = VecDeque::new();

        group.bench_with_input(BenchmarkId::new("kit", size), &size, |b, _| {
            b.iter(|| {
                // Hit everything each buffer
                queue.extend((0..synth.len()).map(|voice| SynthMessage::Press {
                    voice,
                    note: 60,
                    velocity: 0.8,
                }));
                synth.render_from(&mut queue, black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
