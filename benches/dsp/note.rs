//! Benchmarks for a single note: table lookup, envelope, pan and filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synthvoice::{
    dsp::{filter::FilterSettings, EnvelopeParams, FilterType, Waveform},
    synth::Note,
    RenderCtx,
};

use crate::BLOCK_SIZES;

pub fn bench_note(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/note");
    let mono = RenderCtx::mono(48_000.0);
    let stereo = RenderCtx::stereo(48_000.0);

    for &size in BLOCK_SIZES {
        // Default square, mono
        let mut buffer = vec![0.0f32; size];
        let mut note = Note::new(220.0);
        note.press();
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                note.render_add(black_box(&mut buffer), black_box(&mono));
            })
        });

        // Wavetable with envelope, panned stereo and low-passed
        let mut buffer = vec![0.0f32; size * 2];
        let mut note = Note::new(220.0)
            .with_waveform(Waveform::saw())
            .with_envelope(EnvelopeParams {
                attack_time: 0.01,
                decay_time: 0.2,
                sustain_level: 0.6,
                ..EnvelopeParams::default()
            })
            .with_panning(-0.3)
            .with_filter(FilterSettings::new(FilterType::LowPass, 1_200.0, 2.0));
        note.press();
        group.bench_with_input(BenchmarkId::new("saw_filtered_stereo", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                note.render_add(black_box(&mut buffer), black_box(&stereo));
            })
        });
    }

    group.finish();
}
