//! Benchmarks for control-rate modulators.
//!
//! These tick once per 64-frame block, so the numbers here are per block,
//! not per sample.

use std::hint::black_box;

use criterion::Criterion;
use synthvoice::dsp::{
    lerp::{ArEnvelope, Lerp},
    Lfo, Waveform,
};

const DT: f32 = 64.0 / 48_000.0;

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    let mut triangle = Lfo::new().with_rate(5.0);
    group.bench_function("triangle", |b| {
        b.iter(|| black_box(triangle.tick(black_box(DT))))
    });

    let mut table = Lfo::new().with_waveform(Waveform::sine()).with_rate(5.0);
    group.bench_function("table", |b| {
        b.iter(|| black_box(table.tick(black_box(DT))))
    });

    let mut lerp = Lerp::new(0.5, 0.0);
    lerp.set_value(1.0);
    group.bench_function("lerp", |b| b.iter(|| black_box(lerp.tick(black_box(DT)))));

    let mut ar = ArEnvelope::new(0.5, 0.5, 1.0);
    ar.press();
    group.bench_function("ar_envelope", |b| {
        b.iter(|| black_box(ar.tick(black_box(DT))))
    });

    group.finish();
}
