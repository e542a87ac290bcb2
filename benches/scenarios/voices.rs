//! Benchmarks for whole voices: one control update plus one 64-frame block,
//! which is what the synthesizer does per voice per block.

use std::hint::black_box;

use criterion::Criterion;
use synthvoice::{
    dsp::{waveform::mix, Waveform},
    voice::{Cymbal, Drum, Oscillator, Sample, Tom, Velocity},
    RenderCtx, SynthConfig, Voice, CONTROL_BLOCK,
};

fn bench_block(c: &mut Criterion, name: &str, voice: &mut dyn Voice, ctx: &RenderCtx) {
    let dt = CONTROL_BLOCK as f32 / ctx.sample_rate;
    let mut buffer = vec![0.0f32; CONTROL_BLOCK * ctx.channel_count];

    c.bench_function(&format!("scenarios/voices/{name}"), |b| {
        b.iter(|| {
            voice.update(black_box(dt));
            buffer.fill(0.0);
            voice.render(black_box(&mut buffer), ctx);
        })
    });
}

pub fn bench_voices(c: &mut Criterion) {
    let config = SynthConfig::default();
    let ctx = config.render_ctx();

    // Bare oscillator, the simpletest voice
    let mut plain = Oscillator::new(&config);
    plain.press(60, Velocity::FULL);
    bench_block(c, "oscillator", &mut plain, &ctx);

    // Everything modulating: vibrato, tremolo, auto-pan, filter envelope + LFO
    let mut pad = Oscillator::new(&config);
    pad.set_waveform(Some(mix(&[(Waveform::saw(), 1.0), (Waveform::square(), 0.5)])));
    pad.set_vibrato_rate(6.0);
    pad.set_vibrato_depth(0.02);
    pad.set_tremolo_rate(3.0);
    pad.set_tremolo_depth(0.2);
    pad.set_pan_rate(0.5);
    pad.set_pan_depth(0.5);
    pad.set_filter_frequency(400.0);
    pad.set_filter_resonance(2.0);
    pad.set_filter_amount(2_000.0);
    pad.set_filter_rate(0.5);
    pad.set_filter_depth(500.0);
    pad.press(48, Velocity::FULL);
    bench_block(c, "oscillator_modulated", &mut pad, &ctx);

    let mut sample = Sample::new(&config);
    let data: Vec<i16> = (0..4096)
        .map(|i| ((i as f32 * 0.0627).sin() * 20_000.0) as i16)
        .collect();
    sample.set_waveform_data(data, 44_100);
    sample.press(60, Velocity::FULL);
    bench_block(c, "sample", &mut sample, &ctx);

    // Drums are retriggered every iteration so they never fall silent
    let drums: Vec<(&str, Box<dyn Voice>)> = vec![
        ("kick", Box::new(Drum::kick(&config))),
        ("snare", Box::new(Drum::snare(&config))),
        ("closed_hat", Box::new(Cymbal::closed_hat(&config))),
        ("floor_tom", Box::new(Tom::floor(&config))),
    ];
    for (name, mut drum) in drums {
        let dt = CONTROL_BLOCK as f32 / ctx.sample_rate;
        let mut buffer = vec![0.0f32; CONTROL_BLOCK * ctx.channel_count];
        c.bench_function(&format!("scenarios/voices/{name}"), |b| {
            b.iter(|| {
                drum.press(36, Velocity::FULL);
                drum.update(black_box(dt));
                buffer.fill(0.0);
                drum.render(black_box(&mut buffer), &ctx);
            })
        });
    }
}
