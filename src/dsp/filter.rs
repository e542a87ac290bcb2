use std::f32::consts::{FRAC_1_SQRT_2, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::synth::RenderCtx;

/*
| type      | passes          | rejects         |
| --------- | --------------- | --------------- |
| low-pass  | below cutoff    | above cutoff    |
| high-pass | above cutoff    | below cutoff    |
| band-pass | around cutoff   | either side     |

The filter is the topology-preserving (TPT) state variable filter. All three
responses come out of the same two integrators; `filter_type` only selects
which tap is returned.

Resonance is expressed as Q. Damping is k = 1/Q, so Q = 1/√2 gives the flat
Butterworth response and higher Q values peak at the cutoff.
*/

/// Lowest usable Q. Anything below this is clamped up to it.
pub const MIN_Q: f32 = FRAC_1_SQRT_2;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
}

/// Filter applied to a single note.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub kind: FilterType,
    pub frequency: f32,
    pub q: f32,
}

impl FilterSettings {
    pub fn new(kind: FilterType, frequency: f32, q: f32) -> Self {
        Self { kind, frequency, q }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: cutoff_hz.max(0.0),
            q: q.max(MIN_Q),
            filter_type,
        }
    }

    pub fn from_settings(settings: FilterSettings) -> Self {
        Self::new(settings.kind, settings.frequency, settings.q)
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, MIN_Q)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, MIN_Q)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, MIN_Q)
    }

    /// Take new settings without clearing the integrators, so a moving
    /// cutoff does not click.
    pub fn apply(&mut self, settings: FilterSettings) {
        self.filter_type = settings.kind;
        self.set_cutoff(settings.frequency);
        self.set_q(settings.q);
    }

    #[inline]
    fn coefficients(&self, ctx: &RenderCtx) -> (f32, f32) {
        // Keep the prewarp below nyquist where tan() blows up
        let cutoff = self.cutoff_hz.min(ctx.sample_rate * 0.49);
        let g = (TAU * cutoff / (2.0 * ctx.sample_rate)).tan();
        (g, 1.0 / self.q)
    }

    pub fn tick(&mut self, sample: f32, g: f32, k: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    /// Filter a single sample.
    pub fn next_sample(&mut self, sample: f32, ctx: &RenderCtx) -> f32 {
        let (g, k) = self.coefficients(ctx);
        self.select(sample, g, k)
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let (g, k) = self.coefficients(ctx);
        for sample in buffer.iter_mut() {
            *sample = self.select(*sample, g, k);
        }
    }

    #[inline]
    fn select(&mut self, sample: f32, g: f32, k: f32) -> f32 {
        let outputs = self.tick(sample, g, k);
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff.max(0.0);
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q.max(MIN_Q);
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 1024];
        filter.render(&mut buffer, &RenderCtx::mono(SAMPLE_RATE));

        assert!((buffer[1023] - 1.0).abs() < 0.01, "got {}", buffer[1023]);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 1024];
        filter.render(&mut buffer, &RenderCtx::mono(SAMPLE_RATE));

        assert!(buffer[1023].abs() < 0.001, "got {}", buffer[1023]);
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = sine(5_000.0, 1024);
        filter.render(&mut buffer, &RenderCtx::mono(SAMPLE_RATE));

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.05, "expected attenuation, got peak {peak}");
    }

    #[test]
    fn bandpass_emphasizes_cutoff() {
        let ctx = RenderCtx::mono(SAMPLE_RATE);
        let mut filter = SVFilter::bandpass(1_000.0);
        filter.set_q(4.0);

        let mut centre = sine(1_000.0, 2048);
        filter.render(&mut centre, &ctx);
        let centre_peak = peak_after_transient(&centre);

        filter.reset();
        let mut off = sine(200.0, 2048);
        filter.render(&mut off, &ctx);
        let off_peak = peak_after_transient(&off);

        assert!(
            centre_peak > off_peak * 2.0,
            "centre={centre_peak}, off={off_peak}"
        );
    }

    #[test]
    fn higher_q_boosts_cutoff() {
        let ctx = RenderCtx::mono(SAMPLE_RATE);
        let mut flat = SVFilter::lowpass(1_000.0);
        let mut resonant = SVFilter::lowpass(1_000.0);
        resonant.set_q(4.0);

        let mut a = sine(1_000.0, 2048);
        let mut b = a.clone();
        flat.render(&mut a, &ctx);
        resonant.render(&mut b, &ctx);

        assert!(peak_after_transient(&b) > peak_after_transient(&a) * 2.0);
    }

    #[test]
    fn q_is_clamped_to_butterworth() {
        let mut filter = SVFilter::lowpass(1_000.0);
        filter.set_q(0.1);
        assert!((filter.q() - MIN_Q).abs() < 1e-6);
    }

    #[test]
    fn next_sample_matches_render() {
        let ctx = RenderCtx::mono(SAMPLE_RATE);
        let input = sine(3_000.0, 64);

        let mut block = input.clone();
        SVFilter::highpass(800.0).render(&mut block, &ctx);

        let mut filter = SVFilter::highpass(800.0);
        for (x, expected) in input.iter().zip(&block) {
            assert!((filter.next_sample(*x, &ctx) - expected).abs() < 1e-6);
        }
    }
}
