//! Single-cycle wavetables.
//!
//! A [`Waveform`] is an immutable table of signed 16-bit samples shared by
//! reference count, so the same table can back many notes at once without
//! copying. Tables are built from a [`Shape`] with [`WaveformBuilder`], mixed
//! with [`mix`], or wrapped from existing data (e.g. a loaded WAV file).

use std::{f32::consts::TAU, sync::Arc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of samples in a generated table unless a size is given.
pub const DEFAULT_SIZE: usize = 256;

const NOISE_SEED: u64 = 0x5EED_CAFE;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sine,
    Triangle,
    Saw,
    Square,
    Noise,
}

impl Shape {
    /// Value of the shape at `t` cycles, in -1.0 to +1.0. Noise has no
    /// deterministic value and is handled by the builder.
    pub(crate) fn value_at(self, t: f32) -> f32 {
        let t = t.rem_euclid(1.0);
        match self {
            Shape::Sine => (TAU * t).sin(),
            Shape::Triangle => {
                if t < 0.25 {
                    4.0 * t
                } else if t < 0.75 {
                    2.0 - 4.0 * t
                } else {
                    4.0 * t - 4.0
                }
            }
            Shape::Saw => 2.0 * t - 1.0,
            Shape::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Shape::Noise => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waveform(Arc<[i16]>);

impl Waveform {
    pub fn from_samples(samples: Vec<i16>) -> Self {
        Self(samples.into())
    }

    pub fn sine() -> Self {
        WaveformBuilder::new(Shape::Sine).build()
    }

    pub fn triangle() -> Self {
        WaveformBuilder::new(Shape::Triangle).build()
    }

    pub fn saw() -> Self {
        WaveformBuilder::new(Shape::Saw).build()
    }

    pub fn square() -> Self {
        WaveformBuilder::new(Shape::Square).build()
    }

    pub fn noise() -> Self {
        WaveformBuilder::new(Shape::Noise).build()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i16] {
        &self.0
    }

    /// Linearly interpolated value at `phase` cycles, scaled to -1.0..=1.0.
    pub fn sample_at(&self, phase: f32) -> f32 {
        let len = self.0.len();
        if len == 0 {
            return 0.0;
        }

        let position = phase.rem_euclid(1.0) * len as f32;
        let index = (position as usize).min(len - 1);
        let next = (index + 1) % len;
        let frac = position - index as f32;

        let a = self.0[index] as f32;
        let b = self.0[next] as f32;
        (a + (b - a) * frac) / 32768.0
    }
}

impl AsRef<[i16]> for Waveform {
    fn as_ref(&self) -> &[i16] {
        &self.0
    }
}

impl From<Vec<i16>> for Waveform {
    fn from(samples: Vec<i16>) -> Self {
        Self::from_samples(samples)
    }
}

/// Builder for generated tables.
///
/// ```
/// use synthvoice::dsp::waveform::{Shape, WaveformBuilder};
///
/// // Half a cycle out of phase, used by the kick drum
/// let offset_sine = WaveformBuilder::new(Shape::Sine).phase(0.5).build();
/// assert_eq!(offset_sine.len(), 256);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WaveformBuilder {
    shape: Shape,
    amplitude: f32,
    phase: f32,
    frequency: f32,
    size: usize,
    seed: u64,
}

impl WaveformBuilder {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            amplitude: 1.0,
            phase: 0.0,
            frequency: 1.0,
            size: DEFAULT_SIZE,
            seed: NOISE_SEED,
        }
    }

    /// Peak level, 0.0 - 1.0.
    pub fn amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    /// Start offset in cycles.
    pub fn phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    /// Number of cycles stored in the table.
    pub fn frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size.max(2);
        self
    }

    /// Seed for [`Shape::Noise`]; the same seed always yields the same table.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Waveform {
        let scale = self.amplitude * i16::MAX as f32;

        let samples = if self.shape == Shape::Noise {
            let mut rng = oorandom::Rand32::new(self.seed);
            (0..self.size)
                .map(|_| to_i16((rng.rand_float() * 2.0 - 1.0) * scale))
                .collect()
        } else {
            (0..self.size)
                .map(|i| {
                    let t = i as f32 / self.size as f32 * self.frequency + self.phase;
                    to_i16(self.shape.value_at(t) * scale)
                })
                .collect()
        };

        Waveform::from_samples(samples)
    }
}

/// Sum tables with per-table levels, clipping to the 16-bit range.
///
/// The result has the length of the longest input; shorter tables are
/// stretched by nearest-sample lookup.
pub fn mix(parts: &[(Waveform, f32)]) -> Waveform {
    let len = parts.iter().map(|(w, _)| w.len()).max().unwrap_or(0);

    let samples = (0..len)
        .map(|i| {
            let sum: f32 = parts
                .iter()
                .filter(|(w, _)| !w.is_empty())
                .map(|(w, level)| {
                    let index = i * w.len() / len;
                    w.as_slice()[index] as f32 * level
                })
                .sum();
            to_i16(sum)
        })
        .collect();

    Waveform::from_samples(samples)
}

#[inline]
fn to_i16(value: f32) -> i16 {
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
