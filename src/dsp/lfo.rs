//! Low Frequency Oscillator (LFO) control source.

use crate::dsp::waveform::{Shape, Waveform};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at control rate (roughly 0.01 Hz - 20 Hz).
Nobody listens to it directly; its output moves a parameter of something
that is audible.

Output
------

    value = offset + scale * shape(phase + phase_offset)

`shape` is bipolar (-1.0 to +1.0). `offset` is the resting value of the
parameter and `scale` is how far the LFO swings it. The voices lean on this
directly:

    tremolo   offset = amplitude,  scale = tremolo depth
    vibrato   offset = 0 octaves,  scale = vibrato depth (octaves)
    auto-pan  offset = pan,        scale = pan depth
    filter    offset = 0 Hz,       scale = filter depth (Hz)

With scale = 0 the LFO is a constant, which is how an unused modulator
costs nothing musically.


Shapes
------

Without a custom table the LFO is a triangle that starts at 0 and rises.
A custom `Waveform` table can replace it; tables are read with linear
interpolation between entries.


One-Shot Mode
-------------

A `once` LFO runs a single cycle and then holds its final value. The table
is stretched so its first entry is phase 0.0 and its last entry is phase
1.0, without wrapping back to the start. A two-entry table therefore turns
the LFO into a straight ramp:

    table [+1, -1], once, rate 20 Hz
        → falls from offset+scale to offset-scale over 50 ms, then holds

The percussive voices bend their pitch this way.

`retrigger()` restarts the cycle from phase 0.


Typical Frequencies
-------------------

    0.01 - 0.1 Hz   Very slow sweeps, evolving textures
    0.5 - 2 Hz      Classic tremolo, auto-pan
    2 - 7 Hz        Vibrato sweet spot
    > 15 Hz         Approaching audio rate (FM/AM territory)
*/

#[derive(Debug, Clone)]
pub struct Lfo {
    waveform: Option<Waveform>,
    rate: f32,
    scale: f32,
    offset: f32,
    phase_offset: f32,
    once: bool,
    interpolate: bool,

    phase: f32,
    finished: bool,
    value: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Lfo {
    pub fn new() -> Self {
        let mut lfo = Self {
            waveform: None,
            rate: 1.0,
            scale: 1.0,
            offset: 0.0,
            phase_offset: 0.0,
            once: false,
            interpolate: true,
            phase: 0.0,
            finished: false,
            value: 0.0,
        };
        lfo.refresh();
        lfo
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.set_rate(rate);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.set_scale(scale);
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.set_offset(offset);
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.set_waveform(Some(waveform));
        self
    }

    /// Run a single cycle per trigger and hold the final value.
    pub fn once(mut self) -> Self {
        self.once = true;
        self.refresh();
        self
    }

    /// Step between table entries instead of blending them.
    pub fn stepped(mut self) -> Self {
        self.set_interpolate(false);
        self
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn tick(&mut self, dt: f32) -> f32 {
        if !self.finished {
            self.phase += self.rate * dt;
            if self.phase >= 1.0 {
                if self.once {
                    self.phase = 1.0;
                    self.finished = true;
                } else {
                    self.phase = self.phase.fract();
                }
            }
        }

        self.refresh();
        self.value
    }

    /// Restart the cycle from phase 0.
    pub fn retrigger(&mut self) {
        self.phase = 0.0;
        self.finished = false;
        self.refresh();
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(0.0);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.refresh();
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
        self.refresh();
    }

    pub fn phase_offset(&self) -> f32 {
        self.phase_offset
    }

    pub fn set_phase_offset(&mut self, phase_offset: f32) {
        self.phase_offset = phase_offset;
        self.refresh();
    }

    pub fn waveform(&self) -> Option<&Waveform> {
        self.waveform.as_ref()
    }

    pub fn set_waveform(&mut self, waveform: Option<Waveform>) {
        self.waveform = waveform.filter(|w| !w.is_empty());
        self.refresh();
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    pub fn set_interpolate(&mut self, interpolate: bool) {
        self.interpolate = interpolate;
        self.refresh();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn refresh(&mut self) {
        self.value = self.offset + self.scale * self.shape();
    }

    fn shape(&self) -> f32 {
        let phase = self.phase + self.phase_offset;

        match &self.waveform {
            None => {
                // A finished one-shot stays at the end of the cycle
                let phase = if self.once && phase >= 1.0 { 0.999_999 } else { phase };
                Shape::Triangle.value_at(phase)
            }
            Some(table) if self.once => {
                // Stretch first..last entry over the single cycle
                let samples = table.as_slice();
                let last = samples.len() - 1;
                let position = phase.clamp(0.0, 1.0) * last as f32;
                let index = (position as usize).min(last);
                let next = (index + 1).min(last);
                let frac = if self.interpolate { position - index as f32 } else { 0.0 };
                let a = samples[index] as f32;
                let b = samples[next] as f32;
                (a + (b - a) * frac) / 32768.0
            }
            Some(table) if self.interpolate => table.sample_at(phase),
            Some(table) => {
                let samples = table.as_slice();
                let index = (phase.rem_euclid(1.0) * samples.len() as f32) as usize;
                samples[index.min(samples.len() - 1)] as f32 / 32768.0
            }
        }
    }
}

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
///
/// Useful when a parameter expects positive-only modulation.
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Convert unipolar signal (0.0 to 1.0) to bipolar (-1.0 to +1.0).
///
/// Useful when you have a 0-1 source but need symmetric modulation.
#[inline]
pub fn unipolar_to_bipolar(unipolar: f32) -> f32 {
    (unipolar * 2.0) - 1.0
}

/// Calculate LFO period in seconds from frequency.
///
/// # Example
/// ```
/// use synthvoice::dsp::lfo::period_from_frequency;
/// let period = period_from_frequency(5.0);
/// assert!((period - 0.2).abs() < 1e-6); // 5 Hz = 200ms period
/// ```
#[inline]
pub fn period_from_frequency(frequency_hz: f32) -> f32 {
    1.0 / frequency_hz
}

/// Calculate samples per LFO period.
///
/// # Example
/// ```
/// use synthvoice::dsp::lfo::samples_per_period;
/// let samples = samples_per_period(5.0, 48000.0);
/// assert_eq!(samples, 9600.0); // 5 Hz at 48kHz = 9600 samples
/// ```
#[inline]
pub fn samples_per_period(frequency_hz: f32, sample_rate: f32) -> f32 {
    sample_rate / frequency_hz
}
