// Purpose: Playable voices built from notes and control-rate modulators.
// A voice turns press/release events into note parameters once per control
// block; the notes do the per-sample work.

pub mod oscillator;
pub mod percussive;
pub mod sample;

use std::any::Any;

use crate::{
    dsp::filter::{FilterSettings, FilterType, MIN_Q},
    synth::{RenderCtx, SynthConfig},
};

pub use oscillator::{Oscillator, OscillatorPatch};
pub use percussive::{Cymbal, Drum, Tom};
pub use sample::Sample;

/// High-pass cutoffs at or below this are treated as no filter.
pub const HIGHPASS_MIN_FREQUENCY: f32 = 50.0;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_to_hz(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Strength of a press, 0.0 - 1.0.
///
/// Built from an `f32` as is, or from a MIDI velocity byte (divided by 127).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity(f32);

impl Velocity {
    pub const FULL: Velocity = Velocity(1.0);

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Self::FULL
    }
}

impl From<f32> for Velocity {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl From<u8> for Velocity {
    fn from(value: u8) -> Self {
        Self(value as f32 / 127.0)
    }
}

/// State every voice shares: the held note, velocity and the filter
/// settings.
#[derive(Debug, Clone)]
pub struct VoiceCore {
    note: Option<u8>,
    velocity: f32,
    velocity_amount: f32,

    filter_type: FilterType,
    filter_frequency: f32,
    filter_resonance: f32,
    // Last (type, frequency, q) pushed to the notes
    filter_cache: Option<(FilterType, f32, f32)>,

    sample_rate: f32,
}

impl VoiceCore {
    pub fn new(config: &SynthConfig) -> Self {
        Self {
            note: None,
            velocity: 0.0,
            velocity_amount: 1.0,
            filter_type: FilterType::LowPass,
            filter_frequency: config.nyquist(),
            filter_resonance: MIN_Q,
            filter_cache: None,
            sample_rate: config.sample_rate() as f32,
        }
    }

    /// Store the velocity and hold `note`. Returns false if `note` was
    /// already held.
    pub fn press(&mut self, note: u8, velocity: Velocity) -> bool {
        self.velocity = velocity.value();
        if self.note == Some(note) {
            return false;
        }
        self.note = Some(note);
        true
    }

    /// Let go of the held note. Returns false if nothing was held.
    pub fn release(&mut self) -> bool {
        self.note.take().is_some()
    }

    pub fn pressed(&self) -> bool {
        self.note.is_some()
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Envelope scale for the current velocity:
    /// `1 - (1 - velocity) * velocity_amount`.
    pub fn velocity_mod(&self) -> f32 {
        1.0 - (1.0 - self.velocity.clamp(0.0, 1.0)) * self.velocity_amount
    }

    pub fn velocity_amount(&self) -> f32 {
        self.velocity_amount
    }

    pub fn set_velocity_amount(&mut self, value: f32) {
        self.velocity_amount = value.clamp(0.0, 1.0);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn set_filter_type(&mut self, value: FilterType) {
        self.filter_type = value;
    }

    pub fn filter_frequency(&self) -> f32 {
        self.filter_frequency
    }

    pub fn set_filter_frequency(&mut self, value: f32) {
        self.filter_frequency = value.clamp(0.0, self.nyquist());
    }

    pub fn filter_resonance(&self) -> f32 {
        self.filter_resonance
    }

    pub fn set_filter_resonance(&mut self, value: f32) {
        self.filter_resonance = value.max(MIN_Q);
    }

    /// Resolve the note filter for an effective cutoff of `frequency`.
    ///
    /// Returns `None` when nothing changed since the last call, otherwise the
    /// filter the notes should use. A low-pass at or above nyquist and a
    /// high-pass at or below [`HIGHPASS_MIN_FREQUENCY`] resolve to no filter.
    pub fn resolve_filter(&mut self, frequency: f32) -> Option<Option<FilterSettings>> {
        let current = (self.filter_type, frequency, self.filter_resonance);
        if self.filter_cache == Some(current) {
            return None;
        }
        self.filter_cache = Some(current);

        let bypass = match self.filter_type {
            FilterType::LowPass => frequency >= self.nyquist(),
            FilterType::HighPass => frequency <= HIGHPASS_MIN_FREQUENCY,
            FilterType::BandPass => false,
        };

        Some((!bypass).then(|| FilterSettings::new(self.filter_type, frequency, self.filter_resonance)))
    }
}

/// A playable instrument voice.
///
/// Voices are driven by [`press`](Voice::press) and
/// [`release`](Voice::release), advanced once per control block by
/// [`update`](Voice::update), and mixed into the output by
/// [`render`](Voice::render).
pub trait Voice: Send {
    fn core(&self) -> &VoiceCore;
    fn core_mut(&mut self) -> &mut VoiceCore;

    /// Press `note` at `velocity`. Returns true if a new note started; the
    /// velocity is applied either way.
    fn press(&mut self, note: u8, velocity: Velocity) -> bool;

    /// Returns true if a held note was released.
    fn release(&mut self) -> bool;

    fn pressed(&self) -> bool {
        self.core().pressed()
    }

    /// Advance modulation by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Mix the voice into interleaved `out`.
    fn render(&mut self, out: &mut [f32], ctx: &RenderCtx);

    fn amplitude(&self) -> f32;
    fn set_amplitude(&mut self, value: f32);

    /// Pitch bend in -1.0..=1.0. Voices without a bend range ignore it.
    fn set_bend(&mut self, _value: f32) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn filter_type(&self) -> FilterType {
        self.core().filter_type()
    }

    fn set_filter_type(&mut self, value: FilterType) {
        self.core_mut().set_filter_type(value);
    }

    fn filter_frequency(&self) -> f32 {
        self.core().filter_frequency()
    }

    fn set_filter_frequency(&mut self, value: f32) {
        self.core_mut().set_filter_frequency(value);
    }

    fn filter_resonance(&self) -> f32 {
        self.core().filter_resonance()
    }

    fn set_filter_resonance(&mut self, value: f32) {
        self.core_mut().set_filter_resonance(value);
    }

    fn velocity_amount(&self) -> f32 {
        self.core().velocity_amount()
    }

    fn set_velocity_amount(&mut self, value: f32) {
        self.core_mut().set_velocity_amount(value);
    }
}
