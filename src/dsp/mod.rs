//! Low-level DSP primitives used by the notes and voices.
//!
//! Everything here except [`analysis`] is allocation-free once built and safe
//! to run on the audio thread. The primitives stay focused on the signal math;
//! the voices decide how they are wired together.

/// Spectrum, pitch detection and sample data helpers.
pub mod analysis;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with low, high and band-pass responses.
pub mod filter;
/// Linear control-value glides and the attack/release envelope built on them.
pub mod lerp;
/// Low frequency oscillator control source.
pub mod lfo;
/// Shared single-cycle wavetables.
pub mod waveform;

pub use envelope::{Envelope, EnvelopeParams, EnvelopeState};
pub use filter::{FilterSettings, FilterType, SVFilter};
pub use lerp::{ArEnvelope, Lerp};
pub use lfo::Lfo;
pub use waveform::{Shape, Waveform, WaveformBuilder};
