//! Ready-made synthesizer voices and the small engine they render on.
//!
//! A [`Synthesizer`] owns any number of [`Voice`]s and renders them into an
//! interleaved buffer. The voices come in three families:
//!
//! - [`voice::oscillator::Oscillator`]: a wavetable oscillator with amplitude
//!   and filter envelopes, LFOs, glide and pitch bend
//! - [`voice::sample::Sample`]: an oscillator that plays back a loaded WAV
//! - [`voice::percussive`]: single-shot analog style drums
//!
//! The `demos/` directory holds a runnable program for each voice, and the
//! `synthvoice` binary plays them live.

pub mod dsp;
pub mod error;
pub mod io;
pub mod synth;
pub mod voice;

pub use error::{Error, Result};
pub use synth::{RenderCtx, SynthConfig, SynthMessage, Synthesizer, VoiceId};
pub use voice::{Velocity, Voice};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Frames rendered between two voice `update` calls.
pub const CONTROL_BLOCK: usize = 64;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
