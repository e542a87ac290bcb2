//! Scenario benchmarks.
//!
//! These model the demos: single voices at control rate and a synthesizer
//! rendering a full drum kit.

mod synth;
mod voices;

pub use synth::bench_synth;
pub use voices::bench_voices;
