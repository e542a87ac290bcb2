// Purpose: Note playback, the synthesizer that owns the voices, and the
// control messages that drive them from other threads.

pub mod message;
pub mod note;
pub mod synthesizer;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use message::{MessageReceiver, SynthMessage};
pub use note::Note;
pub use synthesizer::{Synthesizer, VoiceId};

/// Context passed down while rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - channel_count: 1 for mono, 2 for interleaved stereo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub channel_count: usize,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, channel_count: usize) -> Self {
        Self {
            sample_rate,
            channel_count: channel_count.max(1),
        }
    }

    pub fn mono(sample_rate: f32) -> Self {
        Self::new(sample_rate, 1)
    }

    pub fn stereo(sample_rate: f32) -> Self {
        Self::new(sample_rate, 2)
    }
}

/// Output format of a [`Synthesizer`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    sample_rate: u32,
    channel_count: u16,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channel_count: 2,
        }
    }
}

impl SynthConfig {
    pub fn new(sample_rate: u32, channel_count: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidConfig("sample rate must be above zero".into()));
        }
        if !(1..=2).contains(&channel_count) {
            return Err(Error::InvalidConfig(format!(
                "channel count must be 1 or 2, got {channel_count}"
            )));
        }

        Ok(Self {
            sample_rate,
            channel_count,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Highest representable frequency, half the sample rate.
    pub fn nyquist(&self) -> f32 {
        self.sample_rate as f32 / 2.0
    }

    pub fn render_ctx(&self) -> RenderCtx {
        RenderCtx::new(self.sample_rate as f32, self.channel_count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_cd_stereo() {
        let config = SynthConfig::default();
        assert_eq!(config.sample_rate(), 44_100);
        assert_eq!(config.channel_count(), 2);
        assert_eq!(config.nyquist(), 22_050.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SynthConfig::new(0, 2),
            Err(Error::InvalidConfig(_))
        ));
        assert!(SynthConfig::new(48_000, 0).is_err());
        assert!(SynthConfig::new(48_000, 3).is_err());
        assert!(SynthConfig::new(48_000, 1).is_ok());
    }
}
