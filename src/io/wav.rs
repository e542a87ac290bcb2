use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{Error, Result};

/// Mono sample data read from a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavData {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl WavData {
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Read at most `max_frames` frames of a 16-bit integer WAV file.
///
/// Only the first channel of multi-channel files is kept.
pub fn load(path: &Path, max_frames: usize) -> Result<WavData> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::UnsupportedFormat {
            bits: spec.bits_per_sample,
            format: match spec.sample_format {
                SampleFormat::Int => "integer",
                SampleFormat::Float => "float",
            },
        });
    }

    let channels = spec.channels.max(1) as usize;
    let samples = reader
        .samples::<i16>()
        .step_by(channels)
        .take(max_frames)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if samples.is_empty() {
        return Err(Error::Empty);
    }

    Ok(WavData {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write interleaved `f32` frames as a 16-bit integer WAV file.
///
/// Samples are clipped to -1.0..=1.0.
pub fn save(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
