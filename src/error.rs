use thiserror::Error;

/// Errors reported by the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("wav file error: {0}")]
    Wav(#[from] hound::Error),
    #[error("unsupported sample format: {bits}-bit {format}, expected 16-bit integer")]
    UnsupportedFormat { bits: u16, format: &'static str },
    #[error("sample data is empty")]
    Empty,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no voice with id {0}")]
    NoSuchVoice(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
