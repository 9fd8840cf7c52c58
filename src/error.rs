use thiserror::Error;

// Errors raised while decoding chunks or operating on tag stores.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Truncated data: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Unsupported ID3v2 version: 2.{0}")]
    UnsupportedVersion(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        Error::UnsupportedOperation(what.into())
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, Error::Truncated { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
