//! # Playback Error Types
//!
//! Error types for container detection and descriptor persistence.

use thiserror::Error;

/// Errors that can occur while inspecting a media stream.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Audio format is not recognized or cannot be parsed.
    #[error("Unsupported or invalid audio format: {0}")]
    InvalidFormat(String),

    /// I/O error occurred while reading the stream.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Detection task was cancelled or panicked.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, PlaybackError::IoError(_))
    }
}

/// Errors produced when decoding a persisted container descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown descriptor tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("Truncated descriptor: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Descriptor field is not valid UTF-8")]
    InvalidUtf8,

    #[error("Unknown container format token: {0}")]
    UnknownFormat(String),

    #[error("Duplicate descriptor parameter: {0}")]
    DuplicateParameter(String),

    #[error("{0} trailing bytes after descriptor")]
    TrailingBytes(usize),
}

/// Errors produced when encoding a value for storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Field of {0} bytes does not fit a u32 length prefix")]
    FieldTooLong(usize),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_transient() {
        let err = PlaybackError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(err.is_transient());
        assert!(!PlaybackError::InvalidFormat("xyz".into()).is_transient());
    }

    #[test]
    fn test_decode_error_display() {
        assert_eq!(
            DecodeError::UnknownTag(0xFF).to_string(),
            "Unknown descriptor tag: 0xff"
        );
    }
}
