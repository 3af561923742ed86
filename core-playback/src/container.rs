//! # Container Model
//!
//! Types describing the binary container of a media stream: which format it
//! is, the parameters a decoder needs, and the hints a detector may use.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PlaybackError;

/// Container formats the detector can identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Mp3,
    Adts,
    Flac,
    Ogg,
    Wav,
    Mp4,
    Matroska,
}

impl ContainerFormat {
    /// Every known format, in token order.
    pub const ALL: [ContainerFormat; 7] = [
        ContainerFormat::Mp3,
        ContainerFormat::Adts,
        ContainerFormat::Flac,
        ContainerFormat::Ogg,
        ContainerFormat::Wav,
        ContainerFormat::Mp4,
        ContainerFormat::Matroska,
    ];

    /// Stable token used for persistence and logging.
    pub fn token(&self) -> &'static str {
        match self {
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::Adts => "adts",
            ContainerFormat::Flac => "flac",
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::Wav => "wav",
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Matroska => "mkv",
        }
    }

    /// Parse a token produced by [`ContainerFormat::token`].
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|format| format.token() == token)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ContainerFormat {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| PlaybackError::InvalidFormat(s.to_string()))
    }
}

/// Identifies a stream's container plus the parameters needed to decode it.
///
/// The descriptor without a format is the "no stored format" sentinel. Two
/// descriptors are equal iff their format and parameters match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDescriptor {
    format: Option<ContainerFormat>,
    parameters: BTreeMap<String, String>,
}

impl ContainerDescriptor {
    pub fn new(format: ContainerFormat) -> Self {
        Self {
            format: Some(format),
            parameters: BTreeMap::new(),
        }
    }

    /// The sentinel descriptor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a format-specific parameter. Ignored on the sentinel.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if self.format.is_some() {
            self.parameters.insert(key.into(), value.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.format.is_none()
    }

    pub fn format(&self) -> Option<ContainerFormat> {
        self.format
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

impl fmt::Display for ContainerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            None => f.write_str("none"),
            Some(format) => {
                write!(f, "{}", format)?;
                for (key, value) in &self.parameters {
                    write!(f, " {}={}", key, value)?;
                }
                Ok(())
            }
        }
    }
}

/// Hints handed to a detector alongside the byte stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerHints {
    /// MIME type without parameters, lowercased
    pub mime_type: Option<String>,
    /// File extension of the media URL path, lowercased
    pub extension: Option<String>,
}

impl ContainerHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the MIME type from a raw `Content-Type` value.
    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        self.mime_type = content_type
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty());
        self
    }

    pub fn with_extension(mut self, extension: Option<&str>) -> Self {
        self.extension = extension
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty());
        self
    }
}

/// Result of a successful detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedContainer {
    pub descriptor: ContainerDescriptor,
    /// Media length, when the container declares it
    pub duration_ms: Option<u64>,
}

impl DetectedContainer {
    pub fn new(descriptor: ContainerDescriptor) -> Self {
        Self {
            descriptor,
            duration_ms: None,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: Option<u64>) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for format in ContainerFormat::ALL {
            assert_eq!(ContainerFormat::from_token(format.token()), Some(format));
        }
        assert_eq!(ContainerFormat::from_token("MP3"), None);
        assert!("wma".parse::<ContainerFormat>().is_err());
    }

    #[test]
    fn test_descriptor_equality() {
        let a = ContainerDescriptor::new(ContainerFormat::Mp3).with_parameter("codec", "mp3");
        let b = ContainerDescriptor::new(ContainerFormat::Mp3).with_parameter("codec", "mp3");
        let c = ContainerDescriptor::new(ContainerFormat::Mp3).with_parameter("codec", "aac");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, ContainerDescriptor::new(ContainerFormat::Mp3));
    }

    #[test]
    fn test_sentinel_ignores_parameters() {
        let sentinel = ContainerDescriptor::empty().with_parameter("codec", "mp3");
        assert!(sentinel.is_empty());
        assert!(sentinel.parameters().is_empty());
        assert_eq!(sentinel.to_string(), "none");
    }

    #[test]
    fn test_hints_strip_parameters() {
        let hints = ContainerHints::new()
            .with_content_type(Some("Audio/MPEG; charset=binary"))
            .with_extension(Some("MP3"));

        assert_eq!(hints.mime_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(hints.extension.as_deref(), Some("mp3"));

        let blank = ContainerHints::new().with_content_type(Some("  ; x=y"));
        assert_eq!(blank.mime_type, None);
    }
}
