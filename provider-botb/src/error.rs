//! Error types for the Battle of the Bits provider
//!
//! Expected resolution outcomes (404, redirect, unplayable media) are values
//! of [`ResolutionOutcome`](crate::types::ResolutionOutcome). The variants here
//! are contract violations and infrastructure failures.

use bridge_traits::error::BridgeError;
use core_playback::{DecodeError, EncodeError, PlaybackError};
use thiserror::Error;

/// How much attention an error deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected in normal use; report plainly to the user
    Common,
    /// A remote service broke its contract
    Suspicious,
    /// A bug or corrupted local data
    Fault,
}

/// Battle of the Bits provider errors
#[derive(Error, Debug)]
pub enum BotbError {
    /// Catalog answered with something other than the agreed JSON
    #[error("Malformed catalog response from {url} (status {status}): {reason}")]
    MalformedResponse {
        url: String,
        status: u16,
        reason: String,
    },

    /// Catalog record lacks a required field
    #[error("Catalog record is missing `{field}`")]
    MalformedRecord { field: &'static str },

    /// Transport failure talking to `url`
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Media URL refused to serve a playback stream
    #[error("Media stream {url} returned status {status}")]
    StreamStatus { url: String, status: u16 },

    /// Persisted track blob could not be read
    #[error("Invalid track data: {0}")]
    InvalidTrackData(String),

    #[error("Invalid container descriptor: {0}")]
    Codec(#[from] DecodeError),

    /// Track is too large for the persistence format
    #[error("Cannot encode track: {0}")]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl BotbError {
    pub fn severity(&self) -> Severity {
        match self {
            BotbError::MalformedResponse { .. } | BotbError::MalformedRecord { .. } => {
                Severity::Suspicious
            }
            BotbError::Network { .. } | BotbError::StreamStatus { .. } => Severity::Common,
            BotbError::Playback(e) if e.is_transient() => Severity::Common,
            BotbError::Bridge(e) if e.is_network() => Severity::Common,
            BotbError::InvalidTrackData(_)
            | BotbError::Codec(_)
            | BotbError::Encode(_)
            | BotbError::Playback(_)
            | BotbError::Bridge(_) => Severity::Fault,
        }
    }

    /// Returns `true` if a caller-driven retry may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BotbError::Network { .. } => true,
            BotbError::Playback(e) => e.is_transient(),
            BotbError::Bridge(e) => e.is_network(),
            _ => false,
        }
    }

    /// Short text safe to show an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            BotbError::MalformedResponse { .. } | BotbError::MalformedRecord { .. } => {
                "Loading track from botb failed."
            }
            BotbError::Network { .. } => "Connecting to the URL failed.",
            BotbError::StreamStatus { .. } => "That URL is not playable.",
            _ => "Something went wrong while loading the track.",
        }
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, BotbError>;
