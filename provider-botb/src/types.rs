//! Battle of the Bits data types
//!
//! Catalog API response shapes plus the values produced by resolution.

use core_playback::ContainerDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque locator handed to the resolver: a catalog URL, a media URL or a
/// search phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackReference {
    pub identifier: String,
    /// Display hint, usually the track title
    pub hint: Option<String>,
}

impl TrackReference {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Artist block of a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Botbr {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry object from the catalog API
///
/// Every field is optional on the wire; `null` and absent are the same.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(default)]
    pub title: Option<String>,

    /// Direct media URL
    #[serde(default, rename = "play_url")]
    pub media_url: Option<String>,

    #[serde(default)]
    pub botbr: Option<Botbr>,
}

impl CatalogRecord {
    pub fn author_name(&self) -> Option<&str> {
        self.botbr.as_ref().and_then(|b| b.name.as_deref())
    }
}

/// Outcome of a catalog lookup that reached the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOutcome<T> {
    Found(T),
    NotFound,
}

/// Normalized track metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub title: String,
    pub author: String,
    pub media_url: String,
    pub duration_millis: Option<u64>,
}

/// A resolved track: metadata plus the container to decode it with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableTrack {
    pub track: TrackDescriptor,
    pub container: ContainerDescriptor,
}

/// Why a media URL cannot be played
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotPlayableReason {
    /// URL failed to parse or is not http(s); never requested
    InvalidUrl(String),
    /// Non-2xx status, or a 2xx without content
    Status(u16),
    /// Bytes did not match any known container
    UnrecognizedContainer,
}

impl fmt::Display for NotPlayableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotPlayableReason::InvalidUrl(url) => write!(f, "invalid URL {}", url),
            NotPlayableReason::Status(status) => write!(f, "status code {}", status),
            NotPlayableReason::UnrecognizedContainer => f.write_str("unknown container format"),
        }
    }
}

/// Pipeline stage where a transient failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Search,
    Entry,
    Probe,
}

/// A network-level failure eligible for a caller-driven retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientFailure {
    pub stage: ResolutionStage,
    pub cause: String,
}

/// Result of one resolution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved(PlayableTrack),
    /// Redirect hop budget ran out; the caller may re-dispatch this reference
    Redirected(TrackReference),
    NotFound,
    NotPlayable(NotPlayableReason),
    TransientFailure(TransientFailure),
}

impl ResolutionOutcome {
    /// Short text safe to show an end user. `None` when resolved.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            ResolutionOutcome::Resolved(_) | ResolutionOutcome::Redirected(_) => None,
            ResolutionOutcome::NotFound => Some("This track is not available"),
            ResolutionOutcome::NotPlayable(NotPlayableReason::InvalidUrl(_)) => {
                Some("Not a valid URL.")
            }
            ResolutionOutcome::NotPlayable(_) => Some("That URL is not playable."),
            ResolutionOutcome::TransientFailure(failure) => Some(match failure.stage {
                ResolutionStage::Search => "Search failed to find any tracks.",
                ResolutionStage::Entry => "Loading track from botb failed.",
                ResolutionStage::Probe => "Connecting to the URL failed.",
            }),
        }
    }

    /// Only transient failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolutionOutcome::TransientFailure(_))
    }
}
