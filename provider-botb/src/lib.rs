//! # Battle of the Bits Provider
//!
//! Resolves Battle of the Bits identifiers into playable tracks.
//!
//! ## Overview
//!
//! An identifier goes through these stages:
//! - [`classifier`]: entry URL, player URL, `botb ` search, or not ours
//! - [`catalog`]: entry load or search against the JSON API
//! - [`descriptor`]: catalog record to [`TrackDescriptor`]
//! - [`prober`]: status, redirect and container detection on the media URL
//!
//! [`BotbSourceManager`] drives the pipeline and persists resolved tracks.

pub mod catalog;
pub mod classifier;
pub mod descriptor;
pub mod error;
pub mod prober;
pub mod source;
pub mod types;

pub use catalog::CatalogClient;
pub use classifier::{classify, Classification};
pub use error::{BotbError, Result, Severity};
pub use prober::{ContainerProber, ProbeOutcome};
pub use source::{BotbSourceManager, SOURCE_NAME};
pub use types::{
    CatalogOutcome, CatalogRecord, NotPlayableReason, PlayableTrack, ResolutionOutcome,
    ResolutionStage, TrackDescriptor, TrackReference, TransientFailure,
};
