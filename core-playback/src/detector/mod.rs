//! # Container Detection
//!
//! The [`ContainerDetector`] trait is the seam to whatever inspects a media
//! stream's bytes. [`SymphoniaContainerDetector`] is the bundled
//! implementation (feature `symphonia-probe`).

use async_trait::async_trait;
use bridge_traits::http::DynAsyncRead;

use crate::container::{ContainerHints, DetectedContainer};
use crate::error::Result;

pub mod format_detector;

#[cfg(feature = "symphonia-probe")]
mod symphonia;

pub use format_detector::sniff_format;

#[cfg(feature = "symphonia-probe")]
pub use self::symphonia::SymphoniaContainerDetector;

/// Identifies the container of a byte stream.
///
/// Implementations consume as much of `stream` as they need and drop the
/// rest; the caller must not expect the stream to be reusable.
#[async_trait]
pub trait ContainerDetector: Send + Sync {
    /// Returns `Ok(None)` when no known container matched.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading the stream fails.
    async fn detect(
        &self,
        stream: Box<DynAsyncRead>,
        hints: &ContainerHints,
    ) -> Result<Option<DetectedContainer>>;
}
