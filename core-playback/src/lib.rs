//! # Container Layer
//!
//! Describes and detects the binary container of a media stream.
//!
//! ## Overview
//!
//! This module handles:
//! - The container model ([`ContainerFormat`], [`ContainerDescriptor`])
//! - Detection through the [`ContainerDetector`] seam, with a Symphonia
//!   implementation behind the `symphonia-probe` feature
//! - The binary descriptor codec used by cache and queue stores

pub mod codec;
pub mod container;
pub mod detector;
pub mod error;

pub use codec::{decode_descriptor, encode_descriptor};
pub use container::{ContainerDescriptor, ContainerFormat, ContainerHints, DetectedContainer};
pub use detector::{sniff_format, ContainerDetector};
pub use error::{DecodeError, EncodeError, PlaybackError, Result};

#[cfg(feature = "symphonia-probe")]
pub use detector::SymphoniaContainerDetector;
