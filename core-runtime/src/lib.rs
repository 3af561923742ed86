//! # Core Runtime Module
//!
//! Provides the runtime infrastructure shared by the resolution crates:
//! - Logging and tracing infrastructure
//! - Source configuration with fail-fast capability checks

pub mod config;
pub mod error;
pub mod logging;

pub use config::{SourceConfig, SourceConfigBuilder};
pub use error::{Error, Result};
