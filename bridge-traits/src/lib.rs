//! # Host Bridge Traits
//!
//! Capability contracts between the track resolution core and the host that
//! embeds it.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP with buffered and streamed responses
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should map transport failures (timeouts, resets, refused connections) to
//! [`BridgeError::Network`] so the core can tell them apart from contract
//! violations.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so one implementation can serve many
//! concurrent resolutions.

pub mod error;
pub mod http;
pub mod logging;

pub use error::BridgeError;

pub use http::{DynAsyncRead, HttpClient, HttpMethod, HttpRequest, HttpResponse, HttpStream};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
