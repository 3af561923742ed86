//! # Source Configuration Module
//!
//! Provides configuration management for the track resolution core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `SourceConfig` instance that holds the HTTP bridge and every tunable used
//! by the catalog client and the container prober. It enforces fail-fast
//! validation so a misconfigured source never reaches the network.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - required, unless the `desktop-shims` feature is enabled,
//!   in which case the reqwest-based desktop client is injected
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::SourceConfig;
//! use std::time::Duration;
//!
//! let config = SourceConfig::builder()
//!     .request_timeout(Duration::from_secs(15))
//!     .max_redirect_hops(1)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! Without `desktop-shims`, omitting the HTTP client fails with an actionable
//! [`Error::CapabilityMissing`].

use crate::error::{Error, Result};
use bridge_traits::HttpClient;
use std::sync::Arc;
use std::time::Duration;

/// Base URL of the Battle of the Bits public API.
pub const DEFAULT_CATALOG_API_BASE: &str = "https://battleofthebits.org/api/v1";

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of media bytes inspected by container detection.
pub const DEFAULT_PROBE_WINDOW_BYTES: usize = 256 * 1024;

/// Default number of redirect hops followed inside one resolution.
pub const DEFAULT_MAX_REDIRECT_HOPS: u8 = 1;

const MIN_PROBE_WINDOW_BYTES: usize = 4 * 1024;
const MAX_PROBE_WINDOW_BYTES: usize = 16 * 1024 * 1024;
const MAX_REDIRECT_HOPS_LIMIT: u8 = 5;

const DEFAULT_USER_AGENT: &str = concat!("botb-source/", env!("CARGO_PKG_VERSION"));

/// Configuration for the track resolution core.
///
/// Use [`SourceConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct SourceConfig {
    /// HTTP client used for catalog calls and media probing
    pub http_client: Arc<dyn HttpClient>,

    /// Catalog API base, without trailing slash
    pub catalog_api_base: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Connection establishment timeout (used by the desktop default client)
    pub connect_timeout: Duration,

    /// User agent sent by the desktop default client
    pub user_agent: String,

    /// Maximum number of media bytes handed to container detection
    pub probe_window_bytes: usize,

    /// Redirect hops followed before handing a redirect back to the caller
    pub max_redirect_hops: u8,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("catalog_api_base", &self.catalog_api_base)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("probe_window_bytes", &self.probe_window_bytes)
            .field("max_redirect_hops", &self.max_redirect_hops)
            .finish()
    }
}

impl SourceConfig {
    /// Creates a new builder for constructing a `SourceConfig`.
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Catalog base URL is an http(s) URL
    /// - Timeouts are non-zero
    /// - Probe window is within 4 KiB..=16 MiB
    /// - Redirect hop limit is at most 5
    pub fn validate(&self) -> Result<()> {
        let base = self.catalog_api_base.trim();
        if base.is_empty() {
            return Err(Error::Config(
                "Catalog API base URL cannot be empty".to_string(),
            ));
        }

        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(Error::Config(format!(
                "Catalog API base URL must use http or https: {}",
                base
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(Error::Config(
                "Connect timeout must be greater than zero".to_string(),
            ));
        }

        if !(MIN_PROBE_WINDOW_BYTES..=MAX_PROBE_WINDOW_BYTES).contains(&self.probe_window_bytes) {
            return Err(Error::Config(format!(
                "Probe window must be between {} and {} bytes, got {}",
                MIN_PROBE_WINDOW_BYTES, MAX_PROBE_WINDOW_BYTES, self.probe_window_bytes
            )));
        }

        if self.max_redirect_hops > MAX_REDIRECT_HOPS_LIMIT {
            return Err(Error::Config(format!(
                "Redirect hop limit exceeds maximum of {}",
                MAX_REDIRECT_HOPS_LIMIT
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Embedded hosts: inject an HttpClient that does not follow redirects."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(
    connect_timeout: Duration,
    user_agent: &str,
) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_settings(connect_timeout, user_agent)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;

    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(
    _connect_timeout: Duration,
    _user_agent: &str,
) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`SourceConfig`] instances.
#[derive(Default)]
pub struct SourceConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    catalog_api_base: Option<String>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    probe_window_bytes: Option<usize>,
    max_redirect_hops: Option<u8>,
}

impl SourceConfigBuilder {
    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the catalog API base URL.
    ///
    /// Default: `https://battleofthebits.org/api/v1`
    pub fn catalog_api_base(mut self, base: impl Into<String>) -> Self {
        self.catalog_api_base = Some(base.into());
        self
    }

    /// Sets the per-request timeout.
    ///
    /// Default: 30 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout of the desktop default client.
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the user agent of the desktop default client.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Sets how many media bytes container detection may read.
    ///
    /// Default: 256 KiB
    pub fn probe_window_bytes(mut self, bytes: usize) -> Self {
        self.probe_window_bytes = Some(bytes);
        self
    }

    /// Sets how many redirects one resolution follows on its own.
    ///
    /// Default: 1
    pub fn max_redirect_hops(mut self, hops: u8) -> Self {
        self.max_redirect_hops = Some(hops);
        self
    }

    /// Builds the final [`SourceConfig`] instance.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] if no HTTP client was provided and no
    ///   desktop default is available
    /// - [`Error::Config`] if validation fails
    pub fn build(self) -> Result<SourceConfig> {
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let catalog_api_base = self
            .catalog_api_base
            .unwrap_or_else(|| DEFAULT_CATALOG_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let probe_window_bytes = self.probe_window_bytes.unwrap_or(DEFAULT_PROBE_WINDOW_BYTES);
        let max_redirect_hops = self.max_redirect_hops.unwrap_or(DEFAULT_MAX_REDIRECT_HOPS);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(connect_timeout, &user_agent)?,
        };

        let config = SourceConfig {
            http_client,
            catalog_api_base,
            request_timeout,
            connect_timeout,
            user_agent,
            probe_window_bytes,
            max_redirect_hops,
        };

        config.validate()?;

        Ok(config)
    }
}
