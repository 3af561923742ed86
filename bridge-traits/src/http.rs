//! HTTP Client Abstraction
//!
//! Provides async HTTP operations for the resolution core. Two shapes of
//! response are supported:
//!
//! - [`HttpResponse`]: fully buffered body, used for small JSON API calls
//! - [`HttpStream`]: status and headers up front with a live body reader, used
//!   when the body may be large (media files) and only a prefix is inspected
//!
//! Implementations must not follow redirects on their own. Redirect responses
//! are surfaced as-is so that callers can decide how to re-dispatch them.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// Async reader handed out for streamed bodies.
pub type DynAsyncRead = dyn tokio::io::AsyncRead + Send + Unpin;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// Case-insensitive header lookup.
fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// HTTP response with a buffered body
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Look up a header value, ignoring name case
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }
}

/// HTTP response whose body is still on the wire.
///
/// Dropping the stream (or its `body`) closes the underlying connection or
/// returns it to the pool, so every exit path releases it.
pub struct HttpStream {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Declared body length, when the server sent one
    pub content_length: Option<u64>,
    pub body: Box<DynAsyncRead>,
}

impl HttpStream {
    /// Look up a header value, ignoring name case
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// 2xx with a body to read: not 204 and not an explicit zero length.
    pub fn is_success_with_content(&self) -> bool {
        self.is_success() && self.status != 204 && self.content_length != Some(0)
    }

    /// Check if response status is a redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// `Location` header of a 3xx response; `None` for any other status.
    pub fn redirect_location(&self) -> Option<&str> {
        if self.is_redirect() {
            self.header("Location").filter(|value| !value.trim().is_empty())
        } else {
            None
        }
    }
}

impl fmt::Debug for HttpStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpStream")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("content_length", &self.content_length)
            .field("body", &"AsyncRead { ... }")
            .finish()
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Async HTTP client trait
///
/// This trait abstracts HTTP operations to allow platform-specific implementations.
/// Implementations should handle:
/// - TLS certificate validation
/// - Connection pooling and keep-alive
/// - Per-request timeouts
///
/// Implementations must not retry and must not follow redirects; both are
/// decisions left to the caller.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest};
///
/// async fn fetch_data(client: &dyn HttpClient) -> Result<serde_json::Value> {
///     let request = HttpRequest::get("https://api.example.com/data");
///     let response = client.execute(request).await?;
///     response.json()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and buffer the whole body
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Network`] if the connection fails or times out.
    /// Non-2xx statuses are not errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Execute an HTTP request and return as soon as headers are available
    ///
    /// The body is read lazily through [`HttpStream::body`].
    async fn open_stream(&self, request: HttpRequest) -> Result<HttpStream>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(status: u16, headers: &[(&str, &str)], content_length: Option<u64>) -> HttpStream {
        HttpStream {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            content_length,
            body: Box::new(std::io::Cursor::new(Vec::<u8>::new())),
        }
    }

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::get("https://example.com")
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://example.com");
        assert_eq!(
            request.headers.get("Accept"),
            Some(&"application/json".to_string())
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from(r#"{"ok":true}"#),
        };

        assert!(response.is_success());
        assert_eq!(response.json::<serde_json::Value>().unwrap()["ok"], true);

        let missing = HttpResponse {
            status: 404,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert!(!missing.is_success());
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "audio/mpeg".to_string());
        let response = HttpResponse {
            status: 200,
            headers,
            body: Bytes::new(),
        };

        assert_eq!(response.header("Content-Type"), Some("audio/mpeg"));
        assert_eq!(response.header("location"), None);
    }

    #[test]
    fn test_redirect_location_requires_3xx() {
        let redirect = stream(302, &[("location", "http://x/z.mp3")], None);
        assert_eq!(redirect.redirect_location(), Some("http://x/z.mp3"));

        let ok_with_location = stream(200, &[("Location", "http://x/z.mp3")], Some(10));
        assert_eq!(ok_with_location.redirect_location(), None);

        let blank = stream(301, &[("Location", "  ")], None);
        assert_eq!(blank.redirect_location(), None);
    }

    #[test]
    fn test_success_with_content() {
        assert!(stream(200, &[], None).is_success_with_content());
        assert!(stream(206, &[], Some(100)).is_success_with_content());
        assert!(!stream(204, &[], None).is_success_with_content());
        assert!(!stream(200, &[], Some(0)).is_success_with_content());
        assert!(!stream(500, &[], Some(10)).is_success_with_content());
    }
}
