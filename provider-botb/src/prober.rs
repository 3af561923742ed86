//! Container prober
//!
//! One probe attempt against a media URL: open the stream, look at status and
//! headers, and hand the body to a [`ContainerDetector`] only when there is
//! something playable to look at. Redirects are never followed here; they are
//! reported so the resolver can decide how to re-dispatch them.

use bridge_traits::http::{HttpClient, HttpRequest};
use core_playback::{ContainerDetector, ContainerHints, DetectedContainer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{BotbError, Result};
use crate::types::{NotPlayableReason, TrackReference};

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Detected(DetectedContainer),
    /// Server pointed elsewhere; `identifier` is the absolute target URL
    Redirected(TrackReference),
    NotFound,
    NotPlayable(NotPlayableReason),
    /// Network-level failure; the caller may retry
    TransientFailure(String),
}

/// Probes media URLs for their container format
pub struct ContainerProber {
    http_client: Arc<dyn HttpClient>,
    detector: Arc<dyn ContainerDetector>,
    timeout: Duration,
}

impl ContainerProber {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        detector: Arc<dyn ContainerDetector>,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            detector,
            timeout,
        }
    }

    /// Probe `media_url`.
    ///
    /// # Errors
    ///
    /// Only bridge contract failures are errors. Every expected outcome,
    /// including network failures, is a [`ProbeOutcome`].
    #[instrument(skip(self))]
    pub async fn probe(&self, media_url: &str) -> Result<ProbeOutcome> {
        let url = match parse_media_url(media_url) {
            Ok(url) => url,
            Err(reason) => {
                info!("Rejected media URL before probing: {}", reason);
                return Ok(ProbeOutcome::NotPlayable(reason));
            }
        };

        let request = HttpRequest::get(url.as_str()).timeout(self.timeout);
        let stream = match self.http_client.open_stream(request).await {
            Ok(stream) => stream,
            Err(e) if e.is_network() => {
                warn!("Probe request failed: {}", e);
                return Ok(ProbeOutcome::TransientFailure(e.to_string()));
            }
            Err(e) => return Err(BotbError::Bridge(e)),
        };

        debug!(
            status = stream.status,
            content_length = ?stream.content_length,
            "Media responded"
        );

        if let Some(location) = stream.redirect_location() {
            let target = redirect_target(&url, location);
            info!("Media redirects to {}", target);
            return Ok(ProbeOutcome::Redirected(TrackReference::new(target)));
        }

        if stream.status == 404 {
            return Ok(ProbeOutcome::NotFound);
        }

        if !stream.is_success_with_content() {
            info!("Media is not playable: status {}", stream.status);
            return Ok(ProbeOutcome::NotPlayable(NotPlayableReason::Status(
                stream.status,
            )));
        }

        let hints = ContainerHints::new()
            .with_content_type(stream.header("Content-Type"))
            .with_extension(path_extension(&url));

        // Dropping the body below closes the connection on every path.
        match self.detector.detect(stream.body, &hints).await {
            Ok(Some(detected)) => {
                info!("Detected container {}", detected.descriptor);
                Ok(ProbeOutcome::Detected(detected))
            }
            Ok(None) => {
                info!(?hints, "No known container matched");
                Ok(ProbeOutcome::NotPlayable(
                    NotPlayableReason::UnrecognizedContainer,
                ))
            }
            Err(e) if e.is_transient() => {
                warn!("Reading media stream failed: {}", e);
                Ok(ProbeOutcome::TransientFailure(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Absolute locations are kept verbatim; relative ones resolve against `base`.
fn redirect_target(base: &Url, location: &str) -> String {
    let location = location.trim();
    if Url::parse(location).is_ok() {
        return location.to_string();
    }
    base.join(location)
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}

fn parse_media_url(media_url: &str) -> std::result::Result<Url, NotPlayableReason> {
    let invalid = || NotPlayableReason::InvalidUrl(media_url.to_string());
    let url = Url::parse(media_url.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(invalid()),
    }
}

fn path_extension(url: &Url) -> Option<&str> {
    let last = url.path_segments()?.next_back()?;
    let (stem, extension) = last.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{DynAsyncRead, HttpResponse, HttpStream};
    use core_playback::{ContainerDescriptor, ContainerFormat, PlaybackError};
    use mockall::mock;
    use std::collections::HashMap;
    use std::io::Cursor;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn open_stream(&self, request: HttpRequest) -> BridgeResult<HttpStream>;
        }
    }

    mock! {
        Detector {}

        #[async_trait]
        impl ContainerDetector for Detector {
            async fn detect(
                &self,
                stream: Box<DynAsyncRead>,
                hints: &ContainerHints,
            ) -> core_playback::Result<Option<DetectedContainer>>;
        }
    }

    fn stream(status: u16, headers: &[(&str, &str)], body: &[u8]) -> HttpStream {
        HttpStream {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            content_length: Some(body.len() as u64),
            body: Box::new(Cursor::new(body.to_vec())),
        }
    }

    fn mp3() -> DetectedContainer {
        DetectedContainer::new(
            ContainerDescriptor::new(ContainerFormat::Mp3).with_parameter("codec", "mp3"),
        )
    }

    fn prober(http: MockHttpClient, detector: MockDetector) -> ContainerProber {
        ContainerProber::new(Arc::new(http), Arc::new(detector), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_detects_mp3() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .withf(|req| req.url == "http://x/y.mp3")
            .times(1)
            .returning(|_| {
                Ok(stream(
                    200,
                    &[("Content-Type", "audio/mpeg; charset=binary")],
                    b"ID3\x04\x00\x00",
                ))
            });

        let mut detector = MockDetector::new();
        detector
            .expect_detect()
            .withf(|_, hints| {
                hints.mime_type.as_deref() == Some("audio/mpeg")
                    && hints.extension.as_deref() == Some("mp3")
            })
            .times(1)
            .returning(|_, _| Ok(Some(mp3())));

        let outcome = prober(http, detector).probe("http://x/y.mp3").await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Detected(mp3()));
    }

    #[tokio::test]
    async fn test_redirect_skips_detection() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Ok(stream(302, &[("Location", "http://cdn/z.mp3")], b"")));

        let mut detector = MockDetector::new();
        detector.expect_detect().times(0);

        let outcome = prober(http, detector).probe("http://x/y.mp3").await.unwrap();
        assert_eq!(
            outcome,
            ProbeOutcome::Redirected(TrackReference::new("http://cdn/z.mp3"))
        );
    }

    #[tokio::test]
    async fn test_relative_redirect_is_resolved() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Ok(stream(301, &[("location", "/media/z.ogg")], b"")));

        let outcome = prober(http, MockDetector::new())
            .probe("https://x.org/a/y.mp3")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ProbeOutcome::Redirected(TrackReference::new("https://x.org/media/z.ogg"))
        );
    }

    #[tokio::test]
    async fn test_absolute_redirect_is_kept_verbatim() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Ok(stream(302, &[("Location", " HTTP://CDN.Example.com ")], b"")));

        let outcome = prober(http, MockDetector::new())
            .probe("http://x/y.mp3")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ProbeOutcome::Redirected(TrackReference::new("HTTP://CDN.Example.com"))
        );
    }

    #[tokio::test]
    async fn test_status_outcomes() {
        for (status, body, expected) in [
            (404, &b"gone"[..], ProbeOutcome::NotFound),
            (
                500,
                &b"oops"[..],
                ProbeOutcome::NotPlayable(NotPlayableReason::Status(500)),
            ),
            (
                200,
                &b""[..],
                ProbeOutcome::NotPlayable(NotPlayableReason::Status(200)),
            ),
            (
                204,
                &b""[..],
                ProbeOutcome::NotPlayable(NotPlayableReason::Status(204)),
            ),
            (
                304,
                &b""[..],
                ProbeOutcome::NotPlayable(NotPlayableReason::Status(304)),
            ),
        ] {
            let mut http = MockHttpClient::new();
            http.expect_open_stream()
                .times(1)
                .returning(move |_| Ok(stream(status, &[], body)));

            let outcome = prober(http, MockDetector::new())
                .probe("http://x/y.mp3")
                .await
                .unwrap();
            assert_eq!(outcome, expected, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_invalid_urls_are_never_requested() {
        for url in ["", "not a url", "ftp://x/y.mp3", "file:///tmp/y.mp3", "http://"] {
            let mut http = MockHttpClient::new();
            http.expect_open_stream().times(0);

            let outcome = prober(http, MockDetector::new()).probe(url).await.unwrap();
            assert_eq!(
                outcome,
                ProbeOutcome::NotPlayable(NotPlayableReason::InvalidUrl(url.to_string())),
                "url {:?}",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_unrecognized_container() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Ok(stream(200, &[("Content-Type", "text/html")], b"<html>")));

        let mut detector = MockDetector::new();
        detector.expect_detect().times(1).returning(|_, _| Ok(None));

        let outcome = prober(http, detector).probe("http://x/page").await.unwrap();
        assert_eq!(
            outcome,
            ProbeOutcome::NotPlayable(NotPlayableReason::UnrecognizedContainer)
        );
    }

    #[tokio::test]
    async fn test_network_failures_are_transient() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Err(BridgeError::Network("timed out".to_string())));

        let outcome = prober(http, MockDetector::new())
            .probe("http://x/y.mp3")
            .await
            .unwrap();
        assert!(matches!(outcome, ProbeOutcome::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_body_read_failure_is_transient() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Ok(stream(200, &[], b"\xFF\xFB")));

        let mut detector = MockDetector::new();
        detector.expect_detect().times(1).returning(|_, _| {
            Err(PlaybackError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            )))
        });

        let outcome = prober(http, detector).probe("http://x/y.mp3").await.unwrap();
        assert!(matches!(outcome, ProbeOutcome::TransientFailure(_)));
    }

    #[tokio::test]
    async fn test_bridge_contract_failure_is_error() {
        let mut http = MockHttpClient::new();
        http.expect_open_stream()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("bad request".to_string())));

        let result = prober(http, MockDetector::new()).probe("http://x/y.mp3").await;
        assert!(matches!(result, Err(BotbError::Bridge(_))));
    }

    #[test]
    fn test_path_extension() {
        let ext = |s: &str| path_extension(&Url::parse(s).unwrap()).map(str::to_string);

        assert_eq!(ext("http://x/a/y.mp3"), Some("mp3".to_string()));
        assert_eq!(ext("http://x/y.tar.ogg?dl=1"), Some("ogg".to_string()));
        assert_eq!(ext("http://x/a/"), None);
        assert_eq!(ext("http://x/.hidden"), None);
        assert_eq!(ext("http://x/player"), None);
    }
}
