//! Battle of the Bits source manager
//!
//! Wires classifier, catalog client, descriptor builder and container prober
//! into one resolution pipeline, and owns the persistence format for resolved
//! tracks.

use bridge_traits::http::{HttpClient, HttpRequest, HttpStream};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use core_playback::codec::{read_bytes, read_str, write_bytes, write_str};
use core_playback::{decode_descriptor, encode_descriptor, ContainerDetector};
use core_runtime::SourceConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::catalog::CatalogClient;
use crate::classifier::{classify, Classification};
use crate::descriptor;
use crate::error::{BotbError, Result};
use crate::prober::{ContainerProber, ProbeOutcome};
use crate::types::{
    CatalogOutcome, PlayableTrack, ResolutionOutcome, ResolutionStage, TrackDescriptor,
    TransientFailure,
};

/// Name this source reports to the host.
pub const SOURCE_NAME: &str = "botb";

const TRACK_FORMAT_VERSION: u8 = 1;

/// Next thing the resolver has to do.
enum Step {
    Entry(String),
    Search(String),
    Probe(TrackDescriptor),
}

/// Resolves Battle of the Bits identifiers into playable tracks.
///
/// # Example
///
/// ```ignore
/// use provider_botb::{BotbSourceManager, ResolutionOutcome};
///
/// let source = BotbSourceManager::from_config(&config, detector);
/// match source.resolve("botb chiptune").await? {
///     Some(ResolutionOutcome::Resolved(track)) => play(track),
///     Some(other) => println!("{}", other.user_message().unwrap_or_default()),
///     None => { /* not a botb identifier */ }
/// }
/// ```
pub struct BotbSourceManager {
    http_client: Arc<dyn HttpClient>,
    catalog: CatalogClient,
    prober: ContainerProber,
    max_redirect_hops: u8,
}

impl BotbSourceManager {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        detector: Arc<dyn ContainerDetector>,
        catalog_api_base: impl Into<String>,
        request_timeout: Duration,
        max_redirect_hops: u8,
    ) -> Self {
        Self {
            catalog: CatalogClient::new(
                Arc::clone(&http_client),
                catalog_api_base,
                request_timeout,
            ),
            prober: ContainerProber::new(Arc::clone(&http_client), detector, request_timeout),
            http_client,
            max_redirect_hops,
        }
    }

    /// Production constructor.
    pub fn from_config(config: &SourceConfig, detector: Arc<dyn ContainerDetector>) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            detector,
            config.catalog_api_base.clone(),
            config.request_timeout,
            config.max_redirect_hops,
        )
    }

    /// Constructor using the Symphonia detector sized by the config.
    #[cfg(feature = "symphonia-probe")]
    pub fn with_symphonia(config: &SourceConfig) -> Self {
        let detector = core_playback::SymphoniaContainerDetector::new(config.probe_window_bytes);
        Self::from_config(config, Arc::new(detector))
    }

    pub fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// Every resolved track can be persisted.
    pub fn is_track_encodable(&self, _track: &PlayableTrack) -> bool {
        true
    }

    /// Resolve an identifier.
    ///
    /// Returns `Ok(None)` for identifiers this source does not handle, without
    /// touching the network.
    ///
    /// # Errors
    ///
    /// Contract violations: malformed catalog responses or records, and bridge
    /// failures that are not network-level.
    #[instrument(skip(self))]
    pub async fn resolve(&self, identifier: &str) -> Result<Option<ResolutionOutcome>> {
        let mut step = match classify(identifier) {
            Classification::Unrecognized => {
                debug!("Identifier not handled by this source");
                return Ok(None);
            }
            Classification::DirectEntry(id) => Step::Entry(id),
            Classification::Search(query) => Step::Search(query),
        };

        let mut hops = 0u8;
        loop {
            let track = match step {
                Step::Entry(id) => match self.catalog.fetch_entry(&id).await {
                    Ok(CatalogOutcome::Found(record)) => descriptor::build(record)?,
                    Ok(CatalogOutcome::NotFound) => return Ok(Some(ResolutionOutcome::NotFound)),
                    Err(e) if e.is_transient() => {
                        return Ok(Some(transient(ResolutionStage::Entry, &e)))
                    }
                    Err(e) => return Err(e),
                },
                Step::Search(query) => match self.catalog.search_entries(&query).await {
                    Ok(CatalogOutcome::Found(records)) => match records.into_iter().next() {
                        Some(first) => descriptor::build(first)?,
                        None => return Ok(Some(ResolutionOutcome::NotFound)),
                    },
                    Ok(CatalogOutcome::NotFound) => return Ok(Some(ResolutionOutcome::NotFound)),
                    Err(e) if e.is_transient() => {
                        return Ok(Some(transient(ResolutionStage::Search, &e)))
                    }
                    Err(e) => return Err(e),
                },
                Step::Probe(track) => track,
            };

            debug!(title = %track.title, url = %track.media_url, "Probing media");

            let outcome = match self.prober.probe(&track.media_url).await? {
                ProbeOutcome::Detected(detected) => {
                    ResolutionOutcome::Resolved(PlayableTrack {
                        track: TrackDescriptor {
                            duration_millis: detected.duration_ms,
                            ..track
                        },
                        container: detected.descriptor,
                    })
                }
                ProbeOutcome::Redirected(reference) => {
                    if hops >= self.max_redirect_hops {
                        info!("Redirect hop limit reached at {}", reference.identifier);
                        return Ok(Some(ResolutionOutcome::Redirected(
                            reference.with_hint(track.title),
                        )));
                    }
                    hops += 1;

                    step = match classify(&reference.identifier) {
                        Classification::DirectEntry(id) => Step::Entry(id),
                        Classification::Search(query) => Step::Search(query),
                        Classification::Unrecognized => Step::Probe(TrackDescriptor {
                            media_url: reference.identifier,
                            ..track
                        }),
                    };
                    continue;
                }
                ProbeOutcome::NotFound => ResolutionOutcome::NotFound,
                ProbeOutcome::NotPlayable(reason) => ResolutionOutcome::NotPlayable(reason),
                ProbeOutcome::TransientFailure(cause) => {
                    ResolutionOutcome::TransientFailure(TransientFailure {
                        stage: ResolutionStage::Probe,
                        cause,
                    })
                }
            };

            return Ok(Some(outcome));
        }
    }

    /// Serialize a resolved track for a cache or queue store.
    ///
    /// Layout: version byte, title, author, media URL, duration flag and
    /// value, then the length-prefixed container descriptor.
    ///
    /// # Errors
    ///
    /// [`BotbError::Encode`] when a field is longer than `u32::MAX` bytes.
    pub fn encode_track(&self, track: &PlayableTrack) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        buf.put_u8(TRACK_FORMAT_VERSION);
        write_str(&mut buf, &track.track.title)?;
        write_str(&mut buf, &track.track.author)?;
        write_str(&mut buf, &track.track.media_url)?;
        match track.track.duration_millis {
            Some(duration) => {
                buf.put_u8(1);
                buf.put_u64(duration);
            }
            None => buf.put_u8(0),
        }

        let descriptor = encode_descriptor(&track.container)?;
        write_bytes(&mut buf, &descriptor)?;
        Ok(buf.freeze())
    }

    /// Reverse of [`encode_track`](Self::encode_track).
    ///
    /// Returns `Ok(None)` when the stored descriptor is the sentinel: nothing
    /// playable can be rebuilt without probing again.
    pub fn decode_track(&self, data: &[u8]) -> Result<Option<PlayableTrack>> {
        let mut buf = data;

        let version = read_u8(&mut buf)?;
        if version != TRACK_FORMAT_VERSION {
            return Err(BotbError::InvalidTrackData(format!(
                "unsupported version {}",
                version
            )));
        }

        let title = read_str(&mut buf)?;
        let author = read_str(&mut buf)?;
        let media_url = read_str(&mut buf)?;
        let duration_millis = match read_u8(&mut buf)? {
            0 => None,
            1 => Some(read_u64(&mut buf)?),
            flag => {
                return Err(BotbError::InvalidTrackData(format!(
                    "invalid duration flag {}",
                    flag
                )))
            }
        };

        let container = decode_descriptor(read_bytes(&mut buf)?)?;
        if buf.has_remaining() {
            return Err(BotbError::InvalidTrackData(format!(
                "{} trailing bytes",
                buf.remaining()
            )));
        }

        if container.is_empty() {
            debug!("Stored track has no container descriptor");
            return Ok(None);
        }

        Ok(Some(PlayableTrack {
            track: TrackDescriptor {
                title,
                author,
                media_url,
                duration_millis,
            },
            container,
        }))
    }

    /// Open the media stream for the playback executor.
    ///
    /// The request has no overall timeout so long tracks are not cut off.
    /// Dropping the returned stream releases the connection.
    #[instrument(skip(self, track), fields(url = %track.track.media_url))]
    pub async fn open_playback_stream(&self, track: &PlayableTrack) -> Result<HttpStream> {
        let url = &track.track.media_url;
        let stream = self
            .http_client
            .open_stream(HttpRequest::get(url.as_str()))
            .await
            .map_err(|e| {
                if e.is_network() {
                    BotbError::Network {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                } else {
                    BotbError::Bridge(e)
                }
            })?;

        if !stream.is_success() {
            warn!(status = stream.status, "Playback stream refused");
            return Err(BotbError::StreamStatus {
                url: url.clone(),
                status: stream.status,
            });
        }

        Ok(stream)
    }
}

fn transient(stage: ResolutionStage, error: &BotbError) -> ResolutionOutcome {
    warn!(?stage, "Catalog request failed: {}", error);
    ResolutionOutcome::TransientFailure(TransientFailure {
        stage,
        cause: error.to_string(),
    })
}

fn read_u8(buf: &mut &[u8]) -> Result<u8> {
    if buf.remaining() < 1 {
        return Err(BotbError::InvalidTrackData("truncated".to_string()));
    }
    Ok(buf.get_u8())
}

fn read_u64(buf: &mut &[u8]) -> Result<u64> {
    if buf.remaining() < 8 {
        return Err(BotbError::InvalidTrackData("truncated".to_string()));
    }
    Ok(buf.get_u64())
}
