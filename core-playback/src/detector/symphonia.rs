//! # Symphonia Container Detector
//!
//! Reads a bounded window from the stream, sniffs magic bytes and then runs
//! Symphonia's probe over the window to pull codec parameters and duration.
//! The probe itself runs on the blocking pool.

use async_trait::async_trait;
use bridge_traits::http::DynAsyncRead;
use std::io::Cursor;
use symphonia::core::codecs::{CodecParameters, CodecType, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

use super::format_detector::sniff_format;
use super::ContainerDetector;
use crate::container::{ContainerDescriptor, ContainerFormat, ContainerHints, DetectedContainer};
use crate::error::{PlaybackError, Result};

/// Codec facts Symphonia could extract from the probe window.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodecInfo {
    codec: &'static str,
    sample_rate: Option<u32>,
    channels: Option<usize>,
    duration_ms: Option<u64>,
}

/// [`ContainerDetector`] backed by Symphonia's format probe.
#[derive(Debug, Clone)]
pub struct SymphoniaContainerDetector {
    probe_window: usize,
}

impl SymphoniaContainerDetector {
    pub fn new(probe_window: usize) -> Self {
        Self { probe_window }
    }

    pub fn probe_window(&self) -> usize {
        self.probe_window
    }

    /// Detect over bytes already in memory.
    pub fn detect_bytes(&self, data: &[u8], hints: &ContainerHints) -> Option<DetectedContainer> {
        if data.is_empty() {
            return None;
        }

        let sniffed = sniff_format(data);
        let info = probe_codec(data, hints);
        debug!(?sniffed, ?info, "Container probe finished");

        let format = sniffed.or_else(|| info.as_ref().and_then(|i| format_for_codec(i.codec)))?;

        let mut descriptor = ContainerDescriptor::new(format);
        let mut duration_ms = None;
        if let Some(info) = info {
            descriptor = descriptor.with_parameter("codec", info.codec);
            if let Some(rate) = info.sample_rate {
                descriptor = descriptor.with_parameter("sample_rate", rate.to_string());
            }
            if let Some(channels) = info.channels {
                descriptor = descriptor.with_parameter("channels", channels.to_string());
            }
            duration_ms = info.duration_ms;
        }

        Some(DetectedContainer::new(descriptor).with_duration_ms(duration_ms))
    }
}

#[async_trait]
impl ContainerDetector for SymphoniaContainerDetector {
    #[instrument(skip(self, stream), fields(window = self.probe_window))]
    async fn detect(
        &self,
        stream: Box<DynAsyncRead>,
        hints: &ContainerHints,
    ) -> Result<Option<DetectedContainer>> {
        let mut window = Vec::with_capacity(self.probe_window.min(64 * 1024));
        stream
            .take(self.probe_window as u64)
            .read_to_end(&mut window)
            .await?;

        debug!(bytes = window.len(), "Read probe window");

        let detector = self.clone();
        let hints = hints.clone();
        tokio::task::spawn_blocking(move || detector.detect_bytes(&window, &hints))
            .await
            .map_err(|e| PlaybackError::Internal(format!("Container probe task failed: {}", e)))
    }
}

fn build_hint(hints: &ContainerHints) -> Hint {
    let mut hint = Hint::new();
    if let Some(mime_type) = &hints.mime_type {
        hint.mime_type(mime_type);
    }
    if let Some(extension) = &hints.extension {
        hint.with_extension(extension);
    }
    hint
}

fn probe_codec(data: &[u8], hints: &ContainerHints) -> Option<CodecInfo> {
    let media_source = Box::new(Cursor::new(data.to_vec())) as Box<dyn MediaSource>;
    let mss = MediaSourceStream::new(media_source, Default::default());

    let probed = match symphonia::default::get_probe().format(
        &build_hint(hints),
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(probed) => probed,
        Err(e) => {
            debug!("Symphonia probe failed: {}", e);
            return None;
        }
    };

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)?;

    Some(codec_info(&track.codec_params))
}

fn codec_info(params: &CodecParameters) -> CodecInfo {
    let duration_ms = match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Some(frames.saturating_mul(1000) / rate as u64),
        _ => None,
    };

    CodecInfo {
        codec: codec_name(params.codec),
        sample_rate: params.sample_rate,
        channels: params.channels.map(|ch| ch.count()),
        duration_ms,
    }
}

fn codec_name(codec_type: CodecType) -> &'static str {
    use symphonia::core::codecs::*;

    if codec_type == CODEC_TYPE_MP3 {
        "mp3"
    } else if codec_type == CODEC_TYPE_AAC {
        "aac"
    } else if codec_type == CODEC_TYPE_FLAC {
        "flac"
    } else if codec_type == CODEC_TYPE_VORBIS {
        "vorbis"
    } else if codec_type == CODEC_TYPE_OPUS {
        "opus"
    } else if codec_type == CODEC_TYPE_ALAC {
        "alac"
    } else if codec_type == CODEC_TYPE_PCM_S16LE
        || codec_type == CODEC_TYPE_PCM_S16BE
        || codec_type == CODEC_TYPE_PCM_S24LE
        || codec_type == CODEC_TYPE_PCM_S24BE
        || codec_type == CODEC_TYPE_PCM_S32LE
        || codec_type == CODEC_TYPE_PCM_S32BE
        || codec_type == CODEC_TYPE_PCM_U8
        || codec_type == CODEC_TYPE_PCM_F32LE
        || codec_type == CODEC_TYPE_PCM_F32BE
        || codec_type == CODEC_TYPE_PCM_F64LE
        || codec_type == CODEC_TYPE_PCM_F64BE
    {
        "pcm"
    } else {
        "unknown"
    }
}

/// Fallback when sniffing found nothing but Symphonia still read a track.
fn format_for_codec(codec: &str) -> Option<ContainerFormat> {
    match codec {
        "mp3" => Some(ContainerFormat::Mp3),
        "aac" => Some(ContainerFormat::Adts),
        "flac" => Some(ContainerFormat::Flac),
        "vorbis" | "opus" => Some(ContainerFormat::Ogg),
        "alac" => Some(ContainerFormat::Mp4),
        "pcm" => Some(ContainerFormat::Wav),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: usize = 64 * 1024;

    #[test]
    fn test_codec_names() {
        use symphonia::core::codecs::{CODEC_TYPE_FLAC, CODEC_TYPE_MP3, CODEC_TYPE_PCM_S16LE};

        assert_eq!(codec_name(CODEC_TYPE_MP3), "mp3");
        assert_eq!(codec_name(CODEC_TYPE_FLAC), "flac");
        assert_eq!(codec_name(CODEC_TYPE_PCM_S16LE), "pcm");
        assert_eq!(codec_name(CODEC_TYPE_NULL), "unknown");
    }

    #[test]
    fn test_format_for_codec() {
        assert_eq!(format_for_codec("vorbis"), Some(ContainerFormat::Ogg));
        assert_eq!(format_for_codec("unknown"), None);
    }

    #[test]
    fn test_sniff_only_match_has_no_parameters() {
        // Matroska header that Symphonia cannot parse from eight bytes
        let detector = SymphoniaContainerDetector::new(WINDOW);
        let detected = detector
            .detect_bytes(
                &[0x1A, 0x45, 0xDF, 0xA3, 0x00, 0x00, 0x00, 0x00],
                &ContainerHints::new(),
            )
            .unwrap();

        assert_eq!(detected.descriptor.format(), Some(ContainerFormat::Matroska));
        assert_eq!(detected.duration_ms, None);
    }

    #[test]
    fn test_empty_input_is_unrecognized() {
        let detector = SymphoniaContainerDetector::new(WINDOW);
        assert!(detector.detect_bytes(&[], &ContainerHints::new()).is_none());
    }
}
