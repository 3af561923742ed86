//! Container sniffing from leading magic bytes.

use crate::container::ContainerFormat;

/// Sniff the container format from the first bytes of a stream.
///
/// Requires at least 4 bytes. Returns `None` for anything not in the table.
pub fn sniff_format(header: &[u8]) -> Option<ContainerFormat> {
    if header.len() < 4 {
        return None;
    }

    // EBML magic (WebM / Matroska)
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(ContainerFormat::Matroska);
    }

    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return Some(ContainerFormat::Mp4);
    }

    if header.starts_with(b"OggS") {
        return Some(ContainerFormat::Ogg);
    }

    if header.starts_with(b"fLaC") {
        return Some(ContainerFormat::Flac);
    }

    if header.starts_with(b"RIFF") && header.len() >= 12 && &header[8..12] == b"WAVE" {
        return Some(ContainerFormat::Wav);
    }

    if header.starts_with(b"ID3") {
        return Some(ContainerFormat::Mp3);
    }

    // 11-bit frame sync; layer bits 00 mark ADTS rather than MPEG audio
    if header[0] == 0xFF && (header[1] & 0xE0) == 0xE0 {
        let layer = (header[1] >> 1) & 0x03;
        return Some(if layer == 0 {
            ContainerFormat::Adts
        } else {
            ContainerFormat::Mp3
        });
    }

    None
}
