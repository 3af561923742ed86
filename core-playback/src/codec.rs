//! # Descriptor Codec
//!
//! Binary form of a [`ContainerDescriptor`] for cache and queue stores.
//!
//! ## Layout
//!
//! The sentinel descriptor encodes to zero bytes. Any other descriptor is:
//!
//! ```text
//! u8   tag (0x01)
//! str  format token
//! u32  parameter count
//! str  key, str value   (repeated, keys ascending)
//! ```
//!
//! where `str` is a big-endian `u32` byte length followed by UTF-8 bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::container::{ContainerDescriptor, ContainerFormat};
use crate::error::{DecodeError, EncodeError};

const TAG_CONTAINER: u8 = 0x01;

/// Encode a descriptor.
///
/// Fails only when a field or the parameter count exceeds `u32::MAX`.
pub fn encode_descriptor(descriptor: &ContainerDescriptor) -> Result<Bytes, EncodeError> {
    let Some(format) = descriptor.format() else {
        return Ok(Bytes::new());
    };

    let mut buf = BytesMut::new();
    buf.put_u8(TAG_CONTAINER);
    write_str(&mut buf, format.token())?;
    buf.put_u32(length_prefix(descriptor.parameters().len())?);
    for (key, value) in descriptor.parameters() {
        write_str(&mut buf, key)?;
        write_str(&mut buf, value)?;
    }
    Ok(buf.freeze())
}

/// Decode bytes produced by [`encode_descriptor`].
///
/// An empty input yields the sentinel descriptor.
pub fn decode_descriptor(bytes: &[u8]) -> Result<ContainerDescriptor, DecodeError> {
    let mut buf = bytes;
    if !buf.has_remaining() {
        return Ok(ContainerDescriptor::empty());
    }

    let tag = buf.get_u8();
    if tag != TAG_CONTAINER {
        return Err(DecodeError::UnknownTag(tag));
    }

    let token = read_str(&mut buf)?;
    let format = ContainerFormat::from_token(&token).ok_or(DecodeError::UnknownFormat(token))?;

    let count = read_u32(&mut buf)?;
    let mut descriptor = ContainerDescriptor::new(format);
    for _ in 0..count {
        let key = read_str(&mut buf)?;
        let value = read_str(&mut buf)?;
        if descriptor.parameter(&key).is_some() {
            return Err(DecodeError::DuplicateParameter(key));
        }
        descriptor = descriptor.with_parameter(key, value);
    }

    if buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(buf.remaining()));
    }

    Ok(descriptor)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_str(buf: &mut BytesMut, value: &str) -> Result<(), EncodeError> {
    write_bytes(buf, value.as_bytes())
}

/// Write a `u32`-length-prefixed byte run.
pub fn write_bytes(buf: &mut BytesMut, value: &[u8]) -> Result<(), EncodeError> {
    buf.put_u32(length_prefix(value.len())?);
    buf.put_slice(value);
    Ok(())
}

/// Checked conversion of a length to its `u32` prefix.
pub fn length_prefix(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::FieldTooLong(len))
}

/// Read a string written by [`write_str`], advancing `buf`.
pub fn read_str(buf: &mut &[u8]) -> Result<String, DecodeError> {
    let bytes = read_bytes(buf)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
}

/// Read a `u32`-length-prefixed byte run, advancing `buf`.
pub fn read_bytes<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], DecodeError> {
    let len = read_u32(buf)? as usize;
    ensure_remaining(buf, len)?;
    let slice: &'a [u8] = *buf;
    let (head, tail) = slice.split_at(len);
    *buf = tail;
    Ok(head)
}

pub fn read_u32(buf: &mut &[u8]) -> Result<u32, DecodeError> {
    ensure_remaining(buf, 4)?;
    Ok(buf.get_u32())
}

fn ensure_remaining(buf: &&[u8], needed: usize) -> Result<(), DecodeError> {
    if buf.len() < needed {
        return Err(DecodeError::Truncated {
            needed,
            remaining: buf.len(),
        });
    }
    Ok(())
}
