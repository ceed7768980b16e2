// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounds-checked big-endian primitives shared by the value library and the
// message codec.  Every reader takes an explicit offset and returns the value
// together with the offset just past it.

use vprint_core::error::{Result, VprintError};

fn take(data: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    let end = pos.checked_add(len).ok_or(VprintError::Truncated {
        offset: pos,
        needed: len,
    })?;
    data.get(pos..end).ok_or(VprintError::Truncated {
        offset: pos,
        needed: len,
    })
}

pub(crate) fn read_u8(data: &[u8], pos: usize) -> Result<(u8, usize)> {
    let bytes = take(data, pos, 1)?;
    Ok((bytes[0], pos + 1))
}

pub(crate) fn read_u16(data: &[u8], pos: usize) -> Result<(u16, usize)> {
    let bytes = take(data, pos, 2)?;
    Ok((u16::from_be_bytes([bytes[0], bytes[1]]), pos + 2))
}

pub(crate) fn read_i32(data: &[u8], pos: usize) -> Result<(i32, usize)> {
    let bytes = take(data, pos, 4)?;
    Ok((
        i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        pos + 4,
    ))
}

pub(crate) fn read_bytes(data: &[u8], pos: usize, len: usize) -> Result<(&[u8], usize)> {
    let bytes = take(data, pos, len)?;
    Ok((bytes, pos + len))
}

/// Skip a 2-byte length field and the bytes it declares.
pub(crate) fn skip_length_prefixed(data: &[u8], pos: usize) -> Result<usize> {
    let (len, pos) = read_u16(data, pos)?;
    let (_, pos) = read_bytes(data, pos, len as usize)?;
    Ok(pos)
}

/// Read a 2-byte length followed by that many UTF-8 bytes.
///
/// A zero length yields an empty string.
pub(crate) fn read_string(data: &[u8], pos: usize) -> Result<(String, usize)> {
    let (len, pos) = read_u16(data, pos)?;
    let (bytes, next) = read_bytes(data, pos, len as usize)?;
    let text = std::str::from_utf8(bytes)
        .map_err(|_| VprintError::InvalidUtf8 { offset: pos })?
        .to_owned();
    Ok((text, next))
}

pub(crate) fn write_length(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u16::try_from(len).map_err(|_| VprintError::FieldTooLong(len))?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

pub(crate) fn write_string(buf: &mut Vec<u8>, text: &str) -> Result<()> {
    write_length(buf, text.len())?;
    buf.extend_from_slice(text.as_bytes());
    Ok(())
}
