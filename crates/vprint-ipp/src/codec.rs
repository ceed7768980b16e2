// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binary message codec (RFC 8010 SS3.1).
//
//   version-number   2 bytes  (major, minor)
//   operation-id     2 bytes  (status-code in responses)
//   request-id       4 bytes  (signed)
//   attribute-group  n bytes  (delimiter tag, then entries)
//   end-of-attr-tag  1 byte   (0x03)
//   data             q bytes  (document, requests only)
//
// Each entry is value-tag(1) | name-length(2) | name | value-length(2) | value.
// A zero-length name adds one more value to the preceding attribute.
//
// All four entry points are pure functions over byte slices; requests and
// responses share the group walkers below.

use vprint_core::error::{Result, VprintError};

use crate::attribute::{Attribute, Group};
use crate::message::{Request, Response};
use crate::tag::{DelimiterTag, Operation, StatusCode, ValueTag, Version, is_delimiter};
use crate::value::Value;
use crate::wire::{read_i32, read_string, read_u8, read_u16, write_string};

/// Size of the fixed message header.
pub const HEADER_LEN: usize = 8;

struct Header {
    version: Version,
    code: u16,
    request_id: i32,
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a request. Bytes after end-of-attributes become `document`.
pub fn decode_request(data: &[u8]) -> Result<Request> {
    let header = decode_header(data)?;
    let (groups, body_start) = decode_groups(data, HEADER_LEN)?;
    Ok(Request {
        version: header.version,
        operation: Operation::from_code(header.code),
        request_id: header.request_id,
        groups,
        document: data[body_start..].to_vec(),
    })
}

/// Decode a response. Trailing bytes after end-of-attributes are ignored.
pub fn decode_response(data: &[u8]) -> Result<Response> {
    let header = decode_header(data)?;
    let (groups, _) = decode_groups(data, HEADER_LEN)?;
    Ok(Response {
        version: header.version,
        status: StatusCode::from_code(header.code),
        request_id: header.request_id,
        groups,
    })
}

fn decode_header(data: &[u8]) -> Result<Header> {
    let (major, pos) = read_u8(data, 0)?;
    let (minor, pos) = read_u8(data, pos)?;
    let (code, pos) = read_u16(data, pos)?;
    let (request_id, _) = read_i32(data, pos)?;
    Ok(Header {
        version: Version::new(major, minor),
        code,
        request_id,
    })
}

/// Walk the attribute groups starting at `pos`.
///
/// Returns the groups and the offset just past end-of-attributes (or the end
/// of the buffer if the message stops after a complete group).
fn decode_groups(data: &[u8], pos: usize) -> Result<(Vec<Group>, usize)> {
    let mut groups = Vec::new();
    let (mut tag, mut pos) = read_u8(data, pos)?;

    loop {
        if tag == DelimiterTag::EndOfAttributes.as_u8() {
            return Ok((groups, pos));
        }
        if !is_delimiter(tag) {
            return Err(VprintError::ValueOutsideGroup {
                tag,
                offset: pos - 1,
            });
        }
        let delimiter = DelimiterTag::from_u8(tag).ok_or(VprintError::UnknownDelimiterTag {
            tag,
            offset: pos - 1,
        })?;

        let (group, next_tag, next) = decode_group(data, pos, delimiter)?;
        groups.push(group);
        match next_tag {
            Some(next_tag) => {
                tag = next_tag;
                pos = next;
            }
            None => return Ok((groups, next)),
        }
    }
}

/// Decode entries until the next delimiter tag or the end of the buffer.
///
/// Returns the group, the delimiter that ended it (if any), and the offset
/// just past that delimiter.
fn decode_group(
    data: &[u8],
    mut pos: usize,
    delimiter: DelimiterTag,
) -> Result<(Group, Option<u8>, usize)> {
    let mut group = Group::new(delimiter);

    while pos < data.len() {
        let tag_offset = pos;
        let (tag, next) = read_u8(data, pos)?;
        if is_delimiter(tag) {
            return Ok((group, Some(tag), next));
        }
        let value_tag = ValueTag::from_u8(tag).ok_or(VprintError::UnknownValueTag {
            tag,
            offset: tag_offset,
        })?;

        let (name, next) = read_string(data, next)?;
        let (value, next) = Value::decode(value_tag, data, next)?;

        if name.is_empty() {
            let current = group
                .attributes_mut()
                .last_mut()
                .ok_or(VprintError::OrphanContinuation { offset: tag_offset })?;
            // The encoder repeats the attribute's own tag for every value.
            if current.tag() != value_tag {
                return Err(VprintError::ContinuationTagMismatch {
                    tag,
                    expected: current.tag().as_u8(),
                    offset: tag_offset,
                });
            }
            current.push_value(value);
        } else {
            group.push(Attribute::new(value_tag, name, value)?);
        }
        pos = next;
    }

    Ok((group, None, pos))
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode a request followed by its document bytes.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(256 + request.document.len());
    encode_header(
        &mut buf,
        request.version,
        request.operation.code(),
        request.request_id,
    );
    encode_groups(&mut buf, &request.groups)?;
    buf.extend_from_slice(&request.document);
    Ok(buf)
}

pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(512);
    encode_header(
        &mut buf,
        response.version,
        response.status.code(),
        response.request_id,
    );
    encode_groups(&mut buf, &response.groups)?;
    Ok(buf)
}

fn encode_header(buf: &mut Vec<u8>, version: Version, code: u16, request_id: i32) {
    buf.push(version.major);
    buf.push(version.minor);
    buf.extend_from_slice(&code.to_be_bytes());
    buf.extend_from_slice(&request_id.to_be_bytes());
}

fn encode_groups(buf: &mut Vec<u8>, groups: &[Group]) -> Result<()> {
    for group in groups {
        buf.push(group.tag().as_u8());
        for attribute in group.attributes() {
            encode_attribute(buf, attribute)?;
        }
    }
    buf.push(DelimiterTag::EndOfAttributes.as_u8());
    Ok(())
}

fn encode_attribute(buf: &mut Vec<u8>, attribute: &Attribute) -> Result<()> {
    if attribute.name().trim().is_empty() {
        return Err(VprintError::InvalidAttributeName(attribute.name().to_owned()));
    }
    if attribute.values().is_empty() {
        return Err(VprintError::EmptyAttribute(attribute.name().to_owned()));
    }

    let tag = attribute.tag();
    for (i, value) in attribute.values().iter().enumerate() {
        if !value.fits(tag) {
            return Err(VprintError::ValueTagMismatch {
                name: attribute.name().to_owned(),
                tag: tag.as_u8(),
                kind: value.kind(),
            });
        }
        buf.push(tag.as_u8());
        // Only the first value carries the name.
        write_string(buf, if i == 0 { attribute.name() } else { "" })?;
        value.encode(buf)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Header for a Get-Printer-Attributes request, id 1, version 1.1.
    fn header() -> Vec<u8> {
        vec![0x01, 0x01, 0x00, 0x0B, 0x00, 0x00, 0x00, 0x01]
    }

    fn entry(buf: &mut Vec<u8>, tag: u8, name: &str, value: &[u8]) {
        buf.push(tag);
        buf.extend_from_slice(&(name.len() as u16).to_be_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
        buf.extend_from_slice(value);
    }

    #[test]
    fn decodes_header_fields() {
        let mut data = vec![0x02, 0x00, 0x00, 0x02, 0xFF, 0xFF, 0xFF, 0xFF];
        data.push(0x03);
        let request = decode_request(&data).unwrap();
        assert_eq!(request.version, Version::V2_0);
        assert_eq!(request.operation, Operation::PrintJob);
        assert_eq!(request.request_id, -1);
        assert!(request.groups.is_empty());
        assert!(request.document.is_empty());
    }

    #[test]
    fn continuation_values_join_the_open_attribute() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x44, "requested-attributes", b"printer-name");
        entry(&mut data, 0x44, "", b"printer-state");
        entry(&mut data, 0x44, "", b"media-supported");
        data.push(0x03);

        let request = decode_request(&data).unwrap();
        let group = &request.groups[0];
        assert_eq!(group.len(), 1);
        let values: Vec<_> = group.attributes()[0].strings().collect();
        assert_eq!(values, ["printer-name", "printer-state", "media-supported"]);
    }

    #[test]
    fn continuation_without_attribute_is_rejected() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x44, "", b"orphan");
        data.push(0x03);

        let err = decode_request(&data).unwrap_err();
        assert!(matches!(err, VprintError::OrphanContinuation { offset: 9 }));
    }

    #[test]
    fn continuation_must_repeat_the_attribute_tag() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x21, "copies", &2i32.to_be_bytes());
        let offset = data.len();
        entry(&mut data, 0x33, "", &[0, 0, 0, 1, 0, 0, 0, 4]);
        data.push(0x03);

        let err = decode_request(&data).unwrap_err();
        assert!(err.is_decode_error());
        assert!(matches!(
            err,
            VprintError::ContinuationTagMismatch { tag: 0x33, expected: 0x21, offset: o } if o == offset
        ));
    }

    #[test]
    fn continuation_in_another_string_kind_is_rejected() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x44, "media", b"a");
        entry(&mut data, 0x42, "", b"b");
        data.push(0x03);

        let err = decode_request(&data).unwrap_err();
        assert!(matches!(
            err,
            VprintError::ContinuationTagMismatch { tag: 0x42, expected: 0x44, .. }
        ));
    }

    #[test]
    fn continuation_does_not_cross_groups() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x47, "attributes-charset", b"utf-8");
        data.push(0x02);
        entry(&mut data, 0x44, "", b"stray");
        data.push(0x03);

        let err = decode_request(&data).unwrap_err();
        assert!(matches!(err, VprintError::OrphanContinuation { .. }));
    }

    #[test]
    fn document_bytes_follow_end_of_attributes() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x47, "attributes-charset", b"utf-8");
        data.push(0x03);
        data.extend_from_slice(b"%PDF-1.7");

        let request = decode_request(&data).unwrap();
        assert_eq!(request.document, b"%PDF-1.7");
    }

    #[test]
    fn value_tag_before_any_group_is_rejected() {
        let mut data = header();
        entry(&mut data, 0x44, "name", b"v");
        let err = decode_request(&data).unwrap_err();
        assert!(matches!(err, VprintError::ValueOutsideGroup { tag: 0x44, offset: 8 }));
    }

    #[test]
    fn unassigned_tags_are_fatal() {
        let mut data = header();
        data.push(0x0C);
        let err = decode_request(&data).unwrap_err();
        assert!(matches!(err, VprintError::UnknownDelimiterTag { tag: 0x0C, .. }));

        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x7F, "x", b"");
        let err = decode_request(&data).unwrap_err();
        assert!(matches!(err, VprintError::UnknownValueTag { tag: 0x7F, offset: 9 }));
    }

    #[test]
    fn truncation_anywhere_is_an_error() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x44, "requested-attributes", b"all");
        data.push(0x03);

        for cut in [0, 4, 7, 8, 12, data.len() - 2] {
            let err = decode_request(&data[..cut]).unwrap_err();
            assert!(
                matches!(err, VprintError::Truncated { .. }),
                "cut at {cut} produced {err:?}"
            );
        }
    }

    #[test]
    fn message_may_stop_after_a_complete_group() {
        let mut data = header();
        data.push(0x01);
        entry(&mut data, 0x47, "attributes-charset", b"utf-8");

        let request = decode_request(&data).unwrap();
        assert_eq!(request.groups.len(), 1);
        assert!(request.document.is_empty());
    }

    #[test]
    fn multi_valued_attribute_names_itself_once() {
        let response = Response::new(StatusCode::SuccessfulOk, 5).with_group(
            Group::new(DelimiterTag::PrinterAttributes)
                .with(Attribute::keywords("sides-supported", ["one-sided", "two-sided-long-edge"])),
        );
        let bytes = encode_response(&response).unwrap();

        let name = b"sides-supported";
        let occurrences = bytes.windows(name.len()).filter(|w| w == name).count();
        assert_eq!(occurrences, 1);

        let decoded = decode_response(&bytes).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn response_wire_layout() {
        let response = Response::new(StatusCode::ClientErrorBadRequest, 0x0102_0304)
            .with_group(Group::new(DelimiterTag::OperationAttributes).with(Attribute::charset(
                "attributes-charset",
                "utf-8",
            )));
        let bytes = encode_response(&response).unwrap();

        let mut expected = vec![0x01, 0x01, 0x04, 0x00, 0x01, 0x02, 0x03, 0x04, 0x01];
        entry(&mut expected, 0x47, "attributes-charset", b"utf-8");
        expected.push(0x03);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn encoding_rejects_value_that_does_not_fit_the_tag() {
        let bad = Attribute::with_values(ValueTag::Integer, "copies", [Value::text("two")]).unwrap();
        let response = Response::new(StatusCode::SuccessfulOk, 1)
            .with_group(Group::new(DelimiterTag::JobAttributes).with(bad));
        let err = encode_response(&response).unwrap_err();
        assert!(matches!(err, VprintError::ValueTagMismatch { tag: 0x21, .. }));
    }

    #[test]
    fn encoding_rejects_oversized_strings() {
        let huge = "x".repeat(70_000);
        let response = Response::new(StatusCode::SuccessfulOk, 1).with_group(
            Group::new(DelimiterTag::PrinterAttributes).with(Attribute::text("printer-info", huge)),
        );
        let err = encode_response(&response).unwrap_err();
        assert!(matches!(err, VprintError::FieldTooLong(70_000)));
    }

    #[test]
    fn request_round_trip_keeps_document() {
        let request = Request::new(Version::V2_1, Operation::PrintJob, 42)
            .with_group(
                Group::operation_attributes()
                    .with(Attribute::uri("printer-uri", "ipp://localhost/ipp/print"))
                    .with(Attribute::name_value("job-name", "report")),
            )
            .with_document(b"data".to_vec());
        let bytes = encode_request(&request).unwrap();
        assert_eq!(decode_request(&bytes).unwrap(), request);
    }
}
