// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed attribute values and their wire encoding (RFC 8010 SS3.9).
//
// Every value on the wire is preceded by a 2-byte big-endian value-length,
// even when the kind has a fixed size.  `Value::encode` writes that length
// followed by the payload; `Value::decode` starts at the length field and
// returns the offset just past the payload.
//
// The string family (text, name, keyword, uri, charset, ...) shares a single
// wire shape; which one a value is depends only on the owning attribute's
// value tag.  octetString has the same shape but is opaque bytes, never
// checked as UTF-8.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use vprint_core::error::{Result, VprintError};

use crate::tag::{END_COLLECTION_TAG, MEMBER_ATTR_NAME_TAG, ValueTag};
use crate::wire::{
    read_bytes, read_string, read_u8, read_u16, skip_length_prefixed, write_length, write_string,
};

/// Nesting limit for collection values.
const MAX_COLLECTION_DEPTH: usize = 32;

const DATE_TIME_LENGTH: usize = 11;
const RANGE_LENGTH: usize = 8;
const RESOLUTION_LENGTH: usize = 9;

/// Resolution unit: dots per inch.
pub const UNITS_DPI: u8 = 3;

/// Resolution unit: dots per centimetre.
pub const UNITS_DPCM: u8 = 4;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Boolean(bool),
    Enum(i32),
    /// Always held in UTC; decisecond precision on the wire.
    DateTime(DateTime<Utc>),
    /// Any member of the string family.
    Text(String),
    LangString { language: String, text: String },
    /// `octetString` payload, kept byte for byte.
    Octets(Vec<u8>),
    Range { lower: i32, upper: i32 },
    Resolution { cross_feed: i32, feed: i32, units: u8 },
    Collection(Collection),
    /// Out-of-band `no-value` / `unknown`; carries no payload.
    NoValue,
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn lang_string(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self::LangString {
            language: language.into(),
            text: text.into(),
        }
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::Enum(_) => "enum",
            Self::DateTime(_) => "dateTime",
            Self::Text(_) => "string",
            Self::LangString { .. } => "string-with-language",
            Self::Octets(_) => "octetString",
            Self::Range { .. } => "rangeOfInteger",
            Self::Resolution { .. } => "resolution",
            Self::Collection(_) => "collection",
            Self::NoValue => "no-value",
        }
    }

    /// Whether this value can be carried under `tag`.
    pub fn fits(&self, tag: ValueTag) -> bool {
        match self {
            Self::Integer(_) => tag == ValueTag::Integer,
            Self::Boolean(_) => tag == ValueTag::Boolean,
            Self::Enum(_) => tag == ValueTag::Enum,
            Self::DateTime(_) => tag == ValueTag::DateTime,
            Self::Text(_) => tag.is_string(),
            Self::LangString { .. } => {
                matches!(tag, ValueTag::TextWithLanguage | ValueTag::NameWithLanguage)
            }
            Self::Octets(_) => tag == ValueTag::OctetString,
            Self::Range { .. } => tag == ValueTag::RangeOfInteger,
            Self::Resolution { .. } => tag == ValueTag::Resolution,
            Self::Collection(_) => tag == ValueTag::BegCollection,
            Self::NoValue => matches!(tag, ValueTag::NoValue | ValueTag::Unknown),
        }
    }

    /// Borrow the text of a string-family value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::LangString { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Integer payload of an integer or enum value.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(v) | Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    /// Append value-length and payload to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Integer(v) | Self::Enum(v) => {
                write_length(buf, 4)?;
                buf.extend_from_slice(&v.to_be_bytes());
            }
            Self::Boolean(v) => {
                write_length(buf, 1)?;
                buf.push(u8::from(*v));
            }
            Self::DateTime(v) => encode_date_time(buf, v)?,
            Self::Text(text) => write_string(buf, text)?,
            Self::LangString { language, text } => {
                let mut inner = Vec::with_capacity(4 + language.len() + text.len());
                write_string(&mut inner, language)?;
                write_string(&mut inner, text)?;
                write_length(buf, inner.len())?;
                buf.extend_from_slice(&inner);
            }
            Self::Octets(bytes) => {
                write_length(buf, bytes.len())?;
                buf.extend_from_slice(bytes);
            }
            Self::Range { lower, upper } => {
                write_length(buf, RANGE_LENGTH)?;
                buf.extend_from_slice(&lower.to_be_bytes());
                buf.extend_from_slice(&upper.to_be_bytes());
            }
            Self::Resolution {
                cross_feed,
                feed,
                units,
            } => {
                write_length(buf, RESOLUTION_LENGTH)?;
                buf.extend_from_slice(&cross_feed.to_be_bytes());
                buf.extend_from_slice(&feed.to_be_bytes());
                buf.push(*units);
            }
            Self::Collection(collection) => collection.encode(buf)?,
            Self::NoValue => write_length(buf, 0)?,
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    /// Decode one value of kind `tag` starting at the value-length field.
    pub fn decode(tag: ValueTag, data: &[u8], pos: usize) -> Result<(Value, usize)> {
        decode_value(tag, data, pos, 0)
    }
}

fn decode_value(tag: ValueTag, data: &[u8], pos: usize, depth: usize) -> Result<(Value, usize)> {
    match tag {
        ValueTag::Integer => {
            let (payload, next) = fixed_payload(data, pos, 4, "integer")?;
            Ok((Value::Integer(be_i32(payload, 0)), next))
        }
        ValueTag::Enum => {
            let (payload, next) = fixed_payload(data, pos, 4, "enum")?;
            Ok((Value::Enum(be_i32(payload, 0)), next))
        }
        ValueTag::Boolean => {
            let (payload, next) = fixed_payload(data, pos, 1, "boolean")?;
            Ok((Value::Boolean(payload[0] != 0), next))
        }
        ValueTag::DateTime => {
            let (payload, next) = fixed_payload(data, pos, DATE_TIME_LENGTH, "dateTime")?;
            Ok((Value::DateTime(decode_date_time(payload)?), next))
        }
        ValueTag::RangeOfInteger => {
            let (payload, next) = fixed_payload(data, pos, RANGE_LENGTH, "rangeOfInteger")?;
            let value = Value::Range {
                lower: be_i32(payload, 0),
                upper: be_i32(payload, 4),
            };
            Ok((value, next))
        }
        ValueTag::Resolution => {
            let (payload, next) = fixed_payload(data, pos, RESOLUTION_LENGTH, "resolution")?;
            let value = Value::Resolution {
                cross_feed: be_i32(payload, 0),
                feed: be_i32(payload, 4),
                units: payload[8],
            };
            Ok((value, next))
        }
        ValueTag::TextWithLanguage | ValueTag::NameWithLanguage => {
            let (declared, start) = read_u16(data, pos)?;
            let (language, after_language) = read_string(data, start)?;
            let (text, next) = read_string(data, after_language)?;
            let consumed = next - start;
            if consumed != declared as usize {
                return Err(VprintError::InvalidValueLength {
                    kind: "string-with-language",
                    declared: declared as usize,
                    expected: consumed,
                });
            }
            Ok((Value::LangString { language, text }, next))
        }
        ValueTag::BegCollection => {
            let (collection, next) = Collection::decode_at(data, pos, depth)?;
            Ok((Value::Collection(collection), next))
        }
        ValueTag::OctetString => {
            let (len, start) = read_u16(data, pos)?;
            let (bytes, next) = read_bytes(data, start, len as usize)?;
            Ok((Value::Octets(bytes.to_vec()), next))
        }
        ValueTag::NoValue | ValueTag::Unknown => {
            let next = skip_length_prefixed(data, pos)?;
            Ok((Value::NoValue, next))
        }
        ValueTag::Unsupported
        | ValueTag::TextWithoutLanguage
        | ValueTag::NameWithoutLanguage
        | ValueTag::Keyword
        | ValueTag::Uri
        | ValueTag::UriScheme
        | ValueTag::Charset
        | ValueTag::NaturalLanguage
        | ValueTag::MimeMediaType => {
            let (text, next) = read_string(data, pos)?;
            Ok((Value::Text(text), next))
        }
    }
}

/// Read a value-length that must equal `expected`, then the payload.
fn fixed_payload<'a>(
    data: &'a [u8],
    pos: usize,
    expected: usize,
    kind: &'static str,
) -> Result<(&'a [u8], usize)> {
    let (declared, pos) = read_u16(data, pos)?;
    if declared as usize != expected {
        return Err(VprintError::InvalidValueLength {
            kind,
            declared: declared as usize,
            expected,
        });
    }
    read_bytes(data, pos, expected)
}

fn be_i32(bytes: &[u8], at: usize) -> i32 {
    i32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

// ---------------------------------------------------------------------------
// dateTime (RFC 2579 DateAndTime)
// ---------------------------------------------------------------------------

fn encode_date_time(buf: &mut Vec<u8>, value: &DateTime<Utc>) -> Result<()> {
    let year = u16::try_from(value.year())
        .map_err(|_| VprintError::InvalidDateTime(format!("year {} out of range", value.year())))?;
    // Leap-second nanoseconds exceed 1e9; clamp so the decisecond stays 0..=9.
    let decisecond = (value.nanosecond() / 100_000_000).min(9) as u8;

    write_length(buf, DATE_TIME_LENGTH)?;
    buf.extend_from_slice(&year.to_be_bytes());
    buf.push(value.month() as u8);
    buf.push(value.day() as u8);
    buf.push(value.hour() as u8);
    buf.push(value.minute() as u8);
    buf.push(value.second() as u8);
    buf.push(decisecond);
    buf.push(b'+');
    buf.push(0);
    buf.push(0);
    Ok(())
}

/// Rebuild the instant from an 11-byte payload and normalise it to UTC.
///
/// Both offset fields are applied: RFC 2579 defines the offset as
/// hours *and* minutes from UTC.
fn decode_date_time(payload: &[u8]) -> Result<DateTime<Utc>> {
    let year = u16::from_be_bytes([payload[0], payload[1]]);
    let (month, day, hour, minute, second, decisecond) = (
        payload[2], payload[3], payload[4], payload[5], payload[6], payload[7],
    );
    let sign = match payload[8] {
        b'+' => 1,
        b'-' => -1,
        other => {
            return Err(VprintError::InvalidDateTime(format!(
                "offset direction byte 0x{other:02X} is neither '+' nor '-'"
            )));
        }
    };
    let (offset_hours, offset_minutes) = (payload[9], payload[10]);

    if decisecond > 9 {
        return Err(VprintError::InvalidDateTime(format!(
            "decisecond {decisecond} out of range"
        )));
    }

    let local = NaiveDate::from_ymd_opt(i32::from(year), month.into(), day.into())
        .and_then(|date| {
            date.and_hms_milli_opt(
                hour.into(),
                minute.into(),
                second.into(),
                u32::from(decisecond) * 100,
            )
        })
        .ok_or_else(|| {
            VprintError::InvalidDateTime(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} is not a valid instant"
            ))
        })?;

    let offset_seconds = sign * (i32::from(offset_hours) * 3600 + i32::from(offset_minutes) * 60);
    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
        VprintError::InvalidDateTime(format!("UTC offset of {offset_seconds}s out of range"))
    })?;

    offset
        .from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| VprintError::InvalidDateTime("ambiguous local time".into()))
}

// ---------------------------------------------------------------------------
// Collections (RFC 8010 SS3.1.6)
// ---------------------------------------------------------------------------

/// One named member of a collection value.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub tag: ValueTag,
    pub value: Value,
}

/// Ordered name → value mapping carried in a single value slot.
///
/// Members keep the order they were first inserted in; inserting an existing
/// name replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    members: Vec<Member>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, tag: ValueTag, value: Value) {
        let name = name.into();
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(existing) => {
                existing.tag = tag;
                existing.value = value;
            }
            None => self.members.push(Member { name, tag, value }),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, tag: ValueTag, value: Value) -> Self {
        self.insert(name, tag, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        // begCollection carries an empty payload; members follow as entries.
        write_length(buf, 0)?;
        for member in &self.members {
            if !member.value.fits(member.tag) {
                return Err(VprintError::ValueTagMismatch {
                    name: member.name.clone(),
                    tag: member.tag.as_u8(),
                    kind: member.value.kind(),
                });
            }
            buf.push(MEMBER_ATTR_NAME_TAG);
            write_length(buf, 0)?;
            write_string(buf, &member.name)?;
            buf.push(member.tag.as_u8());
            write_length(buf, 0)?;
            member.value.encode(buf)?;
        }
        buf.push(END_COLLECTION_TAG);
        write_length(buf, 0)?;
        write_length(buf, 0)?;
        Ok(())
    }

    fn decode_at(data: &[u8], pos: usize, depth: usize) -> Result<(Collection, usize)> {
        if depth >= MAX_COLLECTION_DEPTH {
            return Err(VprintError::MalformedCollection {
                offset: pos,
                reason: format!("nested deeper than {MAX_COLLECTION_DEPTH} levels"),
            });
        }

        let mut pos = skip_length_prefixed(data, pos)?;
        let mut collection = Collection::new();

        loop {
            let entry_offset = pos;
            let (tag, next) = read_u8(data, pos)?;
            match tag {
                END_COLLECTION_TAG => {
                    // endCollection: empty name, empty value.
                    let next = skip_length_prefixed(data, next)?;
                    let next = skip_length_prefixed(data, next)?;
                    return Ok((collection, next));
                }
                MEMBER_ATTR_NAME_TAG => {
                    let next = skip_length_prefixed(data, next)?;
                    let (name, next) = read_string(data, next)?;
                    let (raw_tag, next) = read_u8(data, next)?;
                    let member_tag =
                        ValueTag::from_u8(raw_tag).ok_or(VprintError::UnknownValueTag {
                            tag: raw_tag,
                            offset: next - 1,
                        })?;
                    let next = skip_length_prefixed(data, next)?;
                    let (value, next) = decode_value(member_tag, data, next, depth + 1)?;
                    collection.insert(name, member_tag, value);
                    pos = next;
                }
                other => {
                    return Err(VprintError::MalformedCollection {
                        offset: entry_offset,
                        reason: format!(
                            "expected member-name (0x4A) or end-collection (0x37), found 0x{other:02X}"
                        ),
                    });
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::LangString { language, text } => write!(f, "{language:?} - {text:?}"),
            Self::Octets(bytes) => write!(f, "<{} octets>", bytes.len()),
            Self::Range { lower, upper } => write!(f, "{lower}-{upper}"),
            Self::Resolution {
                cross_feed,
                feed,
                units,
            } => {
                let unit = match *units {
                    UNITS_DPI => "dpi",
                    UNITS_DPCM => "dpcm",
                    _ => "?",
                };
                write!(f, "{cross_feed}x{feed}{unit}")
            }
            Self::Collection(collection) => {
                f.write_str("{")?;
                for (i, member) in collection.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", member.name, member.value)?;
                }
                f.write_str("}")
            }
            Self::NoValue => f.write_str("no-value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        value.encode(&mut buf).expect("encode");
        buf
    }

    fn round_trip(tag: ValueTag, value: Value) {
        let bytes = encoded(&value);
        let (decoded, next) = Value::decode(tag, &bytes, 0).expect("decode");
        assert_eq!(decoded, value);
        assert_eq!(next, bytes.len(), "cursor must land on the end of the value");
    }

    #[test]
    fn octet_string_keeps_binary_payload() {
        let payload = vec![0x00, 0xFF, 0xC3, 0x28, 0x80];
        let mut bytes = vec![0x00, 0x05];
        bytes.extend_from_slice(&payload);

        let (decoded, next) = Value::decode(ValueTag::OctetString, &bytes, 0).unwrap();
        assert_eq!(decoded, Value::Octets(payload));
        assert_eq!(next, bytes.len());
        assert_eq!(encoded(&decoded), bytes);
        assert!(decoded.fits(ValueTag::OctetString));
        assert!(!decoded.fits(ValueTag::Keyword));
        assert!(!Value::text("x").fits(ValueTag::OctetString));
    }

    #[test]
    fn integer_wire_shape() {
        assert_eq!(encoded(&Value::Integer(-2)), [0, 4, 0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn boolean_declares_length_one() {
        assert_eq!(encoded(&Value::Boolean(true)), [0, 1, 1]);
        let (value, next) = Value::decode(ValueTag::Boolean, &[0, 1, 0], 0).unwrap();
        assert_eq!(value, Value::Boolean(false));
        assert_eq!(next, 3);
    }

    #[test]
    fn fixed_size_kinds_reject_wrong_declared_length() {
        let err = Value::decode(ValueTag::Boolean, &[0, 4, 0, 0, 0, 1], 0).unwrap_err();
        assert!(matches!(
            err,
            VprintError::InvalidValueLength { declared: 4, expected: 1, .. }
        ));

        let err = Value::decode(ValueTag::Integer, &[0, 2, 0, 1], 0).unwrap_err();
        assert!(matches!(err, VprintError::InvalidValueLength { .. }));
    }

    #[test]
    fn strings_are_wire_identical_across_the_family() {
        let value = Value::text("application/pdf");
        let bytes = encoded(&value);
        for tag in [ValueTag::Keyword, ValueTag::MimeMediaType, ValueTag::Uri, ValueTag::Charset] {
            let (decoded, _) = Value::decode(tag, &bytes, 0).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn empty_string_is_not_absence() {
        round_trip(ValueTag::TextWithoutLanguage, Value::text(""));
    }

    #[test]
    fn lang_string_outer_length_covers_both_parts() {
        let bytes = encoded(&Value::lang_string("en", "hello"));
        // outer length = (2 + 2) + (2 + 5)
        assert_eq!(&bytes[..2], &[0, 11]);
        assert_eq!(&bytes[2..6], &[0, 2, b'e', b'n']);
        round_trip(ValueTag::TextWithLanguage, Value::lang_string("en", "hello"));
    }

    #[test]
    fn lang_string_with_inconsistent_outer_length_fails() {
        let mut bytes = encoded(&Value::lang_string("en", "hi"));
        bytes[1] += 1;
        bytes.push(0);
        let err = Value::decode(ValueTag::NameWithLanguage, &bytes, 0).unwrap_err();
        assert!(matches!(err, VprintError::InvalidValueLength { .. }));
    }

    #[test]
    fn range_keeps_both_bounds() {
        let bytes = encoded(&Value::Range { lower: 1, upper: 99 });
        assert_eq!(bytes, [0, 8, 0, 0, 0, 1, 0, 0, 0, 99]);
        round_trip(ValueTag::RangeOfInteger, Value::Range { lower: -5, upper: 5 });
    }

    #[test]
    fn resolution_is_nine_bytes() {
        let value = Value::Resolution {
            cross_feed: 600,
            feed: 300,
            units: UNITS_DPI,
        };
        assert_eq!(encoded(&value).len(), 2 + 9);
        round_trip(ValueTag::Resolution, value.clone());
        assert_eq!(value.to_string(), "600x300dpi");
    }

    #[test]
    fn date_time_utc_round_trip_keeps_deciseconds() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
            + chrono::Duration::milliseconds(500);
        let bytes = encoded(&Value::DateTime(instant));
        assert_eq!(bytes.len(), 13);
        assert_eq!(&bytes[2..4], &2026u16.to_be_bytes());
        assert_eq!(bytes[9], 5);
        assert_eq!(&bytes[10..13], &[b'+', 0, 0]);
        round_trip(ValueTag::DateTime, Value::DateTime(instant));
    }

    #[test]
    fn date_time_applies_hours_and_minutes_of_offset() {
        // 2026-01-01 12:00:00.0 -05:30
        let payload = [0, 11, 0x07, 0xEA, 1, 1, 12, 0, 0, 0, b'-', 5, 30];
        let (value, next) = Value::decode(ValueTag::DateTime, &payload, 0).unwrap();
        assert_eq!(next, payload.len());
        let expected = Utc.with_ymd_and_hms(2026, 1, 1, 17, 30, 0).unwrap();
        assert_eq!(value, Value::DateTime(expected));
    }

    #[test]
    fn date_time_rejects_impossible_dates() {
        let payload = [0, 11, 0x07, 0xEA, 2, 30, 0, 0, 0, 0, b'+', 0, 0];
        let err = Value::decode(ValueTag::DateTime, &payload, 0).unwrap_err();
        assert!(matches!(err, VprintError::InvalidDateTime(_)));

        let payload = [0, 11, 0x07, 0xEA, 2, 1, 0, 0, 0, 0, b'?', 0, 0];
        let err = Value::decode(ValueTag::DateTime, &payload, 0).unwrap_err();
        assert!(matches!(err, VprintError::InvalidDateTime(_)));
    }

    #[test]
    fn no_value_consumes_only_the_length_field() {
        let (value, next) = Value::decode(ValueTag::NoValue, &[0, 0, 0x21], 0).unwrap();
        assert_eq!(value, Value::NoValue);
        assert_eq!(next, 2);
        assert_eq!(encoded(&Value::NoValue), [0, 0]);
    }

    #[test]
    fn collection_wire_shape() {
        let collection = Collection::new().with("x-dimension", ValueTag::Integer, Value::Integer(21000));
        let bytes = encoded(&Value::Collection(collection));

        let mut expected = vec![0, 0];
        expected.extend_from_slice(&[MEMBER_ATTR_NAME_TAG, 0, 0]);
        expected.extend_from_slice(&[0, 11]);
        expected.extend_from_slice(b"x-dimension");
        expected.extend_from_slice(&[0x21, 0, 0, 0, 4]);
        expected.extend_from_slice(&21000i32.to_be_bytes());
        expected.extend_from_slice(&[END_COLLECTION_TAG, 0, 0, 0, 0]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn nested_collection_round_trip() {
        let size = Collection::new()
            .with("x-dimension", ValueTag::Integer, Value::Integer(21000))
            .with("y-dimension", ValueTag::Integer, Value::Integer(29700));
        let media = Collection::new()
            .with("media-size", ValueTag::BegCollection, Value::Collection(size))
            .with("media-type", ValueTag::Keyword, Value::text("stationery"));
        round_trip(ValueTag::BegCollection, Value::Collection(media));
    }

    #[test]
    fn collection_duplicate_keys_overwrite_in_place() {
        let mut collection = Collection::new();
        collection.insert("a", ValueTag::Integer, Value::Integer(1));
        collection.insert("b", ValueTag::Integer, Value::Integer(2));
        collection.insert("a", ValueTag::Integer, Value::Integer(3));

        let names: Vec<_> = collection.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(collection.get("a").map(|m| &m.value), Some(&Value::Integer(3)));
    }

    #[test]
    fn collection_with_stray_byte_is_malformed() {
        let bytes = [0, 0, 0x21, 0, 0];
        let err = Value::decode(ValueTag::BegCollection, &bytes, 0).unwrap_err();
        assert!(matches!(err, VprintError::MalformedCollection { offset: 2, .. }));
    }

    #[test]
    fn collection_without_terminator_is_truncated() {
        let mut bytes = encoded(&Value::Collection(
            Collection::new().with("k", ValueTag::Keyword, Value::text("v")),
        ));
        bytes.truncate(bytes.len() - 5);
        let err = Value::decode(ValueTag::BegCollection, &bytes, 0).unwrap_err();
        assert!(matches!(err, VprintError::Truncated { .. }));
    }

    #[test]
    fn collection_member_tag_must_match_value() {
        let collection = Collection::new().with("k", ValueTag::Integer, Value::text("v"));
        let err = Value::Collection(collection).encode(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, VprintError::ValueTagMismatch { .. }));
    }

    #[test]
    fn fits_matches_value_kinds_to_tags() {
        assert!(Value::text("x").fits(ValueTag::Keyword));
        assert!(!Value::text("x").fits(ValueTag::Integer));
        assert!(Value::NoValue.fits(ValueTag::Unknown));
        assert!(Value::lang_string("en", "x").fits(ValueTag::NameWithLanguage));
        assert!(!Value::Integer(1).fits(ValueTag::Enum));
    }
}
