// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for vprint.

use thiserror::Error;

/// Top-level error type for all vprint operations.
#[derive(Debug, Error)]
pub enum VprintError {
    // -- Decode errors --
    #[error("message truncated: needed {needed} byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown value tag 0x{tag:02X} at offset {offset}")]
    UnknownValueTag { tag: u8, offset: usize },

    #[error("unknown delimiter tag 0x{tag:02X} at offset {offset}")]
    UnknownDelimiterTag { tag: u8, offset: usize },

    #[error("value tag 0x{tag:02X} at offset {offset} appears before any group delimiter")]
    ValueOutsideGroup { tag: u8, offset: usize },

    #[error("additional value at offset {offset} has no attribute to continue")]
    OrphanContinuation { offset: usize },

    #[error("additional value at offset {offset} has tag 0x{tag:02X}, attribute uses 0x{expected:02X}")]
    ContinuationTagMismatch { tag: u8, expected: u8, offset: usize },

    #[error("{kind} value declares length {declared}, expected {expected}")]
    InvalidValueLength {
        kind: &'static str,
        declared: usize,
        expected: usize,
    },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("invalid date-time value: {0}")]
    InvalidDateTime(String),

    #[error("malformed collection at offset {offset}: {reason}")]
    MalformedCollection { offset: usize, reason: String },

    // -- Model / encode errors --
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),

    #[error("attribute {0:?} has no values")]
    EmptyAttribute(String),

    #[error("{kind} value cannot be carried by attribute {name:?} (tag 0x{tag:02X})")]
    ValueTagMismatch {
        name: String,
        tag: u8,
        kind: &'static str,
    },

    #[error("field of {0} bytes exceeds the 65535-byte wire limit")]
    FieldTooLong(usize),

    // -- Server errors --
    #[error("print server error: {0}")]
    PrintServer(String),

    #[error("configuration error: {0}")]
    Config(String),

    // -- I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VprintError {
    /// Whether this error was raised while decoding wire bytes.
    ///
    /// Decode faults abort the whole message; they are never turned into a
    /// protocol status by the codec itself.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::UnknownValueTag { .. }
                | Self::UnknownDelimiterTag { .. }
                | Self::ValueOutsideGroup { .. }
                | Self::OrphanContinuation { .. }
                | Self::ContinuationTagMismatch { .. }
                | Self::InvalidValueLength { .. }
                | Self::InvalidUtf8 { .. }
                | Self::InvalidDateTime(_)
                | Self::MalformedCollection { .. }
                | Self::InvalidAttributeName(_)
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VprintError>;
