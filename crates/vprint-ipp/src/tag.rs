// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire-level code points: delimiter tags, value tags, operation ids, status
// codes and protocol versions (RFC 8010 SS3.5, RFC 8011 SS4).

use std::fmt;

/// Highest byte value that is a delimiter rather than a value tag.
pub const MAX_DELIMITER_TAG: u8 = 0x0F;

/// Terminates a collection value.
pub const END_COLLECTION_TAG: u8 = 0x37;

/// Introduces a member name inside a collection value.
pub const MEMBER_ATTR_NAME_TAG: u8 = 0x4A;

/// Whether `tag` opens a group or ends the message.
pub fn is_delimiter(tag: u8) -> bool {
    tag <= MAX_DELIMITER_TAG
}

// ---------------------------------------------------------------------------
// Delimiter tags
// ---------------------------------------------------------------------------

/// Group delimiter tags (RFC 8010 SS3.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelimiterTag {
    OperationAttributes,
    JobAttributes,
    EndOfAttributes,
    PrinterAttributes,
    UnsupportedAttributes,
    SubscriptionAttributes,
    EventNotificationAttributes,
    ResourceAttributes,
    DocumentAttributes,
    SystemAttributes,
}

impl DelimiterTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::OperationAttributes,
            0x02 => Self::JobAttributes,
            0x03 => Self::EndOfAttributes,
            0x04 => Self::PrinterAttributes,
            0x05 => Self::UnsupportedAttributes,
            0x06 => Self::SubscriptionAttributes,
            0x07 => Self::EventNotificationAttributes,
            0x08 => Self::ResourceAttributes,
            0x09 => Self::DocumentAttributes,
            0x0A => Self::SystemAttributes,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::OperationAttributes => 0x01,
            Self::JobAttributes => 0x02,
            Self::EndOfAttributes => 0x03,
            Self::PrinterAttributes => 0x04,
            Self::UnsupportedAttributes => 0x05,
            Self::SubscriptionAttributes => 0x06,
            Self::EventNotificationAttributes => 0x07,
            Self::ResourceAttributes => 0x08,
            Self::DocumentAttributes => 0x09,
            Self::SystemAttributes => 0x0A,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::OperationAttributes => "operation-attributes",
            Self::JobAttributes => "job-attributes",
            Self::EndOfAttributes => "end-of-attributes",
            Self::PrinterAttributes => "printer-attributes",
            Self::UnsupportedAttributes => "unsupported-attributes",
            Self::SubscriptionAttributes => "subscription-attributes",
            Self::EventNotificationAttributes => "event-notification-attributes",
            Self::ResourceAttributes => "resource-attributes",
            Self::DocumentAttributes => "document-attributes",
            Self::SystemAttributes => "system-attributes",
        }
    }
}

impl fmt::Display for DelimiterTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ---------------------------------------------------------------------------
// Value tags
// ---------------------------------------------------------------------------

/// Attribute value tags (RFC 8010 SS3.5.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    // out-of-band
    Unsupported,
    Unknown,
    NoValue,
    // integer
    Integer,
    Boolean,
    Enum,
    // octet-string
    OctetString,
    DateTime,
    Resolution,
    RangeOfInteger,
    BegCollection,
    TextWithLanguage,
    NameWithLanguage,
    // character-string
    TextWithoutLanguage,
    NameWithoutLanguage,
    Keyword,
    Uri,
    UriScheme,
    Charset,
    NaturalLanguage,
    MimeMediaType,
}

impl ValueTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x10 => Self::Unsupported,
            0x12 => Self::Unknown,
            0x13 => Self::NoValue,
            0x21 => Self::Integer,
            0x22 => Self::Boolean,
            0x23 => Self::Enum,
            0x30 => Self::OctetString,
            0x31 => Self::DateTime,
            0x32 => Self::Resolution,
            0x33 => Self::RangeOfInteger,
            0x34 => Self::BegCollection,
            0x35 => Self::TextWithLanguage,
            0x36 => Self::NameWithLanguage,
            0x41 => Self::TextWithoutLanguage,
            0x42 => Self::NameWithoutLanguage,
            0x44 => Self::Keyword,
            0x45 => Self::Uri,
            0x46 => Self::UriScheme,
            0x47 => Self::Charset,
            0x48 => Self::NaturalLanguage,
            0x49 => Self::MimeMediaType,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Unsupported => 0x10,
            Self::Unknown => 0x12,
            Self::NoValue => 0x13,
            Self::Integer => 0x21,
            Self::Boolean => 0x22,
            Self::Enum => 0x23,
            Self::OctetString => 0x30,
            Self::DateTime => 0x31,
            Self::Resolution => 0x32,
            Self::RangeOfInteger => 0x33,
            Self::BegCollection => 0x34,
            Self::TextWithLanguage => 0x35,
            Self::NameWithLanguage => 0x36,
            Self::TextWithoutLanguage => 0x41,
            Self::NameWithoutLanguage => 0x42,
            Self::Keyword => 0x44,
            Self::Uri => 0x45,
            Self::UriScheme => 0x46,
            Self::Charset => 0x47,
            Self::NaturalLanguage => 0x48,
            Self::MimeMediaType => 0x49,
        }
    }

    /// Tags whose payload is a single length-prefixed UTF-8 string.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::Unsupported
                | Self::TextWithoutLanguage
                | Self::NameWithoutLanguage
                | Self::Keyword
                | Self::Uri
                | Self::UriScheme
                | Self::Charset
                | Self::NaturalLanguage
                | Self::MimeMediaType
        )
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
            Self::NoValue => "no-value",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::OctetString => "octetString",
            Self::DateTime => "dateTime",
            Self::Resolution => "resolution",
            Self::RangeOfInteger => "rangeOfInteger",
            Self::BegCollection => "collection",
            Self::TextWithLanguage => "textWithLanguage",
            Self::NameWithLanguage => "nameWithLanguage",
            Self::TextWithoutLanguage => "textWithoutLanguage",
            Self::NameWithoutLanguage => "nameWithoutLanguage",
            Self::Keyword => "keyword",
            Self::Uri => "uri",
            Self::UriScheme => "uriScheme",
            Self::Charset => "charset",
            Self::NaturalLanguage => "naturalLanguage",
            Self::MimeMediaType => "mimeMediaType",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// IPP operation identifiers (RFC 8011 SS4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PrintJob,
    PrintUri,
    ValidateJob,
    CreateJob,
    SendDocument,
    SendUri,
    CancelJob,
    GetJobAttributes,
    GetJobs,
    GetPrinterAttributes,
    HoldJob,
    ReleaseJob,
    RestartJob,
    PausePrinter,
    ResumePrinter,
    PurgeJobs,
    /// Any operation id this printer does not recognise.
    Other(u16),
}

impl Operation {
    pub fn from_code(code: u16) -> Self {
        match code {
            0x0002 => Self::PrintJob,
            0x0003 => Self::PrintUri,
            0x0004 => Self::ValidateJob,
            0x0005 => Self::CreateJob,
            0x0006 => Self::SendDocument,
            0x0007 => Self::SendUri,
            0x0008 => Self::CancelJob,
            0x0009 => Self::GetJobAttributes,
            0x000A => Self::GetJobs,
            0x000B => Self::GetPrinterAttributes,
            0x000C => Self::HoldJob,
            0x000D => Self::ReleaseJob,
            0x000E => Self::RestartJob,
            0x0010 => Self::PausePrinter,
            0x0011 => Self::ResumePrinter,
            0x0012 => Self::PurgeJobs,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::PrintJob => 0x0002,
            Self::PrintUri => 0x0003,
            Self::ValidateJob => 0x0004,
            Self::CreateJob => 0x0005,
            Self::SendDocument => 0x0006,
            Self::SendUri => 0x0007,
            Self::CancelJob => 0x0008,
            Self::GetJobAttributes => 0x0009,
            Self::GetJobs => 0x000A,
            Self::GetPrinterAttributes => 0x000B,
            Self::HoldJob => 0x000C,
            Self::ReleaseJob => 0x000D,
            Self::RestartJob => 0x000E,
            Self::PausePrinter => 0x0010,
            Self::ResumePrinter => 0x0011,
            Self::PurgeJobs => 0x0012,
            Self::Other(code) => code,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PrintJob => "Print-Job",
            Self::PrintUri => "Print-URI",
            Self::ValidateJob => "Validate-Job",
            Self::CreateJob => "Create-Job",
            Self::SendDocument => "Send-Document",
            Self::SendUri => "Send-URI",
            Self::CancelJob => "Cancel-Job",
            Self::GetJobAttributes => "Get-Job-Attributes",
            Self::GetJobs => "Get-Jobs",
            Self::GetPrinterAttributes => "Get-Printer-Attributes",
            Self::HoldJob => "Hold-Job",
            Self::ReleaseJob => "Release-Job",
            Self::RestartJob => "Restart-Job",
            Self::PausePrinter => "Pause-Printer",
            Self::ResumePrinter => "Resume-Printer",
            Self::PurgeJobs => "Purge-Jobs",
            Self::Other(_) => "unknown-operation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.name(), self.code())
    }
}

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// IPP status codes (RFC 8011 SS4.1.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    SuccessfulOk,
    SuccessfulOkIgnoredOrSubstitutedAttributes,
    SuccessfulOkConflictingAttributes,
    ClientErrorBadRequest,
    ServerErrorInternalError,
    ServerErrorOperationNotSupported,
    ServerErrorServiceUnavailable,
    ServerErrorVersionNotSupported,
    ServerErrorDeviceError,
    ServerErrorTemporaryError,
    ServerErrorNotAcceptingJobs,
    ServerErrorBusy,
    ServerErrorJobCanceled,
    ServerErrorMultipleDocumentJobsNotSupported,
    /// A status this implementation has no name for.
    Other(u16),
}

impl StatusCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            0x0000 => Self::SuccessfulOk,
            0x0001 => Self::SuccessfulOkIgnoredOrSubstitutedAttributes,
            0x0002 => Self::SuccessfulOkConflictingAttributes,
            0x0400 => Self::ClientErrorBadRequest,
            0x0500 => Self::ServerErrorInternalError,
            0x0501 => Self::ServerErrorOperationNotSupported,
            0x0502 => Self::ServerErrorServiceUnavailable,
            0x0503 => Self::ServerErrorVersionNotSupported,
            0x0504 => Self::ServerErrorDeviceError,
            0x0505 => Self::ServerErrorTemporaryError,
            0x0506 => Self::ServerErrorNotAcceptingJobs,
            0x0507 => Self::ServerErrorBusy,
            0x0508 => Self::ServerErrorJobCanceled,
            0x0509 => Self::ServerErrorMultipleDocumentJobsNotSupported,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::SuccessfulOk => 0x0000,
            Self::SuccessfulOkIgnoredOrSubstitutedAttributes => 0x0001,
            Self::SuccessfulOkConflictingAttributes => 0x0002,
            Self::ClientErrorBadRequest => 0x0400,
            Self::ServerErrorInternalError => 0x0500,
            Self::ServerErrorOperationNotSupported => 0x0501,
            Self::ServerErrorServiceUnavailable => 0x0502,
            Self::ServerErrorVersionNotSupported => 0x0503,
            Self::ServerErrorDeviceError => 0x0504,
            Self::ServerErrorTemporaryError => 0x0505,
            Self::ServerErrorNotAcceptingJobs => 0x0506,
            Self::ServerErrorBusy => 0x0507,
            Self::ServerErrorJobCanceled => 0x0508,
            Self::ServerErrorMultipleDocumentJobsNotSupported => 0x0509,
            Self::Other(code) => code,
        }
    }

    /// Keyword used for `status-message`.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::SuccessfulOk => "successful-ok",
            Self::SuccessfulOkIgnoredOrSubstitutedAttributes => {
                "successful-ok-ignored-or-substituted-attributes"
            }
            Self::SuccessfulOkConflictingAttributes => "successful-ok-conflicting-attributes",
            Self::ClientErrorBadRequest => "client-error-bad-request",
            Self::ServerErrorInternalError => "server-error-internal-error",
            Self::ServerErrorOperationNotSupported => "server-error-operation-not-supported",
            Self::ServerErrorServiceUnavailable => "server-error-service-unavailable",
            Self::ServerErrorVersionNotSupported => "server-error-version-not-supported",
            Self::ServerErrorDeviceError => "server-error-device-error",
            Self::ServerErrorTemporaryError => "server-error-temporary-error",
            Self::ServerErrorNotAcceptingJobs => "server-error-not-accepting-jobs",
            Self::ServerErrorBusy => "server-error-busy",
            Self::ServerErrorJobCanceled => "server-error-job-canceled",
            Self::ServerErrorMultipleDocumentJobsNotSupported => {
                "server-error-multiple-document-jobs-not-supported"
            }
            Self::Other(_) => "unknown-status",
        }
    }

    pub fn is_success(self) -> bool {
        self.code() <= 0x00FF
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04X})", self.keyword(), self.code())
    }
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

/// Protocol version carried in the first two bytes of every message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const V1_1: Version = Version::new(1, 1);
    pub const V2_0: Version = Version::new(2, 0);
    pub const V2_1: Version = Version::new(2, 1);

    /// Versions this printer accepts requests in.
    pub const SUPPORTED: [Version; 3] = [Self::V1_1, Self::V2_0, Self::V2_1];

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_boundary_is_0x0f() {
        assert!(is_delimiter(0x03));
        assert!(is_delimiter(0x0F));
        assert!(!is_delimiter(0x10));
        assert!(!is_delimiter(0x41));
    }

    #[test]
    fn value_tags_map_both_ways() {
        for byte in 0x10..=0x4Au8 {
            if let Some(tag) = ValueTag::from_u8(byte) {
                assert_eq!(tag.as_u8(), byte);
            }
        }
        assert_eq!(ValueTag::from_u8(0x11), None);
        assert_eq!(ValueTag::from_u8(END_COLLECTION_TAG), None);
        assert_eq!(ValueTag::from_u8(MEMBER_ATTR_NAME_TAG), None);
    }

    #[test]
    fn unknown_operation_keeps_its_code() {
        let op = Operation::from_code(0x00FF);
        assert_eq!(op, Operation::Other(0x00FF));
        assert_eq!(op.code(), 0x00FF);
        assert_eq!(Operation::from_code(0x0012), Operation::PurgeJobs);
    }

    #[test]
    fn status_keywords() {
        assert_eq!(StatusCode::ClientErrorBadRequest.code(), 0x0400);
        assert_eq!(
            StatusCode::from_code(0x0503).keyword(),
            "server-error-version-not-supported"
        );
        assert!(StatusCode::SuccessfulOk.is_success());
        assert!(!StatusCode::ServerErrorBusy.is_success());
    }

    #[test]
    fn supported_versions() {
        assert!(Version::new(1, 1).is_supported());
        assert!(Version::new(2, 0).is_supported());
        assert!(Version::new(2, 1).is_supported());
        assert!(!Version::new(1, 0).is_supported());
        assert!(!Version::new(2, 2).is_supported());
        assert_eq!(Version::V2_1.to_string(), "2.1");
    }
}
