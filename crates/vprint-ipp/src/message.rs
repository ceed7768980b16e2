// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoded request and response messages.

use std::fmt;

use crate::attribute::Group;
use crate::tag::{DelimiterTag, Operation, StatusCode, Version};

/// A decoded client request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub version: Version,
    pub operation: Operation,
    pub request_id: i32,
    pub groups: Vec<Group>,
    /// Bytes following the end-of-attributes tag (may be empty).
    pub document: Vec<u8>,
}

impl Request {
    pub fn new(version: Version, operation: Operation, request_id: i32) -> Self {
        Self {
            version,
            operation,
            request_id,
            groups: Vec::new(),
            document: Vec::new(),
        }
    }

    /// First group carrying `tag`.
    pub fn group(&self, tag: DelimiterTag) -> Option<&Group> {
        self.groups.iter().find(|g| g.tag() == tag)
    }

    pub fn operation_attributes(&self) -> Option<&Group> {
        self.group(DelimiterTag::OperationAttributes)
    }

    /// Builder-style group append.
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_document(mut self, document: impl Into<Vec<u8>>) -> Self {
        self.document = document.into();
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "IPP/{} {} request-id={} document={}B",
            self.version,
            self.operation,
            self.request_id,
            self.document.len()
        )?;
        for group in &self.groups {
            write!(f, "{group}")?;
        }
        Ok(())
    }
}

/// A response ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub version: Version,
    pub status: StatusCode,
    pub request_id: i32,
    pub groups: Vec<Group>,
}

impl Response {
    /// Responses are always emitted as IPP/1.1.
    pub fn new(status: StatusCode, request_id: i32) -> Self {
        Self {
            version: Version::V1_1,
            status,
            request_id,
            groups: Vec::new(),
        }
    }

    pub fn group(&self, tag: DelimiterTag) -> Option<&Group> {
        self.groups.iter().find(|g| g.tag() == tag)
    }

    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "IPP/{} {} request-id={}",
            self.version, self.status, self.request_id
        )?;
        for group in &self.groups {
            write!(f, "{group}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;

    #[test]
    fn responses_default_to_ipp_1_1() {
        let response = Response::new(StatusCode::SuccessfulOk, 9);
        assert_eq!(response.version, Version::V1_1);
        assert!(response.groups.is_empty());
    }

    #[test]
    fn group_lookup_by_tag() {
        let request = Request::new(Version::V2_0, Operation::PrintJob, 3)
            .with_group(Group::operation_attributes())
            .with_group(Group::new(DelimiterTag::JobAttributes).with(Attribute::integer("copies", 2)));

        assert!(request.operation_attributes().is_some());
        let job = request.group(DelimiterTag::JobAttributes).unwrap();
        assert_eq!(job.get("copies").and_then(Attribute::first_integer), Some(2));
        assert!(request.group(DelimiterTag::PrinterAttributes).is_none());
    }

    #[test]
    fn display_names_operation_and_groups() {
        let request = Request::new(Version::V1_1, Operation::GetPrinterAttributes, 1)
            .with_group(Group::operation_attributes());
        let text = request.to_string();
        assert!(text.starts_with("IPP/1.1 Get-Printer-Attributes (0x000B) request-id=1"));
        assert!(text.contains("[operation-attributes]"));
        assert!(text.contains("attributes-charset (charset) = \"utf-8\""));
    }
}
