// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the vprint virtual printer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a print job (RFC 8011 §5.3.7).
///
/// Jobs are held, never printed, so every accepted job stays pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Pending,
}

impl JobState {
    /// IPP `job-state` enum value.
    pub fn ipp_enum_value(&self) -> i32 {
        match self {
            Self::Pending => 3,
        }
    }

    /// IPP `job-state-reasons` keyword reported alongside the state.
    pub fn reason_keyword(&self) -> &'static str {
        match self {
            Self::Pending => "none",
        }
    }
}

/// Printer states (RFC 8011 §5.4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrinterState {
    Idle,
    Processing,
    Stopped,
}

impl PrinterState {
    /// IPP `printer-state` enum value.
    pub fn ipp_enum_value(&self) -> i32 {
        match self {
            Self::Idle => 3,
            Self::Processing => 4,
            Self::Stopped => 5,
        }
    }

    /// Text for `printer-state-message`.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Idle => "Idle.",
            Self::Processing => "Processing.",
            Self::Stopped => "Stopped.",
        }
    }

    /// Keyword for `printer-state-reasons`.
    pub fn reason_keyword(&self) -> &'static str {
        match self {
            Self::Stopped => "paused",
            Self::Idle | Self::Processing => "none",
        }
    }
}

/// A job accepted by the virtual printer.
///
/// Jobs live in memory only; purging the printer drops them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i32,
    pub name: String,
    pub state: JobState,
    /// MIME type of the submitted document.
    pub document_format: String,
    /// Size of the document payload in bytes.
    pub document_bytes: usize,
    /// SHA-256 of the document payload, hex encoded ("empty" when no data).
    pub document_digest: String,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: i32, name: String, document_format: String) -> Self {
        Self {
            id,
            name,
            state: JobState::Pending,
            document_format,
            document_bytes: 0,
            document_digest: "empty".into(),
            created_at: Utc::now(),
        }
    }
}

/// Status of the embedded IPP print server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_job_state_matches_rfc() {
        assert_eq!(JobState::Pending.ipp_enum_value(), 3);
        assert_eq!(JobState::Pending.reason_keyword(), "none");
    }

    #[test]
    fn printer_state_enum_values_follow_rfc() {
        assert_eq!(PrinterState::Idle.ipp_enum_value(), 3);
        assert_eq!(PrinterState::Processing.ipp_enum_value(), 4);
        assert_eq!(PrinterState::Stopped.ipp_enum_value(), 5);
        assert_eq!(PrinterState::Stopped.reason_keyword(), "paused");
    }

    #[test]
    fn new_job_is_pending_without_document() {
        let job = Job::new(4, "Job 4".into(), "application/pdf".into());
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.document_bytes, 0);
        assert_eq!(job.document_digest, "empty");
    }
}
