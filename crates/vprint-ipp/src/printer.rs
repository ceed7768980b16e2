// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory virtual printer: state, job list and the attribute projection
// served by Get-Printer-Attributes.
//
// The projection is rebuilt on every call so queue counts, up-time and the
// current time are never stale.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use vprint_core::config::PrinterCatalog;
use vprint_core::types::{Job, PrinterState};

use crate::attribute::{Attribute, DEFAULT_CHARSET, DEFAULT_NATURAL_LANGUAGE};
use crate::tag::{Operation, Version};

/// Operations the dispatcher actually implements, advertised in
/// `operations-supported`.
pub const SUPPORTED_OPERATIONS: [Operation; 5] = [
    Operation::PrintJob,
    Operation::GetPrinterAttributes,
    Operation::PausePrinter,
    Operation::ResumePrinter,
    Operation::PurgeJobs,
];

/// The single printer behind a dispatcher.
#[derive(Debug)]
pub struct Printer {
    catalog: PrinterCatalog,
    uuid: String,
    state: PrinterState,
    started_at: DateTime<Utc>,
    jobs: Vec<Job>,
    next_job_id: i32,
}

impl Printer {
    /// A new printer is stopped until [`start`](Self::start) is called.
    pub fn new(catalog: PrinterCatalog) -> Self {
        Self {
            catalog,
            uuid: format!("urn:uuid:{}", Uuid::new_v4()),
            state: PrinterState::Stopped,
            started_at: Utc::now(),
            jobs: Vec::new(),
            next_job_id: 1,
        }
    }

    pub fn start(&mut self) {
        self.state = PrinterState::Idle;
        info!(printer = %self.catalog.name, "printer started");
    }

    pub fn stop(&mut self) {
        self.state = PrinterState::Stopped;
        info!(printer = %self.catalog.name, "printer stopped");
    }

    pub fn catalog(&self) -> &PrinterCatalog {
        &self.catalog
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn state(&self) -> PrinterState {
        self.state
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Id the next accepted job will receive.
    pub fn next_job_id(&self) -> i32 {
        self.next_job_id
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.catalog
            .document_formats_supported
            .iter()
            .any(|f| f == format)
    }

    /// Allocate the next id and queue a pending job.
    ///
    /// The caller has already validated `document_format`.
    pub fn create_job(
        &mut self,
        name: Option<String>,
        document_format: Option<String>,
        document: &[u8],
    ) -> &Job {
        let id = self.next_job_id;
        self.next_job_id = self.next_job_id.wrapping_add(1).max(1);

        let name = name.unwrap_or_else(|| format!("Job {id}"));
        let format =
            document_format.unwrap_or_else(|| self.catalog.document_format_default.clone());
        let mut job = Job::new(id, name, format);
        job.document_bytes = document.len();
        if !document.is_empty() {
            job.document_digest = hex::encode(Sha256::digest(document));
        }

        info!(
            job_id = id,
            name = %job.name,
            format = %job.document_format,
            bytes = job.document_bytes,
            "job queued"
        );
        self.jobs.push(job);
        &self.jobs[self.jobs.len() - 1]
    }

    /// Drop every job. The id counter keeps counting.
    pub fn purge_jobs(&mut self) -> usize {
        let purged = self.jobs.len();
        self.jobs.clear();
        info!(purged, "jobs purged");
        purged
    }

    /// URI of a job on this printer.
    pub fn job_uri(&self, id: i32) -> String {
        format!("{}/jobs/{id}", self.catalog.uri.trim_end_matches('/'))
    }

    /// Full attribute projection as of now.
    pub fn attributes(&self) -> Vec<Attribute> {
        self.attributes_at(Utc::now())
    }

    /// Full attribute projection as of `now`, in catalog order.
    pub fn attributes_at(&self, now: DateTime<Utc>) -> Vec<Attribute> {
        let catalog = &self.catalog;
        let up_time = i32::try_from((now - self.started_at).num_seconds().max(0)).unwrap_or(i32::MAX);
        let queued = i32::try_from(self.jobs.len()).unwrap_or(i32::MAX);

        vec![
            Attribute::name_value("printer-name", &catalog.name),
            Attribute::text("printer-info", &catalog.info),
            Attribute::text("printer-make-and-model", &catalog.make_and_model),
            Attribute::text("printer-device-id", &catalog.device_id),
            Attribute::uri("printer-uuid", &self.uuid),
            Attribute::uri("printer-uri-supported", &catalog.uri),
            Attribute::uri("printer-uri", &catalog.uri),
            Attribute::text("printer-location", &catalog.location),
            Attribute::keywords("media-supported", &catalog.media_supported),
            Attribute::keywords("media-type-supported", &catalog.media_type_supported),
            Attribute::keyword("printer-kind", "document"),
            Attribute::keyword("uri-security-supported", "none"),
            Attribute::keyword("uri-authentication-supported", "none"),
            Attribute::enumeration("printer-state", self.state.ipp_enum_value()),
            Attribute::text("printer-state-message", self.state.message()),
            Attribute::keyword("printer-state-reasons", self.state.reason_keyword()),
            Attribute::keywords(
                "ipp-versions-supported",
                Version::SUPPORTED.iter().map(Version::to_string),
            ),
            Attribute::enumerations(
                "operations-supported",
                SUPPORTED_OPERATIONS.iter().map(|op| i32::from(op.code())),
            ),
            Attribute::charset("charset-configured", DEFAULT_CHARSET),
            Attribute::charset("charset-supported", DEFAULT_CHARSET),
            Attribute::natural_language("natural-language-configured", DEFAULT_NATURAL_LANGUAGE),
            Attribute::natural_language(
                "generated-natural-language-supported",
                DEFAULT_NATURAL_LANGUAGE,
            ),
            Attribute::mime_types("document-format-default", [&catalog.document_format_default]),
            Attribute::mime_types("document-format-supported", &catalog.document_formats_supported),
            Attribute::mime_types(
                "document-format-preferred",
                [&catalog.document_format_default],
            ),
            Attribute::boolean("printer-is-accepting-jobs", true),
            Attribute::integer("queued-job-count", queued),
            Attribute::keyword("pdl-override-supported", "not-attempted"),
            Attribute::integer("printer-up-time", up_time),
            Attribute::date_time("printer-current-time", now),
            Attribute::keyword("compression-supported", "none"),
        ]
    }
}
