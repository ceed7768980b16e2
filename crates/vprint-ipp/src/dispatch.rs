// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request validation and operation routing.
//
// # Supported operations
//
//   - Print-Job              (0x0002)  RFC 8011 SS4.2.1
//   - Get-Printer-Attributes (0x000B)  RFC 8011 SS4.2.5
//   - Pause-Printer          (0x0010)  RFC 8011 SS4.3.7
//   - Resume-Printer         (0x0011)  RFC 8011 SS4.3.8
//   - Purge-Jobs             (0x0012)  RFC 8011 SS4.3.9
//
// Everything else is answered with server-error-operation-not-supported.

use std::sync::Mutex;

use tracing::{debug, error, info, instrument, warn};

use vprint_core::config::PrinterCatalog;

use crate::attribute::{ATTRIBUTES_CHARSET, ATTRIBUTES_NATURAL_LANGUAGE, Attribute, Group};
use crate::message::{Request, Response};
use crate::printer::Printer;
use crate::tag::{DelimiterTag, Operation, StatusCode, ValueTag};
use crate::value::Value;

const PRINTER_URI: &str = "printer-uri";
const REQUESTED_ATTRIBUTES: &str = "requested-attributes";
const JOB_NAME: &str = "job-name";
const DOCUMENT_FORMAT: &str = "document-format";
const STATUS_MESSAGE: &str = "status-message";

/// Validates decoded requests and applies them to the printer.
///
/// The printer sits behind one mutex held for the whole of each request, so
/// job-id allocation and state changes are serialised.
#[derive(Debug)]
pub struct Dispatcher {
    printer: Mutex<Printer>,
}

impl Dispatcher {
    pub fn new(printer: Printer) -> Self {
        Self {
            printer: Mutex::new(printer),
        }
    }

    /// Build a dispatcher around a freshly started printer.
    pub fn from_catalog(catalog: PrinterCatalog) -> Self {
        let mut printer = Printer::new(catalog);
        printer.start();
        Self::new(printer)
    }

    /// Run `f` against the current printer state.
    ///
    /// Returns `None` if a previous request panicked while holding the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&Printer) -> R) -> Option<R> {
        self.printer.lock().ok().map(|printer| f(&printer))
    }

    /// Validate `request`, route it, and build the response.
    #[instrument(
        name = "ipp_request",
        skip_all,
        fields(request_id = request.request_id, operation = %request.operation, version = %request.version)
    )]
    pub fn process(&self, request: &Request) -> Response {
        if let Err(status) = validate(request) {
            warn!(status = %status, "request rejected");
            // A zero request id is itself the fault, echoed back as zero.
            return status_response(status, request.request_id);
        }

        let mut printer = match self.printer.lock() {
            Ok(printer) => printer,
            Err(_) => {
                error!("printer state lock poisoned");
                return status_response(StatusCode::ServerErrorInternalError, request.request_id);
            }
        };

        let response = match request.operation {
            Operation::GetPrinterAttributes => get_printer_attributes(&printer, request),
            Operation::PrintJob => print_job(&mut printer, request),
            Operation::PurgeJobs => {
                printer.purge_jobs();
                status_response(StatusCode::SuccessfulOk, request.request_id)
            }
            Operation::PausePrinter => {
                printer.stop();
                status_response(StatusCode::SuccessfulOk, request.request_id)
            }
            Operation::ResumePrinter => {
                printer.start();
                status_response(StatusCode::SuccessfulOk, request.request_id)
            }
            other => {
                warn!(operation = %other, "unsupported IPP operation");
                status_response(StatusCode::ServerErrorOperationNotSupported, request.request_id)
            }
        };

        debug!(status = %response.status, "request processed");
        response
    }
}

/// Checks shared by every operation, in order; the first failure wins.
fn validate(request: &Request) -> Result<(), StatusCode> {
    if request.request_id == 0 {
        return Err(StatusCode::ClientErrorBadRequest);
    }
    if !request.version.is_supported() {
        return Err(StatusCode::ServerErrorVersionNotSupported);
    }
    let operation = request
        .operation_attributes()
        .ok_or(StatusCode::ClientErrorBadRequest)?;

    let leading: Vec<&str> = operation
        .attributes()
        .iter()
        .take(2)
        .map(Attribute::name)
        .collect();
    if leading != [ATTRIBUTES_CHARSET, ATTRIBUTES_NATURAL_LANGUAGE] {
        return Err(StatusCode::ClientErrorBadRequest);
    }

    if operation.get(PRINTER_URI).is_none() {
        return Err(StatusCode::ClientErrorBadRequest);
    }
    Ok(())
}

/// Standard operation-attributes group followed by `status-message`.
fn response_operation_group(status: StatusCode) -> Group {
    Group::operation_attributes().with(Attribute::text(STATUS_MESSAGE, status.keyword()))
}

fn status_response(status: StatusCode, request_id: i32) -> Response {
    Response::new(status, request_id).with_group(response_operation_group(status))
}

/// The `requested-attributes` filter; empty when absent.
fn requested_attributes(request: &Request) -> Vec<&str> {
    request
        .operation_attributes()
        .and_then(|group| group.get(REQUESTED_ATTRIBUTES))
        .map(|attribute| attribute.strings().collect())
        .unwrap_or_default()
}

fn get_printer_attributes(printer: &Printer, request: &Request) -> Response {
    let requested = requested_attributes(request);
    let projection = printer.attributes();
    let mut response = status_response(StatusCode::SuccessfulOk, request.request_id);

    if requested.is_empty() || requested.iter().any(|name| name.eq_ignore_ascii_case("all")) {
        debug!(count = projection.len(), "Get-Printer-Attributes: full projection");
        let mut group = Group::new(DelimiterTag::PrinterAttributes);
        group.attributes_mut().extend(projection);
        response.groups.push(group);
        return response;
    }

    let mut unsupported = Group::new(DelimiterTag::UnsupportedAttributes);
    for name in &requested {
        let known = projection.iter().any(|a| a.name() == *name);
        let reported = unsupported.get(name).is_some();
        if !known && !reported {
            unsupported.push(Attribute::named(
                ValueTag::Unsupported,
                *name,
                Value::text("unsupported"),
            ));
        }
    }

    let mut supported = Group::new(DelimiterTag::PrinterAttributes);
    supported.attributes_mut().extend(
        projection
            .into_iter()
            .filter(|a| requested.contains(&a.name())),
    );

    debug!(
        returned = supported.len(),
        unsupported = unsupported.len(),
        "Get-Printer-Attributes: filtered projection"
    );
    response.groups.push(supported);
    if !unsupported.is_empty() {
        response.groups.push(unsupported);
    }
    response
}

fn print_job(printer: &mut Printer, request: &Request) -> Response {
    let operation = request.operation_attributes();
    let string_of = |name: &str| {
        operation
            .and_then(|group| group.get(name))
            .and_then(Attribute::first_string)
            .map(str::to_owned)
    };
    let job_name = string_of(JOB_NAME);
    let document_format = string_of(DOCUMENT_FORMAT);

    if let Some(format) = &document_format {
        if !printer.supports_format(format) {
            warn!(format = %format, "Print-Job: unsupported document format");
            return status_response(StatusCode::ClientErrorBadRequest, request.request_id);
        }
    }

    let job = printer.create_job(job_name, document_format, &request.document);
    let job_id = job.id;
    let job_state = job.state;

    let job_group = Group::new(DelimiterTag::JobAttributes)
        .with(Attribute::uri("job-uri", printer.job_uri(job_id)))
        .with(Attribute::integer("job-id", job_id))
        .with(Attribute::enumeration("job-state", job_state.ipp_enum_value()))
        .with(Attribute::keyword("job-state-reasons", job_state.reason_keyword()));

    info!(job_id, "Print-Job: job accepted");
    status_response(StatusCode::SuccessfulOk, request.request_id).with_group(job_group)
}
