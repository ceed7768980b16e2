// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Server configuration and the printer's descriptive catalog.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VprintError};

/// Server settings, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_address: String,
    /// Port for the IPP print server (default 631).
    pub port: u16,
    /// Maximum bytes read from a single connection.
    pub max_request_bytes: usize,
    /// Advertise `_ipp._tcp.local.` via mDNS-SD on start.
    pub advertise_mdns: bool,
    /// Descriptive attributes served by Get-Printer-Attributes.
    pub printer: PrinterCatalog,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 631,
            max_request_bytes: 64 * 1024 * 1024,
            advertise_mdns: false,
            printer: PrinterCatalog::default(),
        }
    }
}

impl ServerConfig {
    /// Read a JSON config file. Keys missing from the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.printer.name.trim().is_empty() {
            return Err(VprintError::Config("printer name must not be empty".into()));
        }
        if self.printer.document_formats_supported.is_empty() {
            return Err(VprintError::Config(
                "at least one document format must be supported".into(),
            ));
        }
        if !self
            .printer
            .document_formats_supported
            .contains(&self.printer.document_format_default)
        {
            return Err(VprintError::Config(format!(
                "default document format {:?} is not in the supported list",
                self.printer.document_format_default
            )));
        }
        if self.max_request_bytes < 9 {
            return Err(VprintError::Config(
                "max_request_bytes is smaller than an IPP header".into(),
            ));
        }
        Ok(())
    }
}

/// Static descriptive attributes of the virtual printer.
///
/// Read, never computed, by the attribute projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterCatalog {
    pub name: String,
    pub info: String,
    pub make_and_model: String,
    pub device_id: String,
    pub location: String,
    /// URI clients use to address the printer.
    pub uri: String,
    pub document_formats_supported: Vec<String>,
    pub document_format_default: String,
    pub media_supported: Vec<String>,
    pub media_type_supported: Vec<String>,
}

impl Default for PrinterCatalog {
    fn default() -> Self {
        Self {
            name: "vprint".into(),
            info: "This is a virtual IPP printer.".into(),
            make_and_model: "vprint Virtual Printer 1.0".into(),
            device_id: "MFG:vprint;MDL:Virtual Printer;CMD:PDF;".into(),
            location: String::new(),
            uri: "ipp://localhost:631/ipp/print".into(),
            document_formats_supported: vec!["application/pdf".into()],
            document_format_default: "application/pdf".into(),
            media_supported: vec![
                "na_letter_8.5x11in".into(),
                "na_legal_8.5x14in".into(),
                "iso_a4_210x297mm".into(),
            ],
            media_type_supported: vec!["auto".into()],
        }
    }
}
