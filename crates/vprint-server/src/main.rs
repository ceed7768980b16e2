// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// vprint -- virtual IPP printer
//
// Entry point. Initialises logging, loads configuration, starts the IPP
// server and runs until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use vprint_core::config::ServerConfig;
use vprint_core::error::Result;
use vprint_ipp::{Dispatcher, IppServer};

/// Virtual IPP printer
#[derive(Parser, Debug)]
#[command(name = "vprint")]
#[command(about = "Virtual IPP printer: accepts Print-Job and answers attribute queries")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    bind: Option<String>,

    /// Listen port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Advertise the printer via mDNS-SD
    #[arg(long)]
    mdns: bool,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.mdns {
            config.advertise_mdns = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "vprint starting");

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "vprint failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.into_config()?;
    let dispatcher = Arc::new(Dispatcher::from_catalog(config.printer.clone()));

    let mut server = IppServer::new(config, dispatcher);
    let addr = server.start().await?;
    tracing::info!(addr = %addr, "ready for print jobs");

    tokio::signal::ctrl_c().await?;
    tracing::info!("received Ctrl-C, shutting down");

    server.stop().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["vprint", "--port", "8631", "--mdns", "-b", "127.0.0.1"]);
        let config = args.into_config().unwrap();
        assert_eq!(config.port, 8631);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert!(config.advertise_mdns);
    }

    #[test]
    fn no_flags_means_defaults() {
        let config = Args::parse_from(["vprint"]).into_config().unwrap();
        assert_eq!(config.port, 631);
        assert!(!config.advertise_mdns);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let args = Args::parse_from(["vprint", "--config", "/nonexistent/vprint.json"]);
        assert!(args.into_config().is_err());
    }
}
