// ABOUTME: Server binary for the lifestyle streams telemetry API
// ABOUTME: Loads environment configuration, applies CLI overrides, initializes logging and serves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Lifestyle Streams Server Binary
//!
//! Starts the sensor telemetry API: authenticated batch ingestion and
//! downsampled range queries over HTTP.

use anyhow::Result;
use clap::Parser;
use lifestyle_streams::{config::environment::ServerConfig, logging, server};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "lifestyle-streams-server")]
#[command(about = "Lifestyle Streams - sensor telemetry ingestion and downsampling API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the telemetry snapshot file
    #[arg(long, value_name = "PATH")]
    snapshot_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(snapshot_path) = args.snapshot_path {
        config.telemetry.snapshot_path = Some(snapshot_path);
    }

    info!("Starting Lifestyle Streams");
    info!("{}", config.summary());

    if let Err(e) = server::run(config).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    info!("Lifestyle Streams stopped");
    Ok(())
}
