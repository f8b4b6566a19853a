// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! mimic-ntpd - a configurable NTP server with a simulated, driftable clock.
//!
//! Usage:
//!   mimic-ntpd --config config.json
//!   mimic-ntpd --config config.json --reset-state

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mimic_server::config::Config;
use mimic_server::server::MimicServer;
use mimic_server::session::Session;
use mimic_server::state;

#[derive(Debug, Parser)]
#[command(
    name = "mimic-ntpd",
    about = "NTP server answering from a simulated, driftable clock",
    version
)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Ignore any persisted session state and start fresh.
    #[arg(long)]
    reset_state: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    init_tracing(config.debug);

    let session = load_or_fresh_session(&config, cli.reset_state);

    if config.persist_state {
        // Fail before the socket opens if the state path can never be written.
        state::check_writable(&config.state_file).with_context(|| {
            format!(
                "state file {} is not writable",
                config.state_file.display()
            )
        })?;
    }

    let server = MimicServer::bind(config, session)
        .await
        .context("binding UDP socket")?;
    info!(
        "simulated NTP server listening on {}",
        server.local_addr().context("reading bound address")?
    );

    server.run(shutdown_signal()).await?;
    Ok(())
}

fn load_or_fresh_session(config: &Config, reset_state: bool) -> Session {
    if config.persist_state && !reset_state {
        match state::load(&config.state_file) {
            Ok(saved) => {
                info!(
                    "loaded session state from {} (drift {:.6} ppm, {} requests served)",
                    config.state_file.display(),
                    saved.current_drift,
                    saved.request_counter,
                );
                return Session::resume(config, &saved);
            }
            Err(e) => info!("could not load session state ({e}), starting fresh"),
        }
    }
    let session = Session::fresh(config);
    info!("starting with fresh session state (seed: {})", session.seed());
    session
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolves on SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

/// Resolves on Ctrl-C.
#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
