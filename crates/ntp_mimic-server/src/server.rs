// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The tokio request loop.
//!
//! [`MimicServer`] binds one UDP socket and processes datagrams strictly
//! sequentially on a single task. The shutdown future supplied by the caller
//! is polled by that same task via `select!`, so the persistence snapshot
//! taken on shutdown can never race the request path's mutation of the drift
//! clock and random stream — the [`crate::session::Session`] has exactly one
//! owner for the process lifetime.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example(
//! #     config: mimic_server::config::Config,
//! # ) -> Result<(), mimic_server::error::MimicServerError> {
//! use mimic_server::server::MimicServer;
//! use mimic_server::session::Session;
//!
//! let session = Session::fresh(&config);
//! let server = MimicServer::bind(config, session).await?;
//! println!("listening on {}", server.local_addr()?);
//! server.run(std::future::pending()).await
//! # }
//! ```

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::MimicServerError;
use crate::server_common::{HandleOutcome, ResponseInfo, handle_request};
use crate::session::Session;
use crate::state;
use crate::unix_time::Instant;

/// A simulated NTP server bound to a UDP socket.
///
/// Created via [`MimicServer::bind`]. Call [`run()`](MimicServer::run) with a
/// shutdown future to start serving requests.
pub struct MimicServer {
    sock: UdpSocket,
    config: Config,
    session: Session,
}

impl MimicServer {
    /// Bind the server socket on all interfaces at the configured port.
    pub async fn bind(config: Config, session: Session) -> Result<MimicServer, MimicServerError> {
        let sock = UdpSocket::bind(("0.0.0.0", config.port)).await?;
        debug!("simulated NTP server bound on port {}", config.port);
        Ok(MimicServer {
            sock,
            config,
            session,
        })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, MimicServerError> {
        self.sock.local_addr().map_err(MimicServerError::Io)
    }

    /// Run the server until `shutdown` completes.
    ///
    /// Per-datagram faults — truncated packets, non-client modes, send
    /// failures, even socket read errors — are logged at debug level and the
    /// loop continues. When `shutdown` resolves, the session state is saved
    /// once (if persistence is enabled, best-effort) and the loop returns.
    pub async fn run<F>(mut self, shutdown: F) -> Result<(), MimicServerError>
    where
        F: Future<Output = ()>,
    {
        let mut recv_buf = [0u8; 2048];
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                recv = self.sock.recv_from(&mut recv_buf) => {
                    let (recv_len, src_addr) = match recv {
                        Ok(received) => received,
                        Err(e) => {
                            debug!("socket read error: {e}");
                            continue;
                        }
                    };
                    self.process_datagram(&recv_buf, recv_len, src_addr).await;
                }
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    self.flush_state();
                    return Ok(());
                }
            }
        }
    }

    async fn process_datagram(&mut self, recv_buf: &[u8; 2048], recv_len: usize, src_addr: SocketAddr) {
        match handle_request(recv_buf, recv_len, &self.config, &mut self.session) {
            HandleOutcome::Response { buf, info } => {
                log_request(src_addr, &info);
                if let Err(e) = self.sock.send_to(&buf, src_addr).await {
                    debug!("send to {src_addr} failed: {e}");
                }
                log_response(src_addr, &info);
            }
            HandleOutcome::Ignored { mode } => {
                debug!("ignored request from {} with mode {:?}", src_addr.ip(), mode);
            }
            HandleOutcome::Dropped => {
                debug!("dropped packet from {}", src_addr.ip());
            }
        }
    }

    /// Snapshot and save the session state; fire-once, best-effort.
    fn flush_state(&self) {
        if !self.config.persist_state {
            return;
        }
        let snapshot = self.session.snapshot();
        match state::save(&self.config.state_file, &snapshot) {
            Ok(()) => info!(
                "session state saved to {}",
                self.config.state_file.display()
            ),
            Err(e) => warn!("failed to save session state: {e}"),
        }
    }
}

fn log_request(src_addr: SocketAddr, info: &ResponseInfo) {
    debug!(
        "request from {} (NTP v{}), client transmit: {}",
        src_addr.ip(),
        info.request_version.value(),
        format_instant(Instant::from(info.client_transmit)),
    );
}

fn log_response(src_addr: SocketAddr, info: &ResponseInfo) {
    debug!(
        "response #{} to {}: simulated {} | drift {:.6} ppm, jitter {} ms",
        info.counter,
        src_addr.ip(),
        format_instant(info.simulated_now),
        info.drift_ppm,
        info.jitter_ms,
    );
}

/// Render an instant the way operators read log lines, falling back to raw
/// seconds for instants chrono cannot represent.
fn format_instant(t: Instant) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp(t.secs(), t.subsec_nanos().max(0) as u32)
        .map(|dt| dt.format("%b %e %Y %H:%M:%S%.9f (UTC)").to_string())
        .unwrap_or_else(|| format!("{}s", t.secs()))
}
