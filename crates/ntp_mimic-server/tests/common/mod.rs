// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared test helpers for server integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use mimic_server::config::{Config, DriftModelKind};
use mimic_server::protocol::{ConstPackedSizeBytes, FromBytes, Packet, TimestampFormat, ToBytes};
use mimic_server::server::MimicServer;
use mimic_server::session::Session;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// A valid configuration for an ephemeral-port test server.
pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        debug: false,
        min_poll: 4,
        max_poll: 10,
        min_precision: -24,
        max_precision: -16,
        min_stratum: 1,
        max_stratum: 3,
        max_ref_time_offset: 30,
        ref_id: "GPS".to_string(),
        leap_indicator: 0,
        version_number: 4,
        jitter_ms: 0,
        processing_delay_ms: 0,
        drift_model: DriftModelKind::None,
        drift_ppm: 0.0,
        drift_step_ppm: 0.0,
        drift_update_interval_sec: 60,
        persist_state: false,
        state_file: PathBuf::from("mimic-ntpd-state.json"),
    }
}

/// Spawn a test server on an ephemeral loopback port.
///
/// Returns the bound address and a shutdown trigger; dropping or firing the
/// trigger stops the server. The server task itself is detached and joined by
/// the tokio runtime teardown.
pub(crate) async fn spawn_test_server(
    config: Config,
    session: Session,
) -> (SocketAddr, oneshot::Sender<()>) {
    let server = MimicServer::bind(config, session)
        .await
        .expect("failed to bind test server");
    let bound = server.local_addr().expect("failed to get local addr");
    let addr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), bound.port());

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = server
            .run(async move {
                let _ = rx.await;
            })
            .await;
    });
    // Small yield to ensure the server task is running.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, tx)
}

/// Build a minimal valid NTPv4 client request packet (48 bytes).
pub(crate) fn build_client_packet() -> [u8; Packet::PACKED_SIZE_BYTES] {
    let packet = Packet {
        transmit_timestamp: TimestampFormat {
            seconds: 0xE000_0000,
            fraction: 0x1234_5678,
        },
        ..Packet::default()
    };
    let mut buf = [0u8; Packet::PACKED_SIZE_BYTES];
    packet.to_bytes(&mut buf[..]).expect("failed to serialize");
    buf
}

/// Send a raw UDP packet to `addr` and receive the response with a timeout.
///
/// Returns `None` if the server doesn't respond within the timeout.
pub(crate) async fn send_receive_raw(
    addr: SocketAddr,
    packet: &[u8],
    timeout: Duration,
) -> Option<Vec<u8>> {
    let sock = UdpSocket::bind("127.0.0.1:0").await.expect("bind failed");
    sock.send_to(packet, addr).await.expect("send failed");

    let mut buf = vec![0u8; 2048];
    match tokio::time::timeout(timeout, sock.recv_from(&mut buf)).await {
        Ok(Ok((len, _))) => {
            buf.truncate(len);
            Some(buf)
        }
        _ => None,
    }
}

/// Parse a response buffer into a Packet.
pub(crate) fn parse_response(buf: &[u8]) -> Packet {
    let (pkt, _) = Packet::from_bytes(buf).expect("failed to parse response");
    pkt
}
