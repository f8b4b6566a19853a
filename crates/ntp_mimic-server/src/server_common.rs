// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Pure per-request pipeline shared by the server loop and its tests.
//!
//! [`handle_request`] takes one received datagram and the mutable session,
//! and produces either a wire-ready response, an "ignored" verdict for
//! non-client traffic, or a silent drop for malformed input. It performs no
//! I/O, which keeps the whole request path unit-testable with an injected
//! seed.

use log::debug;

use crate::config::Config;
use crate::protocol::{
    ConstPackedSizeBytes, FromBytes, Mode, Packet, TimestampFormat, ToBytes, Version,
};
use crate::randomize::randomize_response;
use crate::session::Session;
use crate::unix_time::Instant;

/// Per-response values surfaced to the request loop for debug logging.
#[derive(Clone, Debug)]
pub struct ResponseInfo {
    /// Version number the client sent.
    pub request_version: Version,
    /// The client's transmit timestamp, echoed as the response origin.
    pub client_transmit: TimestampFormat,
    /// The simulated instant this response was built around.
    pub simulated_now: Instant,
    /// Drift coefficient at response time, in parts per million.
    pub drift_ppm: f64,
    /// Jitter applied to this response, in milliseconds.
    pub jitter_ms: i64,
    /// This response's position in the session request counter.
    pub counter: u64,
}

/// The complete result of handling one datagram.
pub enum HandleOutcome {
    /// Send this response buffer to the client.
    Response {
        /// The serialized 48-byte response.
        buf: [u8; Packet::PACKED_SIZE_BYTES],
        /// Values for request-level debug logging.
        info: ResponseInfo,
    },
    /// Parsed but not a client-mode request; no response is sent.
    Ignored {
        /// The mode the request carried.
        mode: Mode,
    },
    /// Too short or unreadable; silently dropped.
    Dropped,
}

/// Handle a single incoming datagram (pure logic, no I/O).
///
/// Increments the session request counter and advances the simulated clock
/// and random stream only when the datagram is a well-formed client request.
pub fn handle_request(
    recv_buf: &[u8],
    recv_len: usize,
    config: &Config,
    session: &mut Session,
) -> HandleOutcome {
    if recv_len < Packet::PACKED_SIZE_BYTES {
        debug!("dropping short datagram ({recv_len} bytes)");
        return HandleOutcome::Dropped;
    }

    let request = match Packet::from_bytes(&recv_buf[..recv_len]) {
        Ok((packet, _)) => packet,
        Err(e) => {
            debug!("dropping unreadable datagram: {e}");
            return HandleOutcome::Dropped;
        }
    };

    if request.mode != Mode::Client {
        return HandleOutcome::Ignored { mode: request.mode };
    }

    let counter = session.next_request();
    let (clock, rng) = session.parts();
    let now = clock.now(rng);
    let drift_ppm = clock.current_drift();
    let randomized = randomize_response(config, &request, now, rng);

    let mut buf = [0u8; Packet::PACKED_SIZE_BYTES];
    if let Err(e) = randomized.packet.to_bytes(&mut buf) {
        debug!("failed to serialize response: {e}");
        return HandleOutcome::Dropped;
    }

    HandleOutcome::Response {
        buf,
        info: ResponseInfo {
            request_version: request.version,
            client_transmit: request.transmit_timestamp,
            simulated_now: now,
            drift_ppm,
            jitter_ms: randomized.jitter_ms,
            counter,
        },
    }
}
