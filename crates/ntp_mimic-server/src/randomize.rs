// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Per-response randomization of jitter and protocol metadata.
//!
//! All randomized choices for one response come from the single session
//! random stream in a fixed order: **jitter, precision, poll, stratum,
//! reference-identifier fallback** (the last only when the drawn stratum is
//! secondary). The order is a contract: given the same seed and the same
//! request sequence, the emitted packets are bit-for-bit identical.
//! Determinism is per-implementation — it holds for this crate's random
//! stream, not across reimplementations with a different generator.

use rand::Rng;

use crate::config::Config;
use crate::protocol::{Mode, Packet, ReferenceIdentifier, ShortFormat, Stratum};
use crate::unix_time::Instant;

// Root delay/dispersion short-format units added per hop from the reference
// clock.
const ROOT_DELAY_PER_HOP: u16 = 100;
const ROOT_DISPERSION_PER_HOP: u16 = 200;

/// A fully randomized response packet plus the values worth logging.
#[derive(Clone, Debug)]
pub struct RandomizedResponse {
    /// The wire-ready response packet.
    pub packet: Packet,
    /// The jitter applied to receive and transmit timestamps, in milliseconds.
    pub jitter_ms: i64,
}

/// Build one response for `request` around the simulated instant `now`.
pub fn randomize_response<R: Rng>(
    config: &Config,
    request: &Packet,
    now: Instant,
    rng: &mut R,
) -> RandomizedResponse {
    // Contractual draw order; see the module docs.
    let jitter_bound = config.jitter_ms as i64;
    let jitter_ms = rng.gen_range(-jitter_bound..=jitter_bound);
    let precision = rng.gen_range(config.min_precision..=config.max_precision);
    let poll = rng.gen_range(config.min_poll..=config.max_poll);
    let stratum = Stratum(rng.gen_range(config.min_stratum..=config.max_stratum));

    let reference_id = if stratum.is_secondary() {
        ReferenceIdentifier::Secondary(rng.next_u32().to_be_bytes())
    } else {
        ReferenceIdentifier::Tag(config.ref_id_bytes())
    };

    let transmit = now.offset_millis(jitter_ms);
    let receive = now.offset_millis(jitter_ms - config.processing_delay_ms as i64);
    let reference = now.offset_secs(-(config.max_ref_time_offset as i64));

    let hops = stratum.hops() as u16;
    let packet = Packet {
        leap_indicator: config.leap_indicator(),
        version: config.version(),
        mode: Mode::Server,
        stratum,
        poll,
        precision,
        root_delay: ShortFormat {
            seconds: 0,
            fraction: ROOT_DELAY_PER_HOP * hops,
        },
        root_dispersion: ShortFormat {
            seconds: 0,
            fraction: ROOT_DISPERSION_PER_HOP * hops,
        },
        reference_id,
        reference_timestamp: reference.into(),
        origin_timestamp: request.transmit_timestamp,
        receive_timestamp: receive.into(),
        transmit_timestamp: transmit.into(),
    };

    RandomizedResponse { packet, jitter_ms }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::protocol::{
        ConstPackedSizeBytes, LeapIndicator, TimestampFormat, ToBytes, Version,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn client_request() -> Packet {
        Packet {
            transmit_timestamp: TimestampFormat {
                seconds: 0xE000_0000,
                fraction: 0x1234_5678,
            },
            ..Packet::default()
        }
    }

    fn sim_now() -> Instant {
        Instant::new(1_704_067_200, 250_000_000)
    }

    #[test]
    fn origin_echoes_request_transmit() {
        let config = test_config();
        let mut rng = StdRng::seed_from_u64(1);
        let request = client_request();
        let response = randomize_response(&config, &request, sim_now(), &mut rng);
        assert_eq!(
            response.packet.origin_timestamp,
            request.transmit_timestamp
        );
    }

    #[test]
    fn response_is_server_mode_with_configured_metadata() {
        let mut config = test_config();
        config.leap_indicator = 3;
        config.version_number = 3;
        let mut rng = StdRng::seed_from_u64(1);
        let response = randomize_response(&config, &client_request(), sim_now(), &mut rng);
        assert_eq!(response.packet.mode, Mode::Server);
        assert_eq!(response.packet.leap_indicator, LeapIndicator::Unknown);
        assert_eq!(response.packet.version, Version::V3);
    }

    #[test]
    fn randomized_fields_stay_in_configured_ranges() {
        let config = test_config();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..10_000 {
            let response = randomize_response(&config, &client_request(), sim_now(), &mut rng);
            let pkt = &response.packet;
            assert!((1..=3).contains(&pkt.stratum.0), "stratum {}", pkt.stratum.0);
            assert!((4..=10).contains(&pkt.poll), "poll {}", pkt.poll);
            assert!(
                (-24..=-16).contains(&pkt.precision),
                "precision {}",
                pkt.precision
            );
            assert!(response.jitter_ms.abs() <= 5, "jitter {}", response.jitter_ms);
        }
    }

    #[test]
    fn identical_seed_produces_identical_packets() {
        let config = test_config();
        let request = client_request();
        let now = sim_now();

        let encode = |seed: u64| -> Vec<[u8; Packet::PACKED_SIZE_BYTES]> {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..32)
                .map(|_| {
                    let response = randomize_response(&config, &request, now, &mut rng);
                    let mut buf = [0u8; Packet::PACKED_SIZE_BYTES];
                    response.packet.to_bytes(&mut buf).unwrap();
                    buf
                })
                .collect()
        };

        assert_eq!(encode(42), encode(42));
        assert_ne!(encode(42), encode(43));
    }

    #[test]
    fn secondary_stratum_gets_random_reference_id() {
        let mut config = test_config();
        config.min_stratum = 2;
        config.max_stratum = 15;
        let mut rng = StdRng::seed_from_u64(7);
        let response = randomize_response(&config, &client_request(), sim_now(), &mut rng);
        assert!(matches!(
            response.packet.reference_id,
            ReferenceIdentifier::Secondary(_)
        ));
    }

    #[test]
    fn tag_stratum_gets_configured_reference_id() {
        for (min, max) in [(0u8, 0u8), (1, 1), (16, 16)] {
            let mut config = test_config();
            config.min_stratum = min;
            config.max_stratum = max;
            let mut rng = StdRng::seed_from_u64(7);
            let response = randomize_response(&config, &client_request(), sim_now(), &mut rng);
            assert_eq!(
                response.packet.reference_id,
                ReferenceIdentifier::Tag(*b"GPS\0"),
                "stratum {min}"
            );
        }
    }

    #[test]
    fn root_delay_scales_with_stratum_hops() {
        let mut config = test_config();
        config.min_stratum = 3;
        config.max_stratum = 3;
        let mut rng = StdRng::seed_from_u64(7);
        let response = randomize_response(&config, &client_request(), sim_now(), &mut rng);
        assert_eq!(response.packet.root_delay.fraction, 200);
        assert_eq!(response.packet.root_dispersion.fraction, 400);
    }

    #[test]
    fn root_delay_zero_for_stratum_zero_and_one() {
        for stratum in [0u8, 1] {
            let mut config = test_config();
            config.min_stratum = stratum;
            config.max_stratum = stratum;
            let mut rng = StdRng::seed_from_u64(7);
            let response = randomize_response(&config, &client_request(), sim_now(), &mut rng);
            assert_eq!(response.packet.root_delay.fraction, 0);
            assert_eq!(response.packet.root_dispersion.fraction, 0);
        }
    }

    #[test]
    fn processing_delay_shifts_receive_before_transmit() {
        let mut config = test_config();
        config.jitter_ms = 0;
        config.processing_delay_ms = 250;
        let mut rng = StdRng::seed_from_u64(7);
        let now = sim_now();
        let response = randomize_response(&config, &client_request(), now, &mut rng);

        let transmit: TimestampFormat = now.into();
        assert_eq!(response.packet.transmit_timestamp, transmit);

        let receive: TimestampFormat = now.offset_millis(-250).into();
        assert_eq!(response.packet.receive_timestamp, receive);
    }

    #[test]
    fn reference_timestamp_lags_by_configured_offset() {
        let mut config = test_config();
        config.max_ref_time_offset = 3600;
        let mut rng = StdRng::seed_from_u64(7);
        let now = sim_now();
        let response = randomize_response(&config, &client_request(), now, &mut rng);
        let expected: TimestampFormat = now.offset_secs(-3600).into();
        assert_eq!(response.packet.reference_timestamp, expected);
    }
}
