// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! The long-lived simulation session.
//!
//! [`Session`] bundles the three pieces of cross-request state — the drift
//! clock, the deterministic random stream, and the request counter — behind a
//! single owner. The request loop holds the only mutable reference for the
//! process lifetime; persistence works on value snapshots.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::DriftClock;
use crate::config::Config;
use crate::state::SessionState;
use crate::unix_time::Instant;

/// The mutable cross-request state of the simulated server.
#[derive(Debug)]
pub struct Session {
    clock: DriftClock,
    rng: StdRng,
    seed: u64,
    counter: u64,
}

impl Session {
    /// Start a fresh session: new clock anchor, seed drawn from the
    /// nanosecond clock, counter at zero.
    pub fn fresh(config: &Config) -> Session {
        let now = Instant::now();
        let seed = (now.secs() as u64)
            .wrapping_mul(1_000_000_000)
            .wrapping_add(now.subsec_nanos() as u64);
        Session::with_seed(config, seed)
    }

    /// Start a fresh session with an explicit seed.
    pub fn with_seed(config: &Config, seed: u64) -> Session {
        Session {
            clock: DriftClock::new(config.drift_model(), config.drift_ppm),
            rng: StdRng::seed_from_u64(seed),
            seed,
            counter: 0,
        }
    }

    /// Resume a session from persisted state.
    ///
    /// Clock anchors, accumulated drift, seed, and counter are restored
    /// verbatim; drift model parameters come from the current configuration.
    /// The random stream replays from the saved seed, so a resumed session
    /// emits the same draw sequence the original session started with.
    pub fn resume(config: &Config, state: &SessionState) -> Session {
        Session {
            clock: DriftClock::restore(
                config.drift_model(),
                state.base_time,
                state.start_wall,
                state.last_update,
                state.current_drift,
            ),
            rng: StdRng::seed_from_u64(state.random_seed),
            seed: state.random_seed,
            counter: state.request_counter,
        }
    }

    /// A value snapshot of everything the state store persists.
    pub fn snapshot(&self) -> SessionState {
        SessionState {
            base_time: self.clock.base_time(),
            start_wall: self.clock.start_wall(),
            last_update: self.clock.last_update(),
            current_drift: self.clock.current_drift(),
            random_seed: self.seed,
            request_counter: self.counter,
        }
    }

    /// The seed of the deterministic random stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total requests answered so far.
    pub fn request_counter(&self) -> u64 {
        self.counter
    }

    /// Count one more answered request and return the new total.
    pub(crate) fn next_request(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Simultaneous mutable access to the clock and the random stream.
    pub(crate) fn parts(&mut self) -> (&mut DriftClock, &mut StdRng) {
        (&mut self.clock, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use rand::RngCore;
    use std::time::{Duration, UNIX_EPOCH};

    fn saved_state() -> SessionState {
        SessionState {
            base_time: UNIX_EPOCH + Duration::from_secs(500_000),
            start_wall: UNIX_EPOCH + Duration::from_secs(600_000),
            last_update: UNIX_EPOCH + Duration::from_secs(600_100),
            current_drift: 12.5,
            random_seed: 42,
            request_counter: 1234,
        }
    }

    #[test]
    fn fresh_session_starts_at_zero() {
        let session = Session::fresh(&test_config());
        assert_eq!(session.request_counter(), 0);
    }

    #[test]
    fn with_seed_is_deterministic() {
        let config = test_config();
        let mut a = Session::with_seed(&config, 7);
        let mut b = Session::with_seed(&config, 7);
        let (_, rng_a) = a.parts();
        let (_, rng_b) = b.parts();
        let draws_a: Vec<u32> = (0..8).map(|_| rng_a.next_u32()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| rng_b.next_u32()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn resume_restores_saved_variables_verbatim() {
        let config = test_config();
        let state = saved_state();
        let session = Session::resume(&config, &state);
        assert_eq!(session.seed(), 42);
        assert_eq!(session.request_counter(), 1234);
        assert_eq!(session.snapshot(), state);
    }

    #[test]
    fn resume_replays_the_same_random_stream() {
        let config = test_config();
        let state = saved_state();
        let mut first = Session::resume(&config, &state);
        let mut second = Session::resume(&config, &state);
        let (_, rng1) = first.parts();
        let (_, rng2) = second.parts();
        assert_eq!(rng1.next_u64(), rng2.next_u64());
    }

    #[test]
    fn counter_survives_snapshot_resume_cycle() {
        let config = test_config();
        let mut session = Session::with_seed(&config, 5);
        session.next_request();
        session.next_request();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.request_counter, 2);

        let resumed = Session::resume(&config, &snapshot);
        assert_eq!(resumed.request_counter(), 2);
        assert_eq!(resumed.seed(), 5);
    }

    #[test]
    fn snapshot_reflects_clock_anchors() {
        let config = test_config();
        let state = saved_state();
        let session = Session::resume(&config, &state);
        let snap = session.snapshot();
        assert_eq!(snap.base_time, state.base_time);
        assert_eq!(snap.start_wall, state.start_wall);
        assert_eq!(snap.last_update, state.last_update);
        assert_eq!(snap.current_drift, 12.5);
    }
}
