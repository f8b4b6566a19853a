// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Simulated clock with configurable drift models.
//!
//! [`DriftClock`] owns a time anchor (`base_time`) and the wall-clock instant
//! at which the anchor was captured (`start_wall`). Each call to
//! [`DriftClock::now`] converts real elapsed time into simulated elapsed time
//! according to the drift model. The clock is the only mutator of its drift
//! coefficient and must be driven from a single owner; the server loop
//! guarantees this by construction.

use std::time::{Duration, SystemTime};

use rand::Rng;

use crate::unix_time::Instant;

/// How the simulated clock diverges from real elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriftModel {
    /// The simulated clock advances at the true wall-clock rate.
    None,
    /// The drift coefficient takes one uniform step in `[-step_ppm, +step_ppm]`
    /// each time `update_interval` has elapsed. A step bound of zero yields a
    /// constant deterministic drift at the starting coefficient.
    RandomWalk {
        /// Bound on each drift step, in parts per million.
        step_ppm: f64,
        /// Minimum real time between drift steps.
        update_interval: Duration,
    },
}

/// The simulated clock.
#[derive(Clone, Debug)]
pub struct DriftClock {
    base_time: SystemTime,
    start_wall: SystemTime,
    model: DriftModel,
    last_update: SystemTime,
    current_drift: f64, // ppm
}

impl DriftClock {
    /// Create a clock anchored at the current real time.
    ///
    /// `initial_ppm` seeds the drift coefficient; the `None` model ignores it.
    pub fn new(model: DriftModel, initial_ppm: f64) -> DriftClock {
        let now = SystemTime::now();
        DriftClock {
            base_time: now,
            start_wall: now,
            model,
            last_update: now,
            current_drift: initial_ppm,
        }
    }

    /// Restore a clock from persisted anchors.
    ///
    /// The anchors and accumulated drift come back verbatim while the model
    /// parameters come from the current configuration, so an operator can
    /// retune the drift model without losing the accumulated coefficient.
    pub fn restore(
        model: DriftModel,
        base_time: SystemTime,
        start_wall: SystemTime,
        last_update: SystemTime,
        current_drift: f64,
    ) -> DriftClock {
        DriftClock {
            base_time,
            start_wall,
            model,
            last_update,
            current_drift,
        }
    }

    /// The simulated current time.
    ///
    /// For the `RandomWalk` model this may advance the drift coefficient by
    /// one step, drawn from `rng`; a missed interval is never back-filled
    /// with multiple steps.
    pub fn now<R: Rng>(&mut self, rng: &mut R) -> Instant {
        self.now_at(SystemTime::now(), rng)
    }

    /// [`DriftClock::now`] with an injected wall-clock reading.
    pub(crate) fn now_at<R: Rng>(&mut self, wall: SystemTime, rng: &mut R) -> Instant {
        let elapsed = wall
            .duration_since(self.start_wall)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        if let DriftModel::RandomWalk {
            step_ppm,
            update_interval,
        } = self.model
            && wall.duration_since(self.last_update).unwrap_or_default() >= update_interval
        {
            self.current_drift += rng.gen_range(-step_ppm..=step_ppm);
            self.last_update = wall;
        }

        let simulated_elapsed = match self.model {
            DriftModel::None => elapsed,
            DriftModel::RandomWalk { .. } => {
                elapsed * (1.0 + self.current_drift / 1_000_000.0)
            }
        };

        let base = Instant::from(self.base_time);
        Instant::from_nanos(base.total_nanos() + (simulated_elapsed * 1e9).round() as i128)
    }

    /// The current drift coefficient in parts per million.
    pub fn current_drift(&self) -> f64 {
        self.current_drift
    }

    /// The time anchor the simulated clock counts from.
    pub fn base_time(&self) -> SystemTime {
        self.base_time
    }

    /// The wall-clock instant at which the anchor was captured.
    pub fn start_wall(&self) -> SystemTime {
        self.start_wall
    }

    /// The wall-clock instant of the last drift-coefficient update.
    pub fn last_update(&self) -> SystemTime {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::UNIX_EPOCH;

    fn at(unix_secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(unix_secs)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn model_none_tracks_real_elapsed_exactly() {
        let base = at(1_000_000);
        let start = at(2_000_000);
        // Drift coefficient must be ignored entirely by the None model.
        let mut clock = DriftClock::restore(DriftModel::None, base, start, start, 500.0);
        let mut rng = rng();

        let t = clock.now_at(at(2_000_005), &mut rng);
        assert_eq!(t.secs(), 1_000_005);
        assert_eq!(t.subsec_nanos(), 0);

        let t2 = clock.now_at(at(2_000_010), &mut rng);
        assert_eq!(t2.secs() - t.secs(), 5);
    }

    #[test]
    fn model_none_never_mutates_drift() {
        let start = at(2_000_000);
        let mut clock = DriftClock::restore(DriftModel::None, start, start, start, 7.5);
        let mut rng = rng();
        clock.now_at(at(2_999_999), &mut rng);
        assert_eq!(clock.current_drift(), 7.5);
        assert_eq!(clock.last_update(), start);
    }

    #[test]
    fn random_walk_scales_elapsed_by_drift() {
        let base = at(1_000_000);
        let start = at(2_000_000);
        let model = DriftModel::RandomWalk {
            step_ppm: 0.0,
            update_interval: Duration::from_secs(3600),
        };
        // 1000 ppm over 1000 s elapsed = 1 extra simulated second.
        let mut clock = DriftClock::restore(model, base, start, start, 1000.0);
        let mut rng = rng();

        let t = clock.now_at(at(2_001_000), &mut rng);
        assert_eq!(t.secs(), 1_001_001);
        assert_eq!(t.subsec_nanos(), 0);
    }

    #[test]
    fn random_walk_step_bounded_and_interval_gated() {
        let start = at(2_000_000);
        let step_ppm = 0.5;
        let model = DriftModel::RandomWalk {
            step_ppm,
            update_interval: Duration::from_secs(60),
        };
        let mut clock = DriftClock::restore(model, start, start, start, 10.0);
        let mut rng = rng();

        // Within the interval: no step.
        clock.now_at(at(2_000_030), &mut rng);
        assert_eq!(clock.current_drift(), 10.0);
        assert_eq!(clock.last_update(), start);

        // Interval elapsed: exactly one bounded step.
        clock.now_at(at(2_000_060), &mut rng);
        let after_one = clock.current_drift();
        assert!((after_one - 10.0).abs() <= step_ppm);
        assert_eq!(clock.last_update(), at(2_000_060));

        // A long gap is still a single step, not a back-fill.
        clock.now_at(at(2_010_000), &mut rng);
        let after_gap = clock.current_drift();
        assert!((after_gap - after_one).abs() <= step_ppm);
    }

    #[test]
    fn random_walk_many_steps_stay_bounded() {
        let start = at(2_000_000);
        let step_ppm = 0.25;
        let model = DriftModel::RandomWalk {
            step_ppm,
            update_interval: Duration::from_secs(1),
        };
        let mut clock = DriftClock::restore(model, start, start, start, 0.0);
        let mut rng = rng();

        let mut prev = clock.current_drift();
        for i in 1..=1000u64 {
            clock.now_at(at(2_000_000 + i), &mut rng);
            let cur = clock.current_drift();
            assert!((cur - prev).abs() <= step_ppm, "step {i} exceeded bound");
            prev = cur;
        }
    }

    #[test]
    fn restore_continues_from_saved_anchor() {
        // A clock restored from persisted anchors must continue from
        // base_time/start_wall, not reset to the current real time.
        let base = at(500_000);
        let start = at(600_000);
        let last_update = at(600_100);
        let model = DriftModel::RandomWalk {
            step_ppm: 0.0,
            update_interval: Duration::from_secs(3600),
        };
        let mut clock = DriftClock::restore(model, base, start, last_update, 12.5);
        let mut rng = rng();

        // 200 s after start_wall: simulated = base + 200 * (1 + 12.5e-6).
        let t = clock.now_at(at(600_200), &mut rng);
        assert_eq!(t.secs(), 500_200);
        assert_eq!(t.subsec_nanos(), 2_500_000);
        assert_eq!(clock.current_drift(), 12.5);
    }

    #[test]
    fn wall_clock_before_start_counts_as_zero_elapsed() {
        let start = at(2_000_000);
        let mut clock = DriftClock::restore(DriftModel::None, at(1_000_000), start, start, 0.0);
        let mut rng = rng();
        let t = clock.now_at(at(1_999_000), &mut rng);
        assert_eq!(t.secs(), 1_000_000);
    }
}
