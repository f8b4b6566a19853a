use crate::protocol;
use std::time;

/// The number of seconds from 1st January 1900 UTC to the start of the Unix epoch.
pub const EPOCH_DELTA: i64 = 2_208_988_800;

/// The number of nanoseconds in one second.
const NANOS_PER_SEC: i128 = 1_000_000_000;

// The NTP fractional scale (2^32).
const NTP_SCALE: f64 = 4_294_967_296.0;

/// Describes an instant relative to the `UNIX_EPOCH` - 00:00:00 Coordinated
/// Universal Time (UTC), Thursday, 1 January 1970 in seconds with the
/// fractional part in nanoseconds.
///
/// If the **Instant** describes some moment prior to `UNIX_EPOCH`, both the
/// `secs` and `subsec_nanos` components will be negative.
///
/// Conversions to and from [`protocol::TimestampFormat`] use exact rounding of
/// the 32-bit binary fraction: `fraction = round(nanos / 1e9 * 2^32)` and its
/// inverse, so a round trip is faithful to sub-microsecond precision.
///
/// Timestamp seconds are interpreted in NTP era 0 (1900-2036), which covers
/// every instant the simulated clock can produce; era disambiguation is
/// deliberately not modeled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Instant {
    secs: i64,
    subsec_nanos: i32,
}

impl Instant {
    /// Create a new **Instant** given its `secs` and `subsec_nanos` components.
    ///
    /// To indicate a time following `UNIX_EPOCH`, both `secs` and `subsec_nanos`
    /// must be positive. To indicate a time prior to `UNIX_EPOCH`, both must be
    /// negative. Violating these invariants will result in a **panic!**.
    pub fn new(secs: i64, subsec_nanos: i32) -> Instant {
        if secs > 0 && subsec_nanos < 0 {
            panic!("invalid instant: secs was positive but subsec_nanos was negative");
        }
        if secs < 0 && subsec_nanos > 0 {
            panic!("invalid instant: secs was negative but subsec_nanos was positive");
        }
        Instant { secs, subsec_nanos }
    }

    /// Uses `std::time::SystemTime::now` and `std::time::UNIX_EPOCH` to
    /// determine the current **Instant**.
    pub fn now() -> Self {
        time::SystemTime::now().into()
    }

    /// The "seconds" component of the **Instant**.
    pub fn secs(&self) -> i64 {
        self.secs
    }

    /// The fractional component of the **Instant** in nanoseconds.
    pub fn subsec_nanos(&self) -> i32 {
        self.subsec_nanos
    }

    /// The total number of nanoseconds since `UNIX_EPOCH` (negative for
    /// instants before it).
    pub fn total_nanos(&self) -> i128 {
        self.secs as i128 * NANOS_PER_SEC + self.subsec_nanos as i128
    }

    /// Reconstruct an **Instant** from a total nanosecond count relative to
    /// `UNIX_EPOCH`.
    pub fn from_nanos(total: i128) -> Instant {
        // Truncating division keeps secs and subsec_nanos sign-consistent.
        let secs = (total / NANOS_PER_SEC) as i64;
        let subsec_nanos = (total % NANOS_PER_SEC) as i32;
        Instant { secs, subsec_nanos }
    }

    /// Return this instant shifted by a signed number of milliseconds.
    pub fn offset_millis(self, millis: i64) -> Instant {
        Instant::from_nanos(self.total_nanos() + millis as i128 * 1_000_000)
    }

    /// Return this instant shifted by a signed number of whole seconds.
    pub fn offset_secs(self, secs: i64) -> Instant {
        Instant::from_nanos(self.total_nanos() + secs as i128 * NANOS_PER_SEC)
    }
}

impl From<time::SystemTime> for Instant {
    fn from(t: time::SystemTime) -> Self {
        match t.duration_since(time::UNIX_EPOCH) {
            Ok(duration) => {
                let secs = duration.as_secs() as i64;
                let subsec_nanos = duration.subsec_nanos() as i32;
                Instant::new(secs, subsec_nanos)
            }
            Err(sys_time_err) => {
                let duration_pre_unix_epoch = sys_time_err.duration();
                let secs = -(duration_pre_unix_epoch.as_secs() as i64);
                let subsec_nanos = -(duration_pre_unix_epoch.subsec_nanos() as i32);
                Instant::new(secs, subsec_nanos)
            }
        }
    }
}

impl From<protocol::TimestampFormat> for Instant {
    /// Converts a 32-bit NTP timestamp to a Unix [`Instant`], interpreting the
    /// seconds field in NTP era 0.
    fn from(t: protocol::TimestampFormat) -> Self {
        let secs = t.seconds as i64 - EPOCH_DELTA;
        // Exact inverse of the encode rounding; may round up to a full
        // second, which from_nanos folds into the seconds component.
        let nanos = (t.fraction as f64 / NTP_SCALE * 1e9).round() as i128;
        Instant::from_nanos(secs as i128 * NANOS_PER_SEC + nanos)
    }
}

impl From<Instant> for protocol::TimestampFormat {
    /// Converts a Unix [`Instant`] to a 32-bit NTP timestamp.
    ///
    /// The seconds component truncates to 32 bits (era 0 wrap-around); the
    /// fraction is `round(nanos / 1e9 * 2^32)` exactly.
    fn from(t: Instant) -> Self {
        let sec = t.secs() + EPOCH_DELTA;
        let frac = (t.subsec_nanos().unsigned_abs() as f64 / 1e9 * NTP_SCALE).round();
        protocol::TimestampFormat {
            seconds: sec as u32,
            fraction: frac as u32,
        }
    }
}
