//! Clock abstraction for chime.
//!
//! Provides a trait for sampling the current time, with real and mock
//! implementations to enable deterministic testing. A sample carries both
//! the truncated NTP-era stamp the rotation engine works in and the Unix
//! pivot that disambiguates which era the stamp belongs to; keeping the two
//! in one value means they can never drift apart between reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chime_calendar::fold_unix;

/// One coherent reading of the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    /// Seconds since 1900-01-01 00:00 UTC, truncated to 32 bits.
    pub ntp_sec: u32,
    /// Unix seconds used as the era pivot for `ntp_sec`.
    pub pivot: i64,
}

impl WallTime {
    /// Build a sample from a Unix instant, using the instant as its own pivot.
    pub fn from_unix(unix: i64) -> Self {
        Self {
            ntp_sec: fold_unix(unix),
            pivot: unix,
        }
    }
}

/// Trait for sampling the current time.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock sample.
    fn now(&self) -> WallTime;
}

/// Real system clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallTime {
        let unix = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        };
        WallTime::from_unix(unix)
    }
}

/// Mock clock for testing with a fixed sample.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    sample: WallTime,
}

impl MockClock {
    /// Create a mock clock with an explicit stamp and pivot.
    pub fn new(ntp_sec: u32, pivot: i64) -> Self {
        Self {
            sample: WallTime { ntp_sec, pivot },
        }
    }

    /// Create a mock clock pinned to a Unix instant.
    pub fn at_unix(unix: i64) -> Self {
        Self {
            sample: WallTime::from_unix(unix),
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> WallTime {
        self.sample
    }
}

/// Mock clock that auto-advances time on each call.
///
/// Useful for testing time-sensitive loops where the clock needs to progress,
/// including across rotation boundaries.
#[derive(Debug)]
pub struct AdvancingClock {
    start_unix: i64,
    increment: u64,
    calls: AtomicU64,
}

impl AdvancingClock {
    /// Create an advancing clock starting at `start_unix` Unix seconds and
    /// advancing by `increment` seconds on each call.
    pub fn new(start_unix: i64, increment: u64) -> Self {
        Self {
            start_unix,
            increment,
            calls: AtomicU64::new(0),
        }
    }
}

impl Clock for AdvancingClock {
    fn now(&self) -> WallTime {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        WallTime::from_unix(self.start_unix + (n * self.increment) as i64)
    }
}
