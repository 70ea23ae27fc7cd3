//! Sleep abstraction for pacing the write loop.
//!
//! The loop wakes once per interval; hiding the sleep behind a trait lets
//! tests run thousands of simulated cycles instantly.

use std::time::Duration;

/// Trait for sleeping between write cycles.
pub trait Sleeper: Send + Sync {
    /// Sleep for the specified number of seconds.
    fn sleep_sec(&self, seconds: u64);
}

/// Real sleeper backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl RealSleeper {
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for RealSleeper {
    fn sleep_sec(&self, seconds: u64) {
        std::thread::sleep(Duration::from_secs(seconds));
    }
}

/// Mock sleeper for testing; returns immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSleeper;

impl MockSleeper {
    pub fn new() -> Self {
        Self
    }
}

impl Sleeper for MockSleeper {
    fn sleep_sec(&self, _seconds: u64) {
        // Instant return for testing
    }
}
