//! Time source abstraction for deterministic token tests.
//!
//! Token issuance stamps `iat`/`nbf`/`exp` and validation compares them to
//! the current time. Both go through a `TimeSource` so tests can pin the clock.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over the wall clock.
pub trait TimeSource: Send + Sync {
    /// Get the current time in seconds since Unix epoch.
    fn now_secs(&self) -> i64;
}

/// Real time source using the system clock.
///
/// This is the default implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[allow(clippy::cast_possible_wrap)] // Seconds won't overflow i64 for billions of years
    fn now_secs(&self) -> i64 {
        // duration_since(UNIX_EPOCH) only fails if system time is before 1970.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_secs() as i64)
    }
}

/// A manually driven clock.
///
/// Starts at a fixed instant and only moves when `advance` or `set` is called.
#[derive(Debug, Default)]
pub struct FixedTimeSource {
    now: AtomicI64,
}

impl FixedTimeSource {
    #[must_use]
    pub const fn new(now_secs: i64) -> Self {
        Self {
            now: AtomicI64::new(now_secs),
        }
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, now_secs: i64) {
        self.now.store(now_secs, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
