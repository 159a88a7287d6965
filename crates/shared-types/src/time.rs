//! # Time Source
//!
//! Windowed statistics are computed relative to "now". Components take a
//! `TimeSource` so tests can pin the clock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::entities::Timestamp;

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: AtomicU64,
}

impl ManualTimeSource {
    /// Create a clock reading `now`.
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Exclusive lower bound of a trailing window ending at `now`.
///
/// A block belongs to the window when `timestamp > window_start(now, secs)`.
pub fn window_start(now: Timestamp, window_secs: u64) -> Timestamp {
    now.saturating_sub(window_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualTimeSource::new(100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_window_start_saturates() {
        assert_eq!(window_start(100, 40), 60);
        assert_eq!(window_start(10, 86_400), 0);
    }

    #[test]
    fn test_system_clock_is_past_2020() {
        assert!(SystemTimeSource.now() > 1_577_836_800);
    }
}
