//! # StdClock
//!
//! Monotonic nanosecond clock over [`std::time::Instant`].

use std::time::Instant;

use cadence_core::{Clock, TimeSpan};

/// Monotonic clock measuring from its own creation instant.
///
/// `Instant` is monotonic on every supported platform, which is the whole
/// contract. Readings are relative to the clock's origin, not wall time.
#[derive(Clone, Debug)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    /// Creates a clock with its origin at "now".
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_ns(&self) -> TimeSpan {
        // saturate rather than fail: this primitive has no error channel,
        // and i64 nanoseconds covers ~292 years of uptime
        let ns = i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX);
        TimeSpan::nanos(ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = StdClock::new();
        let mut previous = clock.now_ns();
        for _ in 0..1_000 {
            let now = clock.now_ns();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn test_clock_advances_with_real_time() {
        let clock = StdClock::new();
        let before = clock.now_ns();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let after = clock.now_ns();
        assert!(after - before >= TimeSpan::millis(2));
    }
}
