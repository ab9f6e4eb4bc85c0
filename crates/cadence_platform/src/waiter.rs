//! # StdWaiter
//!
//! High-resolution blocking sleep over the OS primitive, with a
//! millisecond-ceiling coarse fallback for durations outside the
//! fine-grained range. The fallback rounds **up**: waking early would defeat
//! the governor's phase lock, waking late is absorbed by its re-anchor path.

use std::time::Duration;

use cadence_core::{Clock, TimeSpan, Waiter};

/// Rounds nanoseconds up to whole milliseconds for the coarse path.
fn ns_to_ms_ceil(ns: i64) -> u64 {
    if ns <= 0 {
        return 0;
    }
    ns.unsigned_abs().div_ceil(1_000_000)
}

/// Blocking waiter for the std platform.
///
/// Borrows the clock it measures `sleep_until` against; the clock must
/// outlive the waiter and be the same instance the governor reads.
pub struct StdWaiter<'c> {
    clock: &'c dyn Clock,
}

impl<'c> StdWaiter<'c> {
    /// Nanosecond requests above this take the coarse millisecond path;
    /// the OS timer wheel is no more precise than that at such lengths.
    const COARSE_THRESHOLD: TimeSpan = TimeSpan::secs(1);

    /// Creates a waiter measuring against `clock`.
    #[must_use]
    pub fn new(clock: &'c dyn Clock) -> Self {
        Self { clock }
    }
}

impl Waiter for StdWaiter<'_> {
    fn sleep_for(&self, duration: TimeSpan) {
        let ns = duration.as_nanos();
        if ns <= 0 {
            return;
        }

        if duration < Self::COARSE_THRESHOLD {
            // high-resolution path: the OS sleep takes the request at
            // nanosecond granularity and never wakes early
            std::thread::sleep(Duration::from_nanos(ns.unsigned_abs()));
            return;
        }

        // coarse path: whole milliseconds, rounded up so we never undershoot
        std::thread::sleep(Duration::from_millis(ns_to_ms_ceil(ns)));
    }

    fn sleep_until(&self, target_tick: TimeSpan) {
        let now = self.clock.now_ns();
        if target_tick <= now {
            return;
        }

        // one call to the underlying primitive, no retry loop: residual
        // jitter is the caller's spin window to absorb
        self.sleep_for(target_tick - now);
    }

    fn relax(&self) {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StdClock;

    #[test]
    fn test_ms_ceil_rounds_up() {
        assert_eq!(ns_to_ms_ceil(0), 0);
        assert_eq!(ns_to_ms_ceil(-5), 0);
        assert_eq!(ns_to_ms_ceil(1), 1);
        assert_eq!(ns_to_ms_ceil(1_000_000), 1);
        assert_eq!(ns_to_ms_ceil(1_000_001), 2);
    }

    #[test]
    fn test_sleep_for_blocks_at_least_the_duration() {
        let clock = StdClock::new();
        let waiter = StdWaiter::new(&clock);

        let before = clock.now_ns();
        waiter.sleep_for(TimeSpan::millis(3));
        let slept = clock.now_ns() - before;
        assert!(slept >= TimeSpan::millis(3), "woke early after {slept}");
    }

    #[test]
    fn test_sleep_until_past_target_is_immediate() {
        let clock = StdClock::new();
        let waiter = StdWaiter::new(&clock);

        let before = clock.now_ns();
        waiter.sleep_until(TimeSpan::zero());
        let spent = clock.now_ns() - before;
        assert!(spent < TimeSpan::millis(1));
    }

    #[test]
    fn test_sleep_until_reaches_target() {
        let clock = StdClock::new();
        let waiter = StdWaiter::new(&clock);

        let target = clock.now_ns() + TimeSpan::millis(5);
        waiter.sleep_until(target);
        assert!(clock.now_ns() >= target);
    }
}
