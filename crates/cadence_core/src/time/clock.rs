//! # Clock Capability
//!
//! The one time source everything in the pacing core reads from. Platform
//! implementations live in `cadence_platform`; this crate only ships the
//! contract plus a deterministic clock for tests and simulation.

use std::sync::atomic::{AtomicI64, Ordering};

use super::TimeSpan;

/// Monotonic nanosecond time source.
///
/// ## Contract
///
/// - `now_ns` never decreases between calls on the same instance
/// - Not necessarily wall-clock; only deltas are meaningful
/// - Never fails: a platform query failure degrades to a zero timestamp,
///   because this is a hot-path primitive with no recovery option
pub trait Clock {
    /// Returns the current time as a nanosecond-denominated [`TimeSpan`].
    fn now_ns(&self) -> TimeSpan;
}

/// Deterministic clock that only moves when told to.
///
/// Shared by the pacing tests and the simulation harness: a
/// [`VirtualWaiter`](super::VirtualWaiter) advances it instead of blocking,
/// so a hundred simulated frames run in microseconds of real time.
///
/// Atomic so one instance can back several timing utilities at once.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ns: AtomicI64,
}

impl ManualClock {
    /// Creates a clock starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at `start`.
    #[must_use]
    pub fn starting_at(start: TimeSpan) -> Self {
        Self {
            now_ns: AtomicI64::new(start.as_nanos()),
        }
    }

    /// Moves the clock forward by `delta`. Negative deltas are ignored;
    /// the clock is monotonic like the real one.
    pub fn advance(&self, delta: TimeSpan) {
        let ns = delta.as_nanos();
        if ns > 0 {
            self.now_ns.fetch_add(ns, Ordering::AcqRel);
        }
    }

    /// Jumps the clock to `target` if it is ahead of the current time.
    pub fn advance_to(&self, target: TimeSpan) {
        let target_ns = target.as_nanos();
        self.now_ns.fetch_max(target_ns, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> TimeSpan {
        TimeSpan::nanos(self.now_ns.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ns(), TimeSpan::zero());

        clock.advance(TimeSpan::millis(5));
        assert_eq!(clock.now_ns(), TimeSpan::nanos(5_000_000));
    }

    #[test]
    fn test_manual_clock_is_monotonic() {
        let clock = ManualClock::starting_at(TimeSpan::secs(1));
        clock.advance(TimeSpan::nanos(-10));
        assert_eq!(clock.now_ns(), TimeSpan::secs(1));

        clock.advance_to(TimeSpan::millis(500));
        assert_eq!(clock.now_ns(), TimeSpan::secs(1));

        clock.advance_to(TimeSpan::secs(2));
        assert_eq!(clock.now_ns(), TimeSpan::secs(2));
    }
}
