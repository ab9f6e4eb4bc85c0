//! # Timer
//!
//! Stopwatch and lap utility over a borrowed [`Clock`].
//!
//! Lap measurement is deliberately decoupled from start/stop: the frame
//! counter uses `lap_ticks` for delta-time whether or not the stopwatch is
//! running.

use super::{Clock, TimeSpan};

/// Stopwatch with an independent lap baseline.
///
/// Borrows its clock (the clock must outlive the timer). Single-thread use;
/// no concurrent-access guarantee.
pub struct Timer<'c> {
    clock: &'c dyn Clock,
    running: bool,
    start: TimeSpan,
    elapsed: TimeSpan,
    // lap baseline, independent of the running flag
    last: TimeSpan,
}

impl<'c> Timer<'c> {
    /// Creates a stopped timer reading from `clock`.
    #[must_use]
    pub fn new(clock: &'c dyn Clock) -> Self {
        let mut timer = Self {
            clock,
            running: false,
            start: TimeSpan::zero(),
            elapsed: TimeSpan::zero(),
            last: TimeSpan::zero(),
        };
        timer.reset();
        timer
    }

    /// Zeroes accumulated time and takes a fresh lap baseline.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed = TimeSpan::zero();
        self.start = TimeSpan::zero();
        self.last = self.clock.now_ns();
    }

    /// Starts accumulating. No-op when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.start = self.clock.now_ns();
        self.running = true;
    }

    /// Stops accumulating, folding the live delta into the total. No-op when
    /// already stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        let now = self.clock.now_ns();
        self.elapsed += now - self.start;
        self.running = false;
    }

    /// True while the stopwatch is accumulating.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Accumulated time, plus the live delta since `start` when running.
    #[must_use]
    pub fn elapsed_ticks(&self) -> TimeSpan {
        let mut total = self.elapsed;
        if self.running {
            total += self.clock.now_ns() - self.start;
        }
        total
    }

    /// [`Self::elapsed_ticks`] as floating-point seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_ticks().as_secs_f64()
    }

    /// Delta since the previous lap call (or reset), and resets the lap
    /// baseline. Measures regardless of the running flag.
    pub fn lap_ticks(&mut self) -> TimeSpan {
        let now = self.clock.now_ns();
        let delta = now - self.last;
        self.last = now;
        delta
    }

    /// [`Self::lap_ticks`] as floating-point seconds.
    pub fn lap_seconds(&mut self) -> f64 {
        self.lap_ticks().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;

    #[test]
    fn test_start_stop_accumulates() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(&clock);

        timer.start();
        clock.advance(TimeSpan::millis(10));
        timer.stop();

        clock.advance(TimeSpan::millis(50)); // not accumulated while stopped

        timer.start();
        clock.advance(TimeSpan::millis(5));
        timer.stop();

        assert_eq!(timer.elapsed_ticks(), TimeSpan::millis(15));
    }

    #[test]
    fn test_elapsed_includes_live_delta_while_running() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(&clock);

        timer.start();
        clock.advance(TimeSpan::micros(250));
        assert_eq!(timer.elapsed_ticks(), TimeSpan::micros(250));
        assert!(timer.is_running());
    }

    #[test]
    fn test_double_start_is_noop() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(&clock);

        timer.start();
        clock.advance(TimeSpan::millis(3));
        timer.start(); // must not re-baseline
        clock.advance(TimeSpan::millis(3));
        timer.stop();

        assert_eq!(timer.elapsed_ticks(), TimeSpan::millis(6));
    }

    #[test]
    fn test_lap_is_independent_of_running_flag() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(&clock);

        clock.advance(TimeSpan::millis(16));
        assert_eq!(timer.lap_ticks(), TimeSpan::millis(16));

        // lap baseline was consumed; next lap starts from here
        clock.advance(TimeSpan::millis(4));
        assert_eq!(timer.lap_ticks(), TimeSpan::millis(4));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_reset_takes_new_lap_baseline() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(&clock);

        clock.advance(TimeSpan::secs(1));
        timer.reset();
        clock.advance(TimeSpan::millis(2));

        assert_eq!(timer.lap_ticks(), TimeSpan::millis(2));
        assert_eq!(timer.elapsed_ticks(), TimeSpan::zero());
    }
}
