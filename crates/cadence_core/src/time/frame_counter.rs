//! # FrameCounter - The FPS Governor
//!
//! Per-tick delta-time and FPS measurement plus an optional phase-locked
//! frame-rate cap.
//!
//! ## Phase-locked capping
//!
//! ```text
//! anchor                anchor+T              anchor+2T             anchor+3T
//!   │types work│ sleep │spin│ work │  sleep  │spin│   work (late!)   │ re-anchor
//!   ├──────────┴───────┴────┼──────┴─────────┴────┼──────────────────┼─────────►
//!   tick 1                  tick 2                tick 3             tick 4
//! ```
//!
//! The schedule anchor advances by exact multiples of the target period, so
//! per-frame overshoot never accumulates into drift. A frame that misses its
//! slot entirely is *not* compensated: the anchor is rebuilt from "now" and
//! the lost time stays lost, preventing frame-time oscillation.

use super::{Clock, TimeSpan, Timer, Waiter};

/// Pre-wake spin window reserved ahead of the target tick, so OS wake
/// latency cannot push the wake past the target. PC-class reference value.
const SPIN_WINDOW: TimeSpan = TimeSpan::micros(200);

/// Delta-time, FPS measurement, and the optional FPS cap.
///
/// Two phases: **uninitialized** (before the first [`Self::tick`]) and
/// **steady-state**. The first tick only establishes a baseline and performs
/// no measurement - that is a documented edge case, not a bug.
///
/// Borrows one clock and one waiter; both must outlive the counter.
/// `tick()` is called exactly once per produced frame, on the pacing thread.
pub struct FrameCounter<'c> {
    clock: &'c dyn Clock,
    waiter: &'c dyn Waiter,
    timer: Timer<'c>,

    initialized: bool,

    // clock reading taken at the end of the most recent tick
    cap_base_tick: TimeSpan,
    // phase-locked schedule anchor; None until the first capped tick
    next_tick: Option<TimeSpan>,

    delta_time: f64,
    fps: f64,

    max_fps: u32,
    max_lead: u32,

    total_frames: u64,
    produce_frame: u64,
}

impl<'c> FrameCounter<'c> {
    /// Creates a counter in the uninitialized phase with a 60 FPS cap.
    #[must_use]
    pub fn new(clock: &'c dyn Clock, waiter: &'c dyn Waiter) -> Self {
        Self {
            clock,
            waiter,
            timer: Timer::new(clock),
            initialized: false,
            cap_base_tick: TimeSpan::zero(),
            next_tick: None,
            delta_time: 0.0,
            fps: 0.0,
            max_fps: 60,
            max_lead: 0,
            total_frames: 0,
            produce_frame: 0,
        }
    }

    /// Advances the counter by one produced frame.
    ///
    /// First call: baseline only. Steady state: applies the FPS cap (which
    /// may block this thread), then measures `delta_time` via the lap timer.
    /// The lap includes the blocking time, so the measured delta reflects
    /// the true frame period.
    pub fn tick(&mut self) {
        if !self.initialized {
            self.timer.reset();
            self.cap_base_tick = self.clock.now_ns();
            self.initialized = true;
            return;
        }

        if self.max_fps > 0 {
            self.cap_fps();
        }

        self.delta_time = self.timer.lap_seconds();
        self.fps = if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        };

        self.total_frames += 1;
        self.produce_frame += 1;

        self.cap_base_tick = self.clock.now_ns();
    }

    /// Seconds between the two most recent ticks (blocking time included).
    #[must_use]
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Instantaneous frames per second (`1 / delta_time`, 0 when unknown).
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Sets the FPS cap. 0 disables capping.
    pub fn set_max_fps(&mut self, max_fps: u32) {
        self.max_fps = max_fps;
    }

    /// Current FPS cap (0 = uncapped).
    #[must_use]
    pub fn max_fps(&self) -> u32 {
        self.max_fps
    }

    /// Sets the pipelining lead: frames a producer may run ahead of the
    /// slowest consumer (2 buffers -> 1, 3 buffers -> 2).
    pub fn set_max_lead(&mut self, max_lead: u32) {
        self.max_lead = max_lead;
    }

    /// Permitted producer lead in frames.
    #[must_use]
    pub fn max_lead(&self) -> u32 {
        self.max_lead
    }

    /// Total measured ticks since construction.
    #[must_use]
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Cumulative produced-frame counter.
    #[must_use]
    pub fn produce_frame(&self) -> u64 {
        self.produce_frame
    }

    /// Clock reading taken at the end of the most recent tick.
    #[must_use]
    pub fn last_tick_time(&self) -> TimeSpan {
        self.cap_base_tick
    }

    /// The phase-locked schedule anchor, exposed for instrumentation.
    /// `None` until the first capped tick.
    #[must_use]
    pub fn next_tick(&self) -> Option<TimeSpan> {
        self.next_tick
    }

    /// Blocks until the phase-locked schedule permits the next frame.
    fn cap_fps(&mut self) {
        // target frame period, rounded to the nearest nanosecond
        #[allow(clippy::cast_possible_truncation)]
        let frame_ns =
            TimeSpan::nanos((1_000_000_000.0 / f64::from(self.max_fps) + 0.5) as i64);

        let now = self.clock.now_ns();

        // first capped tick: establish the phase
        let Some(next_tick) = self.next_tick else {
            self.next_tick = Some(now + frame_ns);
            return;
        };

        // already late: rebuild the anchor from now, never try to catch up.
        // A shortened next frame would oscillate; the lost time stays lost.
        if now >= next_tick {
            self.next_tick = Some(now + frame_ns);
            return;
        }

        // sleep through most of the slack, leaving the spin window
        let sleep_target = next_tick - SPIN_WINDOW;
        if sleep_target > now {
            self.waiter.sleep_until(sleep_target);
        }

        // close in on the target; yielding here would cost precision
        while self.clock.now_ns() < next_tick {
            self.waiter.relax();
        }

        // advance phase-locked: exact multiples of the period, not now+period
        self.next_tick = Some(next_tick + frame_ns);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::time::{ManualClock, VirtualWaiter};

    const FRAME: TimeSpan = TimeSpan::millis(10); // 100 FPS

    fn governor<'a>(clock: &'a ManualClock, waiter: &'a VirtualWaiter) -> FrameCounter<'a> {
        let mut counter = FrameCounter::new(clock, waiter);
        counter.set_max_fps(100);
        counter
    }

    #[test]
    fn test_first_tick_is_baseline_only() {
        let clock = Arc::new(ManualClock::new());
        let waiter = VirtualWaiter::new(Arc::clone(&clock));
        let mut counter = governor(&clock, &waiter);

        counter.tick();
        assert_eq!(counter.total_frames(), 0);
        assert_eq!(counter.produce_frame(), 0);
        assert!((counter.delta_time() - 0.0).abs() < f64::EPSILON);
        assert!(counter.next_tick().is_none());
    }

    #[test]
    fn test_capped_period_converges_without_drift() {
        let clock = Arc::new(ManualClock::new());
        let waiter = VirtualWaiter::new(Arc::clone(&clock));
        let mut counter = governor(&clock, &waiter);

        counter.tick(); // baseline

        // first capped tick anchors the schedule
        counter.tick();
        let anchor = counter.next_tick().expect("anchor after first capped tick");

        const N: i64 = 200;
        let start = clock.now_ns();
        for _ in 0..N {
            // 3ms of simulated work, well under the 10ms budget
            clock.advance(TimeSpan::millis(3));
            counter.tick();
        }

        // phase lock: the anchor advanced by exactly N periods
        assert_eq!(
            counter.next_tick().expect("anchor"),
            anchor + FRAME * N,
            "anchor must advance by exact multiples of the period"
        );

        // and wall time matches: no cumulative drift over 200 frames
        let elapsed = clock.now_ns() - start;
        assert_eq!(elapsed, FRAME * N);

        assert_eq!(counter.total_frames(), u64::try_from(N).unwrap() + 1);
        assert!((counter.fps() - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_late_frame_reanchors_without_compression() {
        let clock = Arc::new(ManualClock::new());
        let waiter = VirtualWaiter::new(Arc::clone(&clock));
        let mut counter = governor(&clock, &waiter);

        counter.tick(); // baseline
        counter.tick(); // anchor

        // miss the slot by four full frames
        clock.advance(FRAME * 5);
        counter.tick();
        let reanchored = counter.next_tick().expect("anchor");
        assert_eq!(reanchored, clock.now_ns() + FRAME, "late tick re-anchors from now");

        // the following frame gets its full period, not a compressed one
        let before = clock.now_ns();
        counter.tick();
        assert_eq!(clock.now_ns() - before, FRAME);
        assert!((counter.delta_time() - 0.010).abs() < 1e-6);
    }

    #[test]
    fn test_uncapped_ticks_never_sleep() {
        let clock = Arc::new(ManualClock::new());
        let waiter = VirtualWaiter::new(Arc::clone(&clock));
        let mut counter = FrameCounter::new(&*clock, &waiter);
        counter.set_max_fps(0);

        counter.tick();
        for _ in 0..50 {
            clock.advance(TimeSpan::millis(1));
            counter.tick();
        }

        assert_eq!(waiter.blocking_sleeps(), 0);
        assert_eq!(counter.total_frames(), 50);
        assert!((counter.fps() - 1_000.0).abs() < 1.0);
    }

    #[test]
    fn test_zero_delta_reports_zero_fps() {
        let clock = Arc::new(ManualClock::new());
        let waiter = VirtualWaiter::new(Arc::clone(&clock));
        let mut counter = FrameCounter::new(&*clock, &waiter);
        counter.set_max_fps(0);

        counter.tick();
        counter.tick(); // no simulated work: delta is exactly zero
        assert!((counter.fps() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_lead_roundtrip() {
        let clock = Arc::new(ManualClock::new());
        let waiter = VirtualWaiter::new(Arc::clone(&clock));
        let mut counter = FrameCounter::new(&*clock, &waiter);

        counter.set_max_lead(2);
        assert_eq!(counter.max_lead(), 2);
    }
}
