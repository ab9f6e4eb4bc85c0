//! # Waiter Capability
//!
//! Blocking sleep with sub-millisecond accuracy plus a busy-wait hint.
//! The FPS governor sleeps through most of a frame's slack via a waiter and
//! spins through the last couple hundred microseconds with [`Waiter::relax`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use super::{Clock, ManualClock, TimeSpan};

/// Blocking sleep primitive bound to a platform wait object.
///
/// ## Contract
///
/// - `sleep_for`: blocks for *at least* `duration`; durations `<= 0` are
///   no-ops. Implementations prefer a high-resolution blocking primitive;
///   a coarse fallback must round **up**, never down, so the caller never
///   wakes early
/// - `sleep_until`: blocks until clock time reaches `target_tick`; returns
///   immediately when already past. Computes the remaining duration and
///   delegates to `sleep_for` exactly once - no retry loop. Jitter
///   correction belongs to the caller (the governor's spin window)
/// - `relax`: CPU pause/yield hint for tight spin loops; must never block
pub trait Waiter {
    /// Blocks the calling thread for at least `duration`.
    fn sleep_for(&self, duration: TimeSpan);

    /// Blocks until the clock reads `target_tick` or later.
    fn sleep_until(&self, target_tick: TimeSpan);

    /// Non-blocking spin-loop hint.
    fn relax(&self);
}

/// Waiter that advances a [`ManualClock`] instead of blocking.
///
/// Drives the deterministic pacing tests: `sleep_*` jumps simulated time
/// forward, and `relax` ticks it by a small quantum so governor spin loops
/// terminate. Nothing here ever puts a thread to sleep.
pub struct VirtualWaiter {
    clock: Arc<ManualClock>,
    relax_quantum_ns: i64,
    sleeps: AtomicI64,
}

impl VirtualWaiter {
    /// Simulated time consumed by one `relax` call (1us).
    const DEFAULT_RELAX_QUANTUM_NS: i64 = 1_000;

    /// Creates a virtual waiter driving `clock`.
    #[must_use]
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            relax_quantum_ns: Self::DEFAULT_RELAX_QUANTUM_NS,
            sleeps: AtomicI64::new(0),
        }
    }

    /// Overrides the simulated cost of one `relax` call.
    #[must_use]
    pub fn with_relax_quantum(mut self, quantum: TimeSpan) -> Self {
        self.relax_quantum_ns = quantum.as_nanos().max(1);
        self
    }

    /// Number of `sleep_for`/`sleep_until` calls that actually advanced time.
    #[must_use]
    pub fn blocking_sleeps(&self) -> u64 {
        self.sleeps.load(Ordering::Acquire).unsigned_abs()
    }
}

impl Waiter for VirtualWaiter {
    fn sleep_for(&self, duration: TimeSpan) {
        if duration <= TimeSpan::zero() {
            return;
        }
        self.clock.advance(duration);
        self.sleeps.fetch_add(1, Ordering::AcqRel);
    }

    fn sleep_until(&self, target_tick: TimeSpan) {
        let now = self.clock.now_ns();
        if target_tick <= now {
            return;
        }
        self.sleep_for(target_tick - now);
    }

    fn relax(&self) {
        self.clock.advance(TimeSpan::nanos(self.relax_quantum_ns));
    }
}
