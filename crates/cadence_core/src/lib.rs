//! # CADENCE Core
//!
//! Timing primitives and threading contracts for the frame pacing engine:
//! - Sub-millisecond frame-rate capping without drift
//! - Leaf dependencies pulled in by everything above
//! - Zero allocations in the per-tick hot path
//!
//! ## Architecture Rules
//!
//! 1. **Capabilities, not platforms** - The scheduler core consumes the
//!    [`Clock`], [`Waiter`] and [`ThreadFactory`] traits; concrete OS
//!    implementations live in `cadence_platform`
//! 2. **Non-owning back-references** - [`Timer`] and [`FrameCounter`] borrow
//!    one shared clock/waiter instead of owning copies
//! 3. **Phase-locked scheduling** - The pacing anchor advances by exact
//!    multiples of the target period, so overshoot never accumulates
//!
//! ## Dependency order
//!
//! ```text
//! Clock ──► Waiter ──► Timer ──► FrameCounter
//!   │                              │
//!   └──── threading (StopToken, ThreadFactory) ────► the pipeline crate
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod threading;
pub mod time;

pub use threading::{StopToken, Thread, ThreadBody, ThreadDesc, ThreadError, ThreadFactory};
pub use time::{
    Clock, FrameCounter, ManualClock, TimeSpan, TimeUnit, Timer, VirtualWaiter, Waiter,
};
