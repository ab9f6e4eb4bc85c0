//! # Time Primitives
//!
//! Leaf-to-root: [`TimeSpan`] → [`Clock`] → [`Waiter`] → [`Timer`] →
//! [`FrameCounter`].
//!
//! Everything here is single-thread state except the deterministic test
//! doubles ([`ManualClock`], [`VirtualWaiter`]), which are atomic so the
//! simulation harness can share them across stages.

mod clock;
mod frame_counter;
mod timer;
mod timespan;
mod waiter;

pub use clock::{Clock, ManualClock};
pub use frame_counter::FrameCounter;
pub use timer::Timer;
pub use timespan::{TimeSpan, TimeUnit};
pub use waiter::{VirtualWaiter, Waiter};
