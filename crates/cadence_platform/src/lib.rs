//! # CADENCE Platform
//!
//! Std-library implementations of the `cadence_core` capability traits:
//! [`StdClock`], [`StdWaiter`], and [`StdThreadFactory`].
//!
//! The pipeline crate consumes these through constructor injection only;
//! nothing above this crate ever names a concrete platform type.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

mod clock;
mod thread;
mod waiter;

pub use clock::StdClock;
pub use thread::StdThreadFactory;
pub use waiter::StdWaiter;
