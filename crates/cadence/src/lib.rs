//! # CADENCE Frame Pipeline
//!
//! Bounded frame pipelining with phase-locked pacing.
//!
//! ```text
//! Frame N (pipelined modes):
//! ┌────────────────────────────────────────────────────────────────────┐
//! │ caller thread          update thread          render thread        │
//! │                                                                    │
//! │ 1. PACE (FrameCounter)                                             │
//! │    └─ sleep + spin to the phase-locked slot                        │
//! │                                                                    │
//! │ 2. KICK update(N) ───► update callback                             │
//! │    KICK render(N-1) ─────────────────────────► render callback     │
//! │                                                                    │
//! │ 3. WAIT (policy-dependent: Fixed waits, Mailbox/Backpressure poll) │
//! │                                                                    │
//! │ 4. PRESENT latest rendered frame inline                            │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Three pacing policies, selected once at construction:
//! - **Fixed**: strict round-robin lockstep, one frame per step, nothing
//!   skipped
//! - **Mailbox**: latest-wins presentation; intermediate completed frames
//!   are dropped, presentation is never more than one frame stale
//! - **Backpressure**: producer throttled to consumer throughput; nothing
//!   dropped, bounded in-flight frames
//!
//! One buffer degenerates to strictly sequential inline execution.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod controller;
pub mod error;
pub mod job;

pub use config::{FrameControllerDesc, PacingMode};
pub use controller::{
    compute_indices, FrameController, FrameIndices, ResizeSignal, StageCallbacks, StageFn,
};
pub use error::{PipelineError, PipelineResult};
pub use job::FrameJob;
