//! # Threading Contracts
//!
//! The pipeline needs exactly one thing from the platform: "start a named
//! thread running a loop that can be cooperatively stopped". These are the
//! contracts for that, nothing more - no pools, no work stealing.

mod error;
mod stop_token;
mod thread;

pub use error::ThreadError;
pub use stop_token::StopToken;
pub use thread::{Thread, ThreadBody, ThreadDesc, ThreadFactory};
