//! # Pipeline Error Types
//!
//! Construction-time failures only. Once the pipeline runs there is no
//! per-frame error channel: a dropped frame under Mailbox or elevated
//! latency under Backpressure is by-design degradation, not an error.
//! Logical misuse (kick after stop, double start) is a programmer error
//! and asserts instead of returning.

use cadence_core::ThreadError;
use thiserror::Error;

/// Errors that can occur while constructing the frame pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The configuration fails validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stage worker thread could not be created.
    #[error("failed to start {stage} stage worker")]
    SpawnFailed {
        /// The pipeline stage whose worker failed.
        stage: &'static str,
        /// The underlying factory error.
        #[source]
        source: ThreadError,
    },
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
