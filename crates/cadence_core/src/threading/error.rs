//! # Threading Error Types

use thiserror::Error;

/// Errors from the platform thread factory.
#[derive(Error, Debug)]
pub enum ThreadError {
    /// The OS refused to create the thread.
    #[error("failed to spawn thread `{name}`")]
    SpawnFailed {
        /// The requested thread name.
        name: String,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },
}
