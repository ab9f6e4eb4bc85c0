//! # Thread & ThreadFactory Contracts
//!
//! Constructor-injected so the scheduler core never names a platform type.
//! The factory hands the worker body a [`StopToken`]; the body must return
//! when the token signals stop.

use super::{StopToken, ThreadError};

/// Creation parameters for a worker thread.
#[derive(Clone, Debug)]
pub struct ThreadDesc {
    /// Thread name, visible in debuggers and profilers.
    pub name: String,
    /// Stack size override in bytes; `None` uses the platform default.
    pub stack_size: Option<usize>,
}

impl ThreadDesc {
    /// A descriptor with the given name and default stack size.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_size: None,
        }
    }
}

/// The entry point handed to the factory. Receives the cooperative stop
/// token and must return when it signals.
pub type ThreadBody = Box<dyn FnOnce(StopToken) + Send + 'static>;

/// A running worker thread.
///
/// Stopping is cooperative: [`Thread::request_stop`] flips the token, and
/// [`Thread::join`] waits for the body to observe it and return.
pub trait Thread: Send {
    /// Signals the worker's stop token. Does not wait.
    fn request_stop(&self);

    /// Blocks until the worker body has returned.
    fn join(self: Box<Self>);
}

/// Creates named, cooperatively-stoppable worker threads.
pub trait ThreadFactory {
    /// Spawns a thread running `body`.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::SpawnFailed`] when the OS refuses the thread.
    fn spawn_thread(
        &self,
        desc: &ThreadDesc,
        body: ThreadBody,
    ) -> Result<Box<dyn Thread>, ThreadError>;
}
