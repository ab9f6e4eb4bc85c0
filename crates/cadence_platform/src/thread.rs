//! # StdThreadFactory
//!
//! Named worker threads over [`std::thread::Builder`] with cooperative stop.

use std::thread::JoinHandle;

use cadence_core::{StopToken, Thread, ThreadBody, ThreadDesc, ThreadError, ThreadFactory};

/// A spawned std thread plus its stop token.
struct StdThread {
    name: String,
    token: StopToken,
    handle: Option<JoinHandle<()>>,
}

impl Thread for StdThread {
    fn request_stop(&self) {
        self.token.request_stop();
    }

    fn join(mut self: Box<Self>) {
        if let Some(handle) = self.handle.take() {
            // the worker body has no error channel back to the pipeline;
            // a panic in it surfaces as a log line, not a propagated error
            if handle.join().is_err() {
                tracing::error!(thread = %self.name, "worker thread panicked");
            }
        }
    }
}

impl Drop for StdThread {
    fn drop(&mut self) {
        // dropped without join: detach, but make sure the body winds down
        if self.handle.is_some() {
            self.token.request_stop();
        }
    }
}

/// Thread factory for the std platform.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdThreadFactory;

impl StdThreadFactory {
    /// Creates the factory. Stateless; one instance serves the process.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ThreadFactory for StdThreadFactory {
    fn spawn_thread(
        &self,
        desc: &ThreadDesc,
        body: ThreadBody,
    ) -> Result<Box<dyn Thread>, ThreadError> {
        let token = StopToken::new();
        let worker_token = token.clone();

        let mut builder = std::thread::Builder::new().name(desc.name.clone());
        if let Some(stack_size) = desc.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || body(worker_token))
            .map_err(|source| ThreadError::SpawnFailed {
                name: desc.name.clone(),
                source,
            })?;

        tracing::debug!(thread = %desc.name, "spawned worker thread");

        Ok(Box::new(StdThread {
            name: desc.name.clone(),
            token,
            handle: Some(handle),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_spawn_runs_body_with_token() {
        let factory = StdThreadFactory::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_in_body = Arc::clone(&ran);

        let thread = factory
            .spawn_thread(
                &ThreadDesc::named("cadence-test"),
                Box::new(move |token| {
                    while !token.is_stop_requested() {
                        std::hint::spin_loop();
                    }
                    ran_in_body.store(true, Ordering::Release);
                }),
            )
            .expect("spawn must succeed");

        thread.request_stop();
        thread.join();
        assert!(ran.load(Ordering::Acquire));
    }

    #[test]
    fn test_thread_name_is_applied() {
        let factory = StdThreadFactory::new();
        let thread = factory
            .spawn_thread(
                &ThreadDesc::named("cadence-named"),
                Box::new(|_token| {
                    let current = std::thread::current();
                    assert_eq!(current.name(), Some("cadence-named"));
                }),
            )
            .expect("spawn must succeed");
        thread.join();
    }
}
