//! # StopToken
//!
//! Cooperative cancellation flag shared between a worker and its owner.
//! Workers poll it at natural yield points (queue wait, after a callback);
//! nothing is ever forcibly aborted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cooperative stop flag.
///
/// Every clone observes the same flag. Once requested, stop is permanent.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    stop: Arc<AtomicBool>,
}

impl StopToken {
    /// Creates a token with stop not yet requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every holder of this token to wind down.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// True once any holder has requested stop.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_is_shared_across_clones() {
        let token = StopToken::new();
        let observer = token.clone();
        assert!(!observer.is_stop_requested());

        token.request_stop();
        assert!(observer.is_stop_requested());
    }

    #[test]
    fn test_stop_is_visible_across_threads() {
        let token = StopToken::new();
        let worker_token = token.clone();

        let handle = std::thread::spawn(move || {
            while !worker_token.is_stop_requested() {
                std::hint::spin_loop();
            }
            true
        });

        token.request_stop();
        assert!(handle.join().expect("worker must exit"));
    }
}
