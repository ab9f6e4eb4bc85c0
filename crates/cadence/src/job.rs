//! # FrameJob - Pipeline Stage Worker
//!
//! One dedicated thread per stage, fed through a mutex/condvar FIFO.
//! The worker executes the stage callback synchronously per request and
//! publishes the last finished frame number through an atomic - the single
//! point of cross-thread state beyond the queue's own lock.
//!
//! The stage callback has no error channel back to the controller. It is
//! trusted not to panic; failures inside it are its own to report.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use cadence_core::{StopToken, Thread, ThreadDesc, ThreadError, ThreadFactory};

/// Stage callback: `(frame_no, buffer_index)`, invoked on the job's thread.
pub type JobFn = Box<dyn FnMut(u64, u32) + Send + 'static>;

/// A queued unit of stage work.
#[derive(Clone, Copy, Debug)]
struct FrameRequest {
    frame_no: u64,
    buffer_index: u32,
}

/// Queue state guarded by the job mutex.
struct JobQueue {
    requests: VecDeque<FrameRequest>,
    exit: bool,
}

/// State shared between the caller and the worker thread.
struct JobShared {
    queue: Mutex<JobQueue>,
    ready: Condvar,
    /// Last frame whose callback has returned. 0 is the "none yet"
    /// sentinel; frame numbers are 1-based by pipeline convention.
    finished_frame: AtomicU64,
    /// Last frame number handed to `kick` (0 = none yet).
    kicked_frame: AtomicU64,
}

/// A single pipeline stage owning a worker thread and a FIFO request queue.
///
/// Requests execute strictly in order: frame N's callback completes before
/// frame N+1's begins. `kick` never blocks - bounded-queue backpressure is
/// the controller's pacing policy's job, not this one's.
pub struct FrameJob {
    shared: Arc<JobShared>,
    thread: Option<Box<dyn Thread>>,
}

impl FrameJob {
    /// Creates a job with no worker. Call [`Self::start`] before kicking.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(JobShared {
                queue: Mutex::new(JobQueue {
                    requests: VecDeque::new(),
                    exit: false,
                }),
                ready: Condvar::new(),
                finished_frame: AtomicU64::new(0),
                kicked_frame: AtomicU64::new(0),
            }),
            thread: None,
        }
    }

    /// Spawns the worker thread via `factory` and binds the stage callback.
    ///
    /// # Errors
    ///
    /// Propagates [`ThreadError`] when the platform refuses the thread.
    ///
    /// # Panics
    ///
    /// Starting an already-started job is a fatal precondition violation.
    pub fn start(
        &mut self,
        factory: &dyn ThreadFactory,
        name: &str,
        mut func: JobFn,
    ) -> Result<(), ThreadError> {
        assert!(self.thread.is_none(), "FrameJob::start called twice");

        let shared = Arc::clone(&self.shared);
        let thread = factory.spawn_thread(
            &ThreadDesc::named(name),
            Box::new(move |token| Self::worker_loop(&shared, &token, &mut func)),
        )?;

        self.thread = Some(thread);
        Ok(())
    }

    /// Enqueues `(frame_no, buffer_index)` and wakes the worker.
    ///
    /// Never blocks. Must not be called after [`Self::stop`]; frame numbers
    /// must increase monotonically per job (caller contract).
    pub fn kick(&self, frame_no: u64, buffer_index: u32) {
        let mut queue = self.shared.queue.lock();
        debug_assert!(!queue.exit, "FrameJob::kick after stop");
        debug_assert!(
            queue.requests.back().map_or(true, |r| r.frame_no < frame_no),
            "FrameJob::kick frame numbers must be monotonic"
        );
        queue.requests.push_back(FrameRequest {
            frame_no,
            buffer_index,
        });
        drop(queue);
        self.shared.kicked_frame.store(frame_no, Ordering::Release);
        self.shared.ready.notify_one();
    }

    /// Last frame number handed to [`Self::kick`] (0 = none yet).
    ///
    /// `kicked_frame() == finished_frame()` means the stage is idle.
    #[must_use]
    pub fn kicked_frame(&self) -> u64 {
        self.shared.kicked_frame.load(Ordering::Acquire)
    }

    /// Last frame number whose callback has returned (0 = none yet).
    ///
    /// Safe to poll from the controller thread without taking the queue
    /// lock; this is how stage completion is detected without blocking.
    #[must_use]
    pub fn finished_frame(&self) -> u64 {
        self.shared.finished_frame.load(Ordering::Acquire)
    }

    /// True once [`Self::start`] has succeeded and [`Self::stop`] has not
    /// yet run.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stops the worker cooperatively and joins it.
    ///
    /// The in-flight callback (if any) finishes first; still-queued
    /// requests are dropped. Idempotent; a no-op for a never-started job.
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        {
            let mut queue = self.shared.queue.lock();
            queue.exit = true;
        }
        self.shared.ready.notify_all();
        thread.request_stop();
        thread.join();
    }

    /// Worker body: wait for requests, run the callback, publish the
    /// finished frame. Exits when the queue's exit flag or the stop token
    /// is raised.
    fn worker_loop(shared: &JobShared, token: &StopToken, func: &mut JobFn) {
        loop {
            let request = {
                let mut queue = shared.queue.lock();
                loop {
                    if queue.exit || token.is_stop_requested() {
                        if !queue.requests.is_empty() {
                            tracing::debug!(
                                dropped = queue.requests.len(),
                                "stage stopping with queued requests"
                            );
                        }
                        return;
                    }
                    if let Some(request) = queue.requests.pop_front() {
                        break request;
                    }
                    shared.ready.wait(&mut queue);
                }
            };

            // lock released: the callback must never run under the queue
            // mutex, or kick() would block on stage work
            func(request.frame_no, request.buffer_index);

            shared
                .finished_frame
                .store(request.frame_no, Ordering::Release);
        }
    }
}

impl Default for FrameJob {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FrameJob {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU64;
    use std::time::{Duration, Instant};

    use cadence_platform::StdThreadFactory;

    use super::*;

    fn wait_for_finished(job: &FrameJob, frame_no: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while job.finished_frame() < frame_no {
            assert!(Instant::now() < deadline, "stage never finished frame {frame_no}");
            std::thread::yield_now();
        }
    }

    #[test]
    fn test_requests_run_fifo() {
        let factory = StdThreadFactory::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_job = Arc::clone(&seen);

        let mut job = FrameJob::new();
        job.start(
            &factory,
            "cadence-update",
            Box::new(move |frame_no, buffer_index| {
                seen_in_job.lock().push((frame_no, buffer_index));
            }),
        )
        .expect("start must succeed");

        for frame_no in 1..=5 {
            job.kick(frame_no, u32::try_from(frame_no % 2).unwrap());
        }
        assert_eq!(job.kicked_frame(), 5);
        wait_for_finished(&job, 5);
        job.stop();

        let seen = seen.lock();
        let frames: Vec<u64> = seen.iter().map(|&(f, _)| f).collect();
        assert_eq!(frames, vec![1, 2, 3, 4, 5], "requests must execute FIFO");
    }

    #[test]
    fn test_finished_frame_starts_at_sentinel() {
        let job = FrameJob::new();
        assert_eq!(job.finished_frame(), 0);
        assert!(!job.is_running());
    }

    #[test]
    fn test_dequeued_request_completes_before_stop() {
        let factory = StdThreadFactory::new();
        let completed = Arc::new(AtomicU64::new(0));
        let completed_in_job = Arc::clone(&completed);

        let mut job = FrameJob::new();
        job.start(
            &factory,
            "cadence-slow",
            Box::new(move |frame_no, _| {
                // the callback is mid-flight when stop() lands
                std::thread::sleep(Duration::from_millis(20));
                completed_in_job.store(frame_no, Ordering::Release);
            }),
        )
        .expect("start must succeed");

        job.kick(1, 0);
        // give the worker time to dequeue frame 1
        std::thread::sleep(Duration::from_millis(5));
        job.stop();

        assert_eq!(
            completed.load(Ordering::Acquire),
            1,
            "a dequeued request must run to completion before stop takes effect"
        );
        assert_eq!(job.finished_frame(), 1);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut job = FrameJob::new();
        job.stop();
        job.stop();
    }

    #[test]
    fn test_stop_is_idempotent_after_start() {
        let factory = StdThreadFactory::new();
        let mut job = FrameJob::new();
        job.start(&factory, "cadence-idem", Box::new(|_, _| {}))
            .expect("start must succeed");

        job.kick(1, 0);
        wait_for_finished(&job, 1);
        job.stop();
        job.stop();
        assert!(!job.is_running());
    }

    #[test]
    #[should_panic(expected = "FrameJob::start called twice")]
    fn test_double_start_panics() {
        let factory = StdThreadFactory::new();
        let mut job = FrameJob::new();
        job.start(&factory, "cadence-a", Box::new(|_, _| {}))
            .expect("first start must succeed");
        let _ = job.start(&factory, "cadence-b", Box::new(|_, _| {}));
    }
}
