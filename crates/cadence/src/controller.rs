//! # FrameController - Pacing Policy State Machine
//!
//! Orchestrates the update and render stage workers plus inline present
//! under one of four policies, selected once at construction and dispatched
//! by a plain `match` - a hot per-frame call earns no dynamic dispatch.
//!
//! ```text
//! step(): ┌ poll resize (atomic flag, applied on the frame boundary only)
//!         ├ FrameCounter::tick()  - phase-locked pacing, may block here
//!         ├ kick update / render  - FIFO queues, never blocks
//!         ├ wait or poll          - Fixed waits, Mailbox/Backpressure poll
//!         └ present inline        - caller's thread, latest eligible frame
//! ```
//!
//! Frame numbers are 1-based throughout the pipeline so the stage workers'
//! finished-frame counters can use 0 as the "nothing finished" sentinel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cadence_core::{Clock, FrameCounter, ThreadFactory, Waiter};

use crate::config::{FrameControllerDesc, PacingMode};
use crate::error::{PipelineError, PipelineResult};
use crate::job::FrameJob;

/// Stage callback: `(frame_no, buffer_index)`.
///
/// Update and render callbacks run on their stage's worker thread; present
/// runs on the thread calling [`FrameController::step`]. A callback must
/// not block indefinitely and must not call back into the controller.
pub type StageFn = Box<dyn FnMut(u64, u32) + Send + 'static>;

/// The three per-stage callbacks handed to the controller at construction.
pub struct StageCallbacks {
    /// Simulation/update stage.
    pub update: StageFn,
    /// Render/record stage.
    pub render: StageFn,
    /// Present stage (inline on the pacing thread).
    pub present: StageFn,
}

/// Buffer-slot assignment for one frame number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameIndices {
    /// Slot the update stage writes for this frame.
    pub update: u32,
    /// Slot the render stage reads this step (the previous frame's output).
    pub render: u32,
    /// Slot present shows this step (tracks what render completed).
    pub present: u32,
}

/// Computes the stage indices for `frame_no` over `buffer_count` slots.
///
/// Update owns slot `(base + frame) % count`; render, running one frame
/// behind update in pipelined modes, owns the previous frame's slot; present
/// tracks render. Deterministic, so no two stages ever touch the same slot
/// for overlapping frames while the earlier stage still owns it.
///
/// # Panics
///
/// Panics when `buffer_count` is 0 (rejected at config validation).
#[must_use]
pub fn compute_indices(frame_no: u64, buffer_count: u32, base: u32) -> FrameIndices {
    assert!(buffer_count > 0, "buffer_count must be at least 1");
    let count = u64::from(buffer_count);
    let base = u64::from(base);

    #[allow(clippy::cast_possible_truncation)]
    let slot = |frame: u64| ((base + frame) % count) as u32;

    let update = slot(frame_no);
    // previous frame's slot, computed additively to avoid underflow at 0
    let render = slot(frame_no + count - 1);
    FrameIndices {
        update,
        render,
        present: render,
    }
}

/// Cloneable handle for requesting a resize from any thread.
///
/// The only cross-thread input the controller accepts while running; the
/// flag is consumed at the top of the next [`FrameController::step`].
#[derive(Clone, Debug)]
pub struct ResizeSignal {
    pending: Arc<AtomicBool>,
}

impl ResizeSignal {
    /// Flags a resize to be applied on the next frame boundary.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FixedState {
    produce_frame: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct MailboxState {
    produce_frame: u64,
    render_kicked: u64,
    last_presented: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct BackpressureState {
    produce_frame: u64,
    render_kicked: u64,
    presented: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct SingleBufferState {
    current_frame: u64,
}

/// Mode-specific state: exactly one variant is live for the controller's
/// lifetime. SingleBuffer keeps the stage callbacks inline instead of
/// handing them to workers.
enum ModeState {
    Fixed(FixedState),
    Mailbox(MailboxState),
    Backpressure(BackpressureState),
    SingleBuffer {
        state: SingleBufferState,
        update: StageFn,
        render: StageFn,
    },
}

impl ModeState {
    fn name(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Mailbox(_) => "mailbox",
            Self::Backpressure(_) => "backpressure",
            Self::SingleBuffer { .. } => "single_buffer",
        }
    }
}

/// The frame pipeline orchestrator.
///
/// Owns the two stage workers, the FPS governor, and the present callback.
/// Everything except the resize flag is owned and mutated exclusively by
/// the thread calling [`Self::step`].
pub struct FrameController<'c> {
    config: FrameControllerDesc,
    waiter: &'c dyn Waiter,
    frame_counter: FrameCounter<'c>,
    update_job: FrameJob,
    render_job: FrameJob,
    present_fn: StageFn,
    mode: ModeState,
    /// Rotates slot assignment after a resize so the next frame lands on
    /// slot 0 of the new buffer set.
    back_buffer_base: u32,
    /// In Fixed mode, frames at or below this are never rendered or
    /// presented; raised by a resize so stale pre-resize content cannot
    /// reach the screen. The other modes achieve the same by fast-forwarding
    /// their consumer bookkeeping when the resize applies.
    render_floor: u64,
    resize_pending: Arc<AtomicBool>,
    update_index: u32,
    render_index: u32,
    present_index: u32,
}

impl<'c> FrameController<'c> {
    /// Builds the controller and starts the stage pipeline.
    ///
    /// Validates `desc`, spawns the update/render workers through `factory`
    /// (skipped for one buffer, which runs inline), and establishes the
    /// pacing baseline. No `step` is permitted after a failure here.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] for a zero buffer count;
    /// [`PipelineError::SpawnFailed`] when a worker thread cannot start.
    pub fn new(
        desc: FrameControllerDesc,
        factory: &dyn ThreadFactory,
        clock: &'c dyn Clock,
        waiter: &'c dyn Waiter,
        callbacks: StageCallbacks,
    ) -> PipelineResult<Self> {
        desc.validate()?;

        let mut frame_counter = FrameCounter::new(clock, waiter);
        frame_counter.set_max_fps(desc.max_fps);
        frame_counter.set_max_lead(desc.default_max_lead());

        let mut update_job = FrameJob::new();
        let mut render_job = FrameJob::new();

        let mode = if desc.buffer_count == 1 {
            // no pipelining possible: keep the callbacks on this thread
            ModeState::SingleBuffer {
                state: SingleBufferState::default(),
                update: callbacks.update,
                render: callbacks.render,
            }
        } else {
            Self::start_pipeline(
                &mut update_job,
                &mut render_job,
                factory,
                callbacks.update,
                callbacks.render,
            )?;
            match desc.mode {
                PacingMode::Fixed => ModeState::Fixed(FixedState::default()),
                PacingMode::Mailbox => ModeState::Mailbox(MailboxState::default()),
                PacingMode::Backpressure => {
                    ModeState::Backpressure(BackpressureState::default())
                }
            }
        };

        // first tick is baseline-only; taking it here means every step
        // performs a real measurement
        frame_counter.tick();

        tracing::info!(
            mode = mode.name(),
            buffer_count = desc.buffer_count,
            max_fps = desc.max_fps,
            "frame pipeline started"
        );

        Ok(Self {
            config: desc,
            waiter,
            frame_counter,
            update_job,
            render_job,
            present_fn: callbacks.present,
            mode,
            back_buffer_base: 0,
            render_floor: 0,
            resize_pending: Arc::new(AtomicBool::new(false)),
            update_index: 0,
            render_index: 0,
            present_index: 0,
        })
    }

    /// Spawns both stage workers. All-or-nothing: a failure on the second
    /// spawn drops the first job, whose `Drop` stops it cooperatively.
    fn start_pipeline(
        update_job: &mut FrameJob,
        render_job: &mut FrameJob,
        factory: &dyn ThreadFactory,
        update: StageFn,
        render: StageFn,
    ) -> PipelineResult<()> {
        update_job
            .start(factory, "cadence-update", update)
            .map_err(|source| PipelineError::SpawnFailed {
                stage: "update",
                source,
            })?;
        render_job
            .start(factory, "cadence-render", render)
            .map_err(|source| PipelineError::SpawnFailed {
                stage: "render",
                source,
            })?;
        Ok(())
    }

    /// Runs one outer-loop iteration: pacing, stage dispatch, present.
    ///
    /// Call exactly once per loop for the remainder of the program. There
    /// is no per-frame failure: degradation under load is a dropped/stale
    /// frame (Mailbox) or elevated latency (Backpressure), by design.
    pub fn step(&mut self) {
        self.poll_resize_request();

        match self.mode {
            ModeState::Fixed(_) => self.step_fixed(),
            ModeState::Mailbox(_) => self.step_mailbox(),
            ModeState::Backpressure(_) => self.step_backpressure(),
            ModeState::SingleBuffer { .. } => self.step_single_buffer(),
        }
    }

    /// Consumes a pending resize request, applying it for the next frame
    /// only - never the in-flight one.
    pub fn poll_resize_request(&mut self) {
        if !self.resize_pending.swap(false, Ordering::AcqRel) {
            return;
        }
        let next_frame_no = self.next_frame_no();
        self.apply_resize_for_next_frame(next_frame_no);
    }

    /// Flags a resize from the controller's own thread.
    pub fn request_resize(&self) {
        self.resize_pending.store(true, Ordering::Release);
    }

    /// Cloneable cross-thread handle for flagging a resize.
    #[must_use]
    pub fn resize_signal(&self) -> ResizeSignal {
        ResizeSignal {
            pending: Arc::clone(&self.resize_pending),
        }
    }

    /// The FPS governor, for reading `fps()`/`delta_time()`.
    #[must_use]
    pub fn frame_counter(&self) -> &FrameCounter<'c> {
        &self.frame_counter
    }

    /// Mutable governor access, for `set_max_fps` at runtime.
    pub fn frame_counter_mut(&mut self) -> &mut FrameCounter<'c> {
        &mut self.frame_counter
    }

    /// Total measured frames since the pipeline started.
    #[must_use]
    pub fn total_frame(&self) -> u64 {
        self.frame_counter.total_frames()
    }

    /// Slot the update stage most recently received.
    #[must_use]
    pub fn update_index(&self) -> u32 {
        self.update_index
    }

    /// Slot the render stage most recently received.
    #[must_use]
    pub fn render_index(&self) -> u32 {
        self.render_index
    }

    /// Slot most recently presented.
    #[must_use]
    pub fn present_index(&self) -> u32 {
        self.present_index
    }

    // --------------------
    // Mode steppers
    // --------------------

    /// Fixed: strict round-robin lockstep. Update(N) and render(N-1) are
    /// kicked together, both are awaited, then N-1 is presented. Exactly
    /// one frame is produced per step and none is ever skipped.
    fn step_fixed(&mut self) {
        self.frame_counter.tick();

        let frame_no = {
            let ModeState::Fixed(state) = &mut self.mode else {
                unreachable!("step_fixed outside fixed mode")
            };
            state.produce_frame += 1;
            state.produce_frame
        };
        let prev = frame_no - 1;

        let indices = compute_indices(frame_no, self.config.buffer_count, self.back_buffer_base);
        self.update_index = indices.update;
        self.update_job.kick(frame_no, indices.update);

        let render_prev = prev > self.render_floor;
        if render_prev {
            self.render_index = indices.render;
            self.render_job.kick(prev, indices.render);
        }

        // lockstep: this mode trades stalls for never skipping a frame
        Self::wait_for_stage(&self.update_job, self.waiter, frame_no);
        if render_prev {
            Self::wait_for_stage(&self.render_job, self.waiter, prev);
            self.present_frame(prev);
        }
    }

    /// Mailbox: the producer runs as fast as the slots permit and present
    /// always shows the most recently completed frame. Intermediate
    /// completed frames are dropped at the render hand-off and at present;
    /// presentation is never more than one frame stale and never regresses.
    fn step_mailbox(&mut self) {
        self.frame_counter.tick();

        let mut state = {
            let ModeState::Mailbox(state) = &self.mode else {
                unreachable!("step_mailbox outside mailbox mode")
            };
            *state
        };
        let slots = u64::from(self.config.buffer_count);

        // 1) produce while a free slot exists ahead of what is on screen
        if state.produce_frame - state.last_presented < slots {
            let frame_no = state.produce_frame + 1;
            let slot = self.slot_of(frame_no);
            self.update_index = slot;
            self.update_job.kick(frame_no, slot);
            state.produce_frame = frame_no;
        }

        // 2) hand the *newest* finished update to an idle render; anything
        //    older is dropped here, unrendered
        let updated = self.update_job.finished_frame();
        let render_idle = self.render_job.finished_frame() == state.render_kicked;
        if updated > state.render_kicked && render_idle {
            let slot = self.slot_of(updated);
            self.render_index = slot;
            self.render_job.kick(updated, slot);
            state.render_kicked = updated;
        }

        // 3) present the newest rendered frame; never regress to an older one
        let rendered = self.render_job.finished_frame();
        if rendered > state.last_presented {
            self.present_frame(rendered);
            state.last_presented = rendered;
        }

        if let ModeState::Mailbox(live) = &mut self.mode {
            *live = state;
        }
    }

    /// Backpressure: the producer is throttled to consumer throughput.
    /// Nothing is dropped; update, render, and present advance strictly in
    /// frame order, and at most `max_lead + 1` frames are in flight.
    fn step_backpressure(&mut self) {
        self.frame_counter.tick();

        let mut state = {
            let ModeState::Backpressure(state) = &self.mode else {
                unreachable!("step_backpressure outside backpressure mode")
            };
            *state
        };
        let max_lead = u64::from(self.frame_counter.max_lead());

        // 1) produce only while within the permitted lead of what has been
        //    fully presented - this is the throttle
        if state.produce_frame - state.presented <= max_lead {
            let frame_no = state.produce_frame + 1;
            let slot = self.slot_of(frame_no);
            self.update_index = slot;
            self.update_job.kick(frame_no, slot);
            state.produce_frame = frame_no;
        }

        // 2) render strictly in order, one frame at a time
        let updated = self.update_job.finished_frame();
        let render_idle = self.render_job.finished_frame() == state.render_kicked;
        if state.render_kicked < updated && render_idle {
            let next = state.render_kicked + 1;
            let slot = self.slot_of(next);
            self.render_index = slot;
            self.render_job.kick(next, slot);
            state.render_kicked = next;
        }

        // 3) present strictly in order, one frame per step at most
        if self.render_job.finished_frame() > state.presented {
            let next = state.presented + 1;
            self.present_frame(next);
            state.presented = next;
        }

        if let ModeState::Backpressure(live) = &mut self.mode {
            *live = state;
        }
    }

    /// SingleBuffer: no pipelining is possible with one slot. All three
    /// stages run strictly sequentially on the calling thread.
    fn step_single_buffer(&mut self) {
        self.frame_counter.tick();

        let frame_no = {
            let ModeState::SingleBuffer {
                state,
                update,
                render,
            } = &mut self.mode
            else {
                unreachable!("step_single_buffer outside single-buffer mode")
            };
            let frame_no = state.current_frame + 1;
            update(frame_no, 0);
            render(frame_no, 0);
            state.current_frame = frame_no;
            frame_no
        };

        self.update_index = 0;
        self.render_index = 0;
        self.present_frame(frame_no);
    }

    // --------------------
    // Shared plumbing
    // --------------------

    /// Invokes the present callback for `frame_no` on this thread.
    fn present_frame(&mut self, frame_no: u64) {
        let slot = self.slot_of(frame_no);
        self.present_index = slot;
        (self.present_fn)(frame_no, slot);
    }

    /// The slot `frame_no`'s update output lives in.
    fn slot_of(&self, frame_no: u64) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let slot = ((u64::from(self.back_buffer_base) + frame_no)
            % u64::from(self.config.buffer_count)) as u32;
        slot
    }

    /// Spins (with the waiter's relax hint) until `job` has finished
    /// `frame_no`. Only ever runs on the pacing thread.
    fn wait_for_stage(job: &FrameJob, waiter: &dyn Waiter, frame_no: u64) {
        while job.finished_frame() < frame_no {
            waiter.relax();
        }
    }

    /// The frame number the next `step` will produce.
    fn next_frame_no(&self) -> u64 {
        match &self.mode {
            ModeState::Fixed(state) => state.produce_frame + 1,
            ModeState::Mailbox(state) => state.produce_frame + 1,
            ModeState::Backpressure(state) => state.produce_frame + 1,
            ModeState::SingleBuffer { state, .. } => state.current_frame + 1,
        }
    }

    /// Applies a resize so it takes effect for `next_frame_no` only:
    /// drains the in-flight frames, drops completed-but-unpresented
    /// pre-resize output (its buffers die with the old set), rebases slot
    /// assignment onto the new buffers, and schedules the refill.
    fn apply_resize_for_next_frame(&mut self, next_frame_no: u64) {
        self.drain_pipeline();

        // everything produced before the resize is now stale: fast-forward
        // the consumer bookkeeping so none of it reaches the screen
        match &mut self.mode {
            ModeState::Fixed(_) | ModeState::SingleBuffer { .. } => {}
            ModeState::Mailbox(state) => {
                state.render_kicked = state.produce_frame;
                state.last_presented = state.produce_frame;
            }
            ModeState::Backpressure(state) => {
                state.render_kicked = state.produce_frame;
                state.presented = state.produce_frame;
            }
        }

        // rebase so the next frame lands on slot 0 of the new buffer set
        let slots = u64::from(self.config.buffer_count);
        #[allow(clippy::cast_possible_truncation)]
        let base = ((slots - (next_frame_no % slots)) % slots) as u32;
        self.back_buffer_base = base;

        self.fill_buffers(next_frame_no);

        tracing::info!(frame = next_frame_no, "resize applied for next frame");
    }

    /// Schedules the post-resize refill: every slot is rewritten by the
    /// normal frame flow before presentation resumes. The render floor
    /// keeps any frame produced against the old buffers off the screen.
    fn fill_buffers(&mut self, next_frame_no: u64) {
        self.render_floor = next_frame_no.saturating_sub(1);
    }

    /// Blocks until both stage workers have finished everything kicked to
    /// them. The resize path's guarantee that no frame is mid-flight.
    fn drain_pipeline(&self) {
        Self::wait_for_stage(&self.update_job, self.waiter, self.update_job.kicked_frame());
        Self::wait_for_stage(&self.render_job, self.waiter, self.render_job.kicked_frame());
    }

    /// Stops both stage workers cooperatively.
    fn stop_jobs(&mut self) {
        self.update_job.stop();
        self.render_job.stop();
    }
}

impl Drop for FrameController<'_> {
    fn drop(&mut self) {
        self.stop_jobs();
        tracing::info!("frame pipeline stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_never_collide_and_cycle() {
        let buffer_count = 3;
        for frame_no in 0..10 {
            let indices = compute_indices(frame_no, buffer_count, 0);
            assert!(indices.update < buffer_count);
            assert!(indices.render < buffer_count);
            assert_ne!(
                indices.update, indices.render,
                "update and render must never share a slot for frame {frame_no}"
            );
            assert_eq!(indices.present, indices.render);

            // indices cycle with period == buffer_count
            let wrapped = compute_indices(frame_no + u64::from(buffer_count), buffer_count, 0);
            assert_eq!(indices, wrapped);
        }
    }

    #[test]
    fn test_render_trails_update_by_one_slot() {
        for frame_no in 1..8 {
            let current = compute_indices(frame_no, 3, 0);
            let previous = compute_indices(frame_no - 1, 3, 0);
            assert_eq!(current.render, previous.update);
        }
    }

    #[test]
    fn test_base_rotates_slots() {
        let rebased = compute_indices(4, 4, 0);
        assert_eq!(rebased.update, 0);
        // base chosen so frame 5 lands on slot 0
        let indices = compute_indices(5, 4, 3);
        assert_eq!(indices.update, 0);
    }

    #[test]
    fn test_single_slot_indices_are_all_zero() {
        let indices = compute_indices(7, 1, 0);
        assert_eq!(indices.update, 0);
        assert_eq!(indices.render, 0);
        assert_eq!(indices.present, 0);
    }
}
