//! # Pipeline Configuration
//!
//! Loaded once at startup (TOML), validated before the pipeline spawns
//! anything. Nothing here is consulted on the per-frame hot path.

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

/// The buffering/pacing policy the controller runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// Strict round-robin lockstep; one frame per step, nothing skipped.
    #[default]
    Fixed,
    /// Latest-wins presentation; stale completed frames are dropped.
    Mailbox,
    /// Producer throttled to consumer throughput; nothing dropped.
    Backpressure,
}

/// Construction parameters for the frame controller.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameControllerDesc {
    /// Number of pipeline buffer slots (>= 1; 1 disables pipelining).
    pub buffer_count: u32,
    /// FPS cap; 0 runs uncapped.
    pub max_fps: u32,
    /// Selected pacing policy.
    pub mode: PacingMode,
}

impl Default for FrameControllerDesc {
    fn default() -> Self {
        Self {
            buffer_count: 2,
            max_fps: 60,
            mode: PacingMode::Fixed,
        }
    }
}

impl FrameControllerDesc {
    /// Parses a descriptor from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] on malformed TOML or a
    /// descriptor that fails [`Self::validate`].
    pub fn from_toml_str(text: &str) -> PipelineResult<Self> {
        let desc: Self = toml::from_str(text)
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        desc.validate()?;
        Ok(desc)
    }

    /// Checks the descriptor for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] when `buffer_count` is 0.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.buffer_count == 0 {
            return Err(PipelineError::InvalidConfig(
                "buffer_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Default producer lead for this buffer count: one less than the slot
    /// count (2 buffers -> 1 frame ahead, 3 -> 2).
    #[must_use]
    pub fn default_max_lead(&self) -> u32 {
        self.buffer_count.saturating_sub(1)
    }
}
