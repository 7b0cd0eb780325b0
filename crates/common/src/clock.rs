//! Frame clock for rendering and export.
//!
//! Every page is played back as a whole number of frames at a fixed rate.
//! This module owns that arithmetic so the compositor, the export pipeline,
//! and preview playback agree on frame counts and progress values.

use std::time::Duration;

/// Fixed-rate frame clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    fps: u32,
}

impl FrameClock {
    /// Create a clock ticking at `fps` frames per second (at least 1).
    pub fn new(fps: u32) -> Self {
        Self { fps: fps.max(1) }
    }

    /// Frames per second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Time between two consecutive frames (`1000 / fps` ms).
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Number of frames a page of the given duration occupies.
    /// Never less than one.
    pub fn frames_for(&self, duration_secs: f64) -> u64 {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return 1;
        }
        ((duration_secs * self.fps as f64).round() as u64).max(1)
    }

    /// Animation progress of frame `frame` out of `total_frames`,
    /// clamped to `[0, 1]`.
    pub fn progress_at(frame: u64, total_frames: u64) -> f64 {
        if total_frames == 0 {
            return 1.0;
        }
        (frame as f64 / total_frames as f64).min(1.0)
    }

    /// Convert a frame count to seconds.
    pub fn frames_to_secs(&self, frames: u64) -> f64 {
        frames as f64 / self.fps as f64
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(30)
    }
}
