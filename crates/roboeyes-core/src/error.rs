//! Error taxonomy for the animation core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Persisted mood codes are small integers; anything outside 0..=6 is rejected.
    #[error("invalid mood code {0}; expected 0..=6")]
    InvalidMood(u8),

    /// A sequence step action failed. The scheduler logs this and consumes the
    /// step; it never propagates out of the frame loop.
    #[error("animation step failed: {0}")]
    StepFailed(String),
}
