//! Core configuration for roboeyes-core.

use serde::{Deserialize, Serialize};

/// Configuration for the eye display area and animation defaults.
/// All geometry values are integer pixel units on the logical display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Logical display size the eyes are laid out on.
    pub screen_width: i32,
    pub screen_height: i32,

    /// Target frame rate for the tweening engine (drawing is rate-limited to
    /// 1000 / frame_rate milliseconds, independent of the host paint rate).
    pub frame_rate: u32,

    /// Default eye geometry (applies to both eyes until changed per-eye).
    pub eye_width: i32,
    pub eye_height: i32,
    pub border_radius: i32,
    pub spacing: i32,

    /// Curious gaze: widen an eye by `curious_height_bonus` when its target x
    /// comes within `curious_edge_margin` pixels of its screen constraint.
    pub curious_edge_margin: i32,
    pub curious_height_bonus: i32,

    /// Self-terminating shiver animations.
    pub confuse_duration_ms: u64,
    pub laugh_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 128,
            screen_height: 64,
            frame_rate: 20,
            eye_width: 36,
            eye_height: 36,
            border_radius: 8,
            spacing: 10,
            curious_edge_margin: 10,
            curious_height_bonus: 8,
            confuse_duration_ms: 500,
            laugh_duration_ms: 500,
        }
    }
}
