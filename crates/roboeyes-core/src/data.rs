//! Data model for the tweening engine: moods, gaze positions, per-eye
//! geometry, and the small state blocks backing the macro-animations.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::CoreError;

/// Expressive mood. Serialized as the integer codes 0..=6 used by persisted
/// emotion mappings.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mood {
    #[default]
    Default,
    Tired,
    Angry,
    Happy,
    Frozen,
    Scary,
    Curious,
}

impl TryFrom<u8> for Mood {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, CoreError> {
        match code {
            0 => Ok(Mood::Default),
            1 => Ok(Mood::Tired),
            2 => Ok(Mood::Angry),
            3 => Ok(Mood::Happy),
            4 => Ok(Mood::Frozen),
            5 => Ok(Mood::Scary),
            6 => Ok(Mood::Curious),
            other => Err(CoreError::InvalidMood(other)),
        }
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> u8 {
        match mood {
            Mood::Default => 0,
            Mood::Tired => 1,
            Mood::Angry => 2,
            Mood::Happy => 3,
            Mood::Frozen => 4,
            Mood::Scary => 5,
            Mood::Curious => 6,
        }
    }
}

/// Predefined gaze direction on the display, compass-style.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    #[default]
    Center,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// Which eye(s) an operation applies to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EyeSelect {
    Both,
    Left,
    Right,
}

impl EyeSelect {
    pub fn left(self) -> bool {
        matches!(self, EyeSelect::Both | EyeSelect::Left)
    }

    pub fn right(self) -> bool {
        matches!(self, EyeSelect::Both | EyeSelect::Right)
    }
}

/// Eyelid mask shape derived from the active mood. At most one style is in
/// effect at a time; the mask heights themselves decay smoothly after a
/// style switch.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum EyelidStyle {
    #[default]
    None,
    /// Outer-corner triangles drooping inward (also used by the scary mood).
    Tired,
    /// Inner-corner triangles, mirror image of tired.
    Angry,
    /// Rectangle rising over the lower half of each eye.
    Happy,
}

/// Geometry of a single eye: current values (drawn this frame), next values
/// (tween targets) and default values (restored on reopen / reset).
#[derive(Clone, Debug)]
pub struct EyeGeometry {
    pub width_default: i32,
    pub width_current: i32,
    pub width_next: i32,

    pub height_default: i32,
    pub height_current: i32,
    pub height_next: i32,

    pub radius_default: i32,
    pub radius_current: i32,
    pub radius_next: i32,

    pub x: i32,
    pub y: i32,
    pub x_next: i32,
    pub y_next: i32,

    /// Transient curious-gaze height bonus applied during smoothing.
    pub height_offset: i32,

    /// Logical lid state; a closed eye tweens to 1px tall, an open one
    /// reopens to its default height.
    pub open: bool,
}

impl EyeGeometry {
    /// Eye starting closed (1px slit) at the given position.
    pub fn closed_at(cfg: &Config, x: i32, y: i32) -> Self {
        Self {
            width_default: cfg.eye_width,
            width_current: cfg.eye_width,
            width_next: cfg.eye_width,
            height_default: cfg.eye_height,
            height_current: 1,
            height_next: cfg.eye_height,
            radius_default: cfg.border_radius,
            radius_current: cfg.border_radius,
            radius_next: cfg.border_radius,
            x,
            y,
            x_next: x,
            y_next: y,
            height_offset: 0,
            open: false,
        }
    }
}

/// Per-axis shiver: while active, offsets the drawn position by the amplitude
/// with a sign that alternates every frame.
#[derive(Copy, Clone, Debug, Default)]
pub struct Flicker {
    pub active: bool,
    pub amplitude: i32,
    pub(crate) alternate: bool,
}

impl Flicker {
    pub fn set(&mut self, active: bool, amplitude: Option<i32>) {
        self.active = active;
        if let Some(amplitude) = amplitude {
            self.amplitude = amplitude;
        }
    }

    /// The offset to apply this frame; flips sign each call.
    pub(crate) fn offset(&mut self) -> i32 {
        let offset = if self.alternate {
            self.amplitude
        } else {
            -self.amplitude
        };
        self.alternate = !self.alternate;
        offset
    }
}

/// Recurring timer with a randomized slack, driving autoblink and idle gaze.
/// `next_fire_ms` starts at 0 so an enabled timer fires on the first frame.
#[derive(Copy, Clone, Debug, Default)]
pub struct PeriodicTimer {
    pub active: bool,
    pub interval_s: u64,
    pub variation_s: u64,
    pub(crate) next_fire_ms: u64,
}

impl PeriodicTimer {
    pub fn set(&mut self, active: bool, interval_s: Option<u64>, variation_s: Option<u64>) {
        self.active = active;
        if let Some(interval_s) = interval_s {
            self.interval_s = interval_s;
        }
        if let Some(variation_s) = variation_s {
            self.variation_s = variation_s;
        }
    }

    pub(crate) fn due(&self, now_ms: u64) -> bool {
        self.active && now_ms >= self.next_fire_ms
    }

    pub(crate) fn reschedule(&mut self, now_ms: u64, slack_s: u64) {
        self.next_fire_ms = now_ms + self.interval_s * 1000 + slack_s * 1000;
    }
}

/// One-shot shiver burst (confuse/laugh). Arms on request, records its start
/// on the next frame, and disarms itself once the duration has elapsed.
#[derive(Copy, Clone, Debug)]
pub struct Burst {
    pub(crate) active: bool,
    pub(crate) armed: bool,
    pub(crate) started_ms: u64,
    pub duration_ms: u64,
}

impl Burst {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            active: false,
            armed: true,
            started_ms: 0,
            duration_ms,
        }
    }

    pub fn fire(&mut self) {
        self.active = true;
        self.armed = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// One integer halving step toward `target`: `(current + target) / 2` with
/// truncating division, which never overshoots. Truncation alone stalls one
/// pixel short when approaching from below, so a step that makes no progress
/// snaps to the target.
pub(crate) fn tween(current: i32, target: i32) -> i32 {
    let stepped = (current + target) / 2;
    if stepped == current && stepped != target {
        target
    } else {
        stepped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_codes_round_trip() {
        for code in 0u8..=6 {
            let mood = Mood::try_from(code).unwrap();
            assert_eq!(u8::from(mood), code);
        }
        assert!(Mood::try_from(7).is_err());
    }

    #[test]
    fn tween_converges_without_overshoot() {
        let mut value = 1;
        for _ in 0..16 {
            value = tween(value, 36);
            assert!(value <= 36);
        }
        assert_eq!(value, 36);

        let mut value = 36;
        for _ in 0..16 {
            value = tween(value, 1);
            assert!(value >= 1);
        }
        assert_eq!(value, 1);
    }

    #[test]
    fn tween_handles_negative_values() {
        assert_eq!(tween(-3, 0), -1);
        assert_eq!(tween(-1, 0), 0);
    }

    #[test]
    fn flicker_alternates_sign() {
        let mut flicker = Flicker::default();
        flicker.set(true, Some(4));
        let first = flicker.offset();
        let second = flicker.offset();
        assert_eq!(first, -second);
        assert_eq!(first.abs(), 4);
    }
}
