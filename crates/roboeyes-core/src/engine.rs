//! Per-frame tweening engine.
//!
//! [`Eyes`] owns all animation state and advances it one frame at a time.
//! Every numeric property carries a current value (drawn this frame) and a
//! next value (the target); each frame halves the gap with truncating integer
//! division, so motion eases out and never overshoots. Macro-animations
//! (autoblink, idle gaze, flickers, confuse/laugh bursts) only mutate targets
//! or per-frame offsets and piggyback on the same smoothing.
//!
//! All methods take `now_ms` explicitly; hosts pass `timing::ticks_ms()` and
//! tests pass simulated time.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::data::{tween, Burst, EyeGeometry, EyeSelect, EyelidStyle, Flicker, Mood, PeriodicTimer, Position};
use crate::render::{Color, Renderer};
use crate::timing::FrameLimiter;

const LAUGH_AMPLITUDE: i32 = 5;
const CONFUSE_AMPLITUDE: i32 = 20;
const FROZEN_AMPLITUDE: i32 = 2;
const SCARY_AMPLITUDE: i32 = 2;

/// The animated pair of eyes.
pub struct Eyes {
    cfg: Config,
    mood: Mood,
    position: Position,
    eyelid_style: EyelidStyle,
    curious: bool,
    cyclops: bool,

    pub left: EyeGeometry,
    pub right: EyeGeometry,

    pub space_default: i32,
    pub space_current: i32,
    pub space_next: i32,

    // Eyelid mask heights, smoothed like every other property.
    pub tired_height: i32,
    pub tired_height_next: i32,
    pub angry_height: i32,
    pub angry_height_next: i32,
    pub happy_offset: i32,
    pub happy_offset_next: i32,

    pub h_flicker: Flicker,
    pub v_flicker: Flicker,
    pub auto_blink: PeriodicTimer,
    pub idle: PeriodicTimer,
    laugh: Burst,
    confuse: Burst,

    limiter: FrameLimiter,
    rng: SmallRng,
}

impl Eyes {
    pub fn new(cfg: Config) -> Self {
        let rng = SmallRng::from_entropy();
        Self::with_rng(cfg, rng)
    }

    /// Deterministic variant for tests: autoblink slack and idle gaze targets
    /// come from a seeded generator.
    pub fn with_seed(cfg: Config, seed: u64) -> Self {
        Self::with_rng(cfg, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: Config, rng: SmallRng) -> Self {
        let left_x = (cfg.screen_width - (cfg.eye_width + cfg.spacing + cfg.eye_width)) / 2;
        let left_y = (cfg.screen_height - cfg.eye_height) / 2;
        let left = EyeGeometry::closed_at(&cfg, left_x, left_y);
        let right =
            EyeGeometry::closed_at(&cfg, left_x + cfg.eye_width + cfg.spacing, left_y);

        let mut h_flicker = Flicker::default();
        h_flicker.amplitude = 2;
        let mut v_flicker = Flicker::default();
        v_flicker.amplitude = 10;

        let mut auto_blink = PeriodicTimer::default();
        auto_blink.interval_s = 1;
        auto_blink.variation_s = 4;
        let mut idle = PeriodicTimer::default();
        idle.interval_s = 1;
        idle.variation_s = 3;

        Self {
            limiter: FrameLimiter::new(cfg.frame_rate),
            laugh: Burst::new(cfg.laugh_duration_ms),
            confuse: Burst::new(cfg.confuse_duration_ms),
            space_default: cfg.spacing,
            space_current: cfg.spacing,
            space_next: cfg.spacing,
            mood: Mood::Default,
            position: Position::Center,
            eyelid_style: EyelidStyle::None,
            curious: false,
            cyclops: false,
            left,
            right,
            tired_height: 0,
            tired_height_next: 0,
            angry_height: 0,
            angry_height_next: 0,
            happy_offset: 0,
            happy_offset_next: 0,
            h_flicker,
            v_flicker,
            auto_blink,
            idle,
            cfg,
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    // --- geometry setters (update both target and default) ---

    pub fn set_width(&mut self, left: Option<i32>, right: Option<i32>) {
        if let Some(w) = left {
            self.left.width_next = w;
            self.left.width_default = w;
        }
        if let Some(w) = right {
            self.right.width_next = w;
            self.right.width_default = w;
        }
    }

    pub fn set_height(&mut self, left: Option<i32>, right: Option<i32>) {
        if let Some(h) = left {
            self.left.height_next = h;
            self.left.height_default = h;
        }
        if let Some(h) = right {
            self.right.height_next = h;
            self.right.height_default = h;
        }
    }

    pub fn set_border_radius(&mut self, left: Option<i32>, right: Option<i32>) {
        if let Some(r) = left {
            self.left.radius_next = r;
            self.left.radius_default = r;
        }
        if let Some(r) = right {
            self.right.radius_next = r;
            self.right.radius_default = r;
        }
    }

    /// Space between the eyes; may be negative to overlap them.
    pub fn set_spacing(&mut self, space: i32) {
        self.space_next = space;
        self.space_default = space;
    }

    pub fn set_framerate(&mut self, fps: u32) {
        self.limiter.set_fps(fps);
    }

    // --- mood / gaze ---

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Switch the expressive mood. Entering frozen or scary arms the matching
    /// flicker; leaving either disables both. Non-curious moods clear the
    /// curious gaze flag.
    pub fn set_mood(&mut self, mood: Mood) {
        let was_shivering = matches!(self.mood, Mood::Frozen | Mood::Scary);
        let will_shiver = matches!(mood, Mood::Frozen | Mood::Scary);
        if was_shivering && !will_shiver {
            self.h_flicker.set(false, None);
            self.v_flicker.set(false, None);
        }
        if self.curious && mood != Mood::Curious {
            self.curious = false;
        }

        self.eyelid_style = match mood {
            Mood::Tired | Mood::Scary => EyelidStyle::Tired,
            Mood::Angry => EyelidStyle::Angry,
            Mood::Happy => EyelidStyle::Happy,
            _ => EyelidStyle::None,
        };
        match mood {
            Mood::Frozen => {
                self.h_flicker.set(true, Some(FROZEN_AMPLITUDE));
                self.v_flicker.set(false, None);
            }
            Mood::Scary => {
                self.h_flicker.set(false, None);
                self.v_flicker.set(true, Some(SCARY_AMPLITUDE));
            }
            Mood::Curious => self.curious = true,
            _ => {}
        }
        self.mood = mood;
        log::debug!("mood set to {:?}", mood);
    }

    pub fn eyelid_style(&self) -> EyelidStyle {
        self.eyelid_style
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Retarget the gaze to a predefined direction. The left eye's target is
    /// set within the screen constraints; the right eye follows on its own.
    pub fn set_position(&mut self, position: Position) {
        let max_x = self.screen_constraint_x();
        let max_y = self.screen_constraint_y();
        let (x, y) = match position {
            Position::N => (max_x / 2, 0),
            Position::NE => (max_x, 0),
            Position::E => (max_x, max_y / 2),
            Position::SE => (max_x, max_y),
            Position::S => (max_x / 2, max_y),
            Position::SW => (0, max_y),
            Position::W => (0, max_y / 2),
            Position::NW => (0, 0),
            Position::Center => (max_x / 2, max_y / 2),
        };
        self.left.x_next = x;
        self.left.y_next = y;
        self.position = position;
    }

    pub fn is_curious(&self) -> bool {
        self.curious
    }

    pub fn set_curious(&mut self, enabled: bool) {
        self.curious = enabled;
    }

    pub fn is_cyclops(&self) -> bool {
        self.cyclops
    }

    /// Single-eye mode: the right eye collapses to zero size and the left eye
    /// is drawn alone (with split eyelid masks).
    pub fn set_cyclops(&mut self, enabled: bool) {
        self.cyclops = enabled;
    }

    /// Max x for the left eye target given current widths and spacing.
    pub fn screen_constraint_x(&self) -> i32 {
        self.cfg.screen_width
            - self.left.width_current
            - self.space_current
            - self.right.width_current
    }

    /// Max y for the left eye target, based on the default height.
    pub fn screen_constraint_y(&self) -> i32 {
        self.cfg.screen_height - self.left.height_default
    }

    // --- lids ---

    pub fn open(&mut self, which: EyeSelect) {
        if which.left() {
            self.left.open = true;
        }
        if which.right() {
            self.right.open = true;
        }
    }

    pub fn close(&mut self, which: EyeSelect) {
        if which.left() {
            self.left.height_next = 1;
            self.left.open = false;
        }
        if which.right() {
            self.right.height_next = 1;
            self.right.open = false;
        }
    }

    /// Close then reopen; the reopen happens once the lid has fully shut.
    pub fn blink(&mut self, which: EyeSelect) {
        self.close(which);
        self.open(which);
    }

    /// Wink with exactly one eye; disables autoblink and idle so the wink
    /// stays visible. Winking with both eyes is a no-op.
    pub fn wink(&mut self, which: EyeSelect) {
        if which == EyeSelect::Both {
            log::warn!("wink requires a single eye; ignoring");
            return;
        }
        self.auto_blink.active = false;
        self.idle.active = false;
        self.blink(which);
    }

    // --- macro-animations ---

    pub fn set_auto_blinker(&mut self, active: bool, interval_s: Option<u64>, variation_s: Option<u64>) {
        self.auto_blink.set(active, interval_s, variation_s);
    }

    pub fn set_idle_mode(&mut self, active: bool, interval_s: Option<u64>, variation_s: Option<u64>) {
        self.idle.set(active, interval_s, variation_s);
    }

    pub fn horiz_flicker(&mut self, enabled: bool, amplitude: Option<i32>) {
        self.h_flicker.set(enabled, amplitude);
    }

    pub fn vert_flicker(&mut self, enabled: bool, amplitude: Option<i32>) {
        self.v_flicker.set(enabled, amplitude);
    }

    /// Shake the eyes horizontally for the configured duration.
    pub fn confuse(&mut self) {
        self.confuse.fire();
    }

    /// Shake the eyes vertically for the configured duration.
    pub fn laugh(&mut self) {
        self.laugh.fire();
    }

    pub fn is_confused(&self) -> bool {
        self.confuse.is_active()
    }

    pub fn is_laughing(&self) -> bool {
        self.laugh.is_active()
    }

    // --- frame loop ---

    /// Rate-limited frame: draws only when the frame interval has elapsed.
    /// Returns whether a frame was emitted.
    pub fn update(&mut self, now_ms: u64, renderer: &mut dyn Renderer) -> bool {
        if self.limiter.should_update(now_ms) {
            self.tick(now_ms, renderer);
            true
        } else {
            false
        }
    }

    /// One unconditional smoothing-and-draw pass.
    pub fn tick(&mut self, now_ms: u64, renderer: &mut dyn Renderer) {
        self.advance(now_ms);
        self.draw(renderer);
    }

    fn advance(&mut self, now_ms: u64) {
        let margin = self.cfg.curious_edge_margin;
        let bonus = self.cfg.curious_height_bonus;

        // Curious gaze: widen whichever eye approaches its screen edge.
        if self.curious {
            self.left.height_offset = if self.left.x_next <= margin
                || (self.left.x_next >= self.screen_constraint_x() - margin && self.cyclops)
            {
                bonus
            } else {
                0
            };
            self.right.height_offset =
                if self.right.x_next >= self.cfg.screen_width - self.right.width_current - margin {
                    bonus
                } else {
                    0
                };
        } else {
            self.left.height_offset = 0;
            self.right.height_offset = 0;
        }

        // Heights, with vertical recentering as the lid closes.
        self.left.height_current = tween(
            self.left.height_current,
            self.left.height_next + self.left.height_offset,
        );
        self.left.y += (self.left.height_default - self.left.height_current) / 2;
        self.left.y -= self.left.height_offset / 2;
        self.right.height_current = tween(
            self.right.height_current,
            self.right.height_next + self.right.height_offset,
        );
        self.right.y += (self.right.height_default - self.right.height_current) / 2;
        self.right.y -= self.right.height_offset / 2;

        // Reopen once an open-flagged lid has fully shut.
        if self.left.open && self.left.height_current <= 1 + self.left.height_offset {
            self.left.height_next = self.left.height_default;
        }
        if self.right.open && self.right.height_current <= 1 + self.right.height_offset {
            self.right.height_next = self.right.height_default;
        }

        self.left.width_current = tween(self.left.width_current, self.left.width_next);
        self.right.width_current = tween(self.right.width_current, self.right.width_next);
        self.space_current = tween(self.space_current, self.space_next);

        self.left.x = tween(self.left.x, self.left.x_next);
        self.left.y = tween(self.left.y, self.left.y_next);
        // The right eye tracks the left eye plus the (animated) spacing.
        self.right.x_next = self.left.x_next + self.left.width_current + self.space_current;
        self.right.y_next = self.left.y_next;
        self.right.x = tween(self.right.x, self.right.x_next);
        self.right.y = tween(self.right.y, self.right.y_next);

        self.left.radius_current = tween(self.left.radius_current, self.left.radius_next);
        self.right.radius_current = tween(self.right.radius_current, self.right.radius_next);

        // Autoblink: fire, then reschedule with randomized slack.
        if self.auto_blink.due(now_ms) {
            let slack = self.rng.gen_range(0..=self.auto_blink.variation_s);
            self.auto_blink.reschedule(now_ms, slack);
            self.blink(EyeSelect::Both);
        }

        // Laugh: vertical shiver for a fixed duration, then self-disarm.
        if self.laugh.active {
            if self.laugh.armed {
                self.v_flicker.set(true, Some(LAUGH_AMPLITUDE));
                self.laugh.started_ms = now_ms;
                self.laugh.armed = false;
            } else if now_ms.saturating_sub(self.laugh.started_ms) >= self.laugh.duration_ms {
                self.v_flicker.set(false, Some(0));
                self.laugh.armed = true;
                self.laugh.active = false;
            }
        }

        // Confuse: same shape, horizontal.
        if self.confuse.active {
            if self.confuse.armed {
                self.h_flicker.set(true, Some(CONFUSE_AMPLITUDE));
                self.confuse.started_ms = now_ms;
                self.confuse.armed = false;
            } else if now_ms.saturating_sub(self.confuse.started_ms) >= self.confuse.duration_ms {
                self.h_flicker.set(false, Some(0));
                self.confuse.armed = true;
                self.confuse.active = false;
            }
        }

        // Idle gaze: hop to a random on-screen target, reschedule with slack.
        if self.idle.due(now_ms) {
            let max_x = self.screen_constraint_x().max(0);
            let max_y = self.screen_constraint_y().max(0);
            self.left.x_next = self.rng.gen_range(0..=max_x);
            self.left.y_next = self.rng.gen_range(0..=max_y);
            let slack = self.rng.gen_range(0..=self.idle.variation_s);
            self.idle.reschedule(now_ms, slack);
        }

        // Flickers offset the drawn position; smoothing pulls it back, which
        // is what makes it read as a shiver.
        if self.h_flicker.active {
            let dx = self.h_flicker.offset();
            self.left.x += dx;
            self.right.x += dx;
        }
        if self.v_flicker.active {
            let dy = self.v_flicker.offset();
            self.left.y += dy;
            self.right.y += dy;
        }

        if self.cyclops {
            self.right.width_current = 0;
            self.right.height_current = 0;
            self.space_current = 0;
        }
    }

    fn draw(&mut self, renderer: &mut dyn Renderer) {
        let l = &self.left;
        let r = &self.right;

        renderer.fill_rounded_rect(
            l.x,
            l.y,
            l.width_current,
            l.height_current,
            l.radius_current,
            Color::Foreground,
        );
        if !self.cyclops {
            renderer.fill_rounded_rect(
                r.x,
                r.y,
                r.width_current,
                r.height_current,
                r.radius_current,
                Color::Foreground,
            );
        }

        // Mask targets follow the active style; the previous style's mask
        // decays back to zero through the same smoothing.
        self.tired_height_next = if self.eyelid_style == EyelidStyle::Tired {
            self.left.height_current / 2
        } else {
            0
        };
        self.angry_height_next = if self.eyelid_style == EyelidStyle::Angry {
            self.left.height_current / 2
        } else {
            0
        };
        self.happy_offset_next = if self.eyelid_style == EyelidStyle::Happy {
            self.left.height_current / 2
        } else {
            0
        };

        self.tired_height = tween(self.tired_height, self.tired_height_next);
        self.angry_height = tween(self.angry_height, self.angry_height_next);
        self.happy_offset = tween(self.happy_offset, self.happy_offset_next);

        let l = &self.left;
        let r = &self.right;
        let (lx, ly, lw) = (l.x, l.y, l.width_current);
        let (rx, ry, rw) = (r.x, r.y, r.width_current);

        // Tired lids: triangles drooping from the outer corners.
        let th = self.tired_height;
        if !self.cyclops {
            renderer.fill_triangle(lx, ly - 1, lx + lw, ly - 1, lx, ly + th - 1, Color::Background);
            renderer.fill_triangle(
                rx,
                ry - 1,
                rx + rw,
                ry - 1,
                rx + rw,
                ry + th - 1,
                Color::Background,
            );
        } else {
            renderer.fill_triangle(
                lx,
                ly - 1,
                lx + lw / 2,
                ly - 1,
                lx,
                ly + th - 1,
                Color::Background,
            );
            renderer.fill_triangle(
                lx + lw / 2,
                ly - 1,
                lx + lw,
                ly - 1,
                lx + lw,
                ly + th - 1,
                Color::Background,
            );
        }

        // Angry lids: mirror image, drooping toward the nose.
        let ah = self.angry_height;
        if !self.cyclops {
            renderer.fill_triangle(
                lx,
                ly - 1,
                lx + lw,
                ly - 1,
                lx + lw,
                ly + ah - 1,
                Color::Background,
            );
            renderer.fill_triangle(rx, ry - 1, rx + rw, ry - 1, rx, ry + ah - 1, Color::Background);
        } else {
            renderer.fill_triangle(
                lx,
                ly - 1,
                lx + lw / 2,
                ly - 1,
                lx + lw / 2,
                ly + ah - 1,
                Color::Background,
            );
            renderer.fill_triangle(
                lx + lw / 2,
                ly - 1,
                lx + lw,
                ly - 1,
                lx + lw / 2,
                ly + ah - 1,
                Color::Background,
            );
        }

        // Happy lids: a background rectangle rising over the bottom half.
        let ho = self.happy_offset;
        renderer.fill_rounded_rect(
            lx - 1,
            (ly + l.height_current) - ho + 1,
            lw + 2,
            l.height_default,
            l.radius_current,
            Color::Background,
        );
        if !self.cyclops {
            renderer.fill_rounded_rect(
                rx - 1,
                (ry + r.height_current) - ho + 1,
                rw + 2,
                r.height_default,
                r.radius_current,
                Color::Background,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullRenderer;

    #[test]
    fn initial_layout_is_centered_and_closed() {
        let eyes = Eyes::with_seed(Config::default(), 7);
        assert_eq!(eyes.left.x, (128 - (36 + 10 + 36)) / 2);
        assert_eq!(eyes.left.y, (64 - 36) / 2);
        assert_eq!(eyes.left.height_current, 1);
        assert_eq!(eyes.right.x, eyes.left.x + 36 + 10);
    }

    #[test]
    fn mood_switch_updates_eyelid_style() {
        let mut eyes = Eyes::with_seed(Config::default(), 7);
        eyes.set_mood(Mood::Tired);
        assert_eq!(eyes.eyelid_style(), EyelidStyle::Tired);
        eyes.set_mood(Mood::Angry);
        assert_eq!(eyes.eyelid_style(), EyelidStyle::Angry);
        eyes.set_mood(Mood::Scary);
        assert_eq!(eyes.eyelid_style(), EyelidStyle::Tired);
        assert!(eyes.v_flicker.active);
        eyes.set_mood(Mood::Default);
        assert!(!eyes.v_flicker.active);
        assert!(!eyes.h_flicker.active);
    }

    #[test]
    fn curious_clears_on_other_mood() {
        let mut eyes = Eyes::with_seed(Config::default(), 7);
        eyes.set_mood(Mood::Curious);
        assert!(eyes.is_curious());
        eyes.set_mood(Mood::Happy);
        assert!(!eyes.is_curious());
    }

    #[test]
    fn wink_with_both_eyes_is_ignored() {
        let mut eyes = Eyes::with_seed(Config::default(), 7);
        eyes.open(EyeSelect::Both);
        let mut renderer = NullRenderer;
        for t in 0..20 {
            eyes.tick(t * 50, &mut renderer);
        }
        let height = eyes.left.height_current;
        eyes.wink(EyeSelect::Both);
        assert_eq!(eyes.left.height_next, eyes.left.height_default);
        assert_eq!(eyes.left.height_current, height);
    }
}
