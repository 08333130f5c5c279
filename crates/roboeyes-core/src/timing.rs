//! Millisecond tick helpers and a frame-rate limiter.
//!
//! Every core API takes `now_ms: u64` explicitly so tests can drive simulated
//! time; `ticks_ms()` is the wall source hosts feed into the loop.

use std::sync::OnceLock;
use std::time::Instant;

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Milliseconds elapsed since the first call in this process. Monotonic.
pub fn ticks_ms() -> u64 {
    epoch().elapsed().as_millis() as u64
}

/// Signed difference between two tick values (`a - b`).
pub fn ticks_diff(a: u64, b: u64) -> i64 {
    a as i64 - b as i64
}

/// Add a millisecond delta to a tick value.
pub fn ticks_add(ticks: u64, delta_ms: u64) -> u64 {
    ticks.saturating_add(delta_ms)
}

/// Gate that admits at most one frame per interval.
#[derive(Clone, Copy, Debug)]
pub struct FrameLimiter {
    interval_ms: u64,
    last_frame_ms: u64,
}

impl FrameLimiter {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval_ms: interval_for(target_fps),
            last_frame_ms: 0,
        }
    }

    pub fn set_fps(&mut self, target_fps: u32) {
        self.interval_ms = interval_for(target_fps);
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// True when the interval has elapsed; records `now_ms` as the new frame
    /// time when it has. The first call always admits a frame.
    pub fn should_update(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_frame_ms) >= self.interval_ms || self.last_frame_ms == 0
        {
            self.last_frame_ms = now_ms;
            true
        } else {
            false
        }
    }
}

fn interval_for(target_fps: u32) -> u64 {
    if target_fps == 0 {
        log::warn!("frame rate of 0 requested; clamping to 1 fps");
        1000
    } else {
        1000 / target_fps as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_admits_on_interval() {
        let mut limiter = FrameLimiter::new(20); // 50ms interval
        assert!(limiter.should_update(1));
        assert!(!limiter.should_update(30));
        assert!(limiter.should_update(51));
        assert!(!limiter.should_update(52));
    }

    #[test]
    fn diff_is_signed() {
        assert_eq!(ticks_diff(10, 30), -20);
        assert_eq!(ticks_diff(30, 10), 20);
        assert_eq!(ticks_add(10, 5), 15);
    }
}
