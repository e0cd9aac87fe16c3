//! Frame clock for the render loop.
//!
//! One source of truth for elapsed time, delta time, and frame count. The
//! optional fixed delta makes stepping deterministic for tests and captures.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! // each frame:
//! let (elapsed, delta) = clock.tick();
//! scene.update(elapsed);
//! ```

use std::time::{Duration, Instant};

/// Elapsed/delta time tracking for the frame loop.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fixed_delta: Option<f32>,
    fps: f32,
    fps_window_start: Instant,
    fps_window_frames: u64,
}

impl FrameClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fixed_delta: None,
            fps: 0.0,
            fps_window_start: now,
            fps_window_frames: 0,
        }
    }

    /// Advance one frame. Returns `(elapsed, delta)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        self.frame_count += 1;

        match self.fixed_delta {
            Some(dt) => {
                self.delta_secs = dt;
                self.elapsed_secs += dt;
            }
            None => {
                self.delta_secs = now.duration_since(self.last_tick).as_secs_f32();
                self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
            }
        }
        self.last_tick = now;

        // FPS over a half-second window.
        self.fps_window_frames += 1;
        let window = now.duration_since(self.fps_window_start);
        if window >= Duration::from_millis(500) {
            self.fps = self.fps_window_frames as f32 / window.as_secs_f32();
            self.fps_window_start = now;
            self.fps_window_frames = 0;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds since the previous tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames ticked so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Recent frames-per-second estimate.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Use a fixed delta per tick instead of wall-clock time.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_tick_advances() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        let (elapsed, delta) = clock.tick();
        assert!(elapsed > 0.0);
        assert!(delta > 0.0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_fixed_delta_is_deterministic() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(1.0 / 60.0));
        for _ in 0..60 {
            clock.tick();
        }
        assert!((clock.elapsed() - 1.0).abs() < 1e-4);
        assert!((clock.delta() - 1.0 / 60.0).abs() < 1e-6);
        assert_eq!(clock.frame(), 60);
    }
}
