// Scaled simulation clock.
//
// The host measures real frame time and hands it to `tick()`; the clock
// multiplies by the current time scale and accumulates. Nothing in the core
// reads the system clock, so a session replays identically given the same
// sequence of real deltas.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    elapsed: f64,
    time_scale: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            time_scale: 1.0,
        }
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `real_dt` seconds and return the scaled delta. Negative or
    /// non-finite deltas count as zero.
    pub fn tick(&mut self, real_dt: f32) -> f32 {
        let real_dt = if real_dt.is_finite() { real_dt.max(0.0) } else { 0.0 };
        let dt = real_dt * self.time_scale;
        self.elapsed += f64::from(dt);
        dt
    }

    /// Total scaled seconds since the clock started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale. Zero pauses; negative or non-finite values clamp
    /// to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scales_and_accumulates() {
        let mut clock = SimClock::new();
        assert_eq!(clock.tick(0.5), 0.5);
        clock.set_time_scale(2.0);
        assert_eq!(clock.tick(0.25), 0.5);
        assert_eq!(clock.elapsed(), 1.0);
    }

    #[test]
    fn zero_scale_pauses() {
        let mut clock = SimClock::new();
        clock.set_time_scale(0.0);
        assert_eq!(clock.tick(1.0), 0.0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn negative_scale_clamps_to_zero() {
        let mut clock = SimClock::new();
        clock.set_time_scale(-3.0);
        assert_eq!(clock.time_scale(), 0.0);
        clock.set_time_scale(f32::NAN);
        assert_eq!(clock.time_scale(), 0.0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = SimClock::new();
        assert_eq!(clock.tick(-1.0), 0.0);
        assert_eq!(clock.elapsed(), 0.0);
    }
}
