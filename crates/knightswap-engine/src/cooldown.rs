//! Swap cooldown timer.
//!
//! A single countdown owned by the [`SwitchController`](crate::switch::SwitchController).
//! It starts ready, is decremented by elapsed time every tick and reset to
//! the configured duration after each completed swap.

/// Countdown in seconds between swaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    duration: f32,
    remaining: f32,
}

impl Cooldown {
    /// A ready cooldown that resets to `duration` seconds.
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    /// Advance by `dt` seconds. Non-finite or negative steps are ignored.
    pub fn tick(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }
}
