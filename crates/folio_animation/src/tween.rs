//! Scroll position tween
//!
//! Animates a scroll offset from one value to another over a fixed duration,
//! optionally after a delay. Used by viewport hosts to carry out snaps and
//! smooth anchor scrolling.

use crate::easing::Easing;
use crate::values::Interpolate;

/// Time-based tween of a single scroll offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTween {
    from: f32,
    to: f32,
    /// Seconds to wait before moving
    delay: f32,
    /// Seconds spent moving
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl ScrollTween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            delay: 0.0,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Wait `delay` seconds before moving (builder pattern)
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.delay + self.duration
    }

    /// Current offset
    pub fn value(&self) -> f32 {
        let moving = self.elapsed - self.delay;
        if self.is_done() {
            return self.to;
        }
        if moving <= 0.0 {
            return self.from;
        }
        let eased = self.easing.apply(moving / self.duration);
        self.from.lerp(&self.to, eased)
    }

    /// Advance by `dt` seconds and return the new offset
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        self.value()
    }

    /// Restart towards a new target from the current value
    pub fn retarget(&mut self, to: f32, duration: f32) {
        *self = Self::new(self.value(), to, duration, self.easing);
    }
}
