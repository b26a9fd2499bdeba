//! A color that fades towards its target over time.

use std::time::{Duration, Instant};

use crate::types::Color;

/// A color animated linearly from its previous value to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedColor {
    from: Color,
    to: Color,
    started: Option<Instant>,
    duration: Duration,
}

impl AnimatedColor {
    /// Creates a color resting at `color`.
    pub fn new(color: Color, duration: Duration) -> Self {
        Self {
            from: color,
            to: color,
            started: None,
            duration,
        }
    }

    /// The color the animation is heading towards.
    pub fn target(&self) -> Color {
        self.to
    }

    /// Sets a new target, starting the fade from the current value at `now`.
    ///
    /// Setting the current target again does nothing.
    pub fn set_target(&mut self, target: Color, now: Instant) {
        if target == self.to {
            return
        }
        self.from = self.value(now);
        self.to = target;
        self.started = (!self.duration.is_zero()).then_some(now);
    }

    /// Changes the fade duration of future animations.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Jumps straight to `color`.
    pub fn warp(&mut self, color: Color) {
        *self = Self::new(color, self.duration);
    }

    /// The value of the color at `now`.
    pub fn value(&self, now: Instant) -> Color {
        match self.started {
            Some(start) => {
                let t = now.saturating_duration_since(start).as_secs_f32()
                    / self.duration.as_secs_f32();
                self.from.lerp(self.to, t)
            }
            None => self.to,
        }
    }

    /// Whether the color is still changing at `now`.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.started
            .is_some_and(|start| now.saturating_duration_since(start) < self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade() {
        let black = Color::from_hex(0x000000ff);
        let t0 = Instant::now();
        let mut color = AnimatedColor::new(black, Duration::from_millis(100));

        color.set_target(Color::WHITE, t0);
        assert!(color.is_animating(t0 + Duration::from_millis(50)));
        assert_eq!(color.value(t0), black);
        assert_eq!(color.value(t0 + Duration::from_millis(50)).rgba(), (128, 128, 128, 255));
        assert_eq!(color.value(t0 + Duration::from_millis(150)), Color::WHITE);
        assert!(!color.is_animating(t0 + Duration::from_millis(150)));
    }

    #[test]
    fn test_zero_duration_snaps() {
        let mut color = AnimatedColor::new(Color::WHITE, Duration::ZERO);
        color.set_target(Color::from_hex(0xff0000ff), Instant::now());

        assert_eq!(color.value(Instant::now()), Color::from_hex(0xff0000ff));
        assert!(!color.is_animating(Instant::now()));
    }
}
