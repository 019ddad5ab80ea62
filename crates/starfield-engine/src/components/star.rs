use glam::Vec2;

use super::color::Rgba;

/// Background particle driven by the force model.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Position in pixels, always inside the viewport.
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rest position the home spring pulls toward.
    pub home: Vec2,
    pub size: f32,
    pub color: Rgba,
    /// Set by an impulse; cleared once the deactivation window passes.
    pub active: bool,
    pub last_pushed_ms: Option<f64>,
}

impl Star {
    /// A resting star at `pos`.
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            home: pos,
            size: 1.0,
            color: Rgba::WHITE,
            active: false,
            last_pushed_ms: None,
        }
    }

    // -- Builder pattern --

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_vel(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    /// Mark as impulsed at `now_ms`.
    pub fn activate(&mut self, now_ms: f64) {
        self.active = true;
        self.last_pushed_ms = Some(now_ms);
    }

    /// Clear the active flag once `window_ms` has passed since the last impulse.
    /// Returns true if the star was deactivated by this call.
    pub fn expire(&mut self, now_ms: f64, window_ms: f64) -> bool {
        match self.last_pushed_ms {
            Some(t) if self.active && now_ms - t >= window_ms => {
                self.active = false;
                true
            }
            _ => false,
        }
    }

    /// 1.0 right after an impulse, falling to 0.0 at the end of the window.
    pub fn glow(&self, now_ms: f64, window_ms: f64) -> f32 {
        match self.last_pushed_ms {
            Some(t) if self.active && window_ms > 0.0 => {
                (1.0 - ((now_ms - t) / window_ms) as f32).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_star_rests_at_home() {
        let s = Star::new(Vec2::new(3.0, 4.0));
        assert_eq!(s.home, s.pos);
        assert_eq!(s.vel, Vec2::ZERO);
        assert!(!s.active);
    }

    #[test]
    fn expires_after_window() {
        let mut s = Star::new(Vec2::ZERO);
        s.activate(1000.0);
        assert!(!s.expire(2000.0, 1500.0));
        assert!(s.active);
        assert!(s.expire(2500.0, 1500.0));
        assert!(!s.active);
    }

    #[test]
    fn glow_fades_linearly() {
        let mut s = Star::new(Vec2::ZERO);
        s.activate(0.0);
        assert_eq!(s.glow(0.0, 1000.0), 1.0);
        assert!((s.glow(500.0, 1000.0) - 0.5).abs() < 1e-6);
        assert_eq!(s.glow(2000.0, 1000.0), 0.0);
    }
}
