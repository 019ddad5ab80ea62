//! Sub-particles of a click burst or collision effect.

use glam::Vec2;

/// A single effect particle. Effects own their particles; a particle has no
/// lifetime of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub alpha: f32,
}

impl EffectParticle {
    pub fn new(pos: Vec2, vel: Vec2, size: f32) -> Self {
        Self { pos, vel, size, alpha: 1.0 }
    }

    /// Advect by `nd` normalized frames: move, apply gravity, decay velocity.
    pub fn advect(&mut self, nd: f32, gravity: f32, decay: f32) {
        self.pos += self.vel * nd;
        self.vel.y += gravity * nd;
        self.vel *= decay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advect_moves_and_slows() {
        let mut p = EffectParticle::new(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0);
        p.advect(0.1, 0.0, 0.5);
        assert_eq!(p.pos, Vec2::new(1.0, 0.0));
        assert_eq!(p.vel, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn gravity_pulls_down() {
        let mut p = EffectParticle::new(Vec2::ZERO, Vec2::ZERO, 2.0);
        p.advect(1.0, 0.5, 1.0);
        assert!(p.vel.y > 0.0);
    }
}
