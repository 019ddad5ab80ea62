use glam::Vec2;

use crate::api::types::BlackHoleId;
use crate::systems::effects::Rng;

/// Decorative particle circling a black hole.
#[derive(Debug, Clone, PartialEq)]
pub struct AccretionParticle {
    pub angle: f32,
    /// Orbit distance from the hole's center in pixels.
    pub distance: f32,
    /// Radians per millisecond.
    pub speed: f32,
    pub size: f32,
}

/// Fixed attractor with a capture radius.
#[derive(Debug, Clone, PartialEq)]
pub struct BlackHole {
    pub id: BlackHoleId,
    pub pos: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub particles: Vec<AccretionParticle>,
}

/// Authoring description: normalized position and base radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackHoleDesc {
    pub pos: Vec2,
    pub base_radius: f32,
}

impl BlackHoleDesc {
    pub const DEFAULTS: [BlackHoleDesc; 2] = [
        BlackHoleDesc { pos: Vec2::new(0.2, 0.3), base_radius: 25.0 },
        BlackHoleDesc { pos: Vec2::new(0.8, 0.7), base_radius: 30.0 },
    ];
}

impl BlackHole {
    /// Mass per pixel of radius.
    pub const MASS_PER_RADIUS: f32 = 50.0;

    /// A bare hole with mass derived from radius and no accretion ring.
    pub fn new(id: BlackHoleId, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            radius,
            mass: radius * Self::MASS_PER_RADIUS,
            particles: Vec::new(),
        }
    }

    /// Build from a description placed in a viewport of `size` pixels.
    pub fn from_desc(
        id: BlackHoleId,
        desc: &BlackHoleDesc,
        size: Vec2,
        size_multiplier: f32,
        particle_count: usize,
        base_speed: f32,
        rng: &mut Rng,
    ) -> Self {
        let radius = desc.base_radius * size_multiplier * 0.4;
        let mut hole = Self::new(id, desc.pos * size, radius);
        hole.particles = (0..particle_count)
            .map(|_| AccretionParticle {
                angle: rng.angle(),
                distance: radius * rng.range(1.5, 2.5),
                speed: base_speed * rng.range(0.75, 1.25),
                size: rng.range(0.5, 1.5),
            })
            .collect();
        hole
    }

    /// Distance inside which gravity applies.
    pub fn influence_radius(&self, multiplier: f32) -> f32 {
        self.radius * multiplier
    }

    /// Advance accretion particle angles. The only mutation after creation.
    pub fn spin(&mut self, dt_ms: f32, speed_multiplier: f32) {
        for p in &mut self.particles {
            p.angle = (p.angle + p.speed * speed_multiplier * dt_ms).rem_euclid(std::f32::consts::TAU);
        }
    }

    /// Pixel position of an accretion particle.
    pub fn particle_pos(&self, p: &AccretionParticle) -> Vec2 {
        self.pos + Vec2::from_angle(p.angle) * p.distance
    }
}
