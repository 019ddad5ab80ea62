use glam::Vec2;

use super::color::Rgba;
use crate::api::types::{PlanetId, SunId};
use crate::systems::effects::Rng;

/// Small decorative moon around a planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Satellite {
    pub angle: f32,
    pub distance: f32,
    /// Radians per millisecond.
    pub speed: f32,
    pub size: f32,
}

/// A body whose position is derived from its parent sun and orbit angle.
#[derive(Debug, Clone, PartialEq)]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    pub parent: SunId,
    /// Drives the parent sun's size and collision scores.
    pub mass: f32,
    /// Orbit radius in pixels.
    pub orbit_radius: f32,
    pub orbit_angle: f32,
    /// Base angular speed, radians per millisecond.
    pub orbit_speed: f32,
    /// Temporary extra speed from a nearby click; decays to zero.
    pub speed_boost: f32,
    /// Hovered planets hold still.
    pub frozen: bool,
    pub color: Rgba,
    /// Render radius in pixels.
    pub size: f32,
    pub satellites: Vec<Satellite>,
    /// Derived pixel position, rewritten every tick.
    pub pos: Vec2,
}

impl Planet {
    pub fn new(id: PlanetId, parent: SunId, orbit_radius: f32, orbit_speed: f32) -> Self {
        Self {
            id,
            name: String::new(),
            parent,
            mass: 1.0,
            orbit_radius,
            orbit_angle: 0.0,
            orbit_speed,
            speed_boost: 0.0,
            frozen: false,
            color: Rgba::WHITE,
            size: 4.0,
            satellites: Vec::new(),
            pos: Vec2::ZERO,
        }
    }

    // -- Builder pattern --

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.orbit_angle = angle;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Attach `count` satellites with randomized orbits.
    pub fn with_satellites(mut self, count: usize, rng: &mut Rng) -> Self {
        let size = self.size;
        self.satellites = (0..count)
            .map(|i| Satellite {
                angle: rng.angle(),
                distance: size * (2.0 + i as f32 * 0.8) + rng.range(0.0, 2.0),
                speed: rng.range(0.001, 0.003),
                size: rng.range(0.8, 1.6),
            })
            .collect();
        self
    }

    /// Angular speed including any click boost.
    pub fn effective_speed(&self) -> f32 {
        self.orbit_speed + self.speed_boost
    }

    /// Position for a parent at `center` (pixels).
    pub fn position_around(&self, center: Vec2) -> Vec2 {
        center + Vec2::from_angle(self.orbit_angle) * self.orbit_radius
    }

    pub fn satellite_pos(&self, s: &Satellite) -> Vec2 {
        self.pos + Vec2::from_angle(s.angle) * s.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_on_orbit_circle() {
        let p = Planet::new(PlanetId(1), SunId(1), 50.0, 0.001).with_angle(std::f32::consts::FRAC_PI_2);
        let pos = p.position_around(Vec2::new(100.0, 100.0));
        assert!((pos.x - 100.0).abs() < 1e-4);
        assert!((pos.y - 150.0).abs() < 1e-4);
    }

    #[test]
    fn satellites_get_increasing_distance() {
        let mut rng = Rng::new(5);
        let p = Planet::new(PlanetId(1), SunId(1), 50.0, 0.001).with_size(5.0).with_satellites(3, &mut rng);
        assert_eq!(p.satellites.len(), 3);
        assert!(p.satellites[0].distance >= 10.0);
    }
}
