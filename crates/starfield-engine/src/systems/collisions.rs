//! Game-mode scoring: active stars striking planets.

use glam::Vec2;

use crate::api::types::PlanetId;
use crate::components::color::Rgba;
use crate::components::planet::Planet;
use crate::components::star::Star;
use crate::core::tuning::PhysicsTuning;

/// One star/planet hit, reported back to the engine for effects and events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    pub planet: PlanetId,
    pub pos: Vec2,
    pub color: Rgba,
    pub score: u32,
    /// Star speed at impact; fast hits get a visual burst.
    pub speed: f32,
}

impl CollisionHit {
    pub fn is_spectacular(&self, tuning: &PhysicsTuning) -> bool {
        self.speed > tuning.collision_effect_speed
    }
}

/// Hit distance for a star of `star_size` against `planet`.
pub fn hit_distance(planet: &Planet, star_size: f32, tuning: &PhysicsTuning) -> f32 {
    tuning.collision_base_distance + star_size * 2.0 + planet.mass / 20.0
}

/// Points awarded for a hit.
pub fn score(planet: &Planet, star: &Star) -> u32 {
    (planet.mass + star.size * 10.0 + star.speed() * 20.0).round().max(0.0) as u32
}

/// Check every active star against every planet. A star scores at most once
/// per tick; it is deactivated and its velocity halved.
pub fn detect_collisions(stars: &mut [Star], planets: &[Planet], tuning: &PhysicsTuning) -> Vec<CollisionHit> {
    let mut hits = Vec::new();
    if planets.is_empty() {
        return hits;
    }
    for star in stars.iter_mut().filter(|s| s.active) {
        let hit = planets.iter().find(|p| {
            let reach = hit_distance(p, star.size, tuning);
            star.pos.distance_squared(p.pos) < reach * reach
        });
        let Some(planet) = hit else { continue };

        hits.push(CollisionHit {
            planet: planet.id,
            pos: star.pos,
            color: planet.color,
            score: score(planet, star),
            speed: star.speed(),
        });
        star.active = false;
        star.vel *= 0.5;
    }
    hits
}
