//! Planet orbits. A planet's position is never integrated: it is recomputed
//! every tick from its parent sun and orbit angle.

use glam::Vec2;

use crate::api::types::PlanetId;
use crate::components::planet::Planet;
use crate::components::sun::Sun;
use crate::core::context::TickContext;
use crate::core::tuning::PhysicsTuning;

/// Advance orbit angles and rewrite derived positions.
/// Planets whose parent no longer exists keep their last position.
pub fn update_planets(planets: &mut [Planet], suns: &[Sun], ctx: &TickContext) {
    let dt = ctx.sun_dt_ms();
    let speed_scale = ctx.config.employee_orbit_speed;
    let decay = ctx.tuning.planet_boost_decay;

    for planet in planets.iter_mut() {
        if !planet.frozen {
            planet.orbit_angle =
                (planet.orbit_angle + planet.effective_speed() * speed_scale * dt).rem_euclid(std::f32::consts::TAU);
        }
        planet.speed_boost *= decay;
        if planet.speed_boost.abs() < 1e-7 {
            planet.speed_boost = 0.0;
        }
        for sat in &mut planet.satellites {
            sat.angle = (sat.angle + sat.speed * dt).rem_euclid(std::f32::consts::TAU);
        }
        let Some(parent) = suns.iter().find(|s| s.id == planet.parent) else {
            continue;
        };
        planet.pos = planet.position_around(ctx.viewport.to_px(parent.pos));
    }
}

/// Boost the orbit speed of planets near a click (pixels), with quadratic
/// falloff. Returns how many planets were affected.
pub fn apply_click_repulsion_to_planets(planets: &mut [Planet], point: Vec2, tuning: &PhysicsTuning) -> usize {
    let radius = tuning.planet_click_radius;
    let mut affected = 0;
    for planet in planets.iter_mut() {
        let dist = planet.pos.distance(point);
        if dist >= radius || dist <= 1.0 {
            continue;
        }
        let falloff = (1.0 - dist / radius).powi(2);
        planet.speed_boost = (planet.speed_boost + tuning.planet_click_boost * falloff).min(tuning.planet_click_boost * 2.0);
        affected += 1;
    }
    affected
}

/// Freeze only the hovered planet; all others resume orbiting.
pub fn set_hovered(planets: &mut [Planet], hovered: Option<PlanetId>) {
    for planet in planets.iter_mut() {
        planet.frozen = Some(planet.id) == hovered;
    }
}

/// Largest orbit radius around a sun, normalized by the viewport's min dimension.
pub fn max_orbit_norm<'a>(planets: impl Iterator<Item = &'a Planet>, min_dim: f32) -> Option<f32> {
    planets
        .map(|p| p.orbit_radius / min_dim.max(1.0))
        .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |a| a.max(r))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StarfieldConfig;
    use crate::api::types::SunId;
    use crate::components::color::Rgba;
    use crate::core::context::fixtures;
    use crate::systems::effects::Rng;

    fn sun_at(pos: Vec2) -> Sun {
        let mut rng = Rng::new(1);
        let mut s = Sun::spawn(SunId(1), "s", Rgba::WHITE, pos, 0.0, &PhysicsTuning::default(), &mut rng);
        s.pos = pos;
        s
    }

    #[test]
    fn position_follows_parent() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let ctx = fixtures::tick(&config, &tuning, 0.0);
        let mut suns = vec![sun_at(Vec2::new(0.5, 0.5))];
        let mut planets = vec![Planet::new(PlanetId(1), SunId(1), 50.0, 0.0)];

        update_planets(&mut planets, &suns, &ctx);
        assert!((planets[0].pos - Vec2::new(450.0, 300.0)).length() < 1e-3);

        suns[0].pos = Vec2::new(0.25, 0.5);
        update_planets(&mut planets, &suns, &ctx);
        assert!((planets[0].pos - Vec2::new(250.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn frozen_planet_holds_its_angle() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let ctx = fixtures::tick(&config, &tuning, 0.0);
        let suns = vec![sun_at(Vec2::new(0.5, 0.5))];
        let mut planets = vec![
            Planet::new(PlanetId(1), SunId(1), 50.0, 0.001),
            Planet::new(PlanetId(2), SunId(1), 80.0, 0.001),
        ];
        set_hovered(&mut planets, Some(PlanetId(1)));
        update_planets(&mut planets, &suns, &ctx);
        assert_eq!(planets[0].orbit_angle, 0.0);
        assert!(planets[1].orbit_angle > 0.0);
    }

    #[test]
    fn click_boost_decays_back_to_base() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let ctx = fixtures::tick(&config, &tuning, 0.0);
        let suns = vec![sun_at(Vec2::new(0.5, 0.5))];
        let mut planets = vec![Planet::new(PlanetId(1), SunId(1), 50.0, 0.001)];
        update_planets(&mut planets, &suns, &ctx);

        let click = planets[0].pos + Vec2::new(20.0, 0.0);
        let hit = apply_click_repulsion_to_planets(&mut planets, click, &tuning);
        assert_eq!(hit, 1);
        assert!(planets[0].effective_speed() > 0.001);
        for _ in 0..500 {
            update_planets(&mut planets, &suns, &ctx);
        }
        assert_eq!(planets[0].speed_boost, 0.0);
    }

    #[test]
    fn max_orbit_of_empty_is_none() {
        assert_eq!(max_orbit_norm(std::iter::empty(), 600.0), None);
        let planets = [
            Planet::new(PlanetId(1), SunId(1), 60.0, 0.0),
            Planet::new(PlanetId(2), SunId(1), 120.0, 0.0),
        ];
        assert_eq!(max_orbit_norm(planets.iter(), 600.0), Some(0.2));
    }
}
