//! Scene generation: stars from viewport area, black holes from fixed
//! descriptions, suns and planets from a `SceneSeed`.

use glam::Vec2;

use crate::api::config::StarfieldConfig;
use crate::api::types::{BlackHoleId, PlanetId, SunId, Viewport};
use crate::components::black_hole::{BlackHole, BlackHoleDesc};
use crate::components::color::palette;
use crate::components::planet::Planet;
use crate::components::seed::SceneSeed;
use crate::components::star::Star;
use crate::components::sun::Sun;
use crate::core::scene::EntityStore;
use crate::core::tuning::PhysicsTuning;
use crate::systems::effects::Rng;
use crate::systems::forces::star_count;
use crate::systems::orbital::update_sun_sizes;

/// Fresh stars for the viewport, resting at random home positions.
pub fn spawn_stars(viewport: Viewport, config: &StarfieldConfig, tuning: &PhysicsTuning, rng: &mut Rng) -> Vec<Star> {
    let count = star_count(
        viewport.width,
        viewport.height,
        config.effective_density(),
        tuning.stars_per_px2,
        tuning.max_stars,
    );
    let colors = palette(config.color_scheme);
    (0..count)
        .map(|_| {
            let color = colors[rng.next_int(colors.len() as u32) as usize];
            let size = (tuning.base_star_size * rng.range(0.5, 1.5) * config.star_size).max(0.1);
            Star::new(rng.point_in(viewport.size())).with_size(size).with_color(color)
        })
        .collect()
}

pub fn spawn_black_holes(viewport: Viewport, config: &StarfieldConfig, tuning: &PhysicsTuning, rng: &mut Rng) -> Vec<BlackHole> {
    BlackHoleDesc::DEFAULTS
        .iter()
        .enumerate()
        .map(|(i, desc)| {
            BlackHole::from_desc(
                BlackHoleId(i as u32 + 1),
                desc,
                viewport.size(),
                config.black_hole_size,
                tuning.accretion_particles,
                tuning.accretion_base_speed,
                rng,
            )
        })
        .collect()
}

/// Suns at the default focus positions (cycled if the seed has more) and
/// their planets, spread in rings around each sun.
pub fn spawn_orbitals(
    seed: &SceneSeed,
    viewport: Viewport,
    tuning: &PhysicsTuning,
    now_ms: f64,
    rng: &mut Rng,
) -> (Vec<Sun>, Vec<Planet>) {
    let suns: Vec<Sun> = seed
        .suns
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let slot = Sun::DEFAULT_POSITIONS[i % Sun::DEFAULT_POSITIONS.len()];
            // Extra suns beyond the four slots are nudged toward the center.
            let ring = (i / Sun::DEFAULT_POSITIONS.len()) as f32;
            let base = slot + (Vec2::splat(0.5) - slot) * (ring * 0.3).min(0.6);
            Sun::spawn(SunId(i as u32 + 1), s.name.clone(), s.color, base, now_ms, tuning, rng)
        })
        .collect();

    let min_dim = viewport.min_dim();
    let mut per_sun = vec![0usize; suns.len()];
    let mut planets = Vec::with_capacity(seed.planets.len());
    for (i, p) in seed.planets.iter().enumerate() {
        let Some(sun) = suns.get(p.sun) else {
            log::warn!("planet '{}' references missing sun {}", p.name, p.sun);
            continue;
        };
        let ring = per_sun[p.sun];
        per_sun[p.sun] += 1;
        let orbit_radius = min_dim * (0.05 + ring as f32 * 0.025);
        let orbit_speed = rng.range(0.0002, 0.0006) / (1.0 + ring as f32 * 0.5);
        let size = 2.5 + p.mass.max(0.0).sqrt();
        let planet = Planet::new(PlanetId(i as u32 + 1), sun.id, orbit_radius, orbit_speed)
            .with_name(p.name.clone())
            .with_mass(p.mass)
            .with_color(p.color)
            .with_size(size)
            .with_angle(rng.angle())
            .with_satellites(rng.next_int(3) as usize, rng);
        planets.push(planet);
    }

    let mut suns = suns;
    update_sun_sizes(&mut suns, &planets, tuning);
    (suns, planets)
}

/// Replace everything in `store` with a freshly generated scene.
pub fn populate(
    store: &mut EntityStore,
    seed: &SceneSeed,
    viewport: Viewport,
    config: &StarfieldConfig,
    tuning: &PhysicsTuning,
    now_ms: f64,
    rng: &mut Rng,
) {
    store.clear();
    store.stars = spawn_stars(viewport, config, tuning, rng);
    store.black_holes = spawn_black_holes(viewport, config, tuning, rng);
    place_orbitals(store, seed, viewport, tuning, now_ms, rng);
    log::debug!(
        "populated scene: {} stars, {} black holes, {} suns, {} planets",
        store.stars.len(),
        store.black_holes.len(),
        store.suns.len(),
        store.planets.len()
    );
}

/// Regenerate only the groups of `store` that are empty, leaving the rest
/// untouched. Returns the number of bodies added.
pub fn fill_missing(
    store: &mut EntityStore,
    seed: &SceneSeed,
    viewport: Viewport,
    config: &StarfieldConfig,
    tuning: &PhysicsTuning,
    now_ms: f64,
    rng: &mut Rng,
) -> usize {
    let before = store.len();
    if store.stars.is_empty() {
        store.stars = spawn_stars(viewport, config, tuning, rng);
    }
    if store.black_holes.is_empty() {
        store.black_holes = spawn_black_holes(viewport, config, tuning, rng);
    }
    if store.suns.is_empty() {
        place_orbitals(store, seed, viewport, tuning, now_ms, rng);
    }
    store.len().saturating_sub(before)
}

/// Replace suns and planets, with planets placed on their orbits.
fn place_orbitals(
    store: &mut EntityStore,
    seed: &SceneSeed,
    viewport: Viewport,
    tuning: &PhysicsTuning,
    now_ms: f64,
    rng: &mut Rng,
) {
    let (suns, mut planets) = spawn_orbitals(seed, viewport, tuning, now_ms, rng);
    for planet in &mut planets {
        if let Some(sun) = suns.iter().find(|s| s.id == planet.parent) {
            planet.pos = planet.position_around(viewport.to_px(sun.pos));
        }
    }
    store.suns = suns;
    store.planets = planets;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_count_matches_density() {
        let vp = Viewport::new(1000.0, 800.0).unwrap();
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(1);
        let stars = spawn_stars(vp, &StarfieldConfig::default(), &tuning, &mut rng);
        assert_eq!(stars.len(), 120);
        assert!(stars.iter().all(|s| vp.contains(s.pos) && s.vel == Vec2::ZERO));
    }

    #[test]
    fn orbitals_follow_seed() {
        let vp = Viewport::new(1000.0, 800.0).unwrap();
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(1);
        let seed = SceneSeed::portfolio();
        let (suns, planets) = spawn_orbitals(&seed, vp, &tuning, 0.0, &mut rng);
        assert_eq!(suns.len(), seed.suns.len());
        assert_eq!(planets.len(), seed.planets.len());
        assert!(planets.iter().all(|p| suns.iter().any(|s| s.id == p.parent)));
        assert!(suns.iter().all(|s| !s.active));
    }

    #[test]
    fn populate_replaces_previous_scene() {
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let tuning = PhysicsTuning::default();
        let config = StarfieldConfig::default();
        let mut rng = Rng::new(1);
        let mut store = EntityStore::new();
        populate(&mut store, &SceneSeed::portfolio(), vp, &config, &tuning, 0.0, &mut rng);
        let first = store.star_count();
        populate(&mut store, &SceneSeed::portfolio(), vp, &config, &tuning, 0.0, &mut rng);
        assert_eq!(store.star_count(), first);
        assert_eq!(store.black_holes.len(), 2);
        assert_eq!(store.suns.len(), 4);
    }

    #[test]
    fn fill_missing_keeps_existing_groups() {
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let tuning = PhysicsTuning::default();
        let config = StarfieldConfig::default();
        let seed = SceneSeed::portfolio();
        let mut rng = Rng::new(1);
        let mut store = EntityStore::new();
        populate(&mut store, &seed, vp, &config, &tuning, 0.0, &mut rng);
        let suns: Vec<Vec2> = store.suns.iter().map(|s| s.pos).collect();
        let stars = store.star_count();

        store.stars.clear();
        assert_eq!(fill_missing(&mut store, &seed, vp, &config, &tuning, 0.0, &mut rng), stars);
        assert_eq!(store.star_count(), stars);
        assert_eq!(store.suns.iter().map(|s| s.pos).collect::<Vec<_>>(), suns);
    }

    #[test]
    fn fill_missing_with_zero_density_adds_nothing() {
        let vp = Viewport::new(800.0, 600.0).unwrap();
        let tuning = PhysicsTuning::default();
        let config = StarfieldConfig {
            star_density: 0.0,
            ..StarfieldConfig::default()
        };
        let seed = SceneSeed::portfolio();
        let mut rng = Rng::new(1);
        let mut store = EntityStore::new();
        populate(&mut store, &seed, vp, &config, &tuning, 0.0, &mut rng);
        assert_eq!(store.star_count(), 0);
        assert!(!store.is_empty());
        assert_eq!(fill_missing(&mut store, &seed, vp, &config, &tuning, 0.0, &mut rng), 0);
    }
}
