//! Force model for background stars.
//!
//! Each tick a star sums four accelerations (black holes, sun wells, flow
//! swirl, pointer repulsion), then integrates with semi-implicit Euler:
//! velocity first, damping, home spring, speed ceiling, then position.
//! Positions wrap around the viewport edges.

use glam::Vec2;

use crate::components::black_hole::BlackHole;
use crate::components::star::Star;
use crate::core::context::TickContext;
use crate::systems::effects::Rng;

/// A point mass stars feel inside an annulus (a sun and its planets).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityWell {
    /// Pixel position.
    pub pos: Vec2,
    pub mass: f32,
}

/// What happened during one star pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForceReport {
    /// Stars swallowed by a black hole and respawned.
    pub captured: usize,
    /// Stars whose state went non-finite and were reset home.
    pub repaired: usize,
    /// Stars that fell back to inactive this tick.
    pub deactivated: usize,
}

/// Advance every star by one tick.
pub fn update_stars(
    stars: &mut [Star],
    holes: &[BlackHole],
    wells: &[GravityWell],
    ctx: &TickContext,
    rng: &mut Rng,
) -> ForceReport {
    let mut report = ForceReport::default();
    let nd = ctx.star_delta();
    let size = ctx.viewport.size();
    let config = ctx.config;
    let tuning = ctx.tuning;

    for star in stars.iter_mut() {
        if star.expire(ctx.now_ms, tuning.deactivation_ms) {
            report.deactivated += 1;
        }

        let mut acc = Vec2::ZERO;

        if config.enable_black_holes {
            match black_hole_pull(star.pos, holes, ctx) {
                Pull::Captured => {
                    respawn(star, size, rng);
                    report.captured += 1;
                    continue;
                }
                Pull::Force(f) => acc += f,
            }
        }
        if config.enable_employee_stars {
            acc += well_pull(star.pos, wells, ctx);
        }
        if config.enable_flow_effect {
            acc += flow(star.pos, ctx);
        }
        if let Some(pointer) = ctx.pointer() {
            acc += pointer_repulsion(star.pos, pointer, ctx);
        }

        star.vel += acc * nd;
        let damping = if star.active { tuning.damping_active } else { tuning.damping_inactive };
        star.vel *= damping.powf(nd);
        star.vel += wrapped_delta(star.home, star.pos, size) * tuning.home_spring * nd;
        star.vel = star.vel.clamp_length_max(tuning.speed_ceiling(config.max_velocity, star.active));
        star.pos += star.vel * nd * config.animation_speed * tuning.position_scale;
        star.pos = wrap(star.pos, size);

        if !(star.pos.is_finite() && star.vel.is_finite()) {
            star.home = wrap(star.home, size);
            star.pos = star.home;
            star.vel = Vec2::ZERO;
            star.active = false;
            report.repaired += 1;
        }
    }

    if report.repaired > 0 {
        log::warn!("reset {} stars with non-finite state", report.repaired);
    }
    report
}

/// One-shot radial impulse. Every star strictly inside `radius` of `point`
/// gets `force * (1 - d/radius)` along the outward direction and is marked
/// active. Kicked speeds are capped at `max_speed`. Returns the number of
/// stars affected.
pub fn apply_force(
    stars: &mut [Star],
    point: Vec2,
    radius: f32,
    force: f32,
    max_speed: f32,
    now_ms: f64,
    rng: &mut Rng,
) -> usize {
    if radius.is_nan() || radius <= 0.0 || !point.is_finite() || !force.is_finite() {
        return 0;
    }
    let mut affected = 0;
    for star in stars.iter_mut() {
        let offset = star.pos - point;
        let dist = offset.length();
        if dist >= radius {
            continue;
        }
        let dir = if dist > 1e-4 { offset / dist } else { rng.unit_vec() };
        star.vel = (star.vel + dir * force * (1.0 - dist / radius)).clamp_length_max(max_speed);
        star.activate(now_ms);
        affected += 1;
    }
    affected
}

/// Number of stars for a viewport and density.
pub fn star_count(width: f32, height: f32, density: f32, per_px2: f32, max: usize) -> usize {
    let n = (width * height * per_px2 * density).floor();
    if n.is_finite() && n > 0.0 {
        (n as usize).min(max)
    } else {
        0
    }
}

/// Wrap a position into `[0, size)` on both axes.
pub fn wrap(p: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(wrap_axis(p.x, size.x), wrap_axis(p.y, size.y))
}

fn wrap_axis(v: f32, extent: f32) -> f32 {
    let r = v.rem_euclid(extent);
    // rem_euclid rounds up to `extent` for tiny negative inputs.
    if r >= extent || !r.is_finite() {
        0.0
    } else {
        r
    }
}

/// Shortest displacement from `from` to `to` on the torus.
fn wrapped_delta(to: Vec2, from: Vec2, size: Vec2) -> Vec2 {
    let mut d = to - from;
    if d.x > size.x * 0.5 {
        d.x -= size.x;
    } else if d.x < -size.x * 0.5 {
        d.x += size.x;
    }
    if d.y > size.y * 0.5 {
        d.y -= size.y;
    } else if d.y < -size.y * 0.5 {
        d.y += size.y;
    }
    d
}

enum Pull {
    Captured,
    Force(Vec2),
}

fn black_hole_pull(pos: Vec2, holes: &[BlackHole], ctx: &TickContext) -> Pull {
    let tuning = ctx.tuning;
    let mut acc = Vec2::ZERO;
    for hole in holes {
        let delta = hole.pos - pos;
        let dist = delta.length();
        if dist < hole.radius {
            return Pull::Captured;
        }
        if dist < hole.influence_radius(tuning.black_hole_influence) {
            let dist_sq = (dist * dist).max(tuning.black_hole_min_dist_sq);
            let magnitude = tuning.black_hole_force * ctx.config.gravitational_pull * hole.mass / dist_sq;
            acc += delta / dist * magnitude;
        }
    }
    Pull::Force(acc)
}

fn well_pull(pos: Vec2, wells: &[GravityWell], ctx: &TickContext) -> Vec2 {
    let tuning = ctx.tuning;
    let min_dim = ctx.viewport.min_dim();
    let inner = tuning.sun_gravity_inner * min_dim;
    let outer = tuning.sun_gravity_outer * min_dim;
    let mut acc = Vec2::ZERO;
    for well in wells {
        let delta = well.pos - pos;
        let dist = delta.length();
        if dist <= inner || dist >= outer {
            continue;
        }
        let magnitude = tuning.sun_gravity_force * ctx.config.gravitational_pull * well.mass / (dist * dist);
        acc += delta / dist * magnitude;
    }
    acc
}

fn flow(pos: Vec2, ctx: &TickContext) -> Vec2 {
    let tuning = ctx.tuning;
    let center = ctx.viewport.center();
    let min_dim = ctx.viewport.min_dim();
    let radial = pos - center;
    let dist = radial.length();
    let band = tuning.flow_band * min_dim;
    let off_ring = (dist - tuning.flow_content_radius * min_dim).abs();
    if dist <= f32::EPSILON || off_ring >= band {
        return Vec2::ZERO;
    }
    let tangent = (radial / dist).perp();
    let side = if pos.x < center.x { 1.0 } else { -1.0 };
    tangent * side * tuning.flow_force * ctx.config.flow_strength * (1.0 - off_ring / band)
}

fn pointer_repulsion(pos: Vec2, pointer: Vec2, ctx: &TickContext) -> Vec2 {
    let radius = ctx.config.mouse_effect_radius;
    let away = pos - pointer;
    let dist = away.length();
    if radius <= 0.0 || dist >= radius || dist <= f32::EPSILON {
        return Vec2::ZERO;
    }
    // Inverse with the distance, reaching zero at the radius edge.
    let push = ctx.tuning.pointer_repel_force * (radius / dist.max(1.0) - 1.0);
    let falloff = 1.0 - dist / radius;
    away / dist * push + ctx.input.speed * ctx.tuning.pointer_velocity_blend * falloff
}

fn respawn(star: &mut Star, size: Vec2, rng: &mut Rng) {
    let pos = rng.point_in(size);
    star.pos = pos;
    star.home = pos;
    star.vel = Vec2::ZERO;
    star.active = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::StarfieldConfig;
    use crate::api::types::BlackHoleId;
    use crate::core::context::fixtures;
    use crate::core::tuning::PhysicsTuning;

    fn scattered(rng: &mut Rng, n: usize, size: Vec2) -> Vec<Star> {
        (0..n)
            .map(|_| Star::new(rng.point_in(size)).with_vel(Vec2::new(rng.range(-40.0, 40.0), rng.range(-40.0, 40.0))))
            .collect()
    }

    #[test]
    fn stars_stay_in_bounds() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(42);
        let size = Vec2::new(800.0, 600.0);
        let mut stars = scattered(&mut rng, 300, size);
        for s in stars.iter_mut().step_by(3) {
            s.activate(0.0);
        }
        let holes = vec![BlackHole::new(BlackHoleId(1), Vec2::new(160.0, 180.0), 10.0)];
        let wells = [GravityWell { pos: Vec2::new(400.0, 300.0), mass: 20.0 }];

        for tick in 0..600 {
            let mut ctx = fixtures::tick(&config, &tuning, tick as f64 * 16.0);
            ctx.input.on_screen = true;
            ctx.input.pointer = Vec2::new(790.0, 5.0);
            ctx.input.speed = Vec2::new(30.0, -30.0);
            update_stars(&mut stars, &holes, &wells, &ctx, &mut rng);
            for s in &stars {
                assert!(
                    s.pos.x >= 0.0 && s.pos.x < 800.0 && s.pos.y >= 0.0 && s.pos.y < 600.0,
                    "star escaped at tick {}: {:?}",
                    tick,
                    s.pos
                );
            }
        }
    }

    #[test]
    fn speed_never_exceeds_ceiling() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(9);
        let size = Vec2::new(800.0, 600.0);
        let mut stars = scattered(&mut rng, 200, size);
        for s in stars.iter_mut().step_by(2) {
            s.activate(0.0);
        }
        let holes = vec![BlackHole::new(BlackHoleId(1), Vec2::new(400.0, 300.0), 12.0)];

        for tick in 0..200 {
            let ctx = fixtures::tick(&config, &tuning, tick as f64 * 16.0);
            update_stars(&mut stars, &holes, &[], &ctx, &mut rng);
            for s in &stars {
                let ceiling = tuning.speed_ceiling(config.max_velocity, s.active);
                assert!(
                    s.speed() <= ceiling + 1e-4,
                    "speed {} above ceiling {} (active={})",
                    s.speed(),
                    ceiling,
                    s.active
                );
            }
        }
    }

    #[test]
    fn apply_force_counts_only_stars_in_radius() {
        let mut rng = Rng::new(1);
        let inside = [Vec2::new(100.0, 100.0), Vec2::new(130.0, 100.0), Vec2::new(100.0, 60.0)];
        let outside = [Vec2::new(151.0, 100.0), Vec2::new(300.0, 300.0), Vec2::new(100.0, 150.0)];
        let mut stars: Vec<Star> = inside.iter().chain(outside.iter()).map(|&p| Star::new(p)).collect();

        let affected = apply_force(&mut stars, Vec2::new(100.0, 100.0), 50.0, 5.0, f32::MAX, 10.0, &mut rng);

        assert_eq!(affected, 3);
        for s in &stars[..3] {
            assert_ne!(s.vel, Vec2::ZERO, "star at {:?} should have been kicked", s.pos);
            assert!(s.active);
            assert_eq!(s.last_pushed_ms, Some(10.0));
        }
        for s in &stars[3..] {
            assert_eq!(s.vel, Vec2::ZERO);
            assert!(!s.active);
        }
    }

    #[test]
    fn apply_force_pushes_outward_with_falloff() {
        let mut rng = Rng::new(1);
        let mut stars = vec![Star::new(Vec2::new(110.0, 100.0)), Star::new(Vec2::new(140.0, 100.0))];
        apply_force(&mut stars, Vec2::new(100.0, 100.0), 50.0, 10.0, f32::MAX, 0.0, &mut rng);
        assert!(stars[0].vel.x > stars[1].vel.x && stars[1].vel.x > 0.0);
        assert!((stars[0].vel.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn apply_force_caps_kicked_speed() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let ceiling = tuning.speed_ceiling(config.max_velocity, true);
        let mut rng = Rng::new(1);
        let mut stars = vec![
            Star::new(Vec2::new(101.0, 100.0)),
            Star::new(Vec2::new(100.0, 100.0)).with_vel(Vec2::new(ceiling, 0.0)),
        ];
        let affected = apply_force(&mut stars, Vec2::new(100.0, 100.0), 50.0, 1.0e6, ceiling, 0.0, &mut rng);
        assert_eq!(affected, 2);
        for s in &stars {
            assert!(s.speed() <= ceiling + 1e-3, "speed {} above {}", s.speed(), ceiling);
        }
    }

    #[test]
    fn black_hole_captures_nearby_star() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(5);
        let hole = BlackHole::new(BlackHoleId(1), Vec2::new(400.0, 300.0), 20.0);
        let old = Vec2::new(405.0, 300.0);
        let mut stars = vec![Star::new(old).with_vel(Vec2::new(0.3, 0.1))];

        let ctx = fixtures::tick(&config, &tuning, 16.0);
        let report = update_stars(&mut stars, &[hole], &[], &ctx, &mut rng);

        assert_eq!(report.captured, 1);
        assert_ne!(stars[0].pos, old);
        assert_eq!(stars[0].vel, Vec2::ZERO);
        assert_eq!(stars[0].home, stars[0].pos);
    }

    #[test]
    fn disabled_black_holes_do_not_capture() {
        let config = StarfieldConfig { enable_black_holes: false, ..Default::default() };
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(5);
        let hole = BlackHole::new(BlackHoleId(1), Vec2::new(400.0, 300.0), 20.0);
        let mut stars = vec![Star::new(Vec2::new(405.0, 300.0))];
        let ctx = fixtures::tick(&config, &tuning, 16.0);
        assert_eq!(update_stars(&mut stars, &[hole], &[], &ctx, &mut rng).captured, 0);
    }

    #[test]
    fn pointer_pushes_stars_away() {
        let config = StarfieldConfig { enable_flow_effect: false, ..Default::default() };
        let tuning = PhysicsTuning::default();
        let mut rng = Rng::new(5);
        let mut stars = vec![Star::new(Vec2::new(420.0, 300.0))];
        let mut ctx = fixtures::tick(&config, &tuning, 16.0);
        ctx.input.on_screen = true;
        ctx.input.pointer = Vec2::new(400.0, 300.0);
        update_stars(&mut stars, &[], &[], &ctx, &mut rng);
        assert!(stars[0].vel.x > 0.0, "vel was {:?}", stars[0].vel);
    }

    #[test]
    fn flow_swirls_in_opposite_directions_on_each_side() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let ctx = fixtures::tick(&config, &tuning, 0.0);
        // Content ring radius is 0.3 * 600 = 180 px around (400, 300).
        let left = flow(Vec2::new(220.0, 300.0), &ctx);
        let right = flow(Vec2::new(580.0, 300.0), &ctx);
        assert!(left.length() > 0.0 && right.length() > 0.0);
        assert!(left.y * right.y > 0.0, "left {:?} right {:?}", left, right);
        assert_eq!(flow(Vec2::new(400.0, 300.0), &ctx), Vec2::ZERO);
    }

    #[test]
    fn wells_only_pull_inside_annulus() {
        let config = StarfieldConfig::default();
        let tuning = PhysicsTuning::default();
        let ctx = fixtures::tick(&config, &tuning, 0.0);
        let well = [GravityWell { pos: Vec2::new(400.0, 300.0), mass: 10.0 }];
        assert_eq!(well_pull(Vec2::new(405.0, 300.0), &well, &ctx), Vec2::ZERO);
        assert!(well_pull(Vec2::new(500.0, 300.0), &well, &ctx).x < 0.0);
        assert_eq!(well_pull(Vec2::new(790.0, 300.0), &well, &ctx), Vec2::ZERO);
    }

    #[test]
    fn wrap_handles_edges_and_negatives() {
        let size = Vec2::new(100.0, 50.0);
        assert_eq!(wrap(Vec2::new(100.0, 50.0), size), Vec2::ZERO);
        assert_eq!(wrap(Vec2::new(-1.0, -1.0), size), Vec2::new(99.0, 49.0));
        let tiny = wrap(Vec2::new(-1e-9, 0.0), size);
        assert!(tiny.x < 100.0);
    }

    #[test]
    fn star_count_scales_with_area() {
        assert_eq!(star_count(1000.0, 1000.0, 1.0, 0.00015, 2000), 150);
        assert_eq!(star_count(1000.0, 1000.0, 0.0, 0.00015, 2000), 0);
        assert_eq!(star_count(1e5, 1e5, 1.0, 0.00015, 2000), 2000);
    }
}
