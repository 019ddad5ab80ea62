//! Sun motion: staggered activation, sinusoidal drift, click and mutual
//! repulsion, and containment. All positions are normalized (0..1).

use glam::Vec2;

use crate::api::types::SunId;
use crate::components::planet::Planet;
use crate::components::sun::Sun;
use crate::core::context::TickContext;
use crate::core::tuning::PhysicsTuning;

/// Advance every sun by one tick.
///
/// Neighbour positions and activation flags are read from a copy taken at
/// the start of the pass, so the result does not depend on sun order.
pub fn update_suns(suns: &mut [Sun], ctx: &TickContext) {
    let t = ctx.tuning;
    let dt = ctx.sun_dt_ms();
    let before: Vec<(SunId, Vec2, bool)> = suns.iter().map(|s| (s.id, s.pos, s.active)).collect();

    for sun in suns.iter_mut() {
        // 1. Activation
        if !sun.active {
            let due = ctx.now_ms >= sun.activation_at_ms;
            let triggered = before.iter().any(|&(id, pos, active)| {
                active && id != sun.id && pos.distance(sun.pos) < t.activation_trigger_radius
            });
            if due || triggered {
                sun.active = true;
                log::debug!("sun {:?} activated ({})", sun.id, if due { "timer" } else { "cascade" });
            } else {
                continue;
            }
        }

        // 2. Drift
        for axis in &mut sun.drift {
            axis.advance(dt);
        }
        let target = sun.drift_target();
        sun.pos += (target - sun.pos) * t.drift_blend;

        // 3. Click repulsion
        sun.vel += sun.click_repulsion;
        sun.click_repulsion *= t.click_repulsion_decay;
        if sun.click_repulsion.length() < t.click_repulsion_cutoff {
            sun.click_repulsion = Vec2::ZERO;
        }

        // 4. Center repulsion
        let from_center = sun.pos - t.center;
        let center_dist = from_center.length();
        if center_dist < t.center_repulsion_radius {
            let dir = if center_dist > t.min_distance_threshold {
                from_center / center_dist
            } else {
                fallback_dir(sun.base - t.center)
            };
            let depth = (t.center_repulsion_radius - center_dist) / t.center_repulsion_radius;
            sun.vel += dir * t.center_repulsion_strength * depth;
        }

        // 5. Mutual repulsion
        for &(id, other, _) in &before {
            if id == sun.id {
                continue;
            }
            let away = sun.pos - other;
            let dist = away.length();
            if dist < t.propel_threshold && dist > t.min_distance_threshold {
                let depth = (t.propel_threshold - dist) / t.propel_threshold;
                sun.pos += away / dist * depth * t.propel_push;
                sun.propel(t.propel_duration_ticks);
                sun.rotation_speed = (sun.rotation_speed + t.rotation_boost * dt).min(t.max_rotation_speed);
            }
        }

        // 6. Damping + integration
        sun.vel *= t.velocity_damping;
        sun.pos += sun.vel * t.velocity_weight;

        // 7. Propel timer / rotation decay
        if sun.propel_timer > 0 {
            sun.propel_timer -= 1;
            if sun.propel_timer == 0 {
                sun.propelling = false;
            }
        } else {
            sun.propelling = false;
            sun.rotation_speed = (sun.rotation_speed * t.rotation_decay).max(t.base_rotation_speed);
        }
        sun.rotation = (sun.rotation + sun.rotation_speed * dt).rem_euclid(std::f32::consts::TAU);

        // 8. Bounds
        contain(sun, t.sun_padding);
    }
}

/// Push suns away from a normalized click point. Returns how many were hit.
pub fn apply_click_repulsion(suns: &mut [Sun], point: Vec2, tuning: &PhysicsTuning) -> usize {
    if !point.is_finite() {
        return 0;
    }
    let radius = tuning.click_repulsion_radius;
    let mut affected = 0;
    for sun in suns.iter_mut() {
        let away = sun.pos - point;
        let dist = away.length();
        if dist >= radius {
            continue;
        }
        let dir = if dist > tuning.min_distance_threshold {
            away / dist
        } else {
            fallback_dir(sun.base - point)
        };
        let strength = tuning.click_repulsion_force * (1.0 - dist / radius);
        sun.push_click(dir * strength, tuning.max_click_repulsion);
        if !sun.active {
            sun.active = true;
        }
        sun.propel(tuning.propel_duration_ticks);
        affected += 1;
    }
    affected
}

/// Derive sun sizes from the mass of their planets: min-max normalize the
/// totals, then map through a square root into `tuning.sun_size_range`.
pub fn update_sun_sizes(suns: &mut [Sun], planets: &[Planet], tuning: &PhysicsTuning) {
    if suns.is_empty() {
        return;
    }
    let masses = aggregate_masses(suns, planets);
    let lo = masses.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = masses.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let (min_size, max_size) = tuning.sun_size_range;
    for (sun, mass) in suns.iter_mut().zip(masses) {
        let normalized = if hi - lo > f32::EPSILON { (mass - lo) / (hi - lo) } else { 0.5 };
        sun.size = min_size + normalized.sqrt() * (max_size - min_size);
    }
}

/// Total planet mass per sun, in sun order.
pub fn aggregate_masses(suns: &[Sun], planets: &[Planet]) -> Vec<f32> {
    suns.iter()
        .map(|s| planets.iter().filter(|p| p.parent == s.id).map(|p| p.mass).sum())
        .collect()
}

fn contain(sun: &mut Sun, pad: f32) {
    let (lo, hi) = (pad, 1.0 - pad);
    if sun.pos.x < lo {
        sun.pos.x = lo;
        sun.vel.x = sun.vel.x.abs();
    } else if sun.pos.x > hi {
        sun.pos.x = hi;
        sun.vel.x = -sun.vel.x.abs();
    }
    if sun.pos.y < lo {
        sun.pos.y = lo;
        sun.vel.y = sun.vel.y.abs();
    } else if sun.pos.y > hi {
        sun.pos.y = hi;
        sun.vel.y = -sun.vel.y.abs();
    }
    if !sun.pos.is_finite() {
        sun.pos = sun.base;
        sun.vel = Vec2::ZERO;
    }
}

fn fallback_dir(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(Vec2::X)
}
