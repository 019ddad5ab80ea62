//! The render pass. Reads state, issues canvas calls, mutates nothing.

use glam::Vec2;

use super::camera::CameraNavigator;
use super::traits::Canvas;
use crate::api::config::StarfieldConfig;
use crate::api::types::{PlanetId, SunId, Viewport};
use crate::components::color::Rgba;
use crate::core::scene::EntityStore;
use crate::core::tuning::PhysicsTuning;
use crate::systems::connections::ConnectionCache;
use crate::systems::effects::EffectManager;

const BACKGROUND: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
const CONNECTION_COLOR: u32 = 0x9333ea;
const HORIZON_COLOR: u32 = 0x7c3aed;
const DEBUG_COLOR: Rgba = Rgba::new(1.0, 0.2, 0.2, 0.8);
/// Debug velocity vectors are drawn for one star in this many.
const DEBUG_STAR_STRIDE: usize = 20;

/// Borrowed view of everything the draw pass reads.
pub struct FrameView<'a> {
    pub store: &'a EntityStore,
    pub effects: &'a EffectManager,
    pub connections: &'a ConnectionCache,
    pub camera: &'a CameraNavigator,
    pub viewport: Viewport,
    pub config: &'a StarfieldConfig,
    pub tuning: &'a PhysicsTuning,
    pub now_ms: f64,
    pub focused: Option<SunId>,
    pub hovered_planet: Option<PlanetId>,
    /// Pointer in world pixels, for the debug overlay.
    pub pointer: Option<Vec2>,
}

/// Draw one frame.
pub fn draw_frame(view: &FrameView, canvas: &mut impl Canvas) {
    canvas.clear(BACKGROUND);
    canvas.save();
    apply_camera(view.camera, view.viewport, canvas);

    if view.config.enable_connections {
        draw_connections(view, canvas);
    }
    draw_stars(view, canvas);
    if view.config.enable_black_holes && view.focused.is_none() {
        draw_black_holes(view, canvas);
    }
    if view.config.enable_employee_stars {
        draw_suns(view, canvas);
        draw_planets(view, canvas);
    }
    draw_effects(view, canvas);
    if view.config.is_debug_mode {
        draw_debug(view, canvas);
    }

    canvas.restore();
}

fn apply_camera(camera: &CameraNavigator, viewport: Viewport, canvas: &mut impl Canvas) {
    canvas.translate(viewport.center());
    canvas.scale(camera.zoom);
    canvas.translate(-viewport.to_px(camera.center));
}

fn draw_connections(view: &FrameView, canvas: &mut impl Canvas) {
    let color = Rgba::hex(CONNECTION_COLOR);
    let segments = view.connections.segments(
        &view.store.stars,
        view.config.line_connection_distance,
        view.config.line_opacity,
        view.now_ms,
    );
    for (a, b, alpha) in segments {
        canvas.line(a, b, 0.5, color.with_alpha(alpha));
    }
}

fn draw_stars(view: &FrameView, canvas: &mut impl Canvas) {
    let window = view.tuning.deactivation_ms;
    for star in &view.store.stars {
        let glow = star.glow(view.now_ms, window);
        if glow > 0.0 {
            canvas.fill_circle(star.pos, star.size * (1.0 + 2.0 * glow), star.color.with_alpha(0.3 * glow));
        }
        canvas.fill_circle(star.pos, star.size, star.color.with_alpha(0.8));
    }
}

fn draw_black_holes(view: &FrameView, canvas: &mut impl Canvas) {
    let horizon = Rgba::hex(HORIZON_COLOR);
    for hole in &view.store.black_holes {
        canvas.fill_circle(hole.pos, hole.radius * 1.4, horizon.with_alpha(0.15));
        canvas.fill_circle(hole.pos, hole.radius, Rgba::BLACK);
        canvas.stroke_circle(hole.pos, hole.radius, 1.5, horizon.with_alpha(0.6));
        for p in &hole.particles {
            canvas.fill_circle(hole.particle_pos(p), p.size, Rgba::WHITE.with_alpha(0.6));
        }
    }
}

fn draw_suns(view: &FrameView, canvas: &mut impl Canvas) {
    let min_dim = view.viewport.min_dim();
    let ticks = view.tuning.propel_duration_ticks.max(1) as f32;
    for sun in &view.store.suns {
        if view.focused.is_some_and(|id| id != sun.id) {
            continue;
        }
        let center = view.viewport.to_px(sun.pos);
        let radius = sun.size * min_dim;
        let strength = if sun.active { 1.0 } else { 0.4 };
        canvas.fill_circle(center, radius * 1.6, sun.color.with_alpha(0.2 * strength));
        canvas.fill_circle(center, radius, sun.color.with_alpha(strength));
        if sun.propelling {
            let fade = sun.propel_timer as f32 / ticks;
            canvas.stroke_circle(center, radius * 1.3, 2.0, sun.color.with_alpha(0.8 * fade));
        }
        let label_pos = center + Vec2::new(0.0, radius + 14.0);
        canvas.text(label_pos, &sun.name, 12.0, Rgba::WHITE.with_alpha(0.7 * strength));
    }
}

fn draw_planets(view: &FrameView, canvas: &mut impl Canvas) {
    for planet in &view.store.planets {
        if view.focused.is_some_and(|id| id != planet.parent) {
            continue;
        }
        if let Some(sun) = view.store.sun(planet.parent) {
            let center = view.viewport.to_px(sun.pos);
            canvas.stroke_circle(center, planet.orbit_radius, 0.5, planet.color.with_alpha(0.08));
        }
        if view.hovered_planet == Some(planet.id) {
            canvas.stroke_circle(planet.pos, planet.size + 4.0, 1.5, Rgba::WHITE.with_alpha(0.8));
        }
        canvas.fill_circle(planet.pos, planet.size, planet.color);
        for s in &planet.satellites {
            canvas.fill_circle(planet.satellite_pos(s), s.size, planet.color.with_alpha(0.7));
        }
    }
}

fn draw_effects(view: &FrameView, canvas: &mut impl Canvas) {
    for effect in view.effects.active_at(view.now_ms) {
        for p in &effect.particles {
            canvas.fill_circle(p.pos, p.size, effect.color.with_alpha(p.alpha));
        }
        if let Some(label) = &effect.label {
            let rise = (1.0 - effect.alpha) * 30.0;
            canvas.text(effect.origin - Vec2::new(0.0, rise), label, 16.0, Rgba::WHITE.with_alpha(effect.alpha));
        }
    }
}

fn draw_debug(view: &FrameView, canvas: &mut impl Canvas) {
    for star in view.store.stars.iter().step_by(DEBUG_STAR_STRIDE) {
        canvas.line(star.pos, star.pos + star.vel * 10.0, 1.0, DEBUG_COLOR);
    }
    if let Some(p) = view.pointer {
        canvas.stroke_circle(p, view.config.mouse_effect_radius, 1.0, Rgba::WHITE.with_alpha(0.1));
    }
}
