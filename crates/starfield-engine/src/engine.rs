//! The simulation core: owns every entity and runs one tick at a time.
//!
//! `Starfield` is what the scheduler drives through the `Simulation` trait.
//! It reads input once per tick, steps physics, settles hover and click
//! state, advances effects and finally draws into the attached surface.

use glam::Vec2;

use crate::api::config::StarfieldConfig;
use crate::api::types::{FocusChange, FrameTelemetry, HoverTarget, PlanetId, StarfieldEvent, SunId, Viewport};
use crate::components::color::{palette, Rgba};
use crate::components::seed::SceneSeed;
use crate::core::context::TickContext;
use crate::core::performance::TierController;
use crate::core::scene::EntityStore;
use crate::core::scheduler::{FrameInfo, Simulation, TickDiagnostics};
use crate::core::time::FpsMeter;
use crate::core::tuning::PhysicsTuning;
use crate::error::{EngineError, EngineResult};
use crate::input::{InputHub, InputSnapshot};
use crate::renderer::camera::CameraNavigator;
use crate::renderer::draw::{draw_frame, FrameView};
use crate::renderer::traits::Canvas;
use crate::systems::collisions::detect_collisions;
use crate::systems::connections::ConnectionCache;
use crate::systems::effects::{EffectManager, Rng};
use crate::systems::forces::{self, update_stars, GravityWell};
use crate::systems::orbital::{aggregate_masses, apply_click_repulsion, update_sun_sizes, update_suns};
use crate::systems::planets::{apply_click_repulsion_to_planets, max_orbit_norm, set_hovered, update_planets};
use crate::systems::spawn::{fill_missing, populate, spawn_black_holes, spawn_stars};

/// Particles requested for a click or explosion burst.
const BURST_PARTICLES: usize = 20;
/// Sun hit radius as a multiple of its render radius.
const SUN_HIT_SLOP: f32 = 1.5;
/// Extra pixels around a planet that still count as hovering it.
const PLANET_HIT_PADDING: f32 = 6.0;

pub struct Starfield<C> {
    config: StarfieldConfig,
    tuning: PhysicsTuning,
    viewport: Viewport,
    seed: SceneSeed,
    store: EntityStore,
    effects: EffectManager,
    connections: ConnectionCache,
    camera: CameraNavigator,
    tiers: TierController,
    fps: FpsMeter,
    input: InputHub,
    rng: Rng,
    surface: Option<C>,
    events: Vec<StarfieldEvent>,
    focused: Option<SunId>,
    hover: Option<HoverTarget>,
    last_click_ms: Option<f64>,
    score: u32,
    now_ms: f64,
    smoothed_fps: f32,
    /// Pointer in world pixels as of the last tick.
    pointer: Option<Vec2>,
}

impl<C: Canvas> Starfield<C> {
    /// A populated engine with no surface attached.
    pub fn new(config: StarfieldConfig, viewport: Viewport, seed: SceneSeed, rng_seed: u64) -> Self {
        let tuning = PhysicsTuning::default();
        let camera = CameraNavigator::new(tuning.camera_smoothing, tuning.camera_convergence);
        let mut engine = Self {
            config,
            tuning,
            viewport,
            seed: seed.sanitized(),
            store: EntityStore::new(),
            effects: EffectManager::new(rng_seed),
            connections: ConnectionCache::new(),
            camera,
            tiers: TierController::default(),
            fps: FpsMeter::default(),
            input: InputHub::new(),
            rng: Rng::new(rng_seed),
            surface: None,
            events: Vec::new(),
            focused: None,
            hover: None,
            last_click_ms: None,
            score: 0,
            now_ms: 0.0,
            smoothed_fps: 0.0,
            pointer: None,
        };
        let quality = engine.tiers.tier().effect_multiplier();
        engine.effects.set_quality_multiplier(quality);
        engine.reset_simulation();
        engine
    }

    // -- Accessors --

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    pub fn tuning(&self) -> &PhysicsTuning {
        &self.tuning
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn camera(&self) -> &CameraNavigator {
        &self.camera
    }

    pub fn input(&self) -> &InputHub {
        &self.input
    }

    pub fn focused(&self) -> Option<SunId> {
        self.focused
    }

    pub fn hover(&self) -> Option<HoverTarget> {
        self.hover
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn surface(&self) -> Option<&C> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut C> {
        self.surface.as_mut()
    }

    /// Attach the drawing surface. Returns the previous one, if any.
    pub fn attach_surface(&mut self, surface: C) -> Option<C> {
        self.surface.replace(surface)
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<StarfieldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn telemetry(&self, degraded: bool) -> FrameTelemetry {
        FrameTelemetry {
            fps: self.smoothed_fps,
            timestamp_ms: self.now_ms,
            tier: self.tiers.tier(),
            degraded,
            stars: self.store.star_count(),
            score: self.score,
        }
    }

    // -- Control --

    /// Regenerate every entity and return the view, effects and hover state
    /// to their initial values. Calling it twice in a row is the same as once.
    pub fn reset_simulation(&mut self) {
        populate(
            &mut self.store,
            &self.seed,
            self.viewport,
            &self.config,
            &self.tuning,
            self.now_ms,
            &mut self.rng,
        );
        self.effects.clear();
        self.connections.reset();
        self.camera.snap_home();
        self.focused = None;
        self.hover = None;
        set_hovered(&mut self.store.planets, None);
    }

    /// Replace only the background stars, e.g. after a density change.
    pub fn regenerate_stars(&mut self) {
        self.store.stars = spawn_stars(self.viewport, &self.config, &self.tuning, &mut self.rng);
        self.connections.reset();
        log::debug!("regenerated {} stars", self.store.stars.len());
    }

    /// Swap in a new config. Density changes regenerate the stars; the rest
    /// is read fresh on the next tick.
    pub fn set_config(&mut self, config: StarfieldConfig) {
        let density_changed = config.effective_density() != self.config.effective_density();
        let holes_changed = config.black_hole_size != self.config.black_hole_size;
        self.config = config;
        if density_changed {
            self.regenerate_stars();
        }
        if holes_changed {
            self.store.black_holes = spawn_black_holes(self.viewport, &self.config, &self.tuning, &mut self.rng);
        }
    }

    /// Adopt a new viewport size. Stars and black holes are pixel-space and
    /// are respawned; suns are normalized and carry over.
    pub fn resize(&mut self, width: f32, height: f32) -> EngineResult<()> {
        let viewport = Viewport::new(width, height)?;
        if viewport == self.viewport {
            return Ok(());
        }
        log::info!(
            "viewport {}x{} -> {}x{}",
            self.viewport.width,
            self.viewport.height,
            viewport.width,
            viewport.height
        );
        let scale = viewport.min_dim() / self.viewport.min_dim();
        self.viewport = viewport;
        self.store.stars = spawn_stars(viewport, &self.config, &self.tuning, &mut self.rng);
        self.store.black_holes = spawn_black_holes(viewport, &self.config, &self.tuning, &mut self.rng);
        for planet in &mut self.store.planets {
            planet.orbit_radius *= scale;
        }
        self.connections.reset();
        Ok(())
    }

    /// Kick stars near `point` (pixels). Returns how many were affected.
    pub fn apply_force(&mut self, point: Vec2, radius: f32, force: f32) -> usize {
        if !point.is_finite() || !radius.is_finite() || !force.is_finite() {
            log::warn!("ignoring non-finite force at {:?} (radius {}, force {})", point, radius, force);
            return 0;
        }
        let max_speed = self.tuning.speed_ceiling(self.config.max_velocity, true);
        forces::apply_force(&mut self.store.stars, point, radius, force, max_speed, self.now_ms, &mut self.rng)
    }

    /// Burst effect plus a star impulse at `point`. False when nothing can be
    /// drawn yet or the point is unusable.
    pub fn create_explosion(&mut self, point: Vec2) -> bool {
        if self.surface.is_none() || !point.is_finite() {
            return false;
        }
        let color = self.burst_color();
        self.effects.spawn_burst(point, color, BURST_PARTICLES, self.now_ms);
        self.apply_force(
            point,
            self.tuning.click_radius,
            self.tuning.click_force * self.tuning.click_force_multiplier,
        );
        true
    }

    /// Focus the camera on a sun, or toggle back to the default view when
    /// that sun is already focused.
    pub fn zoom_to_focus(&mut self, id: SunId) -> EngineResult<FocusChange> {
        let Some(sun) = self.store.sun(id) else {
            return Err(EngineError::UnknownEntity(format!("sun {}", id.0)));
        };
        let change = if self.focused == Some(id) {
            self.camera.reset();
            self.focused = None;
            FocusChange::Unfocused
        } else {
            let (lo, hi) = self.tuning.focus_zoom_range;
            let zoom = match max_orbit_norm(self.store.planets_of(id), self.viewport.min_dim()) {
                Some(r) => (3.0 / (1.0 + 4.0 * r)).clamp(lo, hi),
                None => self.tuning.sun_focus_zoom,
            };
            self.camera.zoom_to(sun.pos, zoom);
            self.focused = Some(id);
            FocusChange::Focused(id)
        };
        log::debug!("focus change: {:?}", change);
        self.events.push(StarfieldEvent::Focus { change });
        Ok(change)
    }

    // -- Tick stages --

    fn apply_pending_resize(&mut self) {
        if let Some((w, h)) = self.input.take_resize() {
            if let Err(e) = self.resize(w, h) {
                log::warn!("ignoring resize: {}", e);
            }
        }
    }

    /// Input with the pointer mapped from screen into world pixels.
    fn world_input(&self, screen: InputSnapshot) -> InputSnapshot {
        let mut world = screen;
        world.pointer = self.camera.screen_to_world(screen.pointer, self.viewport);
        world.last_pointer = self.camera.screen_to_world(screen.last_pointer, self.viewport);
        world.click_pos = self.camera.screen_to_world(screen.click_pos, self.viewport);
        world.speed = screen.speed / self.camera.zoom.max(f32::EPSILON);
        world
    }

    /// One gravity well per awake sun, weighted by its planets.
    fn gravity_wells(&self) -> Vec<GravityWell> {
        let masses = aggregate_masses(&self.store.suns, &self.store.planets);
        self.store
            .suns
            .iter()
            .zip(masses)
            .filter(|(sun, _)| sun.active)
            .map(|(sun, mass)| GravityWell {
                pos: self.viewport.to_px(sun.pos),
                mass: 1.0 + mass,
            })
            .collect()
    }

    fn handle_click(&mut self, world: Vec2) {
        if let Some(id) = self.sun_at(world) {
            if let Err(e) = self.zoom_to_focus(id) {
                log::warn!("click focus failed: {}", e);
            }
            return;
        }
        let suns = apply_click_repulsion(&mut self.store.suns, self.viewport.to_norm(world), &self.tuning);
        let planets = apply_click_repulsion_to_planets(&mut self.store.planets, world, &self.tuning);
        let stars = self.apply_force(
            world,
            self.tuning.click_radius,
            self.tuning.click_force * self.tuning.click_force_multiplier,
        );
        let color = self.burst_color();
        self.effects.spawn_burst(world, color, BURST_PARTICLES, self.now_ms);
        log::debug!("click at {:?}: {} stars, {} suns, {} planets", world, stars, suns, planets);
    }

    fn bodies_visible(&self) -> bool {
        self.config.enable_employee_stars
    }

    fn sun_at(&self, world: Vec2) -> Option<SunId> {
        if !self.bodies_visible() {
            return None;
        }
        let min_dim = self.viewport.min_dim();
        self.store
            .suns
            .iter()
            .filter(|s| self.focused.is_none_or(|id| id == s.id))
            .find(|s| self.viewport.to_px(s.pos).distance(world) < s.size * min_dim * SUN_HIT_SLOP)
            .map(|s| s.id)
    }

    fn planet_at(&self, world: Vec2) -> Option<PlanetId> {
        if !self.bodies_visible() {
            return None;
        }
        self.store
            .planets
            .iter()
            .filter(|p| self.focused.is_none_or(|id| id == p.parent))
            .find(|p| p.pos.distance(world) < p.size + PLANET_HIT_PADDING)
            .map(|p| p.id)
    }

    /// Hit-test suns first, then planets. Emits an event only on change.
    fn update_hover(&mut self, world: Option<Vec2>) {
        let next = world.and_then(|p| {
            self.sun_at(p)
                .map(HoverTarget::Sun)
                .or_else(|| self.planet_at(p).map(HoverTarget::Planet))
        });
        if next == self.hover {
            return;
        }
        self.hover = next;
        let hovered_planet = match next {
            Some(HoverTarget::Planet(id)) => Some(id),
            _ => None,
        };
        set_hovered(&mut self.store.planets, hovered_planet);

        let event = match next {
            Some(target) => {
                let world_pos = match target {
                    HoverTarget::Sun(id) => self.store.sun(id).map(|s| self.viewport.to_px(s.pos)),
                    HoverTarget::Planet(id) => self.store.planet(id).map(|p| p.pos),
                };
                let screen = self.camera.world_to_screen(world_pos.unwrap_or_default(), self.viewport);
                StarfieldEvent::Hover {
                    target,
                    screen_x: screen.x,
                    screen_y: screen.y,
                }
            }
            None => StarfieldEvent::HoverEnd,
        };
        self.events.push(event);
    }

    fn score_collisions(&mut self) {
        let hits = detect_collisions(&mut self.store.stars, &self.store.planets, &self.tuning);
        for hit in hits {
            if hit.is_spectacular(&self.tuning) {
                self.effects.spawn_collision(hit.pos, hit.color, hit.score, self.now_ms);
            }
            self.score = self.score.saturating_add(hit.score);
            self.events.push(StarfieldEvent::Collision {
                planet: hit.planet,
                score: hit.score,
            });
        }
    }

    fn sample_performance(&mut self, dt_ms: f32) {
        let Some(fps) = self.fps.record(dt_ms) else {
            return;
        };
        self.smoothed_fps = fps;
        if let Some(tier) = self.tiers.report(fps) {
            self.effects.set_quality_multiplier(tier.effect_multiplier());
            self.events.push(StarfieldEvent::TierChanged { tier });
        }
    }

    fn burst_color(&self) -> Rgba {
        palette(self.config.color_scheme)[0]
    }

    fn check_finite(&mut self) -> EngineResult<()> {
        if !self.camera.center.is_finite() || !self.camera.zoom.is_finite() {
            self.camera.snap_home();
            return Err(EngineError::NonFinite { what: "camera" });
        }
        if let Some(sun) = self.store.suns.iter().find(|s| !s.pos.is_finite()) {
            log::error!("sun {} has non-finite position {:?}", sun.name, sun.pos);
            return Err(EngineError::NonFinite { what: "sun position" });
        }
        Ok(())
    }

    fn draw(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let hovered_planet = match self.hover {
            Some(HoverTarget::Planet(id)) => Some(id),
            _ => None,
        };
        let view = FrameView {
            store: &self.store,
            effects: &self.effects,
            connections: &self.connections,
            camera: &self.camera,
            viewport: self.viewport,
            config: &self.config,
            tuning: &self.tuning,
            now_ms: self.now_ms,
            focused: self.focused,
            hovered_planet,
            pointer: self.pointer,
        };
        draw_frame(&view, surface);
    }
}

impl<C: Canvas> Simulation for Starfield<C> {
    fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    fn entity_count(&self) -> usize {
        self.store.len()
    }

    fn ensure_entities(&mut self) {
        let added = fill_missing(
            &mut self.store,
            &self.seed,
            self.viewport,
            &self.config,
            &self.tuning,
            self.now_ms,
            &mut self.rng,
        );
        if added > 0 {
            log::info!("regenerated {} missing entities", added);
            self.connections.reset();
        }
    }

    fn tick(&mut self, frame: &FrameInfo) -> EngineResult<()> {
        self.now_ms = frame.timestamp_ms;
        self.apply_pending_resize();

        let screen = self.input.read();
        let input = self.world_input(screen);
        if let Some((pos, t)) = input.click_after(self.last_click_ms) {
            self.last_click_ms = Some(t);
            if self.config.enable_mouse_interaction {
                self.handle_click(pos);
            }
        }

        let wells = if self.bodies_visible() { self.gravity_wells() } else { Vec::new() };
        let ctx = TickContext {
            now_ms: frame.timestamp_ms,
            dt_ms: frame.delta_ms,
            heavy: frame.heavy,
            viewport: self.viewport,
            input,
            config: &self.config,
            tuning: &self.tuning,
        };
        update_stars(&mut self.store.stars, &self.store.black_holes, &wells, &ctx, &mut self.rng);
        if self.config.enable_black_holes {
            for hole in &mut self.store.black_holes {
                hole.spin(ctx.sun_dt_ms(), self.config.particle_speed);
            }
        }
        update_suns(&mut self.store.suns, &ctx);
        update_planets(&mut self.store.planets, &self.store.suns, &ctx);
        self.pointer = ctx.pointer();

        self.update_hover(self.pointer);
        if self.config.game_mode && self.bodies_visible() {
            self.score_collisions();
        }

        self.effects.prune(frame.timestamp_ms);
        if frame.heavy {
            self.effects.advance(frame.timestamp_ms, self.tuning.nominal_frame_ms);
            update_sun_sizes(&mut self.store.suns, &self.store.planets, &self.tuning);
            if self.config.enable_connections {
                let tier = self.tiers.tier();
                self.connections.rebuild(
                    &self.store.stars,
                    self.config.line_connection_distance,
                    tier.connection_stride(),
                    tier.max_connections(),
                    frame.timestamp_ms,
                );
            }
        }
        self.sample_performance(frame.delta_ms);
        self.camera.update(frame.delta_ms);
        self.check_finite()?;

        self.draw();
        Ok(())
    }

    fn diagnostics(&self) -> TickDiagnostics {
        TickDiagnostics {
            stars: self.store.stars.len(),
            black_holes: self.store.black_holes.len(),
            suns: self.store.suns.len(),
            planets: self.store.planets.len(),
            effects: self.effects.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use crate::renderer::commands::{CommandBuffer, DrawCommand};

    fn engine() -> Starfield<CommandBuffer> {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        let mut engine = Starfield::new(StarfieldConfig::default(), viewport, SceneSeed::portfolio(), 11);
        engine.attach_surface(CommandBuffer::new());
        engine
    }

    fn frame(index: u64, heavy: bool) -> FrameInfo {
        FrameInfo {
            timestamp_ms: 1000.0 + index as f64 * 16.0,
            delta_ms: 16.0,
            heavy,
            frame_index: index,
        }
    }

    fn sun_screen_pos(engine: &Starfield<CommandBuffer>, id: SunId) -> Vec2 {
        let sun = engine.store().sun(id).unwrap();
        engine.camera().world_to_screen(engine.viewport().to_px(sun.pos), engine.viewport())
    }

    #[test]
    fn tick_draws_into_surface() {
        let mut e = engine();
        e.tick(&frame(0, true)).unwrap();
        let buf = e.surface().unwrap();
        assert_eq!(buf.commands[0].op, DrawCommand::CLEAR);
        assert!(buf.command_count() as usize > e.store().star_count());
    }

    #[test]
    fn unready_without_surface() {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        let e: Starfield<CommandBuffer> = Starfield::new(StarfieldConfig::default(), viewport, SceneSeed::portfolio(), 1);
        assert!(!e.is_ready());
        assert!(e.entity_count() > 0);
    }

    #[test]
    fn clicking_empty_space_spawns_burst_and_kicks_stars() {
        let mut e = engine();
        e.config.enable_employee_stars = false;
        let center = e.viewport().center();
        let sub = e.input().subscribe_pointer();
        sub.send(InputEvent::PointerDown { x: center.x, y: center.y, timestamp_ms: 5.0 });
        e.tick(&frame(0, false)).unwrap();
        assert_eq!(e.effects().len(), 1);
        assert!(e.store().stars.iter().any(|s| s.active));

        // The same click is not handled twice.
        e.tick(&frame(1, false)).unwrap();
        assert_eq!(e.effects().len(), 1);
    }

    #[test]
    fn clicking_a_sun_focuses_it() {
        let mut e = engine();
        let target = SunId(1);
        let p = sun_screen_pos(&e, target);
        let sub = e.input().subscribe_pointer();
        sub.send(InputEvent::PointerDown { x: p.x, y: p.y, timestamp_ms: 5.0 });
        e.tick(&frame(0, false)).unwrap();
        assert_eq!(e.focused(), Some(target));
        let events = e.drain_events();
        assert!(events.contains(&StarfieldEvent::Focus { change: FocusChange::Focused(target) }));
    }

    #[test]
    fn focus_toggles_and_rejects_unknown_suns() {
        let mut e = engine();
        assert_eq!(e.zoom_to_focus(SunId(2)).unwrap(), FocusChange::Focused(SunId(2)));
        let zoom = e.camera().target.unwrap().zoom;
        assert!((1.5..=3.5).contains(&zoom), "zoom was {}", zoom);
        assert_eq!(e.zoom_to_focus(SunId(2)).unwrap(), FocusChange::Unfocused);
        assert_eq!(e.camera().target.unwrap().zoom, 1.0);
        assert!(matches!(e.zoom_to_focus(SunId(99)), Err(EngineError::UnknownEntity(_))));
    }

    #[test]
    fn hover_emits_only_on_change() {
        let mut e = engine();
        let p = sun_screen_pos(&e, SunId(3));
        let sub = e.input().subscribe_pointer();
        sub.send(InputEvent::PointerMove { x: p.x, y: p.y });
        e.tick(&frame(0, false)).unwrap();
        e.tick(&frame(1, false)).unwrap();
        let hovers = e
            .drain_events()
            .into_iter()
            .filter(|ev| matches!(ev, StarfieldEvent::Hover { .. }))
            .count();
        assert_eq!(hovers, 1);

        sub.send(InputEvent::PointerLeave);
        e.tick(&frame(2, false)).unwrap();
        assert_eq!(e.drain_events(), vec![StarfieldEvent::HoverEnd]);
        assert_eq!(e.hover(), None);
    }

    #[test]
    fn explosion_needs_a_surface() {
        let viewport = Viewport::new(800.0, 600.0).unwrap();
        let mut e: Starfield<CommandBuffer> = Starfield::new(StarfieldConfig::default(), viewport, SceneSeed::portfolio(), 1);
        assert!(!e.create_explosion(Vec2::new(100.0, 100.0)));
        e.attach_surface(CommandBuffer::new());
        assert!(!e.create_explosion(Vec2::new(f32::NAN, 1.0)));
        assert!(e.create_explosion(Vec2::new(100.0, 100.0)));
        assert_eq!(e.effects().len(), 1);
    }

    #[test]
    fn resize_through_subscription_respawns_stars() {
        let mut e = engine();
        let sub = e.input().subscribe_resize();
        sub.resize(400.0, 300.0);
        e.tick(&frame(0, false)).unwrap();
        assert_eq!(e.viewport(), Viewport::new(400.0, 300.0).unwrap());
        let size = e.viewport().size();
        assert!(e.store().stars.iter().all(|s| s.pos.x < size.x && s.pos.y < size.y));
    }

    #[test]
    fn invalid_resize_keeps_previous_viewport() {
        let mut e = engine();
        assert!(e.resize(0.0, 300.0).is_err());
        assert_eq!(e.viewport(), Viewport::new(800.0, 600.0).unwrap());
    }

    #[test]
    fn heavy_ticks_build_connections() {
        let mut e = engine();
        e.config.line_connection_distance = 1000.0;
        e.tick(&frame(0, true)).unwrap();
        assert!(!e.connections.is_empty());
    }

    #[test]
    fn density_change_regenerates_stars() {
        let mut e = engine();
        let before = e.entity_count();
        let mut config = e.config().clone();
        config.star_density = 0.5;
        e.set_config(config);
        assert!(e.entity_count() < before, "count was {} before, {} after", before, e.entity_count());
    }
}
