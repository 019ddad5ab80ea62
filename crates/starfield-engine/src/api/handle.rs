use glam::Vec2;
use serde_json::Value;

use crate::api::config::StarfieldConfig;
use crate::api::types::{FocusChange, FrameTelemetry, StarfieldEvent, SunId, Viewport};
use crate::components::seed::SceneSeed;
use crate::core::scheduler::{AnimationScheduler, FrameHost, FrameOutcome, SchedulerState, Simulation};
use crate::engine::Starfield;
use crate::error::EngineResult;
use crate::input::{PointerSubscription, ResizeSubscription};
use crate::renderer::camera::CameraSnapshot;
use crate::renderer::traits::Canvas;

/// Seed for the engine's random streams when the host does not pick one.
pub const DEFAULT_RNG_SEED: u64 = 0x5eed_57a7;

/// Everything a host needs to drive a starfield: the engine, its scheduler
/// and the frame host that schedules callbacks.
pub struct StarfieldHandle<C, H> {
    engine: Starfield<C>,
    scheduler: AnimationScheduler,
    host: H,
}

impl<C: Canvas, H: FrameHost> StarfieldHandle<C, H> {
    pub fn new(config: StarfieldConfig, viewport: Viewport, host: H) -> Self {
        Self::with_seed(config, viewport, SceneSeed::portfolio(), DEFAULT_RNG_SEED, host)
    }

    pub fn with_seed(config: StarfieldConfig, viewport: Viewport, seed: SceneSeed, rng_seed: u64, host: H) -> Self {
        log::info!(
            "starfield created: {}x{}, density {}",
            viewport.width,
            viewport.height,
            config.effective_density()
        );
        Self {
            engine: Starfield::new(config, viewport, seed, rng_seed),
            scheduler: AnimationScheduler::new(),
            host,
        }
    }

    // -- Scheduling --

    pub fn start(&mut self) {
        self.scheduler.start(&mut self.host);
    }

    pub fn cancel(&mut self) {
        self.scheduler.cancel(&mut self.host);
    }

    pub fn restart(&mut self) {
        self.scheduler.restart(&mut self.engine, &mut self.host);
    }

    /// Run the frame the host just fired.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
        self.scheduler.on_frame(timestamp_ms, &mut self.engine, &mut self.host)
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // -- Control surface --

    /// Push stars near (x, y) away. Returns how many were affected.
    pub fn apply_force(&mut self, x: f32, y: f32, radius: f32, force: f32) -> usize {
        self.engine.apply_force(Vec2::new(x, y), radius, force)
    }

    pub fn create_explosion(&mut self, x: f32, y: f32) -> bool {
        self.engine.create_explosion(Vec2::new(x, y))
    }

    /// Number of background stars.
    pub fn entity_count(&self) -> usize {
        self.engine.entity_count()
    }

    pub fn reset_simulation(&mut self) {
        log::info!("resetting simulation");
        self.engine.reset_simulation();
    }

    /// Change one setting by its camelCase key. On error the last good value
    /// stays in effect.
    pub fn update_setting(&mut self, key: &str, value: &Value) -> EngineResult<()> {
        let mut next = self.engine.config().clone();
        if let Err(e) = next.apply_setting(key, value) {
            log::warn!("rejected setting {}={}: {}", key, value, e);
            return Err(e);
        }
        self.engine.set_config(next);
        Ok(())
    }

    /// Merge a partial config object. All keys apply or none do.
    pub fn set_config(&mut self, partial: &Value) -> EngineResult<()> {
        let mut next = self.engine.config().clone();
        match next.merge(partial) {
            Ok(changed) => {
                log::debug!("config updated: {}", changed.join(", "));
                self.engine.set_config(next);
                Ok(())
            }
            Err(e) => {
                log::warn!("rejected config patch: {}", e);
                Err(e)
            }
        }
    }

    pub fn config(&self) -> &StarfieldConfig {
        self.engine.config()
    }

    pub fn zoom_to_focus(&mut self, id: SunId) -> EngineResult<FocusChange> {
        self.engine.zoom_to_focus(id)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> EngineResult<()> {
        self.engine.resize(width, height)
    }

    // -- Input --

    pub fn subscribe_pointer(&self) -> PointerSubscription {
        self.engine.input().subscribe_pointer()
    }

    pub fn subscribe_resize(&self) -> ResizeSubscription {
        self.engine.input().subscribe_resize()
    }

    // -- Surface and output --

    pub fn attach_surface(&mut self, surface: C) -> Option<C> {
        self.engine.attach_surface(surface)
    }

    pub fn surface(&self) -> Option<&C> {
        self.engine.surface()
    }

    pub fn surface_mut(&mut self) -> Option<&mut C> {
        self.engine.surface_mut()
    }

    pub fn drain_events(&mut self) -> Vec<StarfieldEvent> {
        self.engine.drain_events()
    }

    pub fn telemetry(&self) -> FrameTelemetry {
        self.engine.telemetry(self.scheduler.is_degraded())
    }

    pub fn camera(&self) -> CameraSnapshot {
        self.engine.camera().snapshot()
    }

    pub fn engine(&self) -> &Starfield<C> {
        &self.engine
    }
}
