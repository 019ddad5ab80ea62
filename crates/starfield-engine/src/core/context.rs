use crate::api::config::StarfieldConfig;
use crate::api::types::Viewport;
use crate::core::tuning::PhysicsTuning;
use crate::input::snapshot::InputSnapshot;

/// Everything one update pass may read, built fresh for each tick and passed
/// down explicitly to each system.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Host timestamp for this frame, milliseconds.
    pub now_ms: f64,
    /// Capped frame delta, milliseconds.
    pub dt_ms: f32,
    /// Whether the frame-skip counter is at zero this tick.
    pub heavy: bool,
    pub viewport: Viewport,
    pub input: InputSnapshot,
    pub config: &'a StarfieldConfig,
    pub tuning: &'a PhysicsTuning,
}

impl<'a> TickContext<'a> {
    /// Delta in nominal frames, capped for star integration.
    pub fn star_delta(&self) -> f32 {
        self.tuning.star_delta(self.dt_ms)
    }

    /// Delta in milliseconds, capped for sun integration.
    pub fn sun_dt_ms(&self) -> f32 {
        self.dt_ms.clamp(0.0, self.tuning.max_sun_dt_ms)
    }

    /// Pointer in pixels when it is on screen and interaction is enabled.
    pub fn pointer(&self) -> Option<glam::Vec2> {
        (self.config.enable_mouse_interaction && self.input.on_screen).then_some(self.input.pointer)
    }
}
