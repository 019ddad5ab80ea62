use glam::Vec2;

use super::color::Rgba;
use crate::api::types::SunId;
use crate::core::tuning::PhysicsTuning;
use crate::systems::effects::Rng;

/// Sinusoidal drift on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftAxis {
    pub phase: f32,
    pub amplitude: f32,
    /// Radians per millisecond.
    pub speed: f32,
}

impl DriftAxis {
    pub fn advance(&mut self, dt_ms: f32) {
        self.phase = (self.phase + self.speed * dt_ms).rem_euclid(std::f32::consts::TAU);
    }

    pub fn offset(&self) -> f32 {
        self.phase.sin() * self.amplitude
    }
}

/// A drifting focal body. Positions are normalized to the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Sun {
    pub id: SunId,
    pub name: String,
    pub color: Rgba,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Home position the drift oscillates around.
    pub base: Vec2,
    /// Render radius as a fraction of the viewport's min dimension.
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub active: bool,
    /// Timestamp at which a dormant sun wakes on its own.
    pub activation_at_ms: f64,
    pub drift: [DriftAxis; 2],
    /// Pending click impulse, drained into velocity with decay.
    pub click_repulsion: Vec2,
    pub propelling: bool,
    pub propel_timer: u32,
}

impl Sun {
    /// The four focus-area positions a default scene uses.
    pub const DEFAULT_POSITIONS: [Vec2; 4] = [
        Vec2::new(0.22, 0.18),
        Vec2::new(0.82, 0.15),
        Vec2::new(0.20, 0.82),
        Vec2::new(0.80, 0.80),
    ];

    /// Dormant sun with drift parameters drawn from the tuning ranges.
    pub fn spawn(
        id: SunId,
        name: impl Into<String>,
        color: Rgba,
        base: Vec2,
        now_ms: f64,
        tuning: &PhysicsTuning,
        rng: &mut Rng,
    ) -> Self {
        let (amp_lo, amp_hi) = tuning.drift_amplitude;
        let (speed_lo, speed_hi) = tuning.drift_speed;
        let mut axis = || DriftAxis {
            phase: rng.angle(),
            amplitude: rng.range(amp_lo, amp_hi),
            speed: rng.range(speed_lo, speed_hi),
        };
        let drift = [axis(), axis()];
        let (delay_lo, delay_hi) = tuning.activation_delay_ms;
        let pad = tuning.sun_padding;
        let base = base.clamp(Vec2::splat(pad), Vec2::splat(1.0 - pad));
        Self {
            id,
            name: name.into(),
            color,
            pos: base,
            vel: Vec2::ZERO,
            base,
            size: (tuning.sun_size_range.0 + tuning.sun_size_range.1) * 0.5,
            rotation: rng.angle(),
            rotation_speed: tuning.base_rotation_speed,
            active: false,
            activation_at_ms: now_ms + rng.range_f64(delay_lo, delay_hi),
            drift,
            click_repulsion: Vec2::ZERO,
            propelling: false,
            propel_timer: 0,
        }
    }

    /// Drift target for the current phases.
    pub fn drift_target(&self) -> Vec2 {
        self.base + Vec2::new(self.drift[0].offset(), self.drift[1].offset())
    }

    /// Start (or restart) the propel emphasis.
    pub fn propel(&mut self, ticks: u32) {
        self.propelling = true;
        self.propel_timer = ticks;
    }

    /// Add to the click accumulator, keeping its magnitude at most `max`.
    pub fn push_click(&mut self, impulse: Vec2, max: f32) {
        self.click_repulsion = (self.click_repulsion + impulse).clamp_length_max(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun() -> Sun {
        let mut rng = Rng::new(11);
        Sun::spawn(SunId(1), "Core", Rgba::WHITE, Vec2::new(0.5, 0.5), 0.0, &PhysicsTuning::default(), &mut rng)
    }

    #[test]
    fn spawns_dormant_with_delay_in_range() {
        let s = sun();
        assert!(!s.active);
        assert!(s.activation_at_ms >= 300.0 && s.activation_at_ms < 1200.0);
        for axis in &s.drift {
            assert!(axis.amplitude >= 0.015 && axis.amplitude < 0.035);
        }
    }

    #[test]
    fn base_is_clamped_inside_padding() {
        let mut rng = Rng::new(2);
        let t = PhysicsTuning::default();
        let s = Sun::spawn(SunId(2), "Edge", Rgba::WHITE, Vec2::new(0.0, 1.0), 0.0, &t, &mut rng);
        assert_eq!(s.base, Vec2::new(t.sun_padding, 1.0 - t.sun_padding));
    }

    #[test]
    fn push_click_clamps_magnitude() {
        let mut s = sun();
        for _ in 0..100 {
            s.push_click(Vec2::new(0.05, 0.0), 0.08);
        }
        assert!(s.click_repulsion.length() <= 0.08 + 1e-6);
    }
}
