//! Transient visual effects: click bursts and collision bursts.
//!
//! `EffectManager` prunes effects every tick (cheap: alpha and expiry) and
//! advects their particles only on heavy ticks, covering the time elapsed
//! since each effect last moved.

mod particle;
mod rng;

pub use particle::EffectParticle;
pub use rng::Rng;

use glam::Vec2;

use crate::components::color::Rgba;

/// Which kind of event produced an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    /// Pointer click or explicit explosion.
    Burst,
    /// Star hitting a planet in game mode.
    Collision,
}

/// Per-kind constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    pub ttl_ms: f64,
    pub max_particles: usize,
    pub speed: (f32, f32),
    pub size: (f32, f32),
    /// Downward acceleration per normalized frame.
    pub gravity: f32,
    /// Velocity retained per normalized frame.
    pub decay: f32,
}

impl EffectKind {
    pub fn spec(self) -> EffectSpec {
        match self {
            EffectKind::Burst => EffectSpec {
                ttl_ms: 1500.0,
                max_particles: 20,
                speed: (1.0, 4.0),
                size: (1.0, 3.0),
                gravity: 0.05,
                decay: 0.998,
            },
            EffectKind::Collision => EffectSpec {
                ttl_ms: 1000.0,
                max_particles: 15,
                speed: (2.0, 6.0),
                size: (1.0, 4.0),
                gravity: 0.0,
                decay: 0.995,
            },
        }
    }
}

/// A self-expiring group of particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEffect {
    pub kind: EffectKind,
    pub origin: Vec2,
    pub spawned_at_ms: f64,
    /// Time the particles have been advected up to. Starts at spawn.
    pub advanced_to_ms: f64,
    pub color: Rgba,
    /// Score text drawn at the origin, collision effects only.
    pub label: Option<String>,
    pub particles: Vec<EffectParticle>,
    /// 1.0 at spawn, 0.0 at expiry.
    pub alpha: f32,
}

impl ParticleEffect {
    pub fn ttl_ms(&self) -> f64 {
        self.kind.spec().ttl_ms
    }

    pub fn is_alive(&self, now_ms: f64) -> bool {
        now_ms - self.spawned_at_ms < self.ttl_ms()
    }
}

/// Owns every live effect.
pub struct EffectManager {
    effects: Vec<ParticleEffect>,
    rng: Rng,
    /// Scales particle counts; set from the performance tier.
    quality: f32,
}

impl EffectManager {
    /// Upper bound on normalized frames applied in one advance.
    const MAX_ADVANCE_FRAMES: f32 = 12.0;

    /// Create a new EffectManager with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        Self {
            effects: Vec::new(),
            rng: Rng::new(seed.wrapping_add(7919)),
            quality: 1.0,
        }
    }

    pub fn set_quality_multiplier(&mut self, quality: f32) {
        self.quality = quality.clamp(0.1, 1.0);
    }

    pub fn quality_multiplier(&self) -> f32 {
        self.quality
    }

    /// Scale a requested count by quality and cap it for the kind.
    pub fn scaled_count(&self, kind: EffectKind, requested: usize) -> usize {
        let scaled = (requested as f32 * self.quality).round() as usize;
        scaled.clamp(1, kind.spec().max_particles)
    }

    /// Spawn a click burst. Returns the number of particles created.
    pub fn spawn_burst(&mut self, origin: Vec2, color: Rgba, count: usize, now_ms: f64) -> usize {
        self.spawn_kind(EffectKind::Burst, origin, color, count, None, now_ms)
    }

    /// Spawn a collision burst with a score label.
    pub fn spawn_collision(&mut self, origin: Vec2, color: Rgba, score: u32, now_ms: f64) -> usize {
        let requested = (self.rng.next_f32() * 10.0) as usize + 15;
        self.spawn_kind(EffectKind::Collision, origin, color, requested, Some(format!("+{}", score)), now_ms)
    }

    fn spawn_kind(
        &mut self,
        kind: EffectKind,
        origin: Vec2,
        color: Rgba,
        requested: usize,
        label: Option<String>,
        now_ms: f64,
    ) -> usize {
        let spec = kind.spec();
        let count = self.scaled_count(kind, requested);
        let particles = (0..count)
            .map(|_| {
                let vel = self.rng.unit_vec() * self.rng.range(spec.speed.0, spec.speed.1);
                let size = self.rng.range(spec.size.0, spec.size.1);
                EffectParticle::new(origin, vel, size)
            })
            .collect();
        self.effects.push(ParticleEffect {
            kind,
            origin,
            spawned_at_ms: now_ms,
            advanced_to_ms: now_ms,
            color,
            label,
            particles,
            alpha: 1.0,
        });
        count
    }

    /// Drop expired effects and refresh alpha. Cheap; runs every tick.
    pub fn prune(&mut self, now_ms: f64) {
        let mut i = 0;
        while i < self.effects.len() {
            let effect = &mut self.effects[i];
            if !effect.is_alive(now_ms) {
                // Order does not matter; swap_remove avoids shifting.
                self.effects.swap_remove(i);
                continue;
            }
            let t = ((now_ms - effect.spawned_at_ms) / effect.ttl_ms()).max(0.0) as f32;
            effect.alpha = (1.0 - t).clamp(0.0, 1.0);
            for p in &mut effect.particles {
                p.alpha = effect.alpha;
            }
            i += 1;
        }
    }

    /// Move each effect's particles by the time since it last moved, never
    /// further back than its spawn.
    pub fn advance(&mut self, now_ms: f64, nominal_frame_ms: f32) {
        let frame_ms = nominal_frame_ms.max(1.0);
        for effect in &mut self.effects {
            let elapsed = (now_ms - effect.advanced_to_ms).max(0.0) as f32;
            effect.advanced_to_ms = effect.advanced_to_ms.max(now_ms);
            let nd = (elapsed / frame_ms).min(Self::MAX_ADVANCE_FRAMES);
            if nd <= 0.0 {
                continue;
            }
            let spec = effect.kind.spec();
            let decay = spec.decay.powf(nd);
            for p in &mut effect.particles {
                p.advect(nd, spec.gravity, decay);
            }
        }
    }

    /// Effects alive at `now_ms`.
    pub fn active_at(&self, now_ms: f64) -> impl Iterator<Item = &ParticleEffect> {
        self.effects.iter().filter(move |e| e.is_alive(now_ms))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Total particles across all effects.
    pub fn particle_count(&self) -> usize {
        self.effects.iter().map(|e| e.particles.len()).sum()
    }

    /// Clear all effects.
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
