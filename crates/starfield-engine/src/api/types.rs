use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::Serialize;

use crate::core::performance::PerformanceTier;
use crate::error::{EngineError, EngineResult};

/// Identifier of a sun (orbital focus body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SunId(pub u32);

/// Identifier of a planet orbiting a sun.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlanetId(pub u32);

/// Identifier of a black hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlackHoleId(pub u32);

/// Pixel dimensions of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Validated constructor. Zero, negative or non-finite sizes are rejected.
    pub fn new(width: f32, height: f32) -> EngineResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(EngineError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() * 0.5
    }

    pub fn min_dim(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Normalized (0..1) coordinates to pixels.
    pub fn to_px(&self, norm: Vec2) -> Vec2 {
        norm * self.size()
    }

    /// Pixels to normalized (0..1) coordinates.
    pub fn to_norm(&self, px: Vec2) -> Vec2 {
        px / self.size()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

/// What the pointer is hovering over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum HoverTarget {
    Sun(SunId),
    Planet(PlanetId),
}

/// Result of a focus request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusChange {
    Focused(SunId),
    Unfocused,
}

/// Notifications for the presentation layer, drained once per published frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StarfieldEvent {
    Hover {
        target: HoverTarget,
        #[serde(rename = "screenX")]
        screen_x: f32,
        #[serde(rename = "screenY")]
        screen_y: f32,
    },
    HoverEnd,
    Focus { change: FocusChange },
    Collision { planet: PlanetId, score: u32 },
    TierChanged { tier: PerformanceTier },
}

impl StarfieldEvent {
    /// Flat wire form for the host's event buffer.
    pub fn to_record(&self) -> EventRecord {
        let (kind, a, b, c) = match *self {
            StarfieldEvent::Hover { target, screen_x, screen_y } => match target {
                HoverTarget::Sun(SunId(id)) => (EventRecord::HOVER_SUN, id as f32, screen_x, screen_y),
                HoverTarget::Planet(PlanetId(id)) => {
                    (EventRecord::HOVER_PLANET, id as f32, screen_x, screen_y)
                }
            },
            StarfieldEvent::HoverEnd => (EventRecord::HOVER_END, 0.0, 0.0, 0.0),
            StarfieldEvent::Focus { change } => match change {
                FocusChange::Focused(SunId(id)) => (EventRecord::FOCUS, id as f32, 1.0, 0.0),
                FocusChange::Unfocused => (EventRecord::FOCUS, -1.0, 0.0, 0.0),
            },
            StarfieldEvent::Collision { planet, score } => {
                (EventRecord::COLLISION, planet.0 as f32, score as f32, 0.0)
            }
            StarfieldEvent::TierChanged { tier } => (EventRecord::TIER, tier.index() as f32, 0.0, 0.0),
        };
        EventRecord { kind, a, b, c }
    }
}

/// An event as 4 floats, read by the host from linear memory.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EventRecord {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EventRecord {
    pub const FLOATS: usize = 4;

    pub const HOVER_SUN: f32 = 1.0;
    pub const HOVER_PLANET: f32 = 2.0;
    pub const HOVER_END: f32 = 3.0;
    pub const FOCUS: f32 = 4.0;
    pub const COLLISION: f32 = 5.0;
    pub const TIER: f32 = 6.0;
}

/// Per-frame telemetry published to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTelemetry {
    /// Smoothed frames per second.
    pub fps: f32,
    pub timestamp_ms: f64,
    pub tier: PerformanceTier,
    /// Set after three or more consecutive failed ticks.
    pub degraded: bool,
    pub stars: usize,
    pub score: u32,
}

impl Default for FrameTelemetry {
    fn default() -> Self {
        Self {
            fps: 0.0,
            timestamp_ms: 0.0,
            tier: PerformanceTier::Low,
            degraded: false,
            stars: 0,
            score: 0,
        }
    }
}
