//! Adaptive quality tiers driven by smoothed FPS.

use serde::Serialize;

/// Rendering quality tier. Starts at `Low` and earns its way up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceTier {
    #[default]
    Low,
    Medium,
    High,
}

impl PerformanceTier {
    /// Stable numeric form for flat buffers.
    pub fn index(self) -> u8 {
        match self {
            PerformanceTier::Low => 0,
            PerformanceTier::Medium => 1,
            PerformanceTier::High => 2,
        }
    }

    pub fn upgraded(self) -> Self {
        match self {
            PerformanceTier::Low => PerformanceTier::Medium,
            _ => PerformanceTier::High,
        }
    }

    pub fn downgraded(self) -> Self {
        match self {
            PerformanceTier::High => PerformanceTier::Medium,
            _ => PerformanceTier::Low,
        }
    }

    /// Only every n-th star is a connection source.
    pub fn connection_stride(self) -> usize {
        match self {
            PerformanceTier::Low => 20,
            PerformanceTier::Medium => 10,
            PerformanceTier::High => 5,
        }
    }

    /// Scale applied to effect particle counts.
    pub fn effect_multiplier(self) -> f32 {
        match self {
            PerformanceTier::Low => 0.5,
            PerformanceTier::Medium => 0.75,
            PerformanceTier::High => 1.0,
        }
    }

    pub fn max_connections(self) -> usize {
        match self {
            PerformanceTier::Low => 150,
            PerformanceTier::Medium => 400,
            PerformanceTier::High => 1000,
        }
    }
}

/// Thresholds for tier changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub stable_fps: f32,
    pub low_fps: f32,
    pub stable_samples: u32,
    pub low_samples: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            stable_fps: 55.0,
            low_fps: 30.0,
            stable_samples: 60,
            low_samples: 30,
        }
    }
}

/// Counts consecutive good or bad FPS reports and steps the tier.
#[derive(Debug, Clone, Default)]
pub struct TierController {
    tier: PerformanceTier,
    thresholds: TierThresholds,
    stable_count: u32,
    low_count: u32,
}

impl TierController {
    pub fn tier(&self) -> PerformanceTier {
        self.tier
    }

    /// Feed one smoothed FPS sample. Returns the new tier when it changes.
    pub fn report(&mut self, fps: f32) -> Option<PerformanceTier> {
        let t = self.thresholds;
        let next = if fps > t.stable_fps {
            self.low_count = 0;
            self.stable_count += 1;
            if self.stable_count < t.stable_samples {
                return None;
            }
            self.stable_count = 0;
            self.tier.upgraded()
        } else if fps < t.low_fps {
            self.stable_count = 0;
            self.low_count += 1;
            if self.low_count < t.low_samples {
                return None;
            }
            self.low_count = 0;
            self.tier.downgraded()
        } else {
            // NaN lands here too.
            self.stable_count = 0;
            self.low_count = 0;
            return None;
        };

        if next == self.tier {
            return None;
        }
        log::info!("performance tier {:?} -> {:?} at {:.1} fps", self.tier, next, fps);
        self.tier = next;
        Some(next)
    }
}
