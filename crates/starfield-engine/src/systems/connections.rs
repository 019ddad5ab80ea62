//! Network lines between nearby stars.
//!
//! Pairs are found on heavy ticks only and cached; the draw pass re-reads the
//! live star positions every frame, so a cached pair that drifted apart simply
//! fades out until the next rebuild.

use glam::Vec2;

use crate::components::star::Star;

/// Window over which connections stagger in after a (re)start.
const STAGGER_MS: f64 = 8000.0;
/// Fade-in time of a single connection once its delay has passed.
const FADE_IN_MS: f64 = 2000.0;
const SEED_MODULO: u32 = 10_000;

/// A cached pair of star indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// Stable per-pair value in `0..SEED_MODULO` driving delay and pulse phase.
    pub seed: u32,
}

impl Connection {
    fn new(a: usize, b: usize) -> Self {
        let seed = ((a as u64 * 7919 + b as u64 * 104_729) % SEED_MODULO as u64) as u32;
        Self { a, b, seed }
    }

    fn unit_seed(&self) -> f64 {
        self.seed as f64 / SEED_MODULO as f64
    }

    /// 0.0 before the pair's stagger delay, rising to 1.0 over the fade-in.
    pub fn reveal(&self, elapsed_ms: f64) -> f32 {
        let delay = self.unit_seed() * STAGGER_MS;
        ((elapsed_ms - delay) / FADE_IN_MS).clamp(0.0, 1.0) as f32
    }

    /// Slow two-frequency pulse in roughly [0.0, 1.0].
    pub fn pulse(&self, now_ms: f64) -> f32 {
        let phase = self.unit_seed() * std::f64::consts::TAU;
        let f1 = 0.0003 + (self.seed % 100) as f64 / 100_000.0;
        let f2 = 0.00017 + (self.seed % 50) as f64 / 100_000.0;
        let p1 = (now_ms * f1 + phase).sin();
        let p2 = (now_ms * f2 + phase * 1.3).sin();
        (0.5 + p1 * 0.25 + p2 * 0.25) as f32
    }
}

/// Connection list plus the reveal clock.
#[derive(Debug, Clone, Default)]
pub struct ConnectionCache {
    lines: Vec<Connection>,
    started_at_ms: Option<f64>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute pairs. Only every `stride`-th star is a source; at most
    /// `max_lines` pairs are kept.
    pub fn rebuild(&mut self, stars: &[Star], max_distance: f32, stride: usize, max_lines: usize, now_ms: f64) {
        self.started_at_ms.get_or_insert(now_ms);
        self.lines.clear();
        if max_distance <= 0.0 || stars.len() < 2 {
            return;
        }
        let max_sq = max_distance * max_distance;
        let stride = stride.max(1);
        'sources: for a in (0..stars.len()).step_by(stride) {
            let pa = stars[a].pos;
            for (b, other) in stars.iter().enumerate() {
                if a == b || pa.distance_squared(other.pos) >= max_sq {
                    continue;
                }
                self.lines.push(Connection::new(a, b));
                if self.lines.len() >= max_lines {
                    break 'sources;
                }
            }
        }
    }

    /// Restart the stagger reveal and drop cached pairs.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.started_at_ms = None;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Visible segments at `now_ms`: endpoints from the live stars, alpha from
    /// distance, pulse and reveal. Stale or invisible pairs are skipped.
    pub fn segments<'a>(
        &'a self,
        stars: &'a [Star],
        max_distance: f32,
        opacity: f32,
        now_ms: f64,
    ) -> impl Iterator<Item = (Vec2, Vec2, f32)> + 'a {
        let elapsed = self.started_at_ms.map_or(0.0, |t| now_ms - t);
        self.lines.iter().filter_map(move |c| {
            let (pa, pb) = (stars.get(c.a)?.pos, stars.get(c.b)?.pos);
            let dist = pa.distance(pb);
            if dist >= max_distance {
                return None;
            }
            let alpha = opacity * (1.0 - dist / max_distance) * c.pulse(now_ms) * c.reveal(elapsed);
            (alpha > 0.0).then_some((pa, pb, alpha))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(xs: &[f32]) -> Vec<Star> {
        xs.iter().map(|&x| Star::new(Vec2::new(x, 10.0))).collect()
    }

    #[test]
    fn pairs_within_distance_from_sources_only() {
        let stars = row(&[0.0, 50.0, 500.0, 540.0]);
        let mut cache = ConnectionCache::new();
        cache.rebuild(&stars, 100.0, 1, 100, 0.0);
        // 0-1, 1-0, 2-3, 3-2
        assert_eq!(cache.len(), 4);

        cache.rebuild(&stars, 100.0, 2, 100, 0.0);
        // sources 0 and 2 only
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn rebuild_respects_line_cap() {
        let stars = row(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut cache = ConnectionCache::new();
        cache.rebuild(&stars, 100.0, 1, 7, 0.0);
        assert_eq!(cache.len(), 7);
    }

    #[test]
    fn connections_stagger_in() {
        let stars = row(&[0.0, 50.0]);
        let mut cache = ConnectionCache::new();
        cache.rebuild(&stars, 100.0, 1, 10, 1000.0);
        assert_eq!(cache.segments(&stars, 100.0, 0.15, 1000.0).count(), 0, "nothing visible at start");
        let late = 1000.0 + STAGGER_MS + FADE_IN_MS;
        for seg in cache.segments(&stars, 100.0, 0.15, late) {
            assert!(seg.2 <= 0.15 * 0.5 + 1e-6, "alpha was {}", seg.2);
        }
    }

    #[test]
    fn stale_pairs_are_skipped() {
        let mut stars = row(&[0.0, 50.0]);
        let mut cache = ConnectionCache::new();
        cache.rebuild(&stars, 100.0, 1, 10, 0.0);
        stars[1].pos.x = 400.0;
        assert_eq!(cache.segments(&stars, 100.0, 0.15, 20_000.0).count(), 0);
    }

    #[test]
    fn reveal_ramps_from_zero_to_one() {
        let c = Connection::new(0, 1);
        assert_eq!(c.reveal(-1.0), 0.0);
        assert_eq!(c.reveal(STAGGER_MS + FADE_IN_MS), 1.0);
    }
}
