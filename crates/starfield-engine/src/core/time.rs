use std::collections::VecDeque;

/// Frame delta used for the first tick and for any delta the host reports
/// that cannot be trusted.
pub const FALLBACK_DELTA_MS: f32 = 16.0;
/// Deltas above this are treated as a stall (tab hidden, debugger) rather
/// than real elapsed time.
pub const MAX_TRUSTED_DELTA_MS: f32 = 200.0;

/// Delta between two host timestamps, falling back to 16 ms for the first
/// frame or for a non-finite, negative or stalled delta.
pub fn frame_delta(last_ms: Option<f64>, now_ms: f64) -> f32 {
    let Some(last) = last_ms else {
        return FALLBACK_DELTA_MS;
    };
    let dt = (now_ms - last) as f32;
    if !dt.is_finite() || dt < 0.0 || dt > MAX_TRUSTED_DELTA_MS {
        FALLBACK_DELTA_MS
    } else {
        dt
    }
}

/// Smoothed frames-per-second.
/// Samples `1000 / dt` on every `sample_every`-th frame into a sliding window.
pub struct FpsMeter {
    samples: VecDeque<f32>,
    window: usize,
    sample_every: u64,
    frames: u64,
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(60, 10)
    }
}

impl FpsMeter {
    pub fn new(window: usize, sample_every: u64) -> Self {
        Self {
            samples: VecDeque::with_capacity(window.max(1)),
            window: window.max(1),
            sample_every: sample_every.max(1),
            frames: 0,
        }
    }

    /// Record one frame. Returns the new average when a sample was taken.
    pub fn record(&mut self, dt_ms: f32) -> Option<f32> {
        let sample = self.frames % self.sample_every == 0;
        self.frames += 1;
        if !sample || dt_ms.is_nan() || dt_ms <= 0.0 {
            return None;
        }
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(1000.0 / dt_ms);
        Some(self.average())
    }

    /// Mean of the window, 0.0 before the first sample.
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_uses_fallback() {
        assert_eq!(frame_delta(None, 1234.0), FALLBACK_DELTA_MS);
        assert_eq!(frame_delta(Some(1000.0), 1020.0), 20.0);
    }

    #[test]
    fn untrusted_deltas_fall_back() {
        assert_eq!(frame_delta(Some(1000.0), 900.0), FALLBACK_DELTA_MS);
        assert_eq!(frame_delta(Some(1000.0), 1500.0), FALLBACK_DELTA_MS);
        assert_eq!(frame_delta(Some(1000.0), f64::NAN), FALLBACK_DELTA_MS);
        assert_eq!(frame_delta(Some(1000.0), 1200.0), 200.0);
    }

    #[test]
    fn samples_every_tenth_frame() {
        let mut fps = FpsMeter::default();
        let taken = (0..30).filter(|_| fps.record(20.0).is_some()).count();
        assert_eq!(taken, 3);
        assert!((fps.average() - 50.0).abs() < 1e-4, "average was {}", fps.average());
    }

    #[test]
    fn window_slides() {
        let mut fps = FpsMeter::new(2, 1);
        fps.record(10.0);
        fps.record(20.0);
        fps.record(20.0);
        assert_eq!(fps.sample_count(), 2);
        assert!((fps.average() - 50.0).abs() < 1e-4, "average was {}", fps.average());
    }

    #[test]
    fn zero_delta_is_not_sampled() {
        let mut fps = FpsMeter::new(4, 1);
        assert_eq!(fps.record(0.0), None);
        assert_eq!(fps.average(), 0.0);
    }
}
