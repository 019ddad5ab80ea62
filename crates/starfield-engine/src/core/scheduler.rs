//! Frame scheduling, decoupled from the host's frame API.
//!
//! The scheduler owns the lifecycle (start / cancel / restart), the frame
//! delta, the heavy-tick cadence and failure recovery. The host only has to
//! implement [`FrameHost`]; the engine only has to implement [`Simulation`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::core::time::frame_delta;
use crate::error::{EngineError, EngineResult};

/// Heavy work (connections, effect advection, FPS sampling) runs on one frame in this many.
pub const HEAVY_FRAME_INTERVAL: u32 = 8;
/// Delay before retrying after a failed tick, and before the first frame after a restart.
pub const RETRY_DELAY_MS: f64 = 100.0;
/// Consecutive failures at which the scheduler reports degraded mode.
pub const DEGRADED_AFTER: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Restarting,
}

/// Opaque id of a frame request, as issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u32);

/// The host side of scheduling: "call me back on the next frame" or "after N ms".
pub trait FrameHost {
    fn request_frame(&mut self) -> FrameHandle;
    fn request_frame_after(&mut self, delay_ms: f64) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What the scheduler asked the host for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameRequest {
    NextFrame,
    After(f64),
}

/// A `FrameHost` that records requests instead of talking to a real event
/// loop. The web bridge polls it after every call into the engine and hands
/// the handle back when the frame fires; tests inspect it directly.
#[derive(Debug, Default)]
pub struct QueuedFrameHost {
    next_id: u32,
    /// Issued but not yet picked up by the host.
    pending: Option<(FrameHandle, FrameRequest)>,
    /// The single request that may still fire.
    current: Option<FrameHandle>,
    issued: u32,
    cancelled: u32,
}

impl QueuedFrameHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request not yet picked up, if any.
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending.map(|(_, r)| r)
    }

    /// Pick up the latest request; the caller becomes responsible for firing it.
    pub fn take_pending(&mut self) -> Option<(FrameHandle, FrameRequest)> {
        self.pending.take()
    }

    /// Mark `handle` as fired. False for stale or cancelled handles, whose
    /// callbacks must be ignored.
    pub fn fire(&mut self, handle: FrameHandle) -> bool {
        if self.current == Some(handle) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }

    pub fn cancelled(&self) -> u32 {
        self.cancelled
    }

    fn issue(&mut self, request: FrameRequest) -> FrameHandle {
        self.next_id = self.next_id.wrapping_add(1);
        self.issued += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some((handle, request));
        self.current = Some(handle);
        handle
    }
}

impl FrameHost for QueuedFrameHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.issue(FrameRequest::NextFrame)
    }

    fn request_frame_after(&mut self, delay_ms: f64) -> FrameHandle {
        self.issue(FrameRequest::After(delay_ms))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.current == Some(handle) {
            self.current = None;
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Per-frame timing handed to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub timestamp_ms: f64,
    /// Sanitized delta: 16 ms on the first frame or after a stall.
    pub delta_ms: f32,
    pub heavy: bool,
    pub frame_index: u64,
}

/// Entity counts logged alongside tick failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickDiagnostics {
    pub stars: usize,
    pub black_holes: usize,
    pub suns: usize,
    pub planets: usize,
    pub effects: usize,
}

impl fmt::Display for TickDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stars={} black_holes={} suns={} planets={} effects={}",
            self.stars, self.black_holes, self.suns, self.planets, self.effects
        )
    }
}

/// The engine side of scheduling.
pub trait Simulation {
    /// False while the drawing surface or viewport is unavailable.
    fn is_ready(&self) -> bool;
    fn entity_count(&self) -> usize;
    /// Generate entities if there are none.
    fn ensure_entities(&mut self);
    fn tick(&mut self, frame: &FrameInfo) -> EngineResult<()>;
    fn diagnostics(&self) -> TickDiagnostics;
}

/// Result of one `on_frame` call.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Scheduler is stopped; nothing was scheduled.
    Stopped,
    /// Surface not ready; retried next frame.
    Skipped,
    Ticked(FrameInfo),
    Failed(EngineError),
}

pub struct AnimationScheduler {
    state: SchedulerState,
    pending: Option<FrameHandle>,
    last_frame_ms: Option<f64>,
    skip_counter: u32,
    frame_count: u64,
    heavy_frames: u64,
    failures: u32,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Stopped,
            pending: None,
            last_frame_ms: None,
            skip_counter: 0,
            frame_count: 0,
            heavy_frames: 0,
            failures: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_degraded(&self) -> bool {
        self.failures >= DEGRADED_AFTER
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn heavy_frames(&self) -> u64 {
        self.heavy_frames
    }

    /// Stopped -> Running. No-op in any other state.
    pub fn start(&mut self, host: &mut impl FrameHost) {
        if self.state != SchedulerState::Stopped {
            return;
        }
        self.state = SchedulerState::Running;
        self.last_frame_ms = None;
        self.pending = Some(host.request_frame());
        log::info!("animation started");
    }

    /// Stop and cancel the pending frame. Idempotent.
    pub fn cancel(&mut self, host: &mut impl FrameHost) {
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        if self.state != SchedulerState::Stopped {
            log::info!("animation cancelled after {} frames", self.frame_count);
        }
        self.state = SchedulerState::Stopped;
    }

    /// Tear down and resume after a short delay with fresh timing and entities.
    pub fn restart(&mut self, sim: &mut impl Simulation, host: &mut impl FrameHost) {
        self.state = SchedulerState::Restarting;
        if let Some(handle) = self.pending.take() {
            host.cancel_frame(handle);
        }
        self.last_frame_ms = None;
        self.failures = 0;
        sim.ensure_entities();
        self.pending = Some(host.request_frame_after(RETRY_DELAY_MS));
        log::info!("animation restarting");
    }

    /// Run one frame. Called by the host when a requested frame fires.
    pub fn on_frame(
        &mut self,
        timestamp_ms: f64,
        sim: &mut impl Simulation,
        host: &mut impl FrameHost,
    ) -> FrameOutcome {
        // The request that brought us here has fired.
        self.pending = None;
        match self.state {
            SchedulerState::Stopped => return FrameOutcome::Stopped,
            SchedulerState::Restarting => {
                log::info!("animation resumed after restart");
                self.state = SchedulerState::Running;
            }
            SchedulerState::Running => {}
        }

        let delta_ms = frame_delta(self.last_frame_ms, timestamp_ms);
        self.last_frame_ms = Some(timestamp_ms);

        if !sim.is_ready() {
            log::debug!("surface not ready, skipping frame");
            self.pending = Some(host.request_frame());
            return FrameOutcome::Skipped;
        }
        if sim.entity_count() == 0 {
            log::debug!("no entities, regenerating");
            sim.ensure_entities();
        }

        // Counts ticks, not frames, so skipped frames do not shift the cadence.
        self.skip_counter = (self.skip_counter + 1) % HEAVY_FRAME_INTERVAL;
        let heavy = self.skip_counter == 0;

        let info = FrameInfo {
            timestamp_ms,
            delta_ms,
            heavy,
            frame_index: self.frame_count,
        };
        let result = panic::catch_unwind(AssertUnwindSafe(|| sim.tick(&info)))
            .unwrap_or_else(|payload| Err(EngineError::TickPanicked(panic_message(payload.as_ref()))));

        match result {
            Ok(()) => {
                if self.is_degraded() {
                    log::info!("recovered after {} failed ticks", self.failures);
                }
                self.failures = 0;
                self.frame_count += 1;
                if heavy {
                    self.heavy_frames += 1;
                }
                self.pending = Some(host.request_frame());
                FrameOutcome::Ticked(info)
            }
            Err(err) => {
                self.failures += 1;
                log::error!(
                    "tick failed at {:.1} ms (state={:?}, consecutive={}, {}): {}",
                    timestamp_ms,
                    self.state,
                    self.failures,
                    sim.diagnostics(),
                    err
                );
                if self.failures == DEGRADED_AFTER {
                    log::warn!("entering degraded mode after {} consecutive failures", self.failures);
                }
                self.pending = Some(host.request_frame_after(RETRY_DELAY_MS));
                FrameOutcome::Failed(err)
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSim {
        ready: bool,
        entities: usize,
        ticks: Vec<FrameInfo>,
        fail_next: u32,
        panic_next: bool,
        seeded: u32,
        /// `ensure_entities` cannot produce anything.
        seedless: bool,
    }

    impl FakeSim {
        fn ready() -> Self {
            Self {
                ready: true,
                entities: 10,
                ..Default::default()
            }
        }
    }

    impl Simulation for FakeSim {
        fn is_ready(&self) -> bool {
            self.ready
        }
        fn entity_count(&self) -> usize {
            self.entities
        }
        fn ensure_entities(&mut self) {
            self.seeded += 1;
            if self.entities == 0 && !self.seedless {
                self.entities = 10;
            }
        }
        fn tick(&mut self, frame: &FrameInfo) -> EngineResult<()> {
            if self.panic_next {
                self.panic_next = false;
                panic!("boom");
            }
            if self.fail_next > 0 {
                self.fail_next -= 1;
                return Err(EngineError::NonFinite { what: "star position" });
            }
            self.ticks.push(*frame);
            Ok(())
        }
        fn diagnostics(&self) -> TickDiagnostics {
            TickDiagnostics {
                stars: self.entities,
                ..Default::default()
            }
        }
    }

    fn run(sched: &mut AnimationScheduler, sim: &mut FakeSim, host: &mut QueuedFrameHost, frames: usize, start_ms: f64) {
        for i in 0..frames {
            sched.on_frame(start_ms + i as f64 * 16.0, sim, host);
        }
    }

    #[test]
    fn heavy_path_runs_twice_in_sixteen_ticks() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        run(&mut sched, &mut sim, &mut host, 16, 0.0);
        let heavy = sim.ticks.iter().filter(|f| f.heavy).count();
        assert_eq!(heavy, 2, "heavy ticks: {}", heavy);
        assert_eq!(sched.heavy_frames(), 2);
        assert_eq!(sched.frame_count(), 16);
    }

    #[test]
    fn first_delta_is_nominal() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        sched.on_frame(5000.0, &mut sim, &mut host);
        sched.on_frame(5010.0, &mut sim, &mut host);
        sched.on_frame(9000.0, &mut sim, &mut host);
        let deltas: Vec<f32> = sim.ticks.iter().map(|f| f.delta_ms).collect();
        assert_eq!(deltas, vec![16.0, 10.0, 16.0]);
    }

    #[test]
    fn stopped_scheduler_ignores_frames() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        let mut host = QueuedFrameHost::new();
        assert!(matches!(sched.on_frame(0.0, &mut sim, &mut host), FrameOutcome::Stopped));
        assert!(host.pending().is_none());
        assert!(sim.ticks.is_empty());
    }

    #[test]
    fn start_is_idempotent_and_cancel_clears_pending() {
        let mut sched = AnimationScheduler::new();
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        sched.start(&mut host);
        assert_eq!(host.issued(), 1);
        assert_eq!(host.pending(), Some(FrameRequest::NextFrame));

        sched.cancel(&mut host);
        assert_eq!(sched.state(), SchedulerState::Stopped);
        assert_eq!(host.pending(), None);
        assert_eq!(host.cancelled(), 1);
        sched.cancel(&mut host);
        assert_eq!(host.cancelled(), 1);
    }

    #[test]
    fn restart_waits_then_resumes_with_fresh_delta() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        run(&mut sched, &mut sim, &mut host, 3, 0.0);

        sched.restart(&mut sim, &mut host);
        assert_eq!(sched.state(), SchedulerState::Restarting);
        assert_eq!(host.pending(), Some(FrameRequest::After(RETRY_DELAY_MS)));
        assert_eq!(sim.seeded, 1);

        sched.on_frame(10_000.0, &mut sim, &mut host);
        assert_eq!(sched.state(), SchedulerState::Running);
        assert_eq!(sim.ticks.last().map(|f| f.delta_ms), Some(16.0));
    }

    #[test]
    fn unready_surface_skips_without_ticking() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        sim.ready = false;
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        assert!(matches!(sched.on_frame(0.0, &mut sim, &mut host), FrameOutcome::Skipped));
        assert_eq!(host.pending(), Some(FrameRequest::NextFrame));
        assert!(sim.ticks.is_empty());
        assert_eq!(sched.consecutive_failures(), 0);
    }

    #[test]
    fn empty_scene_is_seeded_and_ticked() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        sim.entities = 0;
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        assert!(matches!(sched.on_frame(0.0, &mut sim, &mut host), FrameOutcome::Ticked(_)));
        assert_eq!(sim.seeded, 1);
        assert_eq!(sim.entities, 10);
    }

    #[test]
    fn scene_that_stays_empty_still_ticks() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        sim.entities = 0;
        sim.seedless = true;
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        run(&mut sched, &mut sim, &mut host, 5, 0.0);
        assert_eq!(sim.ticks.len(), 5);
        assert_eq!(sched.frame_count(), 5);
        assert_eq!(host.pending(), Some(FrameRequest::NextFrame));
    }

    #[test]
    fn skipped_frames_do_not_advance_cadence() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        sim.ready = false;
        run(&mut sched, &mut sim, &mut host, 3, 0.0);
        sim.ready = true;
        run(&mut sched, &mut sim, &mut host, 8, 100.0);
        let heavy: Vec<u64> = sim.ticks.iter().filter(|f| f.heavy).map(|f| f.frame_index).collect();
        assert_eq!(heavy, vec![7]);
    }

    #[test]
    fn failures_retry_after_delay_and_degrade() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        sim.fail_next = 3;
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);

        assert!(matches!(sched.on_frame(0.0, &mut sim, &mut host), FrameOutcome::Failed(_)));
        assert_eq!(host.pending(), Some(FrameRequest::After(RETRY_DELAY_MS)));
        assert!(!sched.is_degraded());
        sched.on_frame(100.0, &mut sim, &mut host);
        sched.on_frame(200.0, &mut sim, &mut host);
        assert!(sched.is_degraded());
        assert_eq!(sched.state(), SchedulerState::Running);

        assert!(matches!(sched.on_frame(300.0, &mut sim, &mut host), FrameOutcome::Ticked(_)));
        assert!(!sched.is_degraded());
        assert_eq!(host.pending(), Some(FrameRequest::NextFrame));
    }

    #[test]
    fn panicking_tick_is_caught() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        sim.panic_next = true;
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        match sched.on_frame(0.0, &mut sim, &mut host) {
            FrameOutcome::Failed(EngineError::TickPanicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(sched.consecutive_failures(), 1);
        assert!(matches!(sched.on_frame(100.0, &mut sim, &mut host), FrameOutcome::Ticked(_)));
    }

    #[test]
    fn stale_handles_do_not_fire() {
        let mut sched = AnimationScheduler::new();
        let mut sim = FakeSim::ready();
        let mut host = QueuedFrameHost::new();
        sched.start(&mut host);
        let (first, _) = host.take_pending().unwrap();
        sched.restart(&mut sim, &mut host);
        let (second, req) = host.take_pending().unwrap();
        assert_eq!(req, FrameRequest::After(RETRY_DELAY_MS));
        assert!(!host.fire(first), "cancelled request fired");
        assert!(host.fire(second));
        assert!(!host.fire(second), "request fired twice");
    }
}
