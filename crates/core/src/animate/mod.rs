use std::time::Instant;

use tiny_skia::Pixmap;

use crate::{
    analysis::ArtConfig,
    render::{render_frame, FrameContext, PointerState},
};

/// Minimum interval between executed frames, in milliseconds (~30 fps).
/// Callbacks that fire earlier reschedule without drawing.
pub const FRAME_BUDGET_MS: f64 = 33.0;

/// Monotonic clock that phase-shifts all periodic motion. Starts at zero
/// when the engine comes up; never persisted.
#[derive(Debug, Clone)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was started.
    pub fn elapsed_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Opaque handle to one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Minimal frame-scheduling boundary, the request-animation-frame
/// equivalent of the host. Keeping it a trait lets the driver's
/// throttle logic run against a fake in tests.
pub trait FrameScheduler {
    /// Asks the host to invoke the frame callback once, soon.
    fn schedule(&mut self) -> FrameHandle;
    /// Revokes a previously scheduled callback that has not fired yet.
    fn cancel(&mut self, handle: FrameHandle);
}

/// Scheduler for hosts that drive the callback from their own loop; it
/// only issues handles, pacing is up to the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u64,
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next_handle += 1;
        FrameHandle::new(self.next_handle)
    }

    fn cancel(&mut self, _handle: FrameHandle) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No art configuration yet; nothing is scheduled.
    Idle,
    /// A repeating frame callback is scheduled.
    Running,
}

/// What a single scheduled callback ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The driver was not running; the callback did nothing.
    Idle,
    /// The surface is gone; the callback no-oped and the loop stopped.
    SurfaceLost,
    /// Under the frame budget; rescheduled without drawing.
    Throttled,
    /// A full background-and-patterns pass was drawn and rescheduled.
    Rendered,
}

/// Owns the frame loop: throttles redraws to [`FRAME_BUDGET_MS`] and keeps
/// exactly one callback scheduled while running. The driver holds the only
/// scheduling handle, so teardown can always revoke the pending callback.
#[derive(Debug)]
pub struct AnimationDriver<S: FrameScheduler> {
    scheduler: S,
    state: DriverState,
    config: Option<ArtConfig>,
    pending: Option<FrameHandle>,
    last_drawn_ms: f64,
}

impl<S: FrameScheduler> AnimationDriver<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: DriverState::Idle,
            config: None,
            pending: None,
            last_drawn_ms: 0.0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Whether a frame callback is currently scheduled.
    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Installs an art configuration and starts the loop. Calling this
    /// again while running swaps the configuration in place without
    /// scheduling a second callback.
    pub fn start(&mut self, config: ArtConfig) {
        self.config = Some(config);
        if self.state == DriverState::Idle {
            self.state = DriverState::Running;
            if self.pending.is_none() {
                self.pending = Some(self.scheduler.schedule());
            }
        }
    }

    /// The scheduled frame callback. `now_ms` is the host's notion of the
    /// frame clock; `surface` is `None` once the hosting view is torn
    /// down, in which case the callback no-ops and the loop stops.
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        surface: Option<&mut Pixmap>,
        pointer: PointerState,
    ) -> FrameOutcome {
        self.pending = None;

        if self.state != DriverState::Running {
            return FrameOutcome::Idle;
        }
        let Some(config) = self.config.as_ref() else {
            return FrameOutcome::Idle;
        };
        let Some(pixmap) = surface else {
            return FrameOutcome::SurfaceLost;
        };

        if now_ms - self.last_drawn_ms < FRAME_BUDGET_MS {
            self.pending = Some(self.scheduler.schedule());
            return FrameOutcome::Throttled;
        }

        self.last_drawn_ms = now_ms;
        render_frame(pixmap, config, &FrameContext::new(pointer, now_ms));
        self.pending = Some(self.scheduler.schedule());
        FrameOutcome::Rendered
    }

    /// Tears the loop down, revoking any callback that has not fired.
    /// Must hold up under rapid start/stop cycles: a cancelled callback
    /// never draws onto a disposed surface.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        self.state = DriverState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::render::create_surface;

    #[derive(Debug, Default)]
    struct FakeScheduler {
        next_handle: u64,
        scheduled: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for FakeScheduler {
        fn schedule(&mut self) -> FrameHandle {
            self.next_handle += 1;
            let handle = FrameHandle::new(self.next_handle);
            self.scheduled.push(handle);
            handle
        }

        fn cancel(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    fn driver() -> AnimationDriver<FakeScheduler> {
        AnimationDriver::new(FakeScheduler::default())
    }

    fn surface() -> Pixmap {
        create_surface(&CanvasConfig {
            width: 32,
            height: 32,
        })
        .unwrap()
    }

    #[test]
    fn idle_driver_ignores_frames() {
        let mut driver = driver();
        let mut pixmap = surface();

        let outcome = driver.on_frame(100.0, Some(&mut pixmap), PointerState::default());

        assert_eq!(outcome, FrameOutcome::Idle);
        assert!(driver.scheduler.scheduled.is_empty());
    }

    #[test]
    fn start_schedules_exactly_one_frame() {
        let mut driver = driver();
        driver.start(ArtConfig::fallback());

        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(driver.scheduler.scheduled.len(), 1);

        // Refreshing the config mid-run must not double-schedule.
        driver.start(ArtConfig::fallback());
        assert_eq!(driver.scheduler.scheduled.len(), 1);
    }

    #[test]
    fn frames_inside_the_budget_reschedule_without_drawing() {
        let mut driver = driver();
        let mut pixmap = surface();
        driver.start(ArtConfig::fallback());

        assert_eq!(
            driver.on_frame(100.0, Some(&mut pixmap), PointerState::default()),
            FrameOutcome::Rendered
        );
        let after_draw = pixmap.data().to_vec();

        assert_eq!(
            driver.on_frame(110.0, Some(&mut pixmap), PointerState::default()),
            FrameOutcome::Throttled
        );
        assert_eq!(pixmap.data(), &after_draw[..], "throttled frame must not draw");

        assert_eq!(
            driver.on_frame(140.0, Some(&mut pixmap), PointerState::default()),
            FrameOutcome::Rendered
        );
    }

    #[test]
    fn lost_surface_stops_the_loop_without_panicking() {
        let mut driver = driver();
        driver.start(ArtConfig::fallback());

        let outcome = driver.on_frame(100.0, None, PointerState::default());

        assert_eq!(outcome, FrameOutcome::SurfaceLost);
        assert!(!driver.has_pending_frame());
        assert_eq!(driver.scheduler.scheduled.len(), 1, "no reschedule after loss");
    }

    #[test]
    fn stop_cancels_the_pending_frame() {
        let mut driver = driver();
        driver.start(ArtConfig::fallback());
        let pending = driver.scheduler.scheduled[0];

        driver.stop();

        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.scheduler.cancelled, vec![pending]);
        assert!(!driver.has_pending_frame());
    }

    #[test]
    fn rapid_start_stop_cycles_leave_no_dangling_callback() {
        let mut driver = driver();
        for _ in 0..5 {
            driver.start(ArtConfig::fallback());
            driver.stop();
        }

        assert_eq!(
            driver.scheduler.scheduled.len(),
            driver.scheduler.cancelled.len()
        );

        let mut pixmap = surface();
        let outcome = driver.on_frame(500.0, Some(&mut pixmap), PointerState::default());
        assert_eq!(outcome, FrameOutcome::Idle);
    }

    #[test]
    fn clock_advances_monotonically() {
        let clock = FrameClock::start();
        let first = clock.elapsed_ms();
        let second = clock.elapsed_ms();
        assert!(second >= first);
        assert!(first >= 0.0);
    }
}
