//! Backend selection, per-frame input and the halt-on-error policy

use crate::stats::FrameStats;
use glam::Vec2;
use particle_physics::{FrameInput, MAX_DELTA_TIME};
use particle_simulation::{Backend, BackendError, BackendKind, BackendState, ErrorKind};
use std::time::Instant;

/// Particle count range reachable with the up/down keys
pub const MIN_STEPPED_PARTICLE_COUNT: u32 = 1_000;
pub const MAX_STEPPED_PARTICLE_COUNT: u32 = 1_000_000;

/// Size range and increment reachable with the +/- keys
pub const MIN_STEPPED_SIZE: f32 = 0.5;
pub const MAX_STEPPED_SIZE: f32 = 5.0;
pub const SIZE_STEP: f32 = 0.5;

/// Creates backends on demand so the controller never builds one itself
pub trait BackendFactory {
    fn create(&mut self, kind: BackendKind) -> Box<dyn Backend>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// A backend call failed; frames are no longer rendered until the user
    /// switches backend or resets
    Halted(String),
}

/// Wall-clock delta and elapsed time for each frame
#[derive(Debug)]
pub struct FrameClock {
    origin: Instant,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(origin: Instant) -> Self {
        Self { origin, last: None }
    }

    /// The next tick reports a zero delta
    pub fn restart(&mut self) {
        self.last = None;
    }

    /// Returns `(delta_time, time)` in seconds. Delta is capped at
    /// [`MAX_DELTA_TIME`] so long stalls do not blow up the integration.
    pub fn tick(&mut self, now: Instant) -> (f32, f32) {
        let delta = self
            .last
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32())
            .min(MAX_DELTA_TIME);
        self.last = Some(now);
        (delta, now.saturating_duration_since(self.origin).as_secs_f32())
    }
}

/// Map a pixel position to NDC (y up)
pub fn pointer_to_ndc(x: f64, y: f64, width: u32, height: u32) -> Vec2 {
    let width = f64::from(width.max(1));
    let height = f64::from(height.max(1));
    Vec2::new(
        (x / width * 2.0 - 1.0) as f32,
        -(y / height * 2.0 - 1.0) as f32,
    )
}

/// Double or halve `count` within the stepped range
pub fn step_particle_count(count: u32, up: bool) -> u32 {
    let next = if up {
        count.saturating_mul(2)
    } else {
        count / 2
    };
    next.clamp(MIN_STEPPED_PARTICLE_COUNT, MAX_STEPPED_PARTICLE_COUNT)
}

/// Grow or shrink `size` by one step within the stepped range
pub fn step_particle_size(size: f32, up: bool) -> f32 {
    let next = if up { size + SIZE_STEP } else { size - SIZE_STEP };
    next.clamp(MIN_STEPPED_SIZE, MAX_STEPPED_SIZE)
}

/// Owns the active backend and drives it one frame at a time
pub struct Controller<F: BackendFactory> {
    factory: F,
    backend: Option<Box<dyn Backend>>,
    kind: BackendKind,
    particle_count: u32,
    particle_size: f32,
    surface_size: (u32, u32),
    pointer: Vec2,
    pointer_active: bool,
    clock: FrameClock,
    stats: FrameStats,
    status: RunStatus,
    last_error: Option<ErrorKind>,
}

impl<F: BackendFactory> Controller<F> {
    pub fn new(
        factory: F,
        kind: BackendKind,
        particle_count: u32,
        particle_size: f32,
        origin: Instant,
    ) -> Self {
        Self {
            factory,
            backend: None,
            kind,
            particle_count,
            particle_size,
            surface_size: (1, 1),
            pointer: Vec2::ZERO,
            pointer_active: false,
            clock: FrameClock::new(origin),
            stats: FrameStats::new(),
            status: RunStatus::Running,
            last_error: None,
        }
    }

    /// Create and initialize the configured backend
    pub fn start(&mut self) {
        self.switch_backend(self.kind);
    }

    /// Release the active backend, then build `kind` from scratch
    pub fn switch_backend(&mut self, kind: BackendKind) {
        self.release_backend();
        self.kind = kind;
        self.status = RunStatus::Running;
        self.last_error = None;
        self.reset_timing();

        let mut backend = self.factory.create(kind);
        let (width, height) = self.surface_size;
        backend.resize_surface(width, height);

        match backend.initialize(self.particle_count) {
            Ok(()) => log::info!("✓ {} backend ready ({} particles)", kind, self.particle_count),
            Err(e) => self.halt(e),
        }
        self.backend = Some(backend);
    }

    /// Rebuild the active backend with fresh particles
    pub fn reset(&mut self) {
        log::info!("Resetting {} backend", self.kind);
        self.switch_backend(self.kind);
    }

    /// Reinitialize the active backend with `count` fresh particles
    pub fn set_particle_count(&mut self, count: u32) {
        if count == self.particle_count {
            return;
        }
        self.particle_count = count;
        self.reset_timing();

        match self.backend.as_mut() {
            Some(backend) if backend.state() == BackendState::Ready => {
                if let Err(e) = backend.resize(count) {
                    self.halt(e);
                }
            }
            // Applied by the next switch or reset
            _ => log::debug!("Deferring particle count {} until the backend is rebuilt", count),
        }
    }

    /// Change the display size; takes effect on the next frame
    pub fn set_particle_size(&mut self, size: f32) {
        self.particle_size = size;
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    pub fn set_pointer_active(&mut self, active: bool) {
        self.pointer_active = active;
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
        if let Some(backend) = self.backend.as_mut() {
            backend.resize_surface(width, height);
        }
    }

    /// Simulate and present one frame unless halted
    pub fn frame(&mut self, now: Instant) {
        if self.status != RunStatus::Running {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        let (delta_time, time) = self.clock.tick(now);
        let input = FrameInput {
            delta_time,
            time,
            pointer: self.pointer,
            pointer_active: self.pointer_active,
            particle_size: self.particle_size,
        };

        match backend.render_frame(&input) {
            Ok(()) => self.stats.record(delta_time, now),
            Err(e) => self.halt(e),
        }
    }

    /// Release the active backend and stop rendering
    pub fn shutdown(&mut self) {
        self.release_backend();
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn particle_size(&self) -> f32 {
        self.particle_size
    }

    /// The other backend, when the last failure was a missing capability
    pub fn suggested_fallback(&self) -> Option<BackendKind> {
        match self.last_error {
            Some(ErrorKind::Capability) => Some(match self.kind {
                BackendKind::Gpu => BackendKind::Cpu,
                BackendKind::Cpu => BackendKind::Gpu,
            }),
            _ => None,
        }
    }

    fn halt(&mut self, error: BackendError) {
        let message = format!("{} backend: {}", self.kind, error);
        log::error!("{message}");
        self.last_error = Some(error.kind());
        self.status = RunStatus::Halted(message);
    }

    fn reset_timing(&mut self) {
        self.stats.reset();
        self.clock.restart();
    }

    fn release_backend(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_renderer::GpuError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        Create(BackendKind),
        Initialize(BackendKind, u32),
        Render(FrameInput),
        Resize(u32),
        ResizeSurface(u32, u32),
        Release(BackendKind),
    }

    #[derive(Clone, Default)]
    struct Script {
        calls: Rc<RefCell<Vec<Call>>>,
        fail_initialize: Rc<RefCell<Option<fn() -> GpuError>>>,
        fail_render: Rc<RefCell<bool>>,
    }

    impl Script {
        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn renders(&self) -> Vec<FrameInput> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Render(input) => Some(input),
                    _ => None,
                })
                .collect()
        }
    }

    struct FakeBackend {
        kind: BackendKind,
        state: BackendState,
        count: u32,
        script: Script,
    }

    impl Backend for FakeBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn state(&self) -> BackendState {
            self.state
        }

        fn particle_count(&self) -> u32 {
            self.count
        }

        fn initialize(&mut self, particle_count: u32) -> Result<(), BackendError> {
            self.script
                .calls
                .borrow_mut()
                .push(Call::Initialize(self.kind, particle_count));
            if let Some(error) = *self.script.fail_initialize.borrow() {
                self.state = BackendState::Error;
                return Err(error().into());
            }
            self.count = particle_count;
            self.state = BackendState::Ready;
            Ok(())
        }

        fn render_frame(&mut self, input: &FrameInput) -> Result<(), BackendError> {
            self.script.calls.borrow_mut().push(Call::Render(*input));
            if *self.script.fail_render.borrow() {
                self.state = BackendState::Error;
                return Err(GpuError::Validation("buffer destroyed".into()).into());
            }
            Ok(())
        }

        fn resize(&mut self, particle_count: u32) -> Result<(), BackendError> {
            self.script.calls.borrow_mut().push(Call::Resize(particle_count));
            self.count = particle_count;
            Ok(())
        }

        fn resize_surface(&mut self, width: u32, height: u32) {
            self.script
                .calls
                .borrow_mut()
                .push(Call::ResizeSurface(width, height));
        }

        fn release(&mut self) {
            self.script.calls.borrow_mut().push(Call::Release(self.kind));
            self.state = BackendState::Uninitialized;
        }
    }

    struct FakeFactory(Script);

    impl BackendFactory for FakeFactory {
        fn create(&mut self, kind: BackendKind) -> Box<dyn Backend> {
            self.0.calls.borrow_mut().push(Call::Create(kind));
            Box::new(FakeBackend {
                kind,
                state: BackendState::Uninitialized,
                count: 0,
                script: self.0.clone(),
            })
        }
    }

    fn controller(kind: BackendKind) -> (Controller<FakeFactory>, Script, Instant) {
        let script = Script::default();
        let origin = Instant::now();
        let mut controller = Controller::new(FakeFactory(script.clone()), kind, 5_000, 1.0, origin);
        controller.resize_surface(800, 600);
        controller.start();
        (controller, script, origin)
    }

    fn ms(origin: Instant, millis: u64) -> Instant {
        origin + Duration::from_millis(millis)
    }

    #[test]
    fn frame_clock_caps_delta_and_starts_at_zero() {
        let origin = Instant::now();
        let mut clock = FrameClock::new(origin);

        assert_eq!(clock.tick(ms(origin, 1_000)), (0.0, 1.0));
        let (delta, _) = clock.tick(ms(origin, 1_016));
        assert!((delta - 0.016).abs() < 1e-6);

        // A 5 second stall is clamped
        let (delta, time) = clock.tick(ms(origin, 6_016));
        assert_eq!(delta, MAX_DELTA_TIME);
        assert!((time - 6.016).abs() < 1e-6);

        clock.restart();
        assert_eq!(clock.tick(ms(origin, 7_000)).0, 0.0);
    }

    #[test]
    fn pointer_maps_to_ndc_with_y_up() {
        assert_eq!(pointer_to_ndc(0.0, 0.0, 800, 600), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(400.0, 300.0, 800, 600), Vec2::ZERO);
        assert_eq!(pointer_to_ndc(800.0, 600.0, 800, 600), Vec2::new(1.0, -1.0));
        assert!(pointer_to_ndc(10.0, 10.0, 0, 0).is_finite());
    }

    #[test]
    fn stepped_count_and_size_are_clamped() {
        assert_eq!(step_particle_count(50_000, true), 100_000);
        assert_eq!(step_particle_count(50_000, false), 25_000);
        assert_eq!(step_particle_count(800_000, true), MAX_STEPPED_PARTICLE_COUNT);
        assert_eq!(step_particle_count(1_500, false), MIN_STEPPED_PARTICLE_COUNT);
        assert_eq!(step_particle_count(0, true), MIN_STEPPED_PARTICLE_COUNT);

        assert_eq!(step_particle_size(1.0, true), 1.5);
        assert_eq!(step_particle_size(0.5, false), MIN_STEPPED_SIZE);
        assert_eq!(step_particle_size(5.0, true), MAX_STEPPED_SIZE);
    }

    #[test]
    fn start_sizes_surface_before_initializing() {
        let (_controller, script, _) = controller(BackendKind::Gpu);
        assert_eq!(
            script.calls(),
            vec![
                Call::Create(BackendKind::Gpu),
                Call::ResizeSurface(800, 600),
                Call::Initialize(BackendKind::Gpu, 5_000),
            ]
        );
    }

    #[test]
    fn frames_carry_clamped_input() {
        let (mut controller, script, origin) = controller(BackendKind::Gpu);
        controller.set_pointer(Vec2::new(0.5, -0.5));
        controller.set_pointer_active(true);
        controller.set_particle_size(2.0);

        controller.frame(ms(origin, 100));
        controller.frame(ms(origin, 116));
        controller.frame(ms(origin, 2_000));

        let renders = script.renders();
        assert_eq!(renders.len(), 3);
        assert_eq!(renders[0].delta_time, 0.0);
        assert!((renders[1].delta_time - 0.016).abs() < 1e-6);
        assert_eq!(renders[2].delta_time, MAX_DELTA_TIME);
        assert!((renders[2].time - 2.0).abs() < 1e-6);
        assert!(renders.iter().all(|r| r.pointer_active && r.particle_size == 2.0));
        assert_eq!(renders[0].pointer, Vec2::new(0.5, -0.5));
        assert_eq!(controller.stats().frame_count(), 3);
    }

    #[test]
    fn render_failure_halts_without_retry() {
        let (mut controller, script, origin) = controller(BackendKind::Gpu);
        *script.fail_render.borrow_mut() = true;

        controller.frame(ms(origin, 16));
        assert!(matches!(controller.status(), RunStatus::Halted(m) if m.contains("buffer destroyed")));

        controller.frame(ms(origin, 32));
        controller.frame(ms(origin, 48));
        assert_eq!(script.renders().len(), 1);
        assert_eq!(controller.suggested_fallback(), None);
    }

    #[test]
    fn capability_failure_suggests_other_backend() {
        let script = Script::default();
        *script.fail_initialize.borrow_mut() =
            Some(|| GpuError::UnsupportedDevice("no compute shaders".into()));
        let mut controller = Controller::new(
            FakeFactory(script.clone()),
            BackendKind::Gpu,
            1_000,
            1.0,
            Instant::now(),
        );
        controller.start();

        assert!(matches!(controller.status(), RunStatus::Halted(_)));
        assert_eq!(controller.suggested_fallback(), Some(BackendKind::Cpu));
        controller.frame(Instant::now());
        assert!(script.renders().is_empty());

        *script.fail_initialize.borrow_mut() = None;
        controller.switch_backend(BackendKind::Cpu);
        assert_eq!(controller.status(), &RunStatus::Running);
        assert_eq!(controller.suggested_fallback(), None);
    }

    #[test]
    fn switching_releases_before_creating_and_resets_stats() {
        let (mut controller, script, origin) = controller(BackendKind::Gpu);
        controller.frame(ms(origin, 16));
        controller.frame(ms(origin, 32));
        assert_eq!(controller.stats().frame_count(), 2);

        controller.switch_backend(BackendKind::Cpu);
        assert_eq!(controller.stats().frame_count(), 0);
        assert_eq!(controller.kind(), BackendKind::Cpu);

        let calls = script.calls();
        let tail = &calls[calls.len() - 4..];
        assert_eq!(
            tail,
            &[
                Call::Release(BackendKind::Gpu),
                Call::Create(BackendKind::Cpu),
                Call::ResizeSurface(800, 600),
                Call::Initialize(BackendKind::Cpu, 5_000),
            ]
        );

        // First frame after a switch has zero delta
        controller.frame(ms(origin, 5_000));
        assert_eq!(script.renders().last().map(|r| r.delta_time), Some(0.0));
    }

    #[test]
    fn reset_rebuilds_and_clears_halt() {
        let (mut controller, script, origin) = controller(BackendKind::Cpu);
        *script.fail_render.borrow_mut() = true;
        controller.frame(ms(origin, 16));
        assert!(matches!(controller.status(), RunStatus::Halted(_)));

        *script.fail_render.borrow_mut() = false;
        controller.reset();
        assert_eq!(controller.status(), &RunStatus::Running);

        let creates = script
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(BackendKind::Cpu)))
            .count();
        assert_eq!(creates, 2);
    }

    #[test]
    fn particle_count_change_resizes_and_resets_stats() {
        let (mut controller, script, origin) = controller(BackendKind::Gpu);
        controller.frame(ms(origin, 16));

        controller.set_particle_count(0);
        assert_eq!(controller.particle_count(), 0);
        assert_eq!(controller.stats().frame_count(), 0);
        assert_eq!(script.calls().last(), Some(&Call::Resize(0)));

        // Unchanged count is a no-op
        controller.set_particle_count(0);
        assert_eq!(
            script.calls().iter().filter(|c| matches!(c, Call::Resize(_))).count(),
            1
        );
    }

    #[test]
    fn particle_count_change_while_halted_applies_on_reset() {
        let (mut controller, script, origin) = controller(BackendKind::Gpu);
        *script.fail_render.borrow_mut() = true;
        controller.frame(ms(origin, 16));

        controller.set_particle_count(20_000);
        assert!(!script.calls().contains(&Call::Resize(20_000)));

        *script.fail_render.borrow_mut() = false;
        controller.reset();
        assert_eq!(
            script.calls().last(),
            Some(&Call::Initialize(BackendKind::Gpu, 20_000))
        );
    }

    #[test]
    fn particle_count_change_skips_backend_that_failed_to_initialize() {
        let script = Script::default();
        *script.fail_initialize.borrow_mut() =
            Some(|| GpuError::Validation("out of memory".into()));
        let mut controller = Controller::new(
            FakeFactory(script.clone()),
            BackendKind::Cpu,
            1_000,
            1.0,
            Instant::now(),
        );
        controller.start();

        controller.set_particle_count(4_000);
        assert_eq!(controller.particle_count(), 4_000);
        assert!(!script.calls().iter().any(|c| matches!(c, Call::Resize(_))));

        *script.fail_initialize.borrow_mut() = None;
        controller.reset();
        assert_eq!(controller.status(), &RunStatus::Running);
        assert_eq!(
            script.calls().last(),
            Some(&Call::Initialize(BackendKind::Cpu, 4_000))
        );
    }

    #[test]
    fn shutdown_releases_backend() {
        let (mut controller, script, _) = controller(BackendKind::Gpu);
        controller.shutdown();
        assert_eq!(script.calls().last(), Some(&Call::Release(BackendKind::Gpu)));

        controller.shutdown();
        assert_eq!(
            script.calls().iter().filter(|c| matches!(c, Call::Release(_))).count(),
            1
        );
    }
}
