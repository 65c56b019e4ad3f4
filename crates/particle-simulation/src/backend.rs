//! The backend contract and its lifecycle state machine

use crate::BackendError;
use particle_physics::FrameInput;
use std::fmt;

/// Which backend implementation to run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// GPU-resident state, compute kernel + quad draw
    Gpu,
    /// Host-resident state, CPU loop + point-sprite draw
    Cpu,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Gpu => f.write_str("GPU compute"),
            BackendKind::Cpu => f.write_str("CPU simulation"),
        }
    }
}

/// Resource state of a backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendState {
    /// No resources held
    #[default]
    Uninitialized,
    /// Resources allocated, frames may be rendered
    Ready,
    /// A call failed; only `release` or `initialize` are meaningful
    Error,
}

/// Guards backend state transitions.
///
/// Only `initialize` and `release` move a backend between `Uninitialized` and
/// `Ready`; any failing call lands in `Error`.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: BackendState,
}

impl Lifecycle {
    pub fn state(&self) -> BackendState {
        self.state
    }

    /// Fail with `NotReady` unless the backend is `Ready`
    pub fn ensure_ready(&self) -> Result<(), BackendError> {
        match self.state {
            BackendState::Ready => Ok(()),
            state => Err(BackendError::NotReady(state)),
        }
    }

    /// Record the outcome of a call: success from `initialize` (or any call made
    /// while ready) leaves the backend `Ready`, failure moves it to `Error`
    pub fn record<T>(&mut self, result: Result<T, BackendError>) -> Result<T, BackendError> {
        self.state = match result {
            Ok(_) => BackendState::Ready,
            Err(_) => BackendState::Error,
        };
        result
    }

    pub fn released(&mut self) {
        self.state = BackendState::Uninitialized;
    }
}

/// A simulation + render implementation the controller can drive.
///
/// Both implementations apply the same update rule; they differ only in where
/// particle state lives and how it reaches the screen.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    fn state(&self) -> BackendState;

    fn particle_count(&self) -> u32;

    /// Acquire a context and allocate `particle_count` random particles.
    ///
    /// Releases any previous resources first.
    fn initialize(&mut self, particle_count: u32) -> Result<(), BackendError>;

    /// Simulate one frame and present it
    fn render_frame(&mut self, input: &FrameInput) -> Result<(), BackendError>;

    /// Reallocate for `particle_count` fresh random particles.
    ///
    /// Not frame-atomic: no frame may be in flight while resizing.
    fn resize(&mut self, particle_count: u32) -> Result<(), BackendError>;

    /// Track a new presentation surface size
    fn resize_surface(&mut self, width: u32, height: u32);

    /// Free all resources. Idempotent.
    fn release(&mut self);
}
