//! Backend error type and its classification

use crate::BackendState;
use particle_renderer::GpuError;
use thiserror::Error;

/// Errors returned by [`crate::Backend`] operations
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Gpu(#[from] GpuError),

    /// Operation requires a `Ready` backend
    #[error("Backend is not ready (state: {0:?})")]
    NotReady(BackendState),
}

/// Coarse classification of backend failures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required graphics capability is absent; the other backend may still work
    Capability,
    /// Adapter, device or surface request failed
    Acquisition,
    /// Shader source or pipeline rejected by the platform
    CompileOrLink,
    /// A per-frame call failed
    RuntimeRender,
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Gpu(GpuError::UnsupportedDevice(_) | GpuError::UnsupportedContext(_)) => {
                ErrorKind::Capability
            }
            BackendError::Gpu(GpuError::Adapter(_) | GpuError::Device(_) | GpuError::Surface(_)) => {
                ErrorKind::Acquisition
            }
            BackendError::Gpu(GpuError::ShaderCompile { .. } | GpuError::ProgramLink { .. }) => {
                ErrorKind::CompileOrLink
            }
            BackendError::Gpu(
                GpuError::Frame(_) | GpuError::Validation(_) | GpuError::Readback(_),
            )
            | BackendError::NotReady(_) => ErrorKind::RuntimeRender,
        }
    }
}
