//! Error types for GPU context acquisition and pipeline creation

use thiserror::Error;

/// Errors raised while acquiring or using a GPU context
#[derive(Debug, Error)]
pub enum GpuError {
    /// The adapter cannot run compute shaders
    #[error("GPU compute is not supported on this device: {0}")]
    UnsupportedDevice(String),

    /// No adapter can rasterize to the surface
    #[error("No rasterization context is available: {0}")]
    UnsupportedContext(String),

    /// Adapter request failed
    #[error("Failed to get GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// Device request failed
    #[error("Failed to get GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// Surface creation failed
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// Shader source rejected by the platform
    #[error("Failed to compile shader `{label}`: {diagnostic}")]
    ShaderCompile { label: String, diagnostic: String },

    /// Pipeline creation rejected by the platform
    #[error("Failed to link pipeline `{label}`: {diagnostic}")]
    ProgramLink { label: String, diagnostic: String },

    /// The next surface texture could not be acquired
    #[error("Failed to acquire frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),

    /// A validation error surfaced while recording or submitting a frame
    #[error("GPU validation failed: {0}")]
    Validation(String),

    /// Reading particles back from the device failed
    #[error("Buffer readback failed: {0}")]
    Readback(String),
}
