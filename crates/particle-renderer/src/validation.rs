//! Validation error scopes around shader, pipeline and frame creation
//!
//! wgpu reports validation failures asynchronously through error scopes rather
//! than return values. These helpers turn them into [`GpuError`]s so callers can
//! fail loudly instead of hitting the uncaptured-error handler.

use crate::GpuError;

/// Run `f` inside a validation error scope and return the first error, if any
pub fn with_validation<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

/// Create a WGSL shader module, reporting rejected source as `ShaderCompile`
pub fn create_shader(
    device: &wgpu::Device,
    label: &str,
    source: String,
) -> Result<wgpu::ShaderModule, GpuError> {
    let (module, error) = with_validation(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });

    match error {
        Some(error) => Err(GpuError::ShaderCompile {
            label: label.to_string(),
            diagnostic: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Build a pipeline, reporting a rejected descriptor as `ProgramLink`
pub fn create_pipeline<T>(
    device: &wgpu::Device,
    label: &str,
    build: impl FnOnce() -> T,
) -> Result<T, GpuError> {
    let (pipeline, error) = with_validation(device, build);

    match error {
        Some(error) => Err(GpuError::ProgramLink {
            label: label.to_string(),
            diagnostic: error.to_string(),
        }),
        None => Ok(pipeline),
    }
}
