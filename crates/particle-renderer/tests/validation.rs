//! Rejected shaders and pipelines surface as typed errors carrying the
//! platform's diagnostic.
//!
//! These tests need a compute-capable adapter, so they are ignored by default.
//! Run them with `cargo test -p particle-renderer -- --ignored`.

use particle_renderer::validation::{create_pipeline, create_shader};
use particle_renderer::{request_headless_device, GpuError};

const EMPTY_KERNEL: &str = "@compute @workgroup_size(1)\nfn main() {}\n";

fn device() -> wgpu::Device {
    let (device, _queue) = pollster::block_on(request_headless_device())
        .unwrap_or_else(|e| panic!("no compute adapter: {e}"));
    device
}

fn compute_pipeline(
    device: &wgpu::Device,
    module: &wgpu::ShaderModule,
    entry_point: &str,
) -> Result<wgpu::ComputePipeline, GpuError> {
    create_pipeline(device, "Test Pipeline", || {
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Test Pipeline"),
            layout: None,
            module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        })
    })
}

#[test]
#[ignore = "requires a compute-capable GPU adapter"]
fn invalid_wgsl_is_a_compile_error() {
    let device = device();

    let error = create_shader(&device, "Broken Shader", "fn main( {".to_string()).err();
    match error {
        Some(GpuError::ShaderCompile { label, diagnostic }) => {
            assert_eq!(label, "Broken Shader");
            assert!(!diagnostic.trim().is_empty());
        }
        other => panic!("expected ShaderCompile, got {other:?}"),
    }
}

#[test]
#[ignore = "requires a compute-capable GPU adapter"]
fn missing_entry_point_is_a_link_error() {
    let device = device();
    let module = create_shader(&device, "Empty Kernel", EMPTY_KERNEL.to_string())
        .expect("valid kernel should compile");

    assert!(compute_pipeline(&device, &module, "main").is_ok());

    match compute_pipeline(&device, &module, "missing").err() {
        Some(GpuError::ProgramLink { label, diagnostic }) => {
            assert_eq!(label, "Test Pipeline");
            assert!(!diagnostic.trim().is_empty());
        }
        other => panic!("expected ProgramLink, got {other:?}"),
    }
}
