//! GPU context acquisition: surface, adapter, device and queue

use crate::GpuError;
use std::sync::Arc;

/// Anything wgpu can create a window surface from (e.g. `Arc<winit::window::Window>`)
pub type SurfaceHandle = Arc<dyn wgpu::WindowHandle>;

/// Where a backend presents its frames
#[derive(Clone)]
pub struct RenderTarget {
    pub handle: SurfaceHandle,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    pub fn new(handle: SurfaceHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

/// What a backend needs from the adapter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Compute shaders plus rasterization (GPU-resident simulation)
    Compute,
    /// Rasterization only; accepts WebGL2-class adapters
    Rasterization,
}

impl Capability {
    fn backends(self) -> wgpu::Backends {
        match self {
            Capability::Compute => wgpu::Backends::PRIMARY,
            Capability::Rasterization => wgpu::Backends::all(),
        }
    }

    fn limits(self, supported: wgpu::Limits) -> wgpu::Limits {
        match self {
            Capability::Compute => wgpu::Limits::downlevel_defaults().using_resolution(supported),
            Capability::Rasterization => {
                wgpu::Limits::downlevel_webgl2_defaults().using_resolution(supported)
            }
        }
    }
}

/// A configured surface together with the device that renders to it
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Acquire a context for `target`, failing fast when `capability` is missing
    pub async fn acquire(target: &RenderTarget, capability: Capability) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: capability.backends(),
            ..Default::default()
        });

        let surface = instance.create_surface(target.handle.clone())?;

        let adapter = match capability {
            Capability::Compute => request_compute_adapter(&instance, Some(&surface)).await?,
            Capability::Rasterization => instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| GpuError::UnsupportedContext(e.to_string()))?,
        };

        let adapter_info = adapter.get_info();
        log::info!(
            "✓ Using GPU: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            capability
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: capability.limits(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                GpuError::UnsupportedContext(format!(
                    "surface is incompatible with adapter {}",
                    adapter_info.name
                ))
            })?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: target.width.max(1),
            height: target.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Get the next surface texture.
    ///
    /// Returns `Ok(None)` when the frame should be skipped: the surface was
    /// lost or outdated (it is reconfigured for the next frame) or timed out.
    pub fn acquire_frame(&mut self) -> Result<Option<wgpu::SurfaceTexture>, GpuError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn ensure_compute(adapter: &wgpu::Adapter) -> Result<(), GpuError> {
    // The quad renderer reads the particle storage buffer from the vertex stage
    let required = wgpu::DownlevelFlags::COMPUTE_SHADERS | wgpu::DownlevelFlags::VERTEX_STORAGE;
    let missing = required - adapter.get_downlevel_capabilities().flags;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(GpuError::UnsupportedDevice(format!(
            "adapter {} lacks {:?}",
            adapter.get_info().name,
            missing
        )))
    }
}

/// Request an adapter that can run the compute kernel and draw from its buffer.
///
/// When no compute-capable backend exposes any adapter at all the failure is
/// `UnsupportedDevice`; an adapter that exists but does not match the request
/// stays an `Adapter` error.
async fn request_compute_adapter(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> Result<wgpu::Adapter, GpuError> {
    let adapter = match instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface,
            force_fallback_adapter: false,
        })
        .await
    {
        Ok(adapter) => adapter,
        Err(e)
            if instance
                .enumerate_adapters(Capability::Compute.backends())
                .is_empty() =>
        {
            return Err(GpuError::UnsupportedDevice(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    ensure_compute(&adapter)?;
    Ok(adapter)
}

/// Request a device without a surface (offscreen compute and tests)
pub async fn request_headless_device() -> Result<(wgpu::Device, wgpu::Queue), GpuError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: Capability::Compute.backends(),
        ..Default::default()
    });

    let adapter = request_compute_adapter(&instance, None).await?;

    let device = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Headless Device"),
            required_features: wgpu::Features::empty(),
            required_limits: Capability::Compute.limits(adapter.limits()),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        })
        .await?;

    Ok(device)
}
