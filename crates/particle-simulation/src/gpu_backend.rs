//! Backend A: particles live in a device buffer, a compute kernel updates
//! them and the same buffer is drawn as quads without leaving the GPU

use crate::{
    respawn, Backend, BackendError, BackendKind, BackendState, DeviceSimulation, Lifecycle,
    ParticleStorage,
};
use particle_physics::{spawn_particles, FrameInput};
use particle_renderer::validation::with_validation;
use particle_renderer::{Capability, GpuContext, GpuError, QuadRenderer, RenderTarget};

struct GpuResources {
    context: GpuContext,
    simulation: DeviceSimulation,
    renderer: QuadRenderer,
    bind_group: wgpu::BindGroup,
}

impl GpuResources {
    fn new(target: &RenderTarget, particle_count: u32) -> Result<Self, BackendError> {
        let context = pollster::block_on(GpuContext::acquire(target, Capability::Compute))?;

        let particles = spawn_particles(particle_count, &mut rand::rng());
        let simulation =
            DeviceSimulation::new(context.device.clone(), context.queue.clone(), &particles)?;
        log::info!("✓ Simulation initialized ({} particles)", particle_count);

        let renderer = QuadRenderer::new(&context.device, context.format())?;
        let bind_group = renderer.bind(
            &context.device,
            simulation.particle_buffer(),
            simulation.uniform_buffer(),
        );
        log::info!("✓ Quad Renderer initialized");

        Ok(Self {
            context,
            simulation,
            renderer,
            bind_group,
        })
    }

    fn render(&mut self, input: &FrameInput) -> Result<(), BackendError> {
        let Some(output) = self.context.acquire_frame()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let device = self.context.device.clone();
        let ((), error) = with_validation(&device, || {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
            self.simulation.advance(input, &mut encoder);
            self.renderer.encode(
                &mut encoder,
                &view,
                &self.bind_group,
                self.simulation.particle_count(),
            );
            self.context.queue.submit(std::iter::once(encoder.finish()));
        });
        if let Some(error) = error {
            return Err(GpuError::Validation(error.to_string()).into());
        }

        output.present();
        Ok(())
    }

    fn resize(&mut self, particle_count: u32) -> Result<(), BackendError> {
        let device = self.context.device.clone();
        let ((), error) = with_validation(&device, || {
            respawn(&mut self.simulation, particle_count, &mut rand::rng());
            self.bind_group = self.renderer.bind(
                &device,
                self.simulation.particle_buffer(),
                self.simulation.uniform_buffer(),
            );
        });
        match error {
            Some(error) => Err(GpuError::Validation(error.to_string()).into()),
            None => Ok(()),
        }
    }
}

/// GPU-resident simulation rendered from the same storage buffer
pub struct GpuBackend {
    target: RenderTarget,
    lifecycle: Lifecycle,
    resources: Option<GpuResources>,
}

impl GpuBackend {
    pub fn new(target: RenderTarget) -> Self {
        Self {
            target,
            lifecycle: Lifecycle::default(),
            resources: None,
        }
    }
}

impl Backend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn state(&self) -> BackendState {
        self.lifecycle.state()
    }

    fn particle_count(&self) -> u32 {
        self.resources
            .as_ref()
            .map_or(0, |r| r.simulation.particle_count())
    }

    fn initialize(&mut self, particle_count: u32) -> Result<(), BackendError> {
        self.release();

        let result = GpuResources::new(&self.target, particle_count).map(|resources| {
            self.resources = Some(resources);
        });
        self.lifecycle.record(result)
    }

    fn render_frame(&mut self, input: &FrameInput) -> Result<(), BackendError> {
        self.lifecycle.ensure_ready()?;
        let Some(resources) = self.resources.as_mut() else {
            return Err(BackendError::NotReady(self.lifecycle.state()));
        };
        let result = resources.render(input);
        self.lifecycle.record(result)
    }

    fn resize(&mut self, particle_count: u32) -> Result<(), BackendError> {
        self.lifecycle.ensure_ready()?;
        let Some(resources) = self.resources.as_mut() else {
            return Err(BackendError::NotReady(self.lifecycle.state()));
        };
        log::debug!(
            "Resizing GPU simulation: {} -> {} particles",
            resources.simulation.particle_count(),
            particle_count
        );
        let result = resources.resize(particle_count);
        self.lifecycle.record(result)
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        self.target.width = width;
        self.target.height = height;
        if let Some(resources) = self.resources.as_mut() {
            resources.context.resize(width, height);
        }
    }

    fn release(&mut self) {
        if let Some(mut resources) = self.resources.take() {
            resources.simulation.release();
            log::info!("Released {} backend", self.kind());
        }
        self.lifecycle.released();
    }
}

impl Drop for GpuBackend {
    fn drop(&mut self) {
        self.release();
    }
}
