//! Backend B: particles live in host memory, a sequential loop updates them
//! and the whole array is uploaded every frame and drawn as point sprites

use crate::{
    respawn, Backend, BackendError, BackendKind, BackendState, HostSimulation, Lifecycle,
    ParticleStorage,
};
use particle_physics::{spawn_particles, FrameInput};
use particle_renderer::validation::with_validation;
use particle_renderer::{
    Capability, GpuContext, GpuError, PointRenderer, PointUniforms, RenderTarget,
};

struct CpuResources {
    context: GpuContext,
    simulation: HostSimulation,
    renderer: PointRenderer,
}

impl CpuResources {
    fn new(target: &RenderTarget, particle_count: u32) -> Result<Self, BackendError> {
        let context = pollster::block_on(GpuContext::acquire(target, Capability::Rasterization))?;

        let simulation = HostSimulation::new(spawn_particles(particle_count, &mut rand::rng()));
        log::info!("✓ Simulation initialized ({} particles)", particle_count);

        let renderer = PointRenderer::new(&context.device, context.format(), particle_count)?;
        log::info!("✓ Point Renderer initialized");

        Ok(Self {
            context,
            simulation,
            renderer,
        })
    }

    fn render(&mut self, input: &FrameInput) -> Result<(), BackendError> {
        let Some(output) = self.context.acquire_frame()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.simulation.advance(input, ());

        let queue = &self.context.queue;
        self.renderer.upload(queue, self.simulation.particles());
        self.renderer.write_uniforms(
            queue,
            &PointUniforms::new(input.particle_size, self.context.size()),
        );

        let device = &self.context.device;
        let ((), error) = with_validation(device, || {
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
            self.renderer
                .encode(&mut encoder, &view, self.simulation.particle_count());
            queue.submit(std::iter::once(encoder.finish()));
        });
        if let Some(error) = error {
            return Err(GpuError::Validation(error.to_string()).into());
        }

        output.present();
        Ok(())
    }

    fn resize(&mut self, particle_count: u32) -> Result<(), BackendError> {
        respawn(&mut self.simulation, particle_count, &mut rand::rng());

        let device = &self.context.device;
        let ((), error) = with_validation(device, || {
            self.renderer.reallocate(device, particle_count);
        });
        match error {
            Some(error) => Err(GpuError::Validation(error.to_string()).into()),
            None => Ok(()),
        }
    }
}

/// Host-resident simulation uploaded and drawn every frame
pub struct CpuBackend {
    target: RenderTarget,
    lifecycle: Lifecycle,
    resources: Option<CpuResources>,
}

impl CpuBackend {
    pub fn new(target: RenderTarget) -> Self {
        Self {
            target,
            lifecycle: Lifecycle::default(),
            resources: None,
        }
    }
}

impl Backend for CpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Cpu
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

        let result = CpuResources::new(&self.target, particle_count).map(|resources| {
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
            "Resizing CPU simulation: {} -> {} particles",
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
            resources.renderer.release();
            resources.simulation.clear();
            log::info!("Released {} backend", self.kind());
        }
        self.lifecycle.released();
    }
}

impl Drop for CpuBackend {
    fn drop(&mut self) {
        self.release();
    }
}
