//! Device-resident particle storage stepped by a compute kernel

use crate::ParticleStorage;
use particle_physics::{wgsl, FrameInput, FrameUniforms, Particle, WORKGROUP_SIZE};
use particle_renderer::validation::{create_pipeline, create_shader};
use particle_renderer::GpuError;
use wgpu::util::DeviceExt;

const UPDATE_SHADER: &str = include_str!("shaders/update.wgsl");

/// Full WGSL source of the update kernel
pub fn update_shader_source() -> String {
    format!("{}{}", wgsl::prelude(), UPDATE_SHADER)
}

/// Number of workgroups needed to cover `particle_count` invocations
pub fn workgroup_count(particle_count: u32) -> u32 {
    particle_count.div_ceil(WORKGROUP_SIZE)
}

/// GPU-resident particle state and the compute pipeline that advances it
pub struct DeviceSimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Buffers
    particle_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,

    // Compute pipeline
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,

    particle_count: u32,
}

impl DeviceSimulation {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        particles: &[Particle],
    ) -> Result<Self, GpuError> {
        log::debug!("Initializing DeviceSimulation with {} particles", particles.len());

        let particle_buffer = Self::create_particle_buffer(&device, particles);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = create_shader(&device, "Update Compute Shader", update_shader_source())?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Update Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Update Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_pipeline(&device, "Update Pipeline", || {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Update Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        })?;

        let bind_group =
            Self::create_bind_group(&device, &bind_group_layout, &particle_buffer, &uniform_buffer);

        Ok(Self {
            device,
            queue,
            particle_buffer,
            uniform_buffer,
            pipeline,
            bind_group_layout,
            bind_group,
            particle_count: particles.len() as u32,
        })
    }

    fn create_particle_buffer(device: &wgpu::Device, particles: &[Particle]) -> wgpu::Buffer {
        // Zero-sized storage bindings are invalid, so an empty set still gets
        // one zeroed slot; `particle_count` stays 0 and nothing is dispatched.
        let placeholder = [Particle::default()];
        let contents = if particles.is_empty() {
            &placeholder[..]
        } else {
            particles
        };

        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer"),
            contents: bytemuck::cast_slice(contents),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        particle_buffer: &wgpu::Buffer,
        uniform_buffer: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Update Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Write the frame uniforms and record the update dispatch into `encoder`
    pub fn encode_step(&self, encoder: &mut wgpu::CommandEncoder, input: &FrameInput) {
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&input.to_uniforms()),
        );

        if self.particle_count == 0 {
            return;
        }

        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Update Compute Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, &self.bind_group, &[]);
        compute_pass.dispatch_workgroups(workgroup_count(self.particle_count), 1, 1);
    }

    /// Record and submit one step on its own command buffer
    pub fn step(&self, input: &FrameInput) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Simulation Encoder"),
            });
        self.encode_step(&mut encoder, input);
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copy the particle buffer back to the host, blocking until the GPU is done
    pub fn read_particles(&self) -> Result<Vec<Particle>, GpuError> {
        if self.particle_count == 0 {
            return Ok(Vec::new());
        }

        let size = std::mem::size_of::<Particle>() as u64 * u64::from(self.particle_count);
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Readback Staging Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.particle_buffer, 0, &staging_buffer, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        receiver
            .recv()
            .map_err(|e| GpuError::Readback(e.to_string()))?
            .map_err(|e| GpuError::Readback(e.to_string()))?;

        let particles = {
            let data = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, Particle>(&data).to_vec()
        };
        staging_buffer.unmap();
        staging_buffer.destroy();

        Ok(particles)
    }

    pub fn particle_buffer(&self) -> &wgpu::Buffer {
        &self.particle_buffer
    }

    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }

    /// Destroy the device buffers. The simulation must not be stepped afterwards.
    pub fn release(&mut self) {
        self.particle_buffer.destroy();
        self.uniform_buffer.destroy();
        self.particle_count = 0;
    }
}

impl ParticleStorage for DeviceSimulation {
    type Encoder<'e> = &'e mut wgpu::CommandEncoder;

    fn particle_count(&self) -> u32 {
        self.particle_count
    }

    fn reallocate(&mut self, particles: &[Particle]) {
        log::debug!(
            "Reallocating particle buffer: {} -> {} particles",
            self.particle_count,
            particles.len()
        );

        self.particle_buffer.destroy();
        self.particle_buffer = Self::create_particle_buffer(&self.device, particles);
        self.bind_group = Self::create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &self.particle_buffer,
            &self.uniform_buffer,
        );
        self.particle_count = particles.len() as u32;
    }

    fn advance(&mut self, input: &FrameInput, encoder: &mut wgpu::CommandEncoder) {
        self.encode_step(encoder, input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workgroups_cover_every_particle() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(50_000), 782);
    }

    #[test]
    fn kernel_workgroup_size_matches_dispatch_math() {
        let source = update_shader_source();
        assert!(source.contains(&format!("@workgroup_size({WORKGROUP_SIZE})")));
    }
}
