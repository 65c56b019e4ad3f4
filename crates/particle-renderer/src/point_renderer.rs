//! Point-sprite rendering of a host-uploaded particle array

use crate::validation::{create_pipeline, create_shader};
use crate::{GpuError, CLEAR_COLOR};
use bytemuck::{Pod, Zeroable};
use particle_physics::{wgsl, Particle};

/// Sprite diameter in physical pixels at particle size 1.0
pub const POINT_BASE_SIZE: f32 = 3.0;

const POINT_SHADER: &str = include_str!("shaders/point.wgsl");

/// Full WGSL source of the point shader
pub fn point_shader_source() -> String {
    format!("{}{}", wgsl::prelude(), POINT_SHADER)
}

/// Uniform block of the point shader (16 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointUniforms {
    pub particle_size: f32,
    pub point_scale: f32,
    pub viewport: [f32; 2],
}

impl PointUniforms {
    pub fn new(particle_size: f32, (width, height): (u32, u32)) -> Self {
        Self {
            particle_size,
            point_scale: POINT_BASE_SIZE,
            viewport: [width as f32, height as f32],
        }
    }
}

/// Instance layout of one particle in the vertex buffer
pub const fn particle_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: &[wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // velocity
        2 => Float32x3, // color
        3 => Float32,   // life
    ];

    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Particle>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: ATTRIBUTES,
    }
}

/// Draws particles as round point sprites from an instance vertex buffer
pub struct PointRenderer {
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    capacity: u32,
}

impl PointRenderer {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        capacity: u32,
    ) -> Result<Self, GpuError> {
        let shader = create_shader(device, "Point Shader", point_shader_source())?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Uniform Buffer"),
            size: std::mem::size_of::<PointUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = create_pipeline(device, "Point Render Pipeline", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Point Render Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vertex"),
                    buffers: &[particle_layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fragment"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        let vertex_buffer = Self::create_vertex_buffer(device, capacity);

        Ok(Self {
            render_pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            capacity,
        })
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: u32) -> wgpu::Buffer {
        // Zero-sized buffers cannot be bound; keep room for one particle.
        let size = std::mem::size_of::<Particle>() as u64 * u64::from(capacity.max(1));
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Vertex Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Replace the vertex buffer with one sized for `capacity` particles
    pub fn reallocate(&mut self, device: &wgpu::Device, capacity: u32) {
        self.vertex_buffer.destroy();
        self.vertex_buffer = Self::create_vertex_buffer(device, capacity);
        self.capacity = capacity;
    }

    /// Upload the whole particle array. `particles` must fit the current capacity.
    pub fn upload(&self, queue: &wgpu::Queue, particles: &[Particle]) {
        debug_assert!(particles.len() <= self.capacity as usize);
        if !particles.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(particles));
        }
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &PointUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Clear `view` and draw `particle_count` sprites.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        particle_count: u32,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Point Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if particle_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..6, 0..particle_count.min(self.capacity));
    }

    pub fn release(&mut self) {
        self.vertex_buffer.destroy();
        self.uniform_buffer.destroy();
        self.capacity = 0;
    }
}
