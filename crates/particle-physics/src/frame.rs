//! Per-frame parameters pushed to the simulation

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Longest delta time a single frame may integrate over (seconds)
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Input for one simulation frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame, already clamped to [`MAX_DELTA_TIME`]
    pub delta_time: f32,
    /// Monotonic time in seconds
    pub time: f32,
    /// Pointer position in NDC (y up)
    pub pointer: Vec2,
    pub pointer_active: bool,
    /// Display size multiplier
    pub particle_size: f32,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            delta_time: 0.0,
            time: 0.0,
            pointer: Vec2::ZERO,
            pointer_active: false,
            particle_size: 1.0,
        }
    }
}

impl FrameInput {
    pub fn to_uniforms(&self) -> FrameUniforms {
        FrameUniforms {
            delta_time: self.delta_time,
            time: self.time,
            pointer: self.pointer.to_array(),
            pointer_active: if self.pointer_active { 1.0 } else { 0.0 },
            particle_size: self.particle_size,
            _padding: [0.0; 6],
        }
    }
}

/// Uniform block shared by the compute kernel and the quad renderer
///
/// Matches the WGSL `FrameUniforms` struct (48 bytes): six packed floats, then
/// a `vec2` and a `vec4` of padding so the struct size is a multiple of 16.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub delta_time: f32,
    pub time: f32,
    pub pointer: [f32; 2],
    /// 1.0 when active, 0.0 otherwise
    pub pointer_active: f32,
    pub particle_size: f32,
    pub _padding: [f32; 6],
}
