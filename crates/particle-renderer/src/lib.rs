//! # Particle Renderer
//!
//! GPU context acquisition and the two particle draw paths: quads read from a
//! device storage buffer, and point sprites fed from a host-uploaded array.

pub mod context;
pub mod error;
pub mod point_renderer;
pub mod quad_renderer;
pub mod validation;

pub use context::*;
pub use error::*;
pub use point_renderer::*;
pub use quad_renderer::*;

/// Background clear color shared by both draw paths
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.05,
    g: 0.05,
    b: 0.15,
    a: 1.0,
};
