//! # Particle Physics
//!
//! The particle record, per-frame parameters and the update rule shared by the
//! CPU and GPU simulation backends.

pub mod constants;
pub mod frame;
pub mod particle;
pub mod rule;
pub mod wgsl;

pub use constants::*;
pub use frame::*;
pub use particle::*;
pub use rule::*;
