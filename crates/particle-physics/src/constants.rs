//! Constants of the per-particle update rule
//!
//! Velocities are expressed in "per 60Hz frame" units, so integration scales by
//! [`FRAME_RATE_SCALE`] regardless of the actual frame rate.

/// Pointer attraction only acts inside this distance (NDC units)
pub const POINTER_RADIUS: f32 = 0.5;

/// Below this distance the pointer and particle are treated as coincident
pub const POINTER_MIN_DISTANCE: f32 = 0.001;

/// Impulse strength per unit of `POINTER_RADIUS - distance`
pub const POINTER_STRENGTH: f32 = 0.01;

/// Converts seconds to 60Hz frames during integration
pub const FRAME_RATE_SCALE: f32 = 60.0;

/// Velocity multiplier applied once per frame.
///
/// Not scaled by delta time, so the effective damping rate depends on the
/// frame rate.
pub const DAMPING: f32 = 0.98;

/// Half extent of the simulation box in NDC
pub const BOUNDS: f32 = 1.0;

/// Velocity multiplier on the bounced axis
pub const RESTITUTION: f32 = -0.8;

/// Amplitude of the decorative vertical wave
pub const WAVE_AMPLITUDE: f32 = 0.0001;

/// Wave phase offset between consecutive particle indices
pub const WAVE_PHASE_STEP: f32 = 0.01;

/// Life advanced per simulated second (one cycle every 10s)
pub const LIFE_RATE: f32 = 0.1;

/// Compute kernel workgroup size
pub const WORKGROUP_SIZE: u32 = 64;

/// Initial velocity components are drawn from `[-SPAWN_SPEED, SPAWN_SPEED)`
pub const SPAWN_SPEED: f32 = 0.005;

/// Number of `f32` values in one particle record
pub const FLOATS_PER_PARTICLE: usize = 8;
