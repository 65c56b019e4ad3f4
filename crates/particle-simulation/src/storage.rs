//! Where particle state lives and how one update step is applied to it

use particle_physics::{spawn_particles, FrameInput, Particle};
use rand::Rng;

/// Storage the update rule runs against.
///
/// Implemented by host memory ([`crate::HostSimulation`]) and device memory
/// ([`crate::DeviceSimulation`]). Backends add only upload/dispatch/draw around it.
pub trait ParticleStorage {
    /// What a step is recorded into: nothing for the host loop, a command
    /// encoder for the device kernel
    type Encoder<'e>;

    fn particle_count(&self) -> u32;

    /// Replace the whole particle set
    fn reallocate(&mut self, particles: &[Particle]);

    /// Apply one frame of the update rule to every particle
    fn advance(&mut self, input: &FrameInput, encoder: Self::Encoder<'_>);
}

/// Reinitialize `storage` with `count` fresh random particles
pub fn respawn<S: ParticleStorage>(storage: &mut S, count: u32, rng: &mut impl Rng) {
    let particles = spawn_particles(count, rng);
    storage.reallocate(&particles);
}
