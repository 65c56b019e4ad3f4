//! The per-particle update rule
//!
//! This is the host-side definition. The compute kernel in
//! `particle-simulation` mirrors it step for step, using the same constants
//! through [`crate::wgsl::prelude`].

use crate::constants::*;
use crate::frame::FrameInput;
use crate::particle::Particle;
use glam::Vec2;

/// Velocity impulse the pointer applies to a particle at `position`.
///
/// Zero outside `POINTER_RADIUS` and when the two are (nearly) coincident.
pub fn pointer_impulse(position: Vec2, pointer: Vec2) -> Vec2 {
    let to_pointer = pointer - position;
    let dist = to_pointer.length();

    if dist < POINTER_RADIUS && dist > POINTER_MIN_DISTANCE {
        to_pointer / dist * (POINTER_RADIUS - dist) * POINTER_STRENGTH
    } else {
        Vec2::ZERO
    }
}

/// Advance one particle by one frame.
///
/// `index` only feeds the phase of the ambient wave.
pub fn update_particle(particle: &mut Particle, index: u32, input: &FrameInput) {
    let mut position = particle.position();
    let mut velocity = particle.velocity();

    if input.pointer_active {
        velocity += pointer_impulse(position, input.pointer);
    }

    position += velocity * input.delta_time * FRAME_RATE_SCALE;

    velocity *= DAMPING;

    if position.x < -BOUNDS || position.x > BOUNDS {
        velocity.x *= RESTITUTION;
        position.x = position.x.clamp(-BOUNDS, BOUNDS);
    }
    if position.y < -BOUNDS || position.y > BOUNDS {
        velocity.y *= RESTITUTION;
        position.y = position.y.clamp(-BOUNDS, BOUNDS);
    }

    velocity.y += (input.time + index as f32 * WAVE_PHASE_STEP).sin() * WAVE_AMPLITUDE;

    particle.position = position.to_array();
    particle.velocity = velocity.to_array();
    particle.life = (particle.life + input.delta_time * LIFE_RATE).fract();
}

/// Apply [`update_particle`] to every particle in order
pub fn step_particles(particles: &mut [Particle], input: &FrameInput) {
    for (index, particle) in particles.iter_mut().enumerate() {
        update_particle(particle, index as u32, input);
    }
}
