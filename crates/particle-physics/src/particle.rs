//! Particle record shared by the host loop and the GPU kernel

use crate::constants::{BOUNDS, FLOATS_PER_PARTICLE, SPAWN_SPEED};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use rand::Rng;

/// GPU-compatible particle structure
///
/// Matches the WGSL `Particle` struct: `vec3<f32>` color is 16-byte aligned,
/// so it lands at offset 16 and `life` fills the slot after it (32 bytes total).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in normalized device coordinates
    pub position: [f32; 2],
    /// Velocity in NDC units per 60Hz frame
    pub velocity: [f32; 2],
    /// RGB color, fixed for the particle's lifetime
    pub color: [f32; 3],
    /// Cyclic opacity driver in [0, 1)
    pub life: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, color: [f32; 3], life: f32) -> Self {
        Self {
            position: position.to_array(),
            velocity: velocity.to_array(),
            color,
            life,
        }
    }

    /// Create a particle with the demo's uniform-random initial distribution
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            position: [
                rng.random_range(-BOUNDS..BOUNDS),
                rng.random_range(-BOUNDS..BOUNDS),
            ],
            velocity: [
                rng.random_range(-SPAWN_SPEED..SPAWN_SPEED),
                rng.random_range(-SPAWN_SPEED..SPAWN_SPEED),
            ],
            color: [rng.random(), rng.random(), rng.random()],
            life: rng.random(),
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from_array(self.velocity)
    }
}

/// Spawn `count` particles with fresh random state
pub fn spawn_particles(count: u32, rng: &mut impl Rng) -> Vec<Particle> {
    (0..count).map(|_| Particle::random(rng)).collect()
}

/// View a particle slice as the flat `count × 8` float array
pub fn as_floats(particles: &[Particle]) -> &[f32] {
    let floats: &[f32] = bytemuck::cast_slice(particles);
    debug_assert_eq!(floats.len(), particles.len() * FLOATS_PER_PARTICLE);
    floats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn layout_is_eight_packed_floats() {
        assert_eq!(std::mem::size_of::<Particle>(), 32);
        assert_eq!(std::mem::offset_of!(Particle, color), 16);
        assert_eq!(std::mem::offset_of!(Particle, life), 28);
    }

    #[test]
    fn flat_view_has_eight_floats_per_particle() {
        let mut rng = StdRng::seed_from_u64(7);
        let particles = spawn_particles(5, &mut rng);
        let floats = as_floats(&particles);

        assert_eq!(floats.len(), 40);
        assert_eq!(floats[8], particles[1].position[0]);
        assert_eq!(floats[15], particles[1].life);
    }

    #[test]
    fn random_particles_respect_spawn_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for p in spawn_particles(1000, &mut rng) {
            assert!(p.position.iter().all(|c| (-1.0..1.0).contains(c)));
            assert!(p.velocity.iter().all(|v| v.abs() <= SPAWN_SPEED));
            assert!(p.color.iter().all(|c| (0.0..1.0).contains(c)));
            assert!((0.0..1.0).contains(&p.life));
        }
    }

    #[test]
    fn spawn_zero_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(spawn_particles(0, &mut rng).is_empty());
    }
}
