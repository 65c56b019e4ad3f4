//! Host-resident particle storage stepped by a sequential loop

use crate::ParticleStorage;
use particle_physics::{step_particles, FrameInput, Particle};

/// Particles in host memory, updated one after another on the CPU
#[derive(Debug, Default)]
pub struct HostSimulation {
    particles: Vec<Particle>,
}

impl HostSimulation {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Drop the particle array and its allocation
    pub fn clear(&mut self) {
        self.particles = Vec::new();
    }
}

impl ParticleStorage for HostSimulation {
    type Encoder<'e> = ();

    fn particle_count(&self) -> u32 {
        self.particles.len() as u32
    }

    fn reallocate(&mut self, particles: &[Particle]) {
        self.particles = particles.to_vec();
    }

    fn advance(&mut self, input: &FrameInput, _encoder: ()) {
        step_particles(&mut self.particles, input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::respawn;
    use glam::Vec2;
    use particle_physics::{spawn_particles, update_particle};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn input() -> FrameInput {
        FrameInput {
            delta_time: 1.0 / 60.0,
            time: 2.5,
            pointer: Vec2::new(0.1, -0.2),
            pointer_active: true,
            particle_size: 1.0,
        }
    }

    #[test]
    fn advance_applies_rule_with_particle_index() {
        let mut rng = StdRng::seed_from_u64(3);
        let initial = spawn_particles(100, &mut rng);
        let mut simulation = HostSimulation::new(initial.clone());

        simulation.advance(&input(), ());

        for (i, (before, after)) in initial.iter().zip(simulation.particles()).enumerate() {
            let mut expected = *before;
            update_particle(&mut expected, i as u32, &input());
            assert_eq!(*after, expected);
        }
    }

    #[test]
    fn empty_simulation_advances_without_work() {
        let mut simulation = HostSimulation::default();
        simulation.advance(&input(), ());
        assert_eq!(simulation.particle_count(), 0);
    }

    #[test]
    fn respawn_replaces_every_particle() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut simulation = HostSimulation::new(spawn_particles(10, &mut rng));
        let before = simulation.particles().to_vec();

        respawn(&mut simulation, 25, &mut rng);
        assert_eq!(simulation.particle_count(), 25);
        assert!(simulation.particles().iter().all(|p| !before.contains(p)));

        respawn(&mut simulation, 0, &mut rng);
        assert_eq!(simulation.particle_count(), 0);
    }
}
