use glam::Vec2;
use particle_physics::{
    step_particles, update_particle, FrameInput, Particle, LIFE_RATE, MAX_DELTA_TIME,
    WAVE_AMPLITUDE,
};
use proptest::prelude::*;

fn particle_strategy() -> impl Strategy<Value = Particle> {
    (
        -1.0f32..1.0,
        -1.0f32..1.0,
        -0.05f32..0.05,
        -0.05f32..0.05,
        0.0f32..1.0,
    )
        .prop_map(|(x, y, vx, vy, life)| {
            Particle::new(Vec2::new(x, y), Vec2::new(vx, vy), [0.5; 3], life)
        })
}

fn frame_strategy() -> impl Strategy<Value = FrameInput> {
    (
        0.0f32..=MAX_DELTA_TIME,
        0.0f32..1000.0,
        -1.0f32..1.0,
        -1.0f32..1.0,
        any::<bool>(),
    )
        .prop_map(|(delta_time, time, px, py, pointer_active)| FrameInput {
            delta_time,
            time,
            pointer: Vec2::new(px, py),
            pointer_active,
            particle_size: 1.0,
        })
}

proptest! {
    #[test]
    fn positions_stay_inside_bounds(
        mut particles in prop::collection::vec(particle_strategy(), 1..32),
        frames in prop::collection::vec(frame_strategy(), 1..60),
    ) {
        for input in &frames {
            step_particles(&mut particles, input);
            for p in &particles {
                prop_assert!(p.position[0] >= -1.0 && p.position[0] <= 1.0);
                prop_assert!(p.position[1] >= -1.0 && p.position[1] <= 1.0);
            }
        }
    }

    #[test]
    fn life_stays_in_unit_interval(
        mut particle in particle_strategy(),
        frames in prop::collection::vec(frame_strategy(), 1..200),
    ) {
        for input in &frames {
            update_particle(&mut particle, 0, input);
            prop_assert!(particle.life >= 0.0 && particle.life < 1.0);
        }
    }

    #[test]
    fn speed_without_pointer_is_bounded_by_damping_and_wave(
        mut particle in particle_strategy(),
        frames in prop::collection::vec(frame_strategy(), 1..100),
    ) {
        for input in &frames {
            let before = particle.velocity().length();
            let input = FrameInput { pointer_active: false, ..*input };
            update_particle(&mut particle, 0, &input);
            // damping (and lossy bounces) can only shrink speed; the wave adds at most its amplitude
            prop_assert!(particle.velocity().length() <= before + WAVE_AMPLITUDE + 1e-7);
        }
    }
}

#[test]
fn life_wrap_period_matches_rate() {
    let dt = 1.0 / 60.0;
    let input = FrameInput {
        delta_time: dt,
        ..FrameInput::default()
    };
    let mut particle = Particle::default();

    let expected_frames = (1.0 / (LIFE_RATE * dt)).round() as usize;
    let mut wraps = Vec::new();
    let mut previous = particle.life;
    for frame in 1..=expected_frames * 3 + expected_frames / 2 {
        update_particle(&mut particle, 0, &input);
        if particle.life < previous {
            wraps.push(frame);
        }
        previous = particle.life;
    }

    assert_eq!(wraps.len(), 3);
    let period = wraps[1] - wraps[0];
    assert!(period.abs_diff(expected_frames) <= 1);
}
