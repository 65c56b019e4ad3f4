//! WGSL prelude generated from the Rust-side definitions
//!
//! Every shader that touches particles is compiled as `prelude() + body`, so the
//! struct layouts and rule constants exist in exactly one place.

use crate::constants::*;

/// WGSL declarations of `Particle`, `FrameUniforms`, the rule constants and
/// the shared `particle_alpha` helper
pub fn prelude() -> String {
    let constants = [
        ("POINTER_RADIUS", POINTER_RADIUS),
        ("POINTER_MIN_DISTANCE", POINTER_MIN_DISTANCE),
        ("POINTER_STRENGTH", POINTER_STRENGTH),
        ("FRAME_RATE_SCALE", FRAME_RATE_SCALE),
        ("DAMPING", DAMPING),
        ("BOUNDS", BOUNDS),
        ("RESTITUTION", RESTITUTION),
        ("WAVE_AMPLITUDE", WAVE_AMPLITUDE),
        ("WAVE_PHASE_STEP", WAVE_PHASE_STEP),
        ("LIFE_RATE", LIFE_RATE),
    ];

    let mut source = String::from(STRUCTS);
    for (name, value) in constants {
        source.push_str(&format!("const {name}: f32 = {};\n", float_literal(value)));
    }
    source.push('\n');
    source.push_str(FUNCTIONS);
    source
}

const STRUCTS: &str = "\
struct Particle {
    position: vec2<f32>,
    velocity: vec2<f32>,
    color: vec3<f32>,
    life: f32,
}

struct FrameUniforms {
    delta_time: f32,
    time: f32,
    pointer: vec2<f32>,
    pointer_active: f32,
    particle_size: f32,
    _padding0: vec2<f32>,
    _padding1: vec4<f32>,
}

";

// Opacity from life: opaque at 0.5, transparent at both ends
const FUNCTIONS: &str = "\
fn particle_alpha(life: f32) -> f32 {
    return 1.0 - abs(life - 0.5) * 2.0;
}

";

/// Format an `f32` as a WGSL float literal (always with a decimal point)
pub fn float_literal(value: f32) -> String {
    let text = value.to_string();
    if text.contains('.') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}
