//! Command line configuration

use clap::{Parser, ValueEnum};
use particle_simulation::BackendKind;

pub const DEFAULT_PARTICLE_COUNT: u32 = 50_000;
pub const MAX_PARTICLE_COUNT: u32 = 1_000_000;
pub const DEFAULT_PARTICLE_SIZE: f32 = 1.0;

const MIN_PARTICLE_SIZE: f32 = 0.1;
const MAX_PARTICLE_SIZE: f32 = 10.0;

#[derive(Parser, Debug)]
#[command(name = "particle-swarm")]
#[command(about = "Particle swarm demo with a GPU compute and a CPU simulation backend")]
#[command(version)]
pub struct Cli {
    /// Backend to start with
    #[arg(short, long, value_enum, default_value_t = BackendArg::Gpu)]
    pub backend: BackendArg,

    /// Number of particles
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_PARTICLE_COUNT,
        value_parser = clap::value_parser!(u32).range(0..=MAX_PARTICLE_COUNT as i64)
    )]
    pub particles: u32,

    /// Particle display size multiplier
    #[arg(short, long, default_value_t = DEFAULT_PARTICLE_SIZE, value_parser = parse_size)]
    pub size: f32,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// Compute kernel over a device buffer
    Gpu,
    /// Host loop uploaded every frame
    Cpu,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Gpu => BackendKind::Gpu,
            BackendArg::Cpu => BackendKind::Cpu,
        }
    }
}

fn parse_size(s: &str) -> Result<f32, String> {
    let size: f32 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    if (MIN_PARTICLE_SIZE..=MAX_PARTICLE_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(format!(
            "size must be between {MIN_PARTICLE_SIZE} and {MAX_PARTICLE_SIZE}"
        ))
    }
}

impl Cli {
    /// Log level implied by `-v`/`-q`, if either was given
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        if self.verbose > 0 {
            Some(match self.verbose {
                1 => log::LevelFilter::Info,
                2 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            })
        } else if self.quiet {
            Some(log::LevelFilter::Error)
        } else {
            None
        }
    }
}
