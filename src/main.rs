//! Particle Swarm
//!
//! Simulates a swarm of particles with either a GPU compute backend or a CPU
//! simulation backend and renders it to a window.

mod app;
mod config;
mod controller;
mod stats;

use anyhow::{Context, Result};
use app::{App, Settings};
use clap::Parser;
use config::Cli;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger (RUST_LOG=debug for verbose output, -v/-q override it)
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = cli.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    let settings = Settings {
        backend: cli.backend.into(),
        particle_count: cli.particles,
        particle_size: cli.size,
    };
    log::info!(
        "Starting particle swarm: {} backend, {} particles",
        settings.backend,
        settings.particle_count
    );
    log::info!("Keys: 1/2 switch backend, R reset, Up/Down particle count, +/- size, Esc quit");

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(settings);
    event_loop
        .run_app(&mut app)
        .context("event loop exited with an error")?;

    Ok(())
}
