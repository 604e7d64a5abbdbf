//! Tessera Runtime
//!
//! Boots a world from a settings file and drives the frame loop: whole fixed
//! ticks through the fixed phases, then one pass of the variable phases and
//! the cleanup flush.

mod demo;

use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tessera_core::ecs::World;
use tessera_core::time::SimulationTime;
use tessera_services::{Settings, UdpStatsSink};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Tessera v{}", tessera_core::VERSION);

    let settings = match std::env::args_os().nth(1) {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("loading settings from {}", path.to_string_lossy()))?,
        None => {
            tracing::info!("no settings file given, using defaults");
            Settings::default()
        }
    };

    let mut world = World::with_config(settings.world.clone());
    if settings.telemetry.enabled {
        match UdpStatsSink::connect(settings.telemetry.address.as_str()) {
            Ok(sink) => world.attach_observer(Box::new(sink)),
            Err(err) => tracing::warn!(%err, "telemetry disabled"),
        }
    }

    demo::populate(&mut world);
    demo::register_systems(&mut world);

    run(&mut world, &settings)?;

    let stats = world.stats();
    tracing::info!(
        entities = stats.entity_count(),
        systems = stats.systems().len(),
        filters = world.filter_count(),
        "simulation finished"
    );
    Ok(())
}

fn run(world: &mut World, settings: &Settings) -> Result<()> {
    let simulation = &settings.simulation;
    if simulation.fixed_hz == 0 {
        anyhow::bail!("simulation.fixed_hz must be at least 1");
    }

    let mut clock = SimulationTime::with_rate(simulation.fixed_hz, simulation.max_fixed_steps);
    let fixed_dt = clock.tick_duration().as_secs_f64();
    let mut last_frame = Instant::now();

    for frame in 0..simulation.frames {
        let frame_time = if simulation.realtime {
            let now = Instant::now();
            let elapsed = now - last_frame;
            last_frame = now;
            elapsed
        } else {
            clock.tick_duration()
        };

        for _ in 0..clock.advance(frame_time) {
            world.pre_fixed_update(fixed_dt);
            world.fixed_update(fixed_dt);
            world.post_fixed_update(fixed_dt);
        }

        let dt = frame_time.as_secs_f64();
        world.pre_update(dt);
        world.update(dt);
        world.post_update(dt);
        world.cleanup();

        if frame % u64::from(simulation.fixed_hz) == 0 {
            log_frame(world, frame, clock.total_time());
        }

        if simulation.realtime {
            let spent = last_frame.elapsed();
            std::thread::sleep(clock.tick_duration().saturating_sub(spent));
        }
    }
    Ok(())
}

fn log_frame(world: &World, frame: u64, simulated: Duration) {
    let stats = world.stats();
    tracing::info!(
        frame,
        simulated = ?simulated,
        entities = stats.entity_count(),
        "frame"
    );
    for system in stats.systems() {
        tracing::debug!(
            system = system.name(),
            elapsed = ?system.time_elapsed(),
            "system timing"
        );
    }
}
