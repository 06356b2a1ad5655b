use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use grid_traffic::simulation::{self, SimConfig, SimObserver, SimWorld, TrafficLight};

#[derive(Parser)]
#[command(name = "grid_traffic")]
#[command(about = "Grid traffic simulation, stepped in the terminal")]
struct Cli {
    /// City map file to load (uses the built-in demo map when omitted)
    #[arg(long)]
    map: Option<PathBuf>,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "100")]
    ticks: u64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Ticks between traffic light changes
    #[arg(long, default_value_t = simulation::LIGHT_CHANGE_TICKS)]
    light_interval: u64,

    /// Pause between ticks in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Only print the final summary
    #[arg(long)]
    quiet: bool,
}

/// Logs light changes as they happen
struct LightLogger;

impl SimObserver for LightLogger {
    fn light_changed(&mut self, old: TrafficLight, new: TrafficLight) {
        info!("Light changed from {} to {}", old.name(), new.name());
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SimConfig::default().with_light_change_ticks(cli.light_interval);
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }

    let mut world = match &cli.map {
        Some(path) => {
            let map = simulation::load_map(path)?;
            SimWorld::with_config(map.grid, map.vehicles, config)
        }
        None => SimWorld::create_demo_world(config).context("Built-in demo map is invalid")?,
    };

    world.subscribe(Box::new(LightLogger));
    world.start();
    run_headless(&mut world, &cli);
    Ok(())
}

/// Step the world and print it to the terminal
fn run_headless(world: &mut SimWorld, cli: &Cli) {
    if !cli.quiet {
        println!("Initial state:");
        world.print_summary();
        world.draw_map();
        println!();
    }

    for _ in 0..cli.ticks {
        world.advance();

        if !cli.quiet {
            println!("--- Tick {} (light {}) ---", world.tick(), world.light().name());
            world.draw_map();
            println!();
        }

        if cli.delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(cli.delay_ms));
        }
    }

    info!("Simulation finished after {} ticks", world.tick());
    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();
}
