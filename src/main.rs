use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use log::info;
use std::time::Instant;

use acc_sim::{
    config::{Scenario, SimulationConfig},
    simulation::{Simulation, VehicleView},
};

#[derive(Parser)]
#[command(name = "acc-sim")]
#[command(about = "Headless adaptive cruise control traffic simulation")]
struct Args {
    /// Built-in scenario, used unless both --road and --vehicles are given
    #[arg(long, value_enum, default_value_t = Preset::SingleLane)]
    scenario: Preset,

    /// Road configuration file
    #[arg(short, long)]
    road: Option<String>,

    /// Vehicle configuration file
    #[arg(short = 'c', long)]
    vehicles: Option<String>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u32,

    /// Random seed for reproducible sensor noise
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log the fleet every N ticks (0 disables)
    #[arg(long, default_value_t = 60)]
    report_every: u32,

    /// Enable verbose logging for detailed simulation progress
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Preset {
    /// Three cars in one lane
    SingleLane,
    /// Two opposing lanes
    TwoWay,
    /// One wide lane with a passing car
    Overtaking,
    /// Fused-sensor ACC follower
    SensorFusion,
}

impl From<Preset> for Scenario {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::SingleLane => Scenario::SingleLane,
            Preset::TwoWay => Scenario::TwoWay,
            Preset::Overtaking => Scenario::Overtaking,
            Preset::SensorFusion => Scenario::SensorFusion,
        }
    }
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    match (&args.road, &args.vehicles) {
        (Some(road), Some(vehicles)) => {
            info!("Loading configuration from {} and {}", road, vehicles);
            SimulationConfig::load_from_files(road, vehicles)
        }
        (None, None) => {
            let scenario = Scenario::from(args.scenario);
            info!("Using built-in scenario: {}", scenario.name());
            Ok(scenario.config())
        }
        _ => bail!("--road and --vehicles must be given together"),
    }
}

fn report(tick: u64, views: &[VehicleView]) {
    info!("=== Tick {} ===", tick);
    for view in views {
        let gap = view
            .front_gap
            .map(|gap| format!("{gap:.1}"))
            .unwrap_or_else(|| "-".to_string());

        info!(
            "{:<12} lane {} pos {:>8.1} lat {:>6.1} speed {:>5.2}/{:<5.2} gap {:>7}{} {:?}",
            view.name,
            view.lane,
            view.position,
            view.lateral_offset,
            view.speed,
            view.max_speed,
            gap,
            if view.alert { " !" } else { "" },
            view.maneuver
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting ACC simulation");

    let mut config = load_config(&args)?;
    if args.seed.is_some() {
        config.vehicles.random.seed = args.seed;
    }

    let mut simulation = Simulation::new(config)?;

    let road = &simulation.config().road.road;
    info!(
        "Road: {} ({} lanes, {:.1}..{:.1}, length {:.1}), {} vehicles",
        road.name,
        road.lanes.len(),
        road.lower_bound,
        road.upper_bound,
        road.length(),
        simulation.state().cars.len()
    );
    if let Some(seed) = simulation.config().vehicles.random.seed {
        info!("Random Seed: {}", seed);
    }

    report(simulation.tick(), &simulation.snapshot());

    let start_time = Instant::now();
    for _ in 0..args.ticks {
        simulation.step();

        if args.report_every > 0 && simulation.tick() % u64::from(args.report_every) == 0 {
            report(simulation.tick(), &simulation.snapshot());
        }
    }

    let elapsed = start_time.elapsed();
    info!("Simulation completed!");
    info!(
        "{} ticks in {:.2}ms ({:.1} µs/tick)",
        args.ticks,
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1e6 / f64::from(args.ticks.max(1))
    );
    report(simulation.tick(), &simulation.snapshot());

    Ok(())
}
