//! Epistemic Network Simulator CLI
//!
//! Runs a single simulation and prints the median belief recorded per step.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use epi_core::config::{Config, DEFAULT_CONFIG_PATH};
use epi_core::output::{write_snapshot, SNAPSHOT_OUTPUT_PATH};
use epi_core::{Simulation, StrategyKind, Topology, WorldState};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "zollman_sim")]
#[command(about = "Simulates learning on an epistemic network")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Graph shape: cycle, wheel or complete
    #[arg(long)]
    topology: Option<Topology>,

    /// Number of agents
    #[arg(long)]
    nodes: Option<usize>,

    /// Number of steps to simulate
    #[arg(long)]
    steps: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Update strategy: bayesian or bandit
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Evidence regime for the Bayesian strategy: new or old
    #[arg(long)]
    world: Option<WorldState>,

    /// Success probability of arm a
    #[arg(long)]
    a_objective: Option<f64>,

    /// Success probability of arm b
    #[arg(long)]
    b_objective: Option<f64>,

    /// Bernoulli trials per bandit pull
    #[arg(long)]
    num_trials: Option<u32>,

    /// Write the final run snapshot to this path
    #[arg(long, num_args = 0..=1, default_missing_value = SNAPSHOT_OUTPUT_PATH)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn load_config(&self) -> Result<Config, String> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
            None => Config::load_if_present(DEFAULT_CONFIG_PATH),
        };

        let sim = &mut config.simulation;
        if let Some(topology) = self.topology {
            sim.topology = topology;
        }
        if let Some(nodes) = self.nodes {
            sim.node_count = nodes;
        }
        if let Some(steps) = self.steps {
            sim.steps = steps;
        }
        if self.seed.is_some() {
            sim.seed = self.seed;
        }
        if let Some(strategy) = self.strategy {
            sim.strategy = strategy;
        }
        if let Some(world) = self.world {
            config.bayesian.world = world;
        }
        if let Some(a) = self.a_objective {
            config.bandit.a_objective = a;
        }
        if let Some(b) = self.b_objective {
            config.bandit.b_objective = b;
        }
        if let Some(trials) = self.num_trials {
            config.bandit.num_trials = trials;
        }
        if self.output.is_some() {
            config.output.snapshot_path = self.output.clone();
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install log subscriber: {}", e);
    }

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sim = &config.simulation;
    println!("Epistemic Network Simulation");
    println!("============================");
    println!("Topology: {}", sim.topology);
    println!("Nodes: {}", sim.node_count);
    println!("Steps: {}", sim.steps);
    println!("Strategy: {}", sim.strategy);
    match sim.seed {
        Some(seed) => println!("Seed: {}", seed),
        None => println!("Seed: <entropy>"),
    }
    println!();

    let mut simulation = match Simulation::from_config(&config) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("Invalid simulation setup: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{:>6}  {:>12}", "step", "median");
    for (index, snapshot) in simulation.steps(sim.steps).enumerate() {
        match snapshot {
            Ok(snapshot) => {
                if let Some(median) = snapshot.latest_median() {
                    println!("{:>6}  {:>12.6}", index + 1, median);
                }
            }
            Err(e) => {
                error!("Step {} failed: {}", index + 1, e);
                return ExitCode::FAILURE;
            }
        }
    }

    let results = simulation.results();
    let distribution = results.belief_distribution();
    println!();
    println!("Summary");
    println!("-------");
    println!("Steps completed: {}", results.steps_completed());
    match results.current_median_belief() {
        Ok(median) => println!("Final median: {:.6}", median),
        Err(e) => println!("Final median: unavailable ({})", e),
    }
    println!("Belief groups: {:?}", distribution.counts);

    if let Some(path) = &config.output.snapshot_path {
        if let Err(e) = write_snapshot(&results.snapshot(), path) {
            error!("Failed to write snapshot to {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        info!("Snapshot written to {}", path.display());
    }

    ExitCode::SUCCESS
}
