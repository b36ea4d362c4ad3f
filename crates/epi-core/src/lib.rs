//! Epistemic Network Simulation Engine
//!
//! Agents sit on a fixed graph and learn about a binary hypothesis, either as
//! Bayesian scientists sharing evidence with their neighbours or as
//! two-armed bandit learners. Each step runs an individual pass followed by a
//! social pass, and the median belief is recorded per step.

pub mod components;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod systems;

pub use components::*;
pub use config::{Config, ConfigError};
pub use error::{SimError, SimResult};
pub use output::{Results, RunInfo};
pub use setup::{build_bandit_graph, build_graph, build_graph_with_beliefs, Topology};
pub use simulation::{run_simulation, seeded_rng, Simulation, Steps};
pub use systems::{
    calculate_posterior, run_experiment, BanditParams, BanditUpdate, BayesianUpdate,
    StrategyKind, UpdateStrategy, WorldState,
};
