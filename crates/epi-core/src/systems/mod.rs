//! Simulation Systems
//!
//! Update rules and the timestep engine that applies them.

pub mod bandit;
pub mod bayes;
pub mod timestep;

pub use bandit::{draw_successes, pull_preferred_arm, BanditParams};
pub use bayes::{calculate_posterior, run_experiment, WorldState};
pub use timestep::{
    individual_pass, social_pass, strategy_for, BanditUpdate, BayesianUpdate, StepFn,
    StrategyKind, UpdateStrategy,
};
