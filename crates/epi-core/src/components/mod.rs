//! Simulation Components
//!
//! Per-agent state records and the graph arena that holds them.

pub mod agent;
pub mod graph;

pub use agent::*;
pub use graph::*;
