//! Output Module
//!
//! Metric aggregation and the snapshots handed to rendering collaborators.

pub mod results;
pub mod snapshot;
pub mod stats;

pub use results::{Results, RunInfo};
pub use snapshot::{graph_snapshot, write_snapshot, SNAPSHOT_OUTPUT_PATH};
pub use stats::{belief_distribution, median, median_belief, BeliefDistribution};
