//! Statistics
//!
//! Network-wide belief metrics computed from a graph.

use serde::Serialize;

use crate::components::agent::belief_group;
use crate::components::graph::AgentGraph;
use crate::error::{SimError, SimResult};

/// Median of `values`; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> SimResult<f64> {
    if values.is_empty() {
        return Err(SimError::EmptyGraph);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Median node belief across the graph.
pub fn median_belief(graph: &AgentGraph) -> SimResult<f64> {
    median(&graph.beliefs())
}

/// Node counts per belief group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BeliefDistribution {
    pub counts: [usize; 4],
}

impl BeliefDistribution {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Buckets every node's belief into the display groups 0..=3.
pub fn belief_distribution(graph: &AgentGraph) -> BeliefDistribution {
    let mut distribution = BeliefDistribution::default();
    for belief in graph.beliefs() {
        distribution.counts[usize::from(belief_group(belief))] += 1;
    }
    distribution
}
