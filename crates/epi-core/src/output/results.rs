//! Results Aggregator
//!
//! Holds the latest graph and the median-belief series of a run. Rendering
//! collaborators read these accessors only.

use epi_events::{generate_run_id, generate_snapshot_id, RunSnapshot};

use super::snapshot::graph_snapshot;
use super::stats::{belief_distribution, median_belief, BeliefDistribution};
use crate::components::graph::AgentGraph;
use crate::error::SimResult;

/// Labels attached to a run's snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub run_id: String,
    pub seed: Option<u64>,
    pub strategy: String,
}

impl RunInfo {
    pub fn new(seed: Option<u64>, strategy: impl Into<String>) -> Self {
        Self {
            run_id: generate_run_id(),
            seed,
            strategy: strategy.into(),
        }
    }
}

/// Latest graph plus the append-only median series
#[derive(Debug, Clone)]
pub struct Results {
    graph: AgentGraph,
    median_series: Vec<f64>,
    info: RunInfo,
}

impl Results {
    pub fn new(graph: AgentGraph, info: RunInfo) -> Self {
        Self {
            graph,
            median_series: Vec::new(),
            info,
        }
    }

    /// Replaces the held graph with the result of the latest step.
    pub fn update_graph(&mut self, graph: AgentGraph) {
        self.graph = graph;
    }

    /// Appends the current median belief to the series and returns it.
    pub fn record_median(&mut self) -> SimResult<f64> {
        let median = self.current_median_belief()?;
        self.median_series.push(median);
        Ok(median)
    }

    pub fn current_graph(&self) -> &AgentGraph {
        &self.graph
    }

    pub fn into_graph(self) -> AgentGraph {
        self.graph
    }

    /// One entry per completed step, in step order.
    pub fn median_series(&self) -> &[f64] {
        &self.median_series
    }

    pub fn steps_completed(&self) -> u64 {
        self.median_series.len() as u64
    }

    /// Median belief of the latest graph. Fails on a graph without nodes.
    pub fn current_median_belief(&self) -> SimResult<f64> {
        median_belief(&self.graph)
    }

    pub fn belief_distribution(&self) -> BeliefDistribution {
        belief_distribution(&self.graph)
    }

    /// Node beliefs in percent, index order.
    pub fn belief_percentages(&self) -> Vec<f64> {
        self.graph.beliefs().into_iter().map(|b| b * 100.0).collect()
    }

    pub fn info(&self) -> &RunInfo {
        &self.info
    }

    /// Read-only snapshot of the current state.
    pub fn snapshot(&self) -> RunSnapshot {
        let step = self.steps_completed();
        RunSnapshot {
            snapshot_id: generate_snapshot_id(step),
            run_id: self.info.run_id.clone(),
            seed: self.info.seed,
            strategy: self.info.strategy.clone(),
            step,
            graph: graph_snapshot(&self.graph),
            median_series: self.median_series.clone(),
        }
    }
}
