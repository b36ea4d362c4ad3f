//! Snapshot Types
//!
//! Serialization structs for run snapshots handed to rendering collaborators.
//!
//! A snapshot captures the graph after a given step together with the median
//! belief series accumulated so far. It is an in-process handoff; JSON is only
//! used when a run is exported for offline plotting.

use serde::{Deserialize, Serialize};

/// Generates a snapshot ID for the given step.
pub fn generate_snapshot_id(step: u64) -> String {
    format!("snap_{:06}", step)
}

/// Generates a random run label. Never used as a simulation seed.
pub fn generate_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Beta-distribution state of one bandit arm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmSnapshot {
    pub alpha: u32,
    pub beta: u32,
    pub expectation: f64,
}

impl ArmSnapshot {
    pub fn new(alpha: u32, beta: u32) -> Self {
        Self {
            alpha,
            beta,
            expectation: alpha as f64 / (alpha as f64 + beta as f64),
        }
    }
}

/// Per-node learning state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeState {
    /// Bayesian scientist: credence in the hypothesis and latest likelihood
    Bayesian {
        belief_prob: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        p_eh: Option<f64>,
        group: u8,
    },
    /// Two-armed bandit learner
    Bandit { a: ArmSnapshot, b: ArmSnapshot },
}

/// Node snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub node_id: String,
    pub index: usize,
    pub state: NodeState,
}

impl NodeSnapshot {
    /// Scalar shown on distribution plots: belief for Bayesian nodes,
    /// arm `b` expectation for bandit nodes.
    pub fn scalar(&self) -> f64 {
        match &self.state {
            NodeState::Bayesian { belief_prob, .. } => *belief_prob,
            NodeState::Bandit { b, .. } => b.expectation,
        }
    }
}

/// Undirected edge, stored with `source < target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: usize,
    pub target: usize,
}

/// Graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub topology: String,
    pub nodes: Vec<NodeSnapshot>,
    #[serde(default)]
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    /// Finds a node by ID.
    pub fn find_node(&self, node_id: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.node_id == node_id)
    }

    /// Returns the number of edges touching `index`.
    pub fn degree(&self, index: usize) -> usize {
        self.edges
            .iter()
            .filter(|e| e.source == index || e.target == index)
            .count()
    }

    /// Per-node scalar scaled to percent, in node order (bar chart input).
    pub fn belief_percentages(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.scalar() * 100.0).collect()
    }
}

/// Complete run snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub snapshot_id: String,
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub strategy: String,
    pub step: u64,
    pub graph: GraphSnapshot,
    #[serde(default)]
    pub median_series: Vec<f64>,
}

impl RunSnapshot {
    /// Latest median, if any step has run.
    pub fn latest_median(&self) -> Option<f64> {
        self.median_series.last().copied()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
