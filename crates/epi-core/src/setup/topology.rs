//! Topology Builder
//!
//! Creates the agent graph for a cycle, wheel or complete network and seeds
//! each node's initial state from the run's random source.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::agent::{Agent, Arm, BanditLearner};
use crate::components::graph::AgentGraph;
use crate::error::{SimError, SimResult};

/// Range of the initial Beta pseudo-counts for bandit arms
const INITIAL_ARM_COUNTS: std::ops::RangeInclusive<u32> = 1..=4;

/// Supported network shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Ring: each node linked to its two neighbours
    Cycle,
    /// Ring of `n - 1` nodes plus a hub linked to all of them
    Wheel,
    /// Every pair of nodes linked
    Complete,
}

impl Topology {
    pub const ALL: [Topology; 3] = [Topology::Cycle, Topology::Wheel, Topology::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topology::Cycle => "cycle",
            Topology::Wheel => "wheel",
            Topology::Complete => "complete",
        }
    }

    /// Smallest node count this shape can be built with
    pub fn minimum_nodes(&self) -> usize {
        match self {
            Topology::Cycle => 3,
            Topology::Wheel => 4,
            Topology::Complete => 1,
        }
    }

    fn check_size(&self, node_count: usize) -> SimResult<()> {
        if node_count < self.minimum_nodes() {
            return Err(SimError::InvalidTopology {
                topology: self.as_str().to_string(),
                node_count,
                minimum: self.minimum_nodes(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(Topology::Cycle),
            "wheel" => Ok(Topology::Wheel),
            "complete" => Ok(Topology::Complete),
            _ => Err(SimError::UnknownTopology(s.to_string())),
        }
    }
}

fn ring(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len).map(move |i| (i, (i + 1) % len))
}

/// Edge list for `topology` over `node_count` nodes.
pub fn topology_edges(topology: Topology, node_count: usize) -> SimResult<Vec<(usize, usize)>> {
    topology.check_size(node_count)?;

    let edges = match topology {
        Topology::Cycle => ring(node_count).collect(),
        Topology::Wheel => {
            let hub = node_count - 1;
            ring(hub).chain((0..hub).map(|i| (i, hub))).collect()
        }
        Topology::Complete => (0..node_count)
            .flat_map(|i| (i + 1..node_count).map(move |j| (i, j)))
            .collect(),
    };
    Ok(edges)
}

/// Builds a graph of Bayesian scientists with beliefs drawn uniformly from
/// [0, 1).
pub fn build_graph(
    topology: Topology,
    node_count: usize,
    rng: &mut SmallRng,
) -> SimResult<AgentGraph> {
    let edges = topology_edges(topology, node_count)?;
    let nodes = (0..node_count)
        .map(|index| Agent::scientist(index, rng.gen::<f64>()))
        .collect();
    Ok(AgentGraph::from_edges(topology, nodes, edges))
}

/// Builds a graph of Bayesian scientists with the given initial beliefs.
pub fn build_graph_with_beliefs(topology: Topology, beliefs: &[f64]) -> SimResult<AgentGraph> {
    let edges = topology_edges(topology, beliefs.len())?;
    if let Some(bad) = beliefs.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(SimError::invalid_parameter(
            "belief_prob",
            bad,
            "must lie in [0, 1]",
        ));
    }
    let nodes = beliefs
        .iter()
        .enumerate()
        .map(|(index, &p)| Agent::scientist(index, p))
        .collect();
    Ok(AgentGraph::from_edges(topology, nodes, edges))
}

/// Builds a graph of bandit learners whose arm pseudo-counts are drawn from
/// 1..=4.
pub fn build_bandit_graph(
    topology: Topology,
    node_count: usize,
    rng: &mut SmallRng,
) -> SimResult<AgentGraph> {
    let edges = topology_edges(topology, node_count)?;
    let mut nodes = Vec::with_capacity(node_count);
    for index in 0..node_count {
        let a = Arm::new(
            rng.gen_range(INITIAL_ARM_COUNTS),
            rng.gen_range(INITIAL_ARM_COUNTS),
        )?;
        let b = Arm::new(
            rng.gen_range(INITIAL_ARM_COUNTS),
            rng.gen_range(INITIAL_ARM_COUNTS),
        )?;
        nodes.push(Agent::bandit(index, BanditLearner::new(a, b)));
    }
    Ok(AgentGraph::from_edges(topology, nodes, edges))
}
