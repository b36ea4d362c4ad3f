//! Agent Graph
//!
//! Arena of agents indexed by stable position, with an undirected neighbour
//! relation that is fixed once the graph is built.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::agent::Agent;
use crate::setup::Topology;

/// Undirected graph of agents. Edges never change after construction; only
/// node data does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentGraph {
    topology: Topology,
    nodes: Vec<Agent>,
    /// Neighbour sets, kept sorted so iteration is ascending by index
    neighbors: Vec<BTreeSet<usize>>,
}

impl AgentGraph {
    /// Builds a graph from nodes and an edge list. Self-loops and duplicate
    /// edges are ignored.
    pub(crate) fn from_edges(
        topology: Topology,
        nodes: Vec<Agent>,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut neighbors = vec![BTreeSet::new(); nodes.len()];
        for (u, v) in edges {
            if u == v {
                continue;
            }
            neighbors[u].insert(v);
            neighbors[v].insert(u);
        }
        Self {
            topology,
            nodes,
            neighbors,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Agent] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&Agent> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Agent> {
        self.nodes.get_mut(index)
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Agent] {
        &mut self.nodes
    }

    /// Neighbours of `index` in ascending order.
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors
            .get(index)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn degree(&self, index: usize) -> usize {
        self.neighbors.get(index).map_or(0, BTreeSet::len)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.neighbors.get(u).is_some_and(|set| set.contains(&v))
    }

    /// Each undirected edge once, as `(low, high)`, in ascending order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(u, set)| set.range(u + 1..).map(move |&v| (u, v)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Per-node scalar belief in index order.
    pub fn beliefs(&self) -> Vec<f64> {
        self.nodes.iter().map(Agent::belief).collect()
    }
}
