//! Setup Module
//!
//! Graph construction for each supported topology.

pub mod topology;

pub use topology::{
    build_bandit_graph, build_graph, build_graph_with_beliefs, topology_edges, Topology,
};
