//! Snapshot Output
//!
//! Converts engine state into `epi-events` snapshots and writes them to disk.

use std::fs;
use std::path::Path;

use epi_events::{ArmSnapshot, EdgeSnapshot, GraphSnapshot, NodeSnapshot, NodeState, RunSnapshot};

use crate::components::agent::{AgentState, Arm};
use crate::components::graph::AgentGraph;

/// Default snapshot output path
pub const SNAPSHOT_OUTPUT_PATH: &str = "output/run_snapshot.json";

fn arm_snapshot(arm: &Arm) -> ArmSnapshot {
    ArmSnapshot {
        alpha: arm.alpha(),
        beta: arm.beta(),
        expectation: arm.expectation(),
    }
}

/// Builds the read-only view of a graph used by rendering collaborators.
pub fn graph_snapshot(graph: &AgentGraph) -> GraphSnapshot {
    let nodes = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, agent)| NodeSnapshot {
            node_id: agent.id.0.clone(),
            index,
            state: match &agent.state {
                AgentState::Bayesian(s) => NodeState::Bayesian {
                    belief_prob: s.belief_prob,
                    p_eh: s.p_eh,
                    group: s.group,
                },
                AgentState::Bandit(l) => NodeState::Bandit {
                    a: arm_snapshot(&l.a),
                    b: arm_snapshot(&l.b),
                },
            },
        })
        .collect();

    let edges = graph
        .edges()
        .into_iter()
        .map(|(source, target)| EdgeSnapshot { source, target })
        .collect();

    GraphSnapshot {
        topology: graph.topology().to_string(),
        nodes,
        edges,
    }
}

/// Writes a run snapshot as pretty JSON, creating parent directories.
pub fn write_snapshot(snapshot: &RunSnapshot, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = snapshot
        .to_json_pretty()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    fs::write(path, json)?;
    Ok(())
}
