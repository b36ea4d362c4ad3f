//! Shared snapshot types for the epistemic network simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Rendering collaborators (network layouts, belief histograms, trend plots)
//! read these types and nothing else.

pub mod snapshot;

// Re-export snapshot types
pub use snapshot::{
    generate_run_id, generate_snapshot_id, ArmSnapshot, EdgeSnapshot, GraphSnapshot, NodeSnapshot,
    NodeState, RunSnapshot,
};
