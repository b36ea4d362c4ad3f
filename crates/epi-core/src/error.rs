//! Error Types
//!
//! Failures the engine surfaces instead of clamping or retrying.

use thiserror::Error;

/// Errors raised while building or running a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Topology name not recognised
    #[error("unknown topology '{0}' (expected cycle, wheel or complete)")]
    UnknownTopology(String),

    /// Topology cannot be built with this many nodes
    #[error("{topology} topology needs at least {minimum} nodes, got {node_count}")]
    InvalidTopology {
        topology: String,
        node_count: usize,
        minimum: usize,
    },

    /// Posterior inputs on or outside the boundary of (0, 1)
    #[error("posterior undefined for p(H)={p_hypothesis}, p(E|H)={p_evidence_given_hypothesis}: both must lie strictly inside (0, 1)")]
    Domain {
        p_hypothesis: f64,
        p_evidence_given_hypothesis: f64,
    },

    /// Metrics requested on a graph without nodes
    #[error("graph has no nodes")]
    EmptyGraph,

    /// Run parameter outside its documented range
    #[error("invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    /// Update strategy applied to a node of the other variant
    #[error("node {node} is not a {expected} node")]
    StrategyMismatch { node: String, expected: &'static str },
}

impl SimError {
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        SimError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SimError::InvalidTopology {
            topology: "wheel".to_string(),
            node_count: 3,
            minimum: 4,
        };
        assert_eq!(err.to_string(), "wheel topology needs at least 4 nodes, got 3");

        let err = SimError::UnknownTopology("star".to_string());
        assert!(err.to_string().contains("'star'"));
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let err = SimError::invalid_parameter("num_trials", 0, "must be at least 1");
        assert_eq!(err.to_string(), "invalid parameter num_trials=0: must be at least 1");
    }
}
