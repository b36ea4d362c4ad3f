//! Bayesian Update
//!
//! Posterior composition and the noisy experiment that feeds it.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Which world the experiments are run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldState {
    /// Experiments lean towards supporting the hypothesis
    #[default]
    New,
    /// Experiments lean against it
    Old,
}

impl WorldState {
    /// Inclusive range experiment likelihoods are drawn from
    pub fn evidence_range(&self) -> (f64, f64) {
        match self {
            WorldState::New => (0.3, 0.8),
            WorldState::Old => (0.2, 0.7),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorldState::New => "new",
            WorldState::Old => "old",
        }
    }
}

impl fmt::Display for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorldState {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(WorldState::New),
            "old" => Ok(WorldState::Old),
            _ => Err(SimError::invalid_parameter("world", s, "expected new or old")),
        }
    }
}

fn strictly_inside_unit(p: f64) -> bool {
    p > 0.0 && p < 1.0
}

/// Posterior credence in the hypothesis after one piece of evidence.
///
/// `p(E) = p(E|H)·p(H) + (1 - p(E|H))·(1 - p(H))` and the result is
/// `p(E|H)·p(H) / p(E)`. Both inputs must lie strictly inside (0, 1); boundary
/// values (and NaN) fail with [`SimError::Domain`] rather than being clamped.
/// The same error is returned when the result rounds to exactly 0 or 1 in
/// floating point, so a saturated belief never reaches the graph.
///
/// Applying this serially over several evidence items is order-sensitive in
/// floating point, so callers fix the order.
pub fn calculate_posterior(p_hypothesis: f64, p_evidence_given_hypothesis: f64) -> SimResult<f64> {
    if !strictly_inside_unit(p_hypothesis) || !strictly_inside_unit(p_evidence_given_hypothesis) {
        return Err(SimError::Domain {
            p_hypothesis,
            p_evidence_given_hypothesis,
        });
    }

    let p_eh = p_evidence_given_hypothesis;
    let p_evidence = p_eh * p_hypothesis + (1.0 - p_eh) * (1.0 - p_hypothesis);
    let posterior = p_eh * p_hypothesis / p_evidence;
    if !strictly_inside_unit(posterior) {
        return Err(SimError::Domain {
            p_hypothesis,
            p_evidence_given_hypothesis,
        });
    }
    Ok(posterior)
}

/// Draws the likelihood an experiment produces in `world`.
pub fn run_experiment(world: WorldState, rng: &mut SmallRng) -> f64 {
    let (low, high) = world.evidence_range();
    rng.gen_range(low..=high)
}
