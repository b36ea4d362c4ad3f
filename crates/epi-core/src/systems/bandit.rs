//! Bandit Update
//!
//! Exploitation-only two-armed bandit learning: each learner pulls whichever
//! arm it currently rates higher and updates that arm's Beta estimate from
//! trials drawn at the arm's true payoff rate.

use rand::rngs::SmallRng;
use rand_distr::{Binomial, Distribution};
use serde::{Deserialize, Serialize};

use crate::components::agent::{ArmChoice, BanditLearner};
use crate::error::{SimError, SimResult};

/// Upper bound on trials per pull
pub const MAX_TRIALS: u32 = 1_000_000;

/// Hidden per-run constants of the bandit model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BanditParams {
    /// True success probability of arm `a`, unknown to the agents
    pub a_objective: f64,
    /// True success probability of arm `b`, unknown to the agents
    pub b_objective: f64,
    /// Trials per pull
    pub num_trials: u32,
}

impl Default for BanditParams {
    fn default() -> Self {
        Self {
            a_objective: 0.49,
            b_objective: 0.51,
            num_trials: 1,
        }
    }
}

impl BanditParams {
    pub fn validate(&self) -> SimResult<()> {
        for (name, value) in [("a_objective", self.a_objective), ("b_objective", self.b_objective)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SimError::invalid_parameter(name, value, "must lie strictly inside (0, 1)"));
            }
        }
        if !(1..=MAX_TRIALS).contains(&self.num_trials) {
            return Err(SimError::invalid_parameter(
                "num_trials",
                self.num_trials,
                format!("must lie in 1..={}", MAX_TRIALS),
            ));
        }
        Ok(())
    }

    pub fn objective(&self, choice: ArmChoice) -> f64 {
        match choice {
            ArmChoice::A => self.a_objective,
            ArmChoice::B => self.b_objective,
        }
    }
}

/// Number of successes in `trials` independent trials at success
/// probability `p`, drawn from Binomial(trials, p).
pub fn draw_successes(p: f64, trials: u32, rng: &mut SmallRng) -> SimResult<u32> {
    let binomial = Binomial::new(u64::from(trials), p)
        .map_err(|e| SimError::invalid_parameter("objective", p, e.to_string()))?;
    let successes = binomial.sample(rng);
    u32::try_from(successes)
        .map_err(|_| SimError::invalid_parameter("successes", successes, "exceeds the trial count"))
}

/// Pulls the learner's preferred arm once and records the outcome.
/// Returns the arm that was pulled.
pub fn pull_preferred_arm(
    learner: &mut BanditLearner,
    params: &BanditParams,
    rng: &mut SmallRng,
) -> SimResult<ArmChoice> {
    let choice = learner.preferred_arm();
    let successes = draw_successes(params.objective(choice), params.num_trials, rng)?;
    learner.arm_mut(choice).record(successes, params.num_trials)?;
    Ok(choice)
}
