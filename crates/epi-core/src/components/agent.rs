//! Agent Components
//!
//! Per-node learning state: Bayesian scientists and two-armed bandit learners.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Belief thresholds used to bucket nodes into display groups
pub const GROUP_THRESHOLDS: [f64; 4] = [0.0, 0.4, 0.6, 1.0];

/// Display bucket for a belief: the number of thresholds it strictly exceeds.
///
/// 0 for a belief of exactly 0, 1 up to 0.4, 2 up to 0.6, 3 above that.
pub fn belief_group(belief_prob: f64) -> u8 {
    GROUP_THRESHOLDS.iter().filter(|&&t| belief_prob > t).count() as u8
}

/// Unique identifier for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn from_index(index: usize) -> Self {
        Self(format!("scientist-{}", index))
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bayesian scientist state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scientist {
    /// Credence that the hypothesis is true, in [0, 1]
    pub belief_prob: f64,
    /// Likelihood produced by this step's experiment, if one was run
    pub p_eh: Option<f64>,
    /// Display bucket derived from `belief_prob`
    pub group: u8,
}

impl Scientist {
    pub fn new(belief_prob: f64) -> Self {
        Self {
            belief_prob,
            p_eh: None,
            group: belief_group(belief_prob),
        }
    }

    /// Scientists only experiment when they lean towards the hypothesis.
    pub fn will_experiment(&self) -> bool {
        self.belief_prob > 0.5
    }

    pub fn regroup(&mut self) {
        self.group = belief_group(self.belief_prob);
    }
}

/// One of the two bandit arms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmChoice {
    A,
    B,
}

/// Beta(alpha, beta) estimate of an arm's payoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    alpha: u32,
    beta: u32,
    expectation: f64,
}

impl Arm {
    pub fn new(alpha: u32, beta: u32) -> SimResult<Self> {
        if alpha < 1 {
            return Err(SimError::invalid_parameter("alpha", alpha, "must be at least 1"));
        }
        if beta < 1 {
            return Err(SimError::invalid_parameter("beta", beta, "must be at least 1"));
        }
        Ok(Self {
            alpha,
            beta,
            expectation: expectation(alpha, beta),
        })
    }

    pub fn alpha(&self) -> u32 {
        self.alpha
    }

    pub fn beta(&self) -> u32 {
        self.beta
    }

    pub fn expectation(&self) -> f64 {
        self.expectation
    }

    /// Total pseudo-count; never decreases.
    pub fn count(&self) -> u64 {
        u64::from(self.alpha) + u64::from(self.beta)
    }

    /// Folds in a batch of trials: successes go to `alpha`, the trial count
    /// goes to `beta`. Fails without changing the arm if either count would
    /// overflow.
    pub fn record(&mut self, successes: u32, trials: u32) -> SimResult<()> {
        let alpha = self
            .alpha
            .checked_add(successes)
            .ok_or_else(|| SimError::invalid_parameter("alpha", self.alpha, "pseudo-count overflow"))?;
        let beta = self
            .beta
            .checked_add(trials)
            .ok_or_else(|| SimError::invalid_parameter("beta", self.beta, "pseudo-count overflow"))?;
        self.alpha = alpha;
        self.beta = beta;
        self.expectation = expectation(alpha, beta);
        Ok(())
    }
}

fn expectation(alpha: u32, beta: u32) -> f64 {
    alpha as f64 / (alpha as f64 + beta as f64)
}

/// Two-armed bandit learner state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditLearner {
    pub a: Arm,
    pub b: Arm,
}

impl BanditLearner {
    pub fn new(a: Arm, b: Arm) -> Self {
        Self { a, b }
    }

    /// Greedy choice; a tie goes to arm `a`.
    pub fn preferred_arm(&self) -> ArmChoice {
        if self.a.expectation() >= self.b.expectation() {
            ArmChoice::A
        } else {
            ArmChoice::B
        }
    }

    pub fn arm(&self, choice: ArmChoice) -> &Arm {
        match choice {
            ArmChoice::A => &self.a,
            ArmChoice::B => &self.b,
        }
    }

    pub fn arm_mut(&mut self, choice: ArmChoice) -> &mut Arm {
        match choice {
            ArmChoice::A => &mut self.a,
            ArmChoice::B => &mut self.b,
        }
    }
}

/// Learning state, tagged by model variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentState {
    Bayesian(Scientist),
    Bandit(BanditLearner),
}

/// A node of the epistemic network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub state: AgentState,
}

impl Agent {
    pub fn scientist(index: usize, belief_prob: f64) -> Self {
        Self {
            id: AgentId::from_index(index),
            state: AgentState::Bayesian(Scientist::new(belief_prob)),
        }
    }

    pub fn bandit(index: usize, learner: BanditLearner) -> Self {
        Self {
            id: AgentId::from_index(index),
            state: AgentState::Bandit(learner),
        }
    }

    /// Scalar tracked by the median series: the belief of a scientist, or a
    /// bandit learner's expectation for arm `b`.
    pub fn belief(&self) -> f64 {
        match &self.state {
            AgentState::Bayesian(s) => s.belief_prob,
            AgentState::Bandit(l) => l.b.expectation(),
        }
    }

    pub fn as_scientist(&self) -> SimResult<&Scientist> {
        match &self.state {
            AgentState::Bayesian(s) => Ok(s),
            AgentState::Bandit(_) => Err(mismatch(&self.id, "bayesian")),
        }
    }

    pub fn as_scientist_mut(&mut self) -> SimResult<&mut Scientist> {
        match &mut self.state {
            AgentState::Bayesian(s) => Ok(s),
            AgentState::Bandit(_) => Err(mismatch(&self.id, "bayesian")),
        }
    }

    pub fn as_bandit_mut(&mut self) -> SimResult<&mut BanditLearner> {
        match &mut self.state {
            AgentState::Bandit(l) => Ok(l),
            AgentState::Bayesian(_) => Err(mismatch(&self.id, "bandit")),
        }
    }
}

fn mismatch(id: &AgentId, expected: &'static str) -> SimError {
    SimError::StrategyMismatch {
        node: id.0.clone(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belief_group_buckets() {
        assert_eq!(belief_group(0.0), 0);
        assert_eq!(belief_group(0.2), 1);
        assert_eq!(belief_group(0.4), 1);
        assert_eq!(belief_group(0.5), 2);
        assert_eq!(belief_group(0.6), 2);
        assert_eq!(belief_group(0.9), 3);
        assert_eq!(belief_group(1.0), 3);
    }

    #[test]
    fn test_scientist_new() {
        let s = Scientist::new(0.55);
        assert!(s.p_eh.is_none());
        assert_eq!(s.group, 2);
        assert!(s.will_experiment());
        assert!(!Scientist::new(0.5).will_experiment());
    }

    #[test]
    fn test_arm_rejects_zero_counts() {
        assert!(Arm::new(0, 1).is_err());
        assert!(Arm::new(1, 0).is_err());
        assert!(Arm::new(1, 1).is_ok());
    }

    #[test]
    fn test_arm_record() {
        let mut arm = Arm::new(2, 2).unwrap();
        arm.record(1, 3).unwrap();
        assert_eq!(arm.alpha(), 3);
        assert_eq!(arm.beta(), 5);
        assert_eq!(arm.count(), 8);
        assert_eq!(arm.expectation(), 3.0 / 8.0);
    }

    #[test]
    fn test_arm_record_overflow_leaves_arm_unchanged() {
        let mut arm = Arm::new(2, u32::MAX - 1).unwrap();
        assert!(matches!(
            arm.record(1, 2),
            Err(SimError::InvalidParameter { .. })
        ));
        assert_eq!((arm.alpha(), arm.beta()), (2, u32::MAX - 1));

        arm.record(1, 1).unwrap();
        assert_eq!(arm.beta(), u32::MAX);
        assert_eq!(arm.count(), u64::from(u32::MAX) + 3);
    }

    #[test]
    fn test_mut_accessors_report_mismatch() {
        let mut scientist = Agent::scientist(2, 0.7);
        assert!(scientist.as_scientist_mut().is_ok());
        match scientist.as_bandit_mut() {
            Err(SimError::StrategyMismatch { node, expected }) => {
                assert_eq!(node, "scientist-2");
                assert_eq!(expected, "bandit");
            }
            other => panic!("expected a mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_preferred_arm() {
        let learner = BanditLearner::new(Arm::new(2, 2).unwrap(), Arm::new(3, 1).unwrap());
        assert_eq!(learner.preferred_arm(), ArmChoice::B);

        // equal expectations prefer a
        let tied = BanditLearner::new(Arm::new(1, 1).unwrap(), Arm::new(2, 2).unwrap());
        assert_eq!(tied.preferred_arm(), ArmChoice::A);
    }

    #[test]
    fn test_agent_variant_access() {
        let mut agent = Agent::scientist(3, 0.7);
        assert_eq!(agent.id.0, "scientist-3");
        assert!(agent.as_scientist().is_ok());
        assert_eq!(
            agent.as_bandit_mut().unwrap_err(),
            SimError::StrategyMismatch {
                node: "scientist-3".to_string(),
                expected: "bandit",
            }
        );
    }
}
