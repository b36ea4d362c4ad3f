//! Timestep Engine
//!
//! One discrete step over the whole graph. A step is computed on a copy of
//! the graph and only handed back when every node updated cleanly, so a
//! failed step leaves the caller's graph untouched.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::bandit::{pull_preferred_arm, BanditParams};
use super::bayes::{calculate_posterior, run_experiment, WorldState};
use crate::components::graph::AgentGraph;
use crate::error::{SimError, SimResult};

/// A per-step update rule applied to the whole graph.
pub trait UpdateStrategy {
    /// Short label recorded in snapshots.
    fn name(&self) -> &str;

    /// Computes the graph after one step. `graph` is the authoritative state
    /// of the previous step and is not modified.
    fn step(&self, graph: &AgentGraph, rng: &mut SmallRng) -> SimResult<AgentGraph>;
}

impl<T: UpdateStrategy + ?Sized> UpdateStrategy for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn step(&self, graph: &AgentGraph, rng: &mut SmallRng) -> SimResult<AgentGraph> {
        (**self).step(graph, rng)
    }
}

/// Which update rule a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Bayesian,
    Bandit,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Bayesian => "bayesian",
            StrategyKind::Bandit => "bandit",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bayesian" | "bayes" => Ok(StrategyKind::Bayesian),
            "bandit" => Ok(StrategyKind::Bandit),
            _ => Err(SimError::invalid_parameter("strategy", s, "expected bayesian or bandit")),
        }
    }
}

/// Bayesian belief propagation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BayesianUpdate {
    pub world: WorldState,
}

impl BayesianUpdate {
    pub fn new(world: WorldState) -> Self {
        Self { world }
    }
}

impl UpdateStrategy for BayesianUpdate {
    fn name(&self) -> &str {
        StrategyKind::Bayesian.as_str()
    }

    fn step(&self, graph: &AgentGraph, rng: &mut SmallRng) -> SimResult<AgentGraph> {
        let mut next = graph.clone();
        individual_pass(&mut next, self.world, rng)?;
        social_pass(&mut next)?;
        Ok(next)
    }
}

/// Individual pass: scientists leaning towards the hypothesis experiment and
/// fold their own result in; everyone else clears `p_eh`.
pub fn individual_pass(graph: &mut AgentGraph, world: WorldState, rng: &mut SmallRng) -> SimResult<()> {
    for agent in graph.nodes_mut() {
        let scientist = agent.as_scientist_mut()?;
        scientist.p_eh = None;
        if scientist.will_experiment() {
            let p_eh = run_experiment(world, rng);
            scientist.belief_prob = calculate_posterior(scientist.belief_prob, p_eh)?;
            scientist.p_eh = Some(p_eh);
        }
    }
    Ok(())
}

/// Social pass: every node folds in each neighbour's fresh `p_eh`, neighbours
/// taken in ascending index order, then recomputes its group.
///
/// Evidence is read from the state left by the individual pass, so no node
/// sees another node's social update within the same step.
pub fn social_pass(graph: &mut AgentGraph) -> SimResult<()> {
    let evidence = graph
        .nodes()
        .iter()
        .map(|agent| agent.as_scientist().map(|s| s.p_eh))
        .collect::<SimResult<Vec<_>>>()?;

    for index in 0..graph.len() {
        let neighbors: Vec<usize> = graph.neighbors(index).collect();
        let Some(agent) = graph.node_mut(index) else {
            continue;
        };
        let scientist = agent.as_scientist_mut()?;

        let mut belief = scientist.belief_prob;
        for p_eh in neighbors.into_iter().filter_map(|n| evidence[n]) {
            belief = calculate_posterior(belief, p_eh)?;
        }
        scientist.belief_prob = belief;
        scientist.regroup();
    }
    Ok(())
}

/// Two-armed bandit learning
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BanditUpdate {
    pub params: BanditParams,
}

impl BanditUpdate {
    pub fn new(params: BanditParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }
}

impl UpdateStrategy for BanditUpdate {
    fn name(&self) -> &str {
        StrategyKind::Bandit.as_str()
    }

    fn step(&self, graph: &AgentGraph, rng: &mut SmallRng) -> SimResult<AgentGraph> {
        let mut next = graph.clone();
        for agent in next.nodes_mut() {
            let learner = agent.as_bandit_mut()?;
            pull_preferred_arm(learner, &self.params, rng)?;
        }
        Ok(next)
    }
}

/// Adapts a plain step function into an [`UpdateStrategy`].
pub struct StepFn<F> {
    name: String,
    step: F,
}

impl<F> StepFn<F>
where
    F: Fn(&AgentGraph, &mut SmallRng) -> SimResult<AgentGraph>,
{
    pub fn new(name: impl Into<String>, step: F) -> Self {
        Self {
            name: name.into(),
            step,
        }
    }
}

impl<F> UpdateStrategy for StepFn<F>
where
    F: Fn(&AgentGraph, &mut SmallRng) -> SimResult<AgentGraph>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&self, graph: &AgentGraph, rng: &mut SmallRng) -> SimResult<AgentGraph> {
        (self.step)(graph, rng)
    }
}

/// Builds the strategy a run was configured with.
pub fn strategy_for(
    kind: StrategyKind,
    world: WorldState,
    bandit: BanditParams,
) -> SimResult<Box<dyn UpdateStrategy>> {
    Ok(match kind {
        StrategyKind::Bayesian => Box::new(BayesianUpdate::new(world)),
        StrategyKind::Bandit => Box::new(BanditUpdate::new(bandit)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{Agent, AgentState, Arm, BanditLearner};
    use crate::setup::{build_bandit_graph, build_graph_with_beliefs, Topology};
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(2024)
    }

    fn scientist(graph: &AgentGraph, index: usize) -> &crate::components::Scientist {
        graph.node(index).unwrap().as_scientist().unwrap()
    }

    #[test]
    fn test_individual_pass_only_confident_nodes_experiment() {
        let mut graph =
            build_graph_with_beliefs(Topology::Complete, &[0.9, 0.1, 0.55, 0.45]).unwrap();

        individual_pass(&mut graph, WorldState::New, &mut rng()).unwrap();

        for index in [0, 2] {
            let s = scientist(&graph, index);
            let p_eh = s.p_eh.expect("confident node should experiment");
            assert!((0.3..=0.8).contains(&p_eh));
        }
        assert_ne!(scientist(&graph, 0).belief_prob, 0.9);
        assert_ne!(scientist(&graph, 2).belief_prob, 0.55);

        assert!(scientist(&graph, 1).p_eh.is_none());
        assert!(scientist(&graph, 3).p_eh.is_none());
        assert_eq!(scientist(&graph, 1).belief_prob, 0.1);
        assert_eq!(scientist(&graph, 3).belief_prob, 0.45);
    }

    #[test]
    fn test_stale_evidence_is_cleared() {
        let mut graph = build_graph_with_beliefs(Topology::Cycle, &[0.2, 0.3, 0.4]).unwrap();
        graph.node_mut(0).unwrap().as_scientist_mut().unwrap().p_eh = Some(0.7);

        individual_pass(&mut graph, WorldState::New, &mut rng()).unwrap();

        assert!(scientist(&graph, 0).p_eh.is_none());
    }

    #[test]
    fn test_social_pass_folds_neighbor_evidence_in_order() {
        let mut graph = build_graph_with_beliefs(Topology::Complete, &[0.3, 0.4, 0.2]).unwrap();
        graph.node_mut(1).unwrap().as_scientist_mut().unwrap().p_eh = Some(0.7);
        graph.node_mut(2).unwrap().as_scientist_mut().unwrap().p_eh = Some(0.6);

        social_pass(&mut graph).unwrap();

        let expected = calculate_posterior(calculate_posterior(0.3, 0.7).unwrap(), 0.6).unwrap();
        assert_eq!(scientist(&graph, 0).belief_prob, expected);
        assert_eq!(scientist(&graph, 0).group, crate::components::belief_group(expected));

        // node 1 only sees node 2's evidence, not node 0's updated belief
        let expected = calculate_posterior(0.4, 0.6).unwrap();
        assert_eq!(scientist(&graph, 1).belief_prob, expected);
    }

    #[test]
    fn test_bayesian_step_leaves_input_untouched() {
        let graph = build_graph_with_beliefs(Topology::Complete, &[0.9, 0.1, 0.55, 0.45]).unwrap();
        let before = graph.clone();

        let next = BayesianUpdate::default().step(&graph, &mut rng()).unwrap();

        assert_eq!(graph, before);
        assert_ne!(next, before);
        assert_eq!(next.edges(), before.edges());
    }

    #[test]
    fn test_domain_error_aborts_step() {
        // a certain scientist cannot take a further posterior update
        let graph = build_graph_with_beliefs(Topology::Cycle, &[1.0, 0.6, 0.2]).unwrap();
        let result = BayesianUpdate::default().step(&graph, &mut rng());
        assert!(matches!(result, Err(SimError::Domain { .. })));
    }

    #[test]
    fn test_bandit_step_pulls_better_rated_arm() {
        let learner = BanditLearner::new(Arm::new(2, 2).unwrap(), Arm::new(3, 1).unwrap());
        let nodes = vec![Agent::bandit(0, learner.clone())];
        let graph = AgentGraph::from_edges(Topology::Complete, nodes, Vec::<(usize, usize)>::new());
        let strategy = BanditUpdate::new(BanditParams {
            num_trials: 4,
            ..BanditParams::default()
        })
        .unwrap();

        let next = strategy.step(&graph, &mut rng()).unwrap();

        let AgentState::Bandit(after) = &next.nodes()[0].state else {
            panic!("expected bandit node");
        };
        assert_eq!(after.b.beta(), 5);
        assert_eq!(after.a, learner.a);
    }

    #[test]
    fn test_bandit_counts_never_decrease() {
        let mut rng = rng();
        let mut graph = build_bandit_graph(Topology::Wheel, 6, &mut rng).unwrap();
        let strategy = BanditUpdate::default();

        for _ in 0..20 {
            let next = strategy.step(&graph, &mut rng).unwrap();
            for (before, after) in graph.nodes().iter().zip(next.nodes()) {
                let (AgentState::Bandit(b), AgentState::Bandit(a)) = (&before.state, &after.state)
                else {
                    panic!("expected bandit nodes");
                };
                assert!(a.a.count() >= b.a.count());
                assert!(a.b.count() >= b.b.count());
                // one trial per step, plus one more on success
                let added = (a.a.count() + a.b.count()) - (b.a.count() + b.b.count());
                assert!(added == 1 || added == 2);
            }
            graph = next;
        }
    }

    #[test]
    fn test_strategy_mismatch() {
        let graph = build_graph_with_beliefs(Topology::Cycle, &[0.2, 0.3, 0.4]).unwrap();
        let result = BanditUpdate::default().step(&graph, &mut rng());
        assert!(matches!(result, Err(SimError::StrategyMismatch { .. })));
    }

    #[test]
    fn test_step_fn_adapter() {
        let identity = StepFn::new("identity", |graph: &AgentGraph, _rng: &mut SmallRng| -> SimResult<AgentGraph> {
            Ok(graph.clone())
        });
        let graph = build_graph_with_beliefs(Topology::Cycle, &[0.2, 0.3, 0.4]).unwrap();

        assert_eq!(identity.name(), "identity");
        assert_eq!(identity.step(&graph, &mut rng()).unwrap(), graph);
    }

    #[test]
    fn test_parse_strategy_kind() {
        assert_eq!("bayesian".parse::<StrategyKind>().unwrap(), StrategyKind::Bayesian);
        assert_eq!("Bandit".parse::<StrategyKind>().unwrap(), StrategyKind::Bandit);
        assert!("random".parse::<StrategyKind>().is_err());
    }
}
