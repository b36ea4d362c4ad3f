//! Simulation Driver
//!
//! Runs a fixed number of timesteps over a graph, committing each step's
//! graph and recording the median belief after it.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use epi_events::RunSnapshot;

use crate::components::graph::AgentGraph;
use crate::config::Config;
use crate::error::SimResult;
use crate::output::results::{Results, RunInfo};
use crate::setup::{build_bandit_graph, build_graph};
use crate::systems::timestep::{strategy_for, StrategyKind, UpdateStrategy};

/// Creates the run's single random source.
pub fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// A graph, the rule that advances it, and the random source driving both.
pub struct Simulation<S> {
    strategy: S,
    rng: SmallRng,
    results: Results,
}

impl<S: UpdateStrategy> Simulation<S> {
    /// Starts a run on `graph`. `seed` labels the run's snapshots; the rng is
    /// used as given.
    pub fn new(graph: AgentGraph, strategy: S, rng: SmallRng, seed: Option<u64>) -> Self {
        let info = RunInfo::new(seed, strategy.name());
        Self {
            strategy,
            rng,
            results: Results::new(graph, info),
        }
    }

    /// Applies one timestep. On failure the held graph and series are left
    /// as they were after the previous step.
    pub fn step(&mut self) -> SimResult<f64> {
        let next = self.strategy.step(self.results.current_graph(), &mut self.rng)?;
        self.results.update_graph(next);
        let median = self.results.record_median()?;
        debug!(
            step = self.results.steps_completed(),
            median,
            "Step complete"
        );
        Ok(median)
    }

    /// Runs `num_steps` steps and returns the accumulated results.
    pub fn run(&mut self, num_steps: u64) -> SimResult<&Results> {
        info!(
            strategy = self.strategy.name(),
            nodes = self.results.current_graph().len(),
            topology = %self.results.current_graph().topology(),
            num_steps,
            "Starting simulation"
        );
        for _ in 0..num_steps {
            if let Err(e) = self.step() {
                warn!(
                    step = self.results.steps_completed() + 1,
                    error = %e,
                    "Simulation aborted"
                );
                return Err(e);
            }
        }
        info!(
            steps = self.results.steps_completed(),
            final_median = ?self.results.median_series().last(),
            "Simulation complete"
        );
        Ok(&self.results)
    }

    /// Lazily yields a snapshot after each of the next `num_steps` steps.
    /// Each item continues from the graph left by the previous one; the
    /// sequence ends early after the first error.
    pub fn steps(&mut self, num_steps: u64) -> Steps<'_, S> {
        Steps {
            simulation: self,
            remaining: num_steps,
            failed: false,
        }
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    pub fn into_results(self) -> Results {
        self.results
    }
}

impl Simulation<Box<dyn UpdateStrategy>> {
    /// Builds the graph and strategy a configuration describes.
    pub fn from_config(config: &Config) -> SimResult<Self> {
        config.validate()?;
        let sim = &config.simulation;
        let mut rng = seeded_rng(sim.seed);

        let graph = match sim.strategy {
            StrategyKind::Bayesian => build_graph(sim.topology, sim.node_count, &mut rng)?,
            StrategyKind::Bandit => build_bandit_graph(sim.topology, sim.node_count, &mut rng)?,
        };
        let strategy = strategy_for(sim.strategy, config.bayesian.world, config.bandit)?;

        Ok(Self::new(graph, strategy, rng, sim.seed))
    }
}

/// Streaming view over a run, see [`Simulation::steps`]
pub struct Steps<'a, S> {
    simulation: &'a mut Simulation<S>,
    remaining: u64,
    failed: bool,
}

impl<S: UpdateStrategy> Iterator for Steps<'_, S> {
    type Item = SimResult<RunSnapshot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.failed {
            return None;
        }
        self.remaining -= 1;
        match self.simulation.step() {
            Ok(_) => Some(Ok(self.simulation.results.snapshot())),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: UpdateStrategy> std::iter::FusedIterator for Steps<'_, S> {}

/// Runs `num_steps` steps of `strategy` over `graph`.
pub fn run_simulation<S: UpdateStrategy>(
    graph: AgentGraph,
    strategy: S,
    num_steps: u64,
    rng: SmallRng,
) -> SimResult<Results> {
    let mut simulation = Simulation::new(graph, strategy, rng, None);
    simulation.run(num_steps)?;
    Ok(simulation.into_results())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::setup::{build_graph_with_beliefs, Topology};
    use crate::systems::timestep::{BayesianUpdate, StepFn};

    fn graph() -> AgentGraph {
        build_graph_with_beliefs(Topology::Cycle, &[0.7, 0.2, 0.6, 0.4, 0.55]).unwrap()
    }

    #[test]
    fn test_zero_steps_is_identity() {
        let input = graph();
        let results =
            run_simulation(input.clone(), BayesianUpdate::default(), 0, seeded_rng(Some(1))).unwrap();

        assert!(results.median_series().is_empty());
        assert_eq!(results.current_graph(), &input);
    }

    #[test]
    fn test_series_has_one_entry_per_step() {
        let results =
            run_simulation(graph(), BayesianUpdate::default(), 4, seeded_rng(Some(1))).unwrap();
        assert_eq!(results.median_series().len(), 4);
        assert_eq!(
            results.median_series().last().copied(),
            Some(results.current_median_belief().unwrap())
        );
    }

    #[test]
    fn test_streaming_continues_from_mutated_graph() {
        let mut simulation =
            Simulation::new(graph(), BayesianUpdate::default(), seeded_rng(Some(9)), Some(9));

        let first: Vec<RunSnapshot> = simulation.steps(2).collect::<SimResult<_>>().unwrap();
        let second: Vec<RunSnapshot> = simulation.steps(1).collect::<SimResult<_>>().unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[1].step, 2);
        assert_eq!(second[0].step, 3);
        assert_eq!(second[0].median_series.len(), 3);
        assert_eq!(&second[0].median_series[..2], &first[1].median_series[..]);
    }

    #[test]
    fn test_failed_step_keeps_previous_state() {
        let failing = StepFn::new(
            "failing",
            |_graph: &AgentGraph, _rng: &mut SmallRng| -> SimResult<AgentGraph> {
                Err(SimError::Domain {
                    p_hypothesis: 1.0,
                    p_evidence_given_hypothesis: 0.5,
                })
            },
        );
        let input = graph();
        let mut simulation = Simulation::new(input.clone(), failing, seeded_rng(Some(1)), None);

        assert!(simulation.run(3).is_err());
        assert_eq!(simulation.results().current_graph(), &input);
        assert!(simulation.results().median_series().is_empty());

        let items: Vec<_> = simulation.steps(5).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }

    #[test]
    fn test_from_config_defaults() {
        let config = Config {
            simulation: crate::config::SimulationConfig {
                seed: Some(3),
                steps: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut simulation = Simulation::from_config(&config).unwrap();
        let results = simulation.run(config.simulation.steps).unwrap();

        assert_eq!(results.current_graph().len(), 10);
        assert_eq!(results.info().strategy, "bayesian");
        assert_eq!(results.median_series().len(), 2);
    }
}
