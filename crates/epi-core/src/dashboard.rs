//! Dashboard Contract
//!
//! What an interactive front end needs from the engine: a set of adjustable
//! parameters, and a step function it can call with their current values to
//! get a numeric series back. No UI framework is involved here.

use std::fmt;

use crate::error::{SimError, SimResult};
use crate::setup::{build_bandit_graph, build_graph, Topology};
use crate::simulation::{run_simulation, seeded_rng};
use crate::systems::bandit::BanditParams;
use crate::systems::bayes::WorldState;
use crate::systems::timestep::{BanditUpdate, BayesianUpdate};

/// Current value of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Choice(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Choice(c) => f.write_str(c),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Choice(value.to_string())
    }
}

/// Allowed values of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDomain {
    /// Inclusive numeric range; `integer` restricts to whole numbers
    Range { min: f64, max: f64, integer: bool },
    /// One of a fixed list of labels
    Options(Vec<String>),
}

impl ParamDomain {
    fn admits(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamDomain::Range { min, max, integer }, ParamValue::Number(n)) => {
                (*min..=*max).contains(n) && (!integer || n.fract() == 0.0)
            }
            (ParamDomain::Options(options), ParamValue::Choice(c)) => options.iter().any(|o| o == c),
            _ => false,
        }
    }
}

/// An adjustable control
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub domain: ParamDomain,
    pub value: ParamValue,
}

impl Parameter {
    pub fn number(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            domain: ParamDomain::Range { min, max, integer: false },
            value: ParamValue::Number(value),
        }
    }

    pub fn integer(name: impl Into<String>, value: u64, min: u64, max: u64) -> Self {
        Self {
            name: name.into(),
            domain: ParamDomain::Range {
                min: min as f64,
                max: max as f64,
                integer: true,
            },
            value: ParamValue::Number(value as f64),
        }
    }

    pub fn choice(name: impl Into<String>, value: &str, options: &[&str]) -> Self {
        Self {
            name: name.into(),
            domain: ParamDomain::Options(options.iter().map(|o| o.to_string()).collect()),
            value: ParamValue::Choice(value.to_string()),
        }
    }
}

/// Ordered collection of parameters, looked up by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    pub fn new(params: Vec<Parameter>) -> Self {
        Self { params }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn get(&self, name: &str) -> SimResult<&ParamValue> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
            .ok_or_else(|| SimError::invalid_parameter(name, "<missing>", "no such parameter"))
    }

    /// Sets a parameter, rejecting values outside its domain.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> SimResult<()> {
        let value = value.into();
        let param = self
            .params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| SimError::invalid_parameter(name, &value, "no such parameter"))?;
        if !param.domain.admits(&value) {
            return Err(SimError::invalid_parameter(name, &value, "outside the allowed values"));
        }
        param.value = value;
        Ok(())
    }

    pub fn number(&self, name: &str) -> SimResult<f64> {
        match self.get(name)? {
            ParamValue::Number(n) => Ok(*n),
            other => Err(SimError::invalid_parameter(name, other, "expected a number")),
        }
    }

    pub fn count(&self, name: &str) -> SimResult<u64> {
        let n = self.number(name)?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(SimError::invalid_parameter(name, n, "expected a whole number"));
        }
        Ok(n as u64)
    }

    pub fn choice(&self, name: &str) -> SimResult<&str> {
        match self.get(name)? {
            ParamValue::Choice(c) => Ok(c),
            other => Err(SimError::invalid_parameter(name, other, "expected a choice")),
        }
    }
}

/// Holds parameter values and re-runs a step function on demand.
pub struct Dashboard<F> {
    params: ParameterSet,
    step_fn: F,
    series: Vec<f64>,
}

impl<F> Dashboard<F>
where
    F: FnMut(&ParameterSet) -> SimResult<Vec<f64>>,
{
    pub fn new(params: ParameterSet, step_fn: F) -> Self {
        Self {
            params,
            step_fn,
            series: Vec::new(),
        }
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> SimResult<()> {
        self.params.set(name, value)
    }

    /// Invokes the step function with the current values and keeps its
    /// series for display. A failed call leaves the previous series in place.
    pub fn interact(&mut self) -> SimResult<&[f64]> {
        self.series = (self.step_fn)(&self.params)?;
        Ok(&self.series)
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }
}

const TOPOLOGY_OPTIONS: &[&str] = &["cycle", "wheel", "complete"];

fn shared_parameters(topology: &str, num_nodes: u64) -> Vec<Parameter> {
    vec![
        Parameter::choice("topology", topology, TOPOLOGY_OPTIONS),
        Parameter::integer("num_nodes", num_nodes, 1, 100),
        Parameter::integer("num_steps", 20, 0, 1000),
        Parameter::integer("seed", 42, 0, u32::MAX as u64),
    ]
}

/// Controls for the Bayesian model
pub fn bayesian_parameters() -> ParameterSet {
    let mut params = shared_parameters("cycle", 10);
    params.push(Parameter::choice("world", "new", &["new", "old"]));
    ParameterSet::new(params)
}

/// Controls for the bandit model
pub fn bandit_parameters() -> ParameterSet {
    let defaults = BanditParams::default();
    let mut params = shared_parameters("complete", 3);
    params.push(Parameter::number("a_objective", defaults.a_objective, 0.01, 0.99));
    params.push(Parameter::number("b_objective", defaults.b_objective, 0.01, 0.99));
    params.push(Parameter::integer("num_trials", u64::from(defaults.num_trials), 1, 100));
    ParameterSet::new(params)
}

/// Runs the Bayesian model with the dashboard's values; returns the median
/// belief series.
pub fn bayesian_series(params: &ParameterSet) -> SimResult<Vec<f64>> {
    let topology: Topology = params.choice("topology")?.parse()?;
    let world: WorldState = params.choice("world")?.parse()?;
    let mut rng = seeded_rng(Some(params.count("seed")?));

    let graph = build_graph(topology, params.count("num_nodes")? as usize, &mut rng)?;
    let results = run_simulation(graph, BayesianUpdate::new(world), params.count("num_steps")?, rng)?;
    Ok(results.median_series().to_vec())
}

/// Runs the bandit model with the dashboard's values; returns the median
/// arm-`b` expectation series.
pub fn bandit_series(params: &ParameterSet) -> SimResult<Vec<f64>> {
    let topology: Topology = params.choice("topology")?.parse()?;
    let bandit = BanditParams {
        a_objective: params.number("a_objective")?,
        b_objective: params.number("b_objective")?,
        num_trials: params.count("num_trials")? as u32,
    };
    let strategy = BanditUpdate::new(bandit)?;
    let mut rng = seeded_rng(Some(params.count("seed")?));

    let graph = build_bandit_graph(topology, params.count("num_nodes")? as usize, &mut rng)?;
    let results = run_simulation(graph, strategy, params.count("num_steps")?, rng)?;
    Ok(results.median_series().to_vec())
}
