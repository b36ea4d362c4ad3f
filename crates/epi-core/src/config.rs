//! Configuration System
//!
//! Loads run parameters from a TOML file so experiments can be adjusted
//! without recompiling. Every table is optional and falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::SimError;
use crate::setup::Topology;
use crate::systems::bandit::BanditParams;
use crate::systems::bayes::WorldState;
use crate::systems::timestep::StrategyKind;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "zollman.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub bayesian: BayesianConfig,
    pub bandit: BanditParams,
    pub output: OutputConfig,
}

/// Graph and run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub topology: Topology,
    pub node_count: usize,
    pub steps: u64,
    /// Seed for the run's random source; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub strategy: StrategyKind,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            topology: Topology::Cycle,
            node_count: 10,
            steps: 20,
            seed: None,
            strategy: StrategyKind::Bayesian,
        }
    }
}

/// Bayesian strategy parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesianConfig {
    pub world: WorldState,
}

/// Export settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to write the final run snapshot, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SimError),
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or use defaults if it is missing or
    /// invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            warn!("Could not load {}: {}. Using defaults.", path.display(), e);
            Self::default()
        })
    }

    /// Like [`Config::load_or_default`], but a missing file is expected and
    /// only logged at debug level.
    pub fn load_if_present(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No {} found, using defaults", path.display());
            return Self::default();
        }
        Self::load_or_default(path)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks the values the engine would otherwise reject mid-build.
    pub fn validate(&self) -> Result<(), SimError> {
        let sim = &self.simulation;
        let minimum = sim.topology.minimum_nodes();
        if sim.node_count < minimum {
            return Err(SimError::InvalidTopology {
                topology: sim.topology.to_string(),
                node_count: sim.node_count,
                minimum,
            });
        }
        if sim.strategy == StrategyKind::Bandit {
            self.bandit.validate()?;
        }
        Ok(())
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Epistemic network simulation

[simulation]
# cycle, wheel or complete
topology = "cycle"
node_count = 10
steps = 20
# seed = 42
# bayesian or bandit
strategy = "bayesian"

[bayesian]
# new: experiments favour the hypothesis; old: they disfavour it
world = "new"

[bandit]
a_objective = 0.49
b_objective = 0.51
num_trials = 1

[output]
# snapshot_path = "output/run_snapshot.json"
"#
    .to_string()
}
