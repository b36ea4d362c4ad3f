//! Loading run parameters from TOML files on disk

use std::fs;

use epi_core::config::{Config, ConfigError};
use epi_core::output::write_snapshot;
use epi_core::{Simulation, SimError, StrategyKind, Topology, WorldState};
use epi_events::RunSnapshot;
use tempfile::tempdir;

#[test]
fn test_load_and_run_bandit_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zollman.toml");
    fs::write(
        &path,
        r#"
[simulation]
topology = "wheel"
node_count = 5
steps = 6
seed = 21
strategy = "bandit"

[bandit]
a_objective = 0.4
b_objective = 0.6
num_trials = 2
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.simulation.topology, Topology::Wheel);
    assert_eq!(config.simulation.strategy, StrategyKind::Bandit);
    assert_eq!(config.bandit.num_trials, 2);
    assert_eq!(config.bayesian.world, WorldState::New);

    let mut simulation = Simulation::from_config(&config).unwrap();
    let results = simulation.run(config.simulation.steps).unwrap();
    assert_eq!(results.median_series().len(), 6);
    assert!(results.median_series().iter().all(|m| (0.0..=1.0).contains(m)));
}

#[test]
fn test_invalid_file_reports_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[simulation]\ntopology = \"cycle\"\nnode_count = 2\n").unwrap();

    match Config::load(&path) {
        Err(ConfigError::Invalid(SimError::InvalidTopology { node_count, .. })) => {
            assert_eq!(node_count, 2)
        }
        other => panic!("expected an invalid topology, got {:?}", other),
    }
    assert!(matches!(
        Config::load(dir.path().join("missing.toml")),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("missing.toml"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_if_present_reads_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zollman.toml");
    assert_eq!(Config::load_if_present(&path), Config::default());

    fs::write(&path, "[simulation]\nsteps = 7\n").unwrap();
    assert_eq!(Config::load_if_present(&path).simulation.steps, 7);
}

#[test]
fn test_final_snapshot_written_and_read_back() {
    let dir = tempdir().unwrap();
    let config = Config::from_str("[simulation]\nseed = 4\nsteps = 3\nnode_count = 6\n").unwrap();
    let mut simulation = Simulation::from_config(&config).unwrap();
    simulation.run(3).unwrap();

    let path = dir.path().join("nested").join("run.json");
    write_snapshot(&simulation.results().snapshot(), &path).unwrap();

    let restored = RunSnapshot::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored.step, 3);
    assert_eq!(restored.seed, Some(4));
    assert_eq!(restored.graph.nodes.len(), 6);
    assert_eq!(restored.median_series, simulation.results().median_series());
}
