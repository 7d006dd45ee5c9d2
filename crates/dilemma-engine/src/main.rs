//! Batch engine binary for the spatial dilemma simulation.
//!
//! Runs one headless simulation from a YAML configuration and logs its
//! progress and outcome.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `DILEMMA_CONFIG` or `dilemma-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Validate configuration and place the population
//! 4. Run `run.max_ticks` ticks, logging every `run.report_interval`
//! 5. Log the final metrics and the stability verdict
//!
//! With `run.mode: compare`, steps 3 to 5 are replaced by one run per
//! built-in game preset and a final table of their outcomes.

mod error;
mod progress;

use std::path::{Path, PathBuf};

use dilemma_core::config::LoggingConfig;
use dilemma_core::compare::{self, Scenario};
use dilemma_core::runner;
use dilemma_core::{Simulation, SimulationConfig};
use dilemma_types::RunMode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Environment variable naming an explicit configuration file.
const CONFIG_ENV: &str = "DILEMMA_CONFIG";

/// Configuration file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "dilemma-config.yaml";

/// Application entry point for the batch engine.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("dilemma-engine starting");
    let source = source.map_or_else(|| "defaults".to_owned(), |p| p.display().to_string());
    info!(
        source = %source,
        width = config.lattice.width,
        height = config.lattice.height,
        density = config.lattice.density,
        seed = config.run.seed,
        max_ticks = config.run.max_ticks,
        mode = ?config.run.mode,
        "Configuration loaded"
    );

    match config.run.mode {
        RunMode::Batch => run_batch(&config)?,
        RunMode::Compare => run_compare(&config)?,
    }

    Ok(())
}

/// Run one simulation and log its outcome.
fn run_batch(config: &SimulationConfig) -> Result<(), EngineError> {
    // 3. Build the simulation.
    let mut simulation = Simulation::new(config)?;
    info!(
        payoff = ?simulation.payoff_summary(),
        initial_cooperation_rate = simulation.metrics().cooperation_rate,
        "Population placed"
    );

    // 4. Run.
    let mut progress = ProgressCallback::new(config.run.report_interval);
    let result = runner::run_simulation(&mut simulation, config.run.max_ticks, &mut progress);

    // 5. Summarize.
    let report = serde_json::to_string(&simulation.metrics())?;
    info!(
        total_ticks = result.total_ticks,
        stability = %progress.stability().classify(),
        cooperation_std = progress.stability().std_dev(),
        report = %report,
        "dilemma-engine finished"
    );

    Ok(())
}

/// Run every game preset from the same configuration and log the table.
fn run_compare(config: &SimulationConfig) -> Result<(), EngineError> {
    let outcomes = compare::run_comparison(config, &Scenario::standard_set())?;
    let report = serde_json::to_string(&outcomes)?;
    info!(report = %report, "dilemma-engine finished");
    Ok(())
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the simulation configuration.
///
/// An explicit `DILEMMA_CONFIG` path must exist. Without it,
/// `dilemma-config.yaml` in the working directory is used when present
/// and defaults otherwise. Returns the path that was read, if any.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        Ok((config, Some(path.to_path_buf())))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}
