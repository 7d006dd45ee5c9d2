//! Configuration loading and validation for the spatial dilemma simulation.
//!
//! The canonical configuration lives in `dilemma-config.yaml` at the
//! project root. Every field has a default, so an empty document describes
//! the classic run: a fully occupied 100x100 Moore lattice, synchronous
//! updates, 1% mutation, half the agents cooperating at start, and the
//! Prisoner's Dilemma table `R=3, S=0, T=5, P=1`.
//!
//! Parsing never validates. Call [`SimulationConfig::validate`] (the
//! [`Simulation`] constructor does) to reject out-of-range values before
//! any agent is created.
//!
//! [`Simulation`]: crate::simulation::Simulation

use std::path::Path;

use dilemma_agents::{ImitationRule, PayoffMatrix};
use dilemma_types::{NeighborhoodType, RunMode, TieBreak, UpdateType};
use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A lattice dimension is zero.
    #[error("{field} must be at least 1")]
    ZeroDimension {
        /// `lattice.width` or `lattice.height`.
        field: &'static str,
    },

    /// A real-valued parameter is outside its allowed range or NaN.
    #[error("{field} must be within {range}, got {value}")]
    OutOfRange {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable allowed range.
        range: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A payoff entry was left out of a `payoff` section.
    #[error("payoff.{entry} is missing")]
    MissingPayoff {
        /// `cc`, `cd`, `dc` or `dd`.
        entry: &'static str,
    },

    /// A payoff entry is infinite or NaN.
    #[error("payoff.{entry} must be finite, got {value}")]
    NonFinitePayoff {
        /// `cc`, `cd`, `dc` or `dd`.
        entry: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The progress report interval is zero.
    #[error("run.report_interval must be at least 1")]
    ZeroReportInterval,

    /// A rule object rejected a value that passed the field checks.
    #[error("invalid rule parameter: {source}")]
    Rule {
        /// The underlying agent-rule error.
        #[from]
        source: dilemma_agents::AgentError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `dilemma-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Lattice size and occupancy.
    #[serde(default)]
    pub lattice: LatticeConfig,

    /// Neighborhood, update scheme and imitation parameters.
    #[serde(default)]
    pub dynamics: DynamicsConfig,

    /// The 2x2 payoff table.
    #[serde(default)]
    pub payoff: PayoffConfig,

    /// Seed and batch-run bounds.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields [`SimulationConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check every field, naming the first offending one.
    ///
    /// Values are rejected, never clamped.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] variant describing the first invalid
    /// field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lattice.validate()?;
        self.dynamics.validate()?;
        self.payoff.matrix()?;
        if self.run.report_interval == 0 {
            return Err(ConfigError::ZeroReportInterval);
        }
        Ok(())
    }

    /// The validated payoff table.
    ///
    /// # Errors
    ///
    /// See [`PayoffConfig::matrix`].
    pub fn payoff_matrix(&self) -> Result<PayoffMatrix, ConfigError> {
        self.payoff.matrix()
    }

    /// The validated imitation rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for a bad `mutation_rate`.
    pub fn imitation_rule(&self) -> Result<ImitationRule, ConfigError> {
        let rate = unit_interval("dynamics.mutation_rate", self.dynamics.mutation_rate)?;
        Ok(ImitationRule::new(rate, self.dynamics.tie_break)?)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Lattice configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatticeConfig {
    /// Number of columns.
    #[serde(default = "default_side")]
    pub width: usize,

    /// Number of rows.
    #[serde(default = "default_side")]
    pub height: usize,

    /// Fraction of cells occupied at start, in `[0, 1]`.
    #[serde(default = "default_density")]
    pub density: f64,
}

impl LatticeConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroDimension {
                field: "lattice.width",
            });
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                field: "lattice.height",
            });
        }
        unit_interval("lattice.density", self.density)?;
        Ok(())
    }
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            width: default_side(),
            height: default_side(),
            density: default_density(),
        }
    }
}

/// Game dynamics configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DynamicsConfig {
    /// Moore (8 neighbors) or Von Neumann (4 neighbors).
    #[serde(default)]
    pub neighborhood: NeighborhoodType,

    /// Synchronous or asynchronous commit.
    #[serde(default)]
    pub update_type: UpdateType,

    /// Fraction of agents committing per tick in asynchronous mode, in
    /// `(0, 1]`.
    #[serde(default = "default_update_fraction")]
    pub update_fraction: f64,

    /// Resolution of equal best scores during imitation.
    #[serde(default)]
    pub tie_break: TieBreak,

    /// Probability that a freshly placed agent cooperates.
    #[serde(default = "default_initial_cooperation_rate")]
    pub initial_cooperation_rate: f64,

    /// Per-agent, per-tick probability of a random strategy.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
}

impl DynamicsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        unit_interval(
            "dynamics.initial_cooperation_rate",
            self.initial_cooperation_rate,
        )?;
        unit_interval("dynamics.mutation_rate", self.mutation_rate)?;
        if !(self.update_fraction > 0.0 && self.update_fraction <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "dynamics.update_fraction",
                range: "(0, 1]",
                value: self.update_fraction,
            });
        }
        Ok(())
    }
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            neighborhood: NeighborhoodType::default(),
            update_type: UpdateType::default(),
            update_fraction: default_update_fraction(),
            tie_break: TieBreak::default(),
            initial_cooperation_rate: default_initial_cooperation_rate(),
            mutation_rate: default_mutation_rate(),
        }
    }
}

/// Payoff table configuration.
///
/// Omitting the whole `payoff` section selects the Prisoner's Dilemma
/// defaults. A section that is present must name all four entries.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PayoffConfig {
    /// Cooperate vs Cooperate (reward).
    #[serde(default)]
    pub cc: Option<f64>,
    /// Cooperate vs Defect (sucker).
    #[serde(default)]
    pub cd: Option<f64>,
    /// Defect vs Cooperate (temptation).
    #[serde(default)]
    pub dc: Option<f64>,
    /// Defect vs Defect (punishment).
    #[serde(default)]
    pub dd: Option<f64>,
}

impl PayoffConfig {
    /// Convert to a [`PayoffMatrix`], checking every entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPayoff`] or
    /// [`ConfigError::NonFinitePayoff`] naming the offending entry.
    pub fn matrix(&self) -> Result<PayoffMatrix, ConfigError> {
        let cc = payoff_entry("cc", self.cc)?;
        let cd = payoff_entry("cd", self.cd)?;
        let dc = payoff_entry("dc", self.dc)?;
        let dd = payoff_entry("dd", self.dd)?;
        Ok(PayoffMatrix::new(cc, cd, dc, dd)?)
    }
}

impl Default for PayoffConfig {
    fn default() -> Self {
        let summary = PayoffMatrix::prisoners_dilemma().summary();
        Self {
            cc: Some(summary.reward),
            cd: Some(summary.sucker),
            dc: Some(summary.temptation),
            dd: Some(summary.punishment),
        }
    }
}

/// Seed and batch-run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of ticks the batch binary runs.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Progress is logged every N ticks.
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,

    /// Single batch run, or every game preset side by side.
    #[serde(default)]
    pub mode: RunMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_ticks: default_max_ticks(),
            report_interval: default_report_interval(),
            mode: RunMode::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Accept values in `[0, 1]`; NaN is rejected.
fn unit_interval(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange {
            field,
            range: "[0, 1]",
            value,
        })
    }
}

/// Require a present, finite payoff entry.
fn payoff_entry(entry: &'static str, value: Option<f64>) -> Result<f64, ConfigError> {
    match value {
        None => Err(ConfigError::MissingPayoff { entry }),
        Some(v) if !v.is_finite() => Err(ConfigError::NonFinitePayoff { entry, value: v }),
        Some(v) => Ok(v),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_side() -> usize {
    100
}

const fn default_density() -> f64 {
    1.0
}

const fn default_update_fraction() -> f64 {
    0.1
}

const fn default_initial_cooperation_rate() -> f64 {
    0.5
}

const fn default_mutation_rate() -> f64 {
    0.01
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_ticks() -> u64 {
    100
}

const fn default_report_interval() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lattice.width, 100);
        assert_eq!(config.lattice.height, 100);
        assert_eq!(config.dynamics.neighborhood, NeighborhoodType::Moore);
        assert_eq!(config.dynamics.update_type, UpdateType::Synchronous);
        assert_eq!(config.run.seed, 42);
        assert_eq!(config.payoff_matrix().ok(), Some(PayoffMatrix::prisoners_dilemma()));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
lattice:
  width: 30
  height: 20
  density: 0.8

dynamics:
  neighborhood: von_neumann
  update_type: asynchronous
  update_fraction: 0.25
  tie_break: random
  initial_cooperation_rate: 0.6
  mutation_rate: 0.0

payoff:
  cc: 1.0
  cd: -1.0
  dc: 2.0
  dd: 0.0

run:
  seed: 7
  max_ticks: 500
  report_interval: 50
  mode: compare

logging:
  level: debug
  json: true
";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.lattice.width, 30);
        assert_eq!(config.lattice.height, 20);
        assert_eq!(config.dynamics.neighborhood, NeighborhoodType::VonNeumann);
        assert_eq!(config.dynamics.update_type, UpdateType::Asynchronous);
        assert_eq!(config.dynamics.tie_break, TieBreak::Random);
        assert_eq!(config.run.seed, 7);
        assert_eq!(config.run.max_ticks, 500);
        assert_eq!(config.run.mode, RunMode::Compare);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
        let summary = config.payoff_matrix().map(|m| m.summary()).ok();
        assert_eq!(summary.map(|s| s.sucker), Some(-1.0));
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("run:\n  seed: 9\n")
            .ok()
            .unwrap_or_default();
        assert_eq!(config.run.seed, 9);
        assert_eq!(config.run.mode, RunMode::Batch);
        assert_eq!(config.lattice, LatticeConfig::default());
        assert_eq!(config.payoff, PayoffConfig::default());
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn zero_dimension_is_named() {
        let mut config = SimulationConfig::default();
        config.lattice.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroDimension {
                field: "lattice.height"
            })
        ));
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        let mut config = SimulationConfig::default();
        config.lattice.density = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "lattice.density",
                ..
            })
        ));

        let mut config = SimulationConfig::default();
        config.dynamics.mutation_rate = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "dynamics.mutation_rate",
                ..
            })
        ));

        let mut config = SimulationConfig::default();
        config.dynamics.initial_cooperation_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn update_fraction_excludes_zero() {
        let mut config = SimulationConfig::default();
        config.dynamics.update_fraction = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "dynamics.update_fraction",
                ..
            })
        ));
        config.dynamics.update_fraction = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_payoff_section_names_missing_entry() {
        let yaml = "payoff:\n  cc: 3\n  cd: 0\n  dd: 1\n";
        let config = SimulationConfig::parse(yaml).ok().unwrap_or_default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingPayoff { entry: "dc" })
        ));
    }

    #[test]
    fn non_finite_payoff_is_rejected() {
        let mut config = SimulationConfig::default();
        config.payoff.cc = Some(f64::INFINITY);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinitePayoff { entry: "cc", .. })
        ));
    }

    #[test]
    fn imitation_rule_carries_tie_break() {
        let mut config = SimulationConfig::default();
        config.dynamics.tie_break = TieBreak::Random;
        let rule = config.imitation_rule().ok();
        assert_eq!(rule.map(|r| r.tie_break()), Some(TieBreak::Random));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("dilemma-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            let valid = config.map(|c| c.validate().is_ok()).unwrap_or(false);
            assert!(valid);
        }
    }
}
