//! Tick scheduler, metrics, and orchestration for the spatial dilemma
//! simulation.
//!
//! This crate sequences the rules from `dilemma-agents` into ticks
//! (Scoring, Update, Commit), measures the committed state, and wraps it
//! all in the [`Simulation`] facade driven by [`run_simulation`].
//!
//! # Modules
//!
//! - [`compare`] -- Built-in game presets run side by side.
//! - [`config`] -- Configuration loading from `dilemma-config.yaml` into
//!   strongly-typed structs, with validation.
//! - [`metrics`] -- Cooperation rate, score moments, clustering.
//! - [`runner`] -- Bounded run loop, [`TickCallback`], and the
//!   [`StabilityTracker`].
//! - [`simulation`] -- The [`Simulation`] facade: `step`, `reset`,
//!   `set_payoff`, snapshots.
//! - [`tick`] -- The phase loop behind a single tick.
//!
//! [`Simulation`]: simulation::Simulation
//! [`run_simulation`]: runner::run_simulation
//! [`TickCallback`]: runner::TickCallback
//! [`StabilityTracker`]: runner::StabilityTracker

pub mod compare;
pub mod config;
pub mod metrics;
pub mod runner;
pub mod simulation;
pub mod tick;

pub use compare::{Scenario, ScenarioOutcome, run_comparison};
pub use config::{ConfigError, SimulationConfig};
pub use runner::{
    NoOpCallback, SimulationResult, Stability, StabilityTracker, TickCallback, run_simulation,
};
pub use simulation::{Simulation, SimulationError};
pub use tick::{Dynamics, Phase, TickSummary};
