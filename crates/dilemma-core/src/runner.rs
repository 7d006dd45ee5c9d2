//! Bounded simulation loop and convergence analysis.
//!
//! [`run_simulation`] wraps [`Simulation::step`] and notifies a
//! [`TickCallback`] after each tick. The engine keeps no history of its
//! own; callers that want one (a progress log, an exporter, the
//! [`StabilityTracker`]) hold it in their callback.

use std::collections::VecDeque;

use tracing::info;

use crate::simulation::Simulation;
use crate::tick::TickSummary;

/// Number of recent cooperation rates the stability check looks at.
pub const STABILITY_WINDOW: usize = 10;

/// Standard deviation below which a run counts as converged.
pub const CONVERGED_THRESHOLD: f64 = 0.01;

/// Standard deviation below which a run counts as quasi-stable.
pub const QUASI_STABLE_THRESHOLD: f64 = 0.05;

/// Callback invoked after each tick completes.
///
/// The callback receives the tick summary and read-only access to the
/// simulation.
pub trait TickCallback {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _simulation: &Simulation) {}
}

/// Result of a bounded run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
    /// Number of ticks executed by this call.
    pub total_ticks: u64,
}

/// Advance `simulation` by `max_ticks` ticks.
pub fn run_simulation(
    simulation: &mut Simulation,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> SimulationResult {
    info!(
        max_ticks,
        start_tick = simulation.tick(),
        agents = simulation.population().len(),
        "Simulation starting"
    );

    let mut final_summary = None;
    let mut total_ticks: u64 = 0;
    while total_ticks < max_ticks {
        let summary = simulation.step();
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, simulation);
        final_summary = Some(summary);
    }

    let result = SimulationResult {
        final_summary,
        total_ticks,
    };
    log_simulation_end(&result);
    result
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    let metrics = result.final_summary.as_ref().map(|s| &s.metrics);
    info!(
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        cooperation_rate = metrics.map(|m| m.cooperation_rate),
        average_score = metrics.map(|m| m.average_score),
        clustering = metrics.map(|m| m.cooperator_clustering),
        "Simulation ended"
    );
}

// ---------------------------------------------------------------------------
// Stability
// ---------------------------------------------------------------------------

/// Classification of the recent cooperation-rate trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Standard deviation below [`CONVERGED_THRESHOLD`].
    Converged,
    /// Standard deviation below [`QUASI_STABLE_THRESHOLD`].
    QuasiStable,
    /// Still moving.
    Evolving,
}

impl core::fmt::Display for Stability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Converged => f.write_str("converged"),
            Self::QuasiStable => f.write_str("quasi-stable"),
            Self::Evolving => f.write_str("evolving"),
        }
    }
}

/// Sliding window over the last [`STABILITY_WINDOW`] cooperation rates.
#[derive(Debug, Clone, Default)]
pub struct StabilityTracker {
    /// Most recent rates, oldest first.
    window: VecDeque<f64>,
}

impl StabilityTracker {
    /// An empty tracker.
    pub const fn new() -> Self {
        Self {
            window: VecDeque::new(),
        }
    }

    /// Record one cooperation rate, dropping the oldest beyond the window.
    pub fn record(&mut self, cooperation_rate: f64) {
        if self.window.len() >= STABILITY_WINDOW {
            self.window.pop_front();
        }
        self.window.push_back(cooperation_rate);
    }

    /// Number of rates currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether no rate has been recorded.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Sample standard deviation (divisor `n - 1`) of the window.
    ///
    /// `None` with fewer than two samples.
    #[allow(clippy::cast_precision_loss)]
    pub fn std_dev(&self) -> Option<f64> {
        let n = self.window.len();
        if n < 2 {
            return None;
        }
        let mean = self.window.iter().sum::<f64>() / n as f64;
        let squares: f64 = self.window.iter().map(|r| (r - mean) * (r - mean)).sum();
        Some((squares / n.saturating_sub(1) as f64).sqrt())
    }

    /// Classify the window. Fewer than two samples count as evolving.
    pub fn classify(&self) -> Stability {
        match self.std_dev() {
            Some(sd) if sd < CONVERGED_THRESHOLD => Stability::Converged,
            Some(sd) if sd < QUASI_STABLE_THRESHOLD => Stability::QuasiStable,
            _ => Stability::Evolving,
        }
    }
}

impl TickCallback for StabilityTracker {
    fn on_tick(&mut self, summary: &TickSummary, _simulation: &Simulation) {
        self.record(summary.metrics.cooperation_rate);
    }
}
