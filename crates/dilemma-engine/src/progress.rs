//! Tick callback that logs batch progress.
//!
//! Every `report_interval` ticks the callback logs the cooperation rate,
//! average score and clustering. Every tick it feeds the cooperation rate
//! into a [`StabilityTracker`] for the final summary.

use dilemma_core::runner::{StabilityTracker, TickCallback};
use dilemma_core::{Simulation, TickSummary};
use tracing::{debug, info};

/// Periodic progress logger.
pub struct ProgressCallback {
    /// Log every N ticks.
    report_interval: u64,
    /// Recent cooperation rates.
    stability: StabilityTracker,
}

impl ProgressCallback {
    /// Create a logger reporting every `report_interval` ticks.
    pub const fn new(report_interval: u64) -> Self {
        Self {
            report_interval,
            stability: StabilityTracker::new(),
        }
    }

    /// The stability window collected so far.
    pub const fn stability(&self) -> &StabilityTracker {
        &self.stability
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        self.stability.record(summary.metrics.cooperation_rate);

        let due = self.report_interval != 0
            && summary.tick.checked_rem(self.report_interval) == Some(0);
        if due {
            info!(
                tick = summary.tick,
                cooperation_rate = format_args!("{:.3}", summary.metrics.cooperation_rate),
                average_score = format_args!("{:.2}", summary.metrics.average_score),
                clustering = format_args!("{:.3}", summary.metrics.cooperator_clustering),
                switched = summary.commit.switched,
                "Progress"
            );
        } else {
            debug!(
                tick = summary.tick,
                agents = simulation.population().len(),
                cooperators = summary.metrics.cooperators,
                "Tick"
            );
        }
    }
}
