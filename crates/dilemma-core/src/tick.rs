//! Tick cycle: the phase loop that drives the lattice.
//!
//! Each tick runs through these phases, in order:
//!
//! 1. **Scoring** -- reset every score and pending strategy, then play the
//!    game against every neighbor (see [`compute_scores`]).
//!
//! 2. **Update** -- every agent picks a pending strategy by imitation,
//!    reading only the frozen end-of-scoring state (see [`plan_updates`]).
//!
//! 3. **Commit** -- synchronous: every agent adopts its pending strategy at
//!    once. Asynchronous: `max(1, round(N * update_fraction))` agents drawn
//!    without replacement adopt theirs; the rest discard it.
//!
//! The scheduler is [`Phase::Idle`] between ticks. A tick over an empty
//! lattice passes through every phase without touching state or drawing
//! randomness. Given the same starting state and generator, a tick is
//! deterministic.
//!
//! [`compute_scores`]: dilemma_agents::compute_scores
//! [`plan_updates`]: dilemma_agents::plan_updates

use dilemma_agents::{
    CommitOutcome, ImitationRule, PayoffMatrix, Population, compute_scores, plan_updates,
};
use dilemma_types::{AgentId, MetricsReport, NeighborhoodType, UpdateType};
use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::metrics;

/// Scheduler state. Cycles `Idle -> Scoring -> Update -> Commit -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Between ticks.
    #[default]
    Idle,
    /// Payoffs are being accumulated.
    Scoring,
    /// Pending strategies are being chosen.
    Update,
    /// Pending strategies are being applied.
    Commit,
}

impl Phase {
    /// The phase that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::Scoring,
            Self::Scoring => Self::Update,
            Self::Update => Self::Commit,
            Self::Commit => Self::Idle,
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Scoring => f.write_str("scoring"),
            Self::Update => f.write_str("update"),
            Self::Commit => f.write_str("commit"),
        }
    }
}

/// Everything a tick needs besides the population and the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dynamics {
    /// The payoff table.
    pub payoff: PayoffMatrix,
    /// Which cells count as neighbors.
    pub neighborhood: NeighborhoodType,
    /// How pending strategies are committed.
    pub update_type: UpdateType,
    /// Share of agents committing per asynchronous tick, in `(0, 1]`.
    pub update_fraction: f64,
    /// Imitation parameters.
    pub rule: ImitationRule,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed (first tick is 1).
    pub tick: u64,
    /// Ordered games played during scoring.
    pub games_played: u64,
    /// Agents whose pending strategy differed from their current one.
    pub planned_switches: usize,
    /// Agents that committed and how many of them changed strategy.
    pub commit: CommitOutcome,
    /// Metrics over the committed state at the end of the tick.
    pub metrics: MetricsReport,
}

/// Execute one complete tick.
///
/// `tick` is the number of the tick being run; it is only used for
/// reporting.
pub fn run_tick<R: Rng + ?Sized>(
    tick: u64,
    population: &mut Population,
    dynamics: &Dynamics,
    rng: &mut R,
) -> TickSummary {
    // --- Phase 1: Scoring ---
    let mut phase = Phase::Idle.next();
    population.begin_tick();
    let scoring = compute_scores(population, &dynamics.payoff, dynamics.neighborhood);
    debug!(tick, %phase, games = scoring.games_played, "Phase complete");

    // --- Phase 2: Update ---
    phase = phase.next();
    let planned_switches = plan_updates(population, dynamics.neighborhood, &dynamics.rule, rng);
    debug!(tick, %phase, planned_switches, "Phase complete");

    // --- Phase 3: Commit ---
    phase = phase.next();
    let commit = phase_commit(population, dynamics, rng);
    debug!(
        tick,
        %phase,
        committed = commit.committed,
        switched = commit.switched,
        "Phase complete"
    );

    TickSummary {
        tick,
        games_played: scoring.games_played,
        planned_switches,
        commit,
        metrics: metrics::measure(population, dynamics.neighborhood, tick),
    }
}

/// Phase 3: apply pending strategies according to the update scheme.
fn phase_commit<R: Rng + ?Sized>(
    population: &mut Population,
    dynamics: &Dynamics,
    rng: &mut R,
) -> CommitOutcome {
    match dynamics.update_type {
        UpdateType::Synchronous => population.commit_all(),
        UpdateType::Asynchronous => {
            let chosen = async_subset(population.len(), dynamics.update_fraction, rng);
            population.commit_agents(&chosen)
        }
    }
}

/// Draw the agents that commit in an asynchronous tick.
///
/// Returns `max(1, round(n * fraction))` distinct ids, capped at `n`, or
/// nothing when `n` is zero.
pub fn async_subset<R: Rng + ?Sized>(n: usize, fraction: f64, rng: &mut R) -> Vec<AgentId> {
    if n == 0 {
        return Vec::new();
    }
    let amount = async_commit_count(n, fraction);
    index::sample(rng, n, amount)
        .into_iter()
        .filter_map(AgentId::from_index)
        .collect()
}

/// `max(1, round(n * fraction))`, capped at `n`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn async_commit_count(n: usize, fraction: f64) -> usize {
    let wanted = (n as f64 * fraction).round();
    let wanted = if wanted.is_finite() && wanted > 0.0 {
        wanted as usize
    } else {
        0
    };
    wanted.clamp(1, n.max(1))
}
