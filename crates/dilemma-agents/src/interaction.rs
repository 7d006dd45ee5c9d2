//! Scoring: every agent plays one game against each neighbor.
//!
//! Accounting is per ordered pair. If `A` and `B` are mutual neighbors,
//! `A` adds `payoff(A, B)` to its own score and `B` independently adds
//! `payoff(B, A)` to its own. No call ever writes to an opponent's
//! score.
//!
//! Scores depend only on committed strategies, so the phase is computed
//! as a read-only pass over the population followed by a single write
//! back.

use dilemma_types::NeighborhoodType;
use tracing::trace;

use crate::agent::Population;
use crate::payoff::PayoffMatrix;

/// Totals from one scoring pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoringSummary {
    /// Number of ordered games played.
    pub games_played: u64,
    /// Sum of all payoffs handed out.
    pub total_payoff: f64,
}

/// One agent's result for the pass.
#[derive(Debug, Clone, Copy, Default)]
struct GameTally {
    /// Sum of payoffs against every neighbor.
    score: f64,
    /// Number of neighbors played.
    games: u64,
}

/// Reset every agent's score and recompute it from its neighbors.
///
/// Each agent's new score is the sum of `payoff(own, neighbor)` over its
/// neighbors under `kind`. Agents without neighbors score `0.0`. The
/// score is also added to the agent's lifetime total and the games are
/// counted under the agent's current strategy.
pub fn compute_scores(
    population: &mut Population,
    payoff: &PayoffMatrix,
    kind: NeighborhoodType,
) -> ScoringSummary {
    let tallies: Vec<GameTally> = population
        .agents()
        .iter()
        .map(|agent| {
            population
                .neighbors(agent.id(), kind)
                .iter()
                .fold(GameTally::default(), |mut tally, neighbor| {
                    tally.score += payoff.payoff(agent.strategy(), neighbor.strategy());
                    tally.games = tally.games.saturating_add(1);
                    tally
                })
        })
        .collect();

    let mut summary = ScoringSummary::default();
    for (agent, tally) in population.agents_mut().iter_mut().zip(&tallies) {
        agent.record_games(tally.score, tally.games);
        summary.games_played = summary.games_played.saturating_add(tally.games);
        summary.total_payoff += tally.score;
    }

    trace!(
        games = summary.games_played,
        total_payoff = summary.total_payoff,
        "Scores computed"
    );
    summary
}
