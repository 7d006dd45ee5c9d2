//! Imitation dynamics: adopt the strategy of the best scorer nearby.
//!
//! For each agent the candidates are the agent itself followed by its
//! neighbors in lattice scan order. The winning candidate's strategy
//! becomes the agent's pending strategy, unless mutation replaces it
//! with a uniformly random one.
//!
//! The decision for one agent is the pure function
//! [`determine_next_strategy`]; [`plan_updates`] maps it over the whole
//! population against the frozen post-scoring state and only then writes
//! the pending strategies back. Committed strategies are never touched
//! here.

use dilemma_types::{NeighborhoodType, Strategy, TieBreak};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::trace;

use crate::agent::{Agent, Population};
use crate::error::{AgentError, check_probability};

/// Parameters of the imitation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImitationRule {
    /// Probability of replacing the imitated strategy with a random one.
    mutation_rate: f64,
    /// How equal best scores are resolved.
    tie_break: TieBreak,
}

impl ImitationRule {
    /// Build a rule.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidProbability`] if `mutation_rate` is
    /// outside `[0, 1]`.
    pub fn new(mutation_rate: f64, tie_break: TieBreak) -> Result<Self, AgentError> {
        Ok(Self {
            mutation_rate: check_probability("mutation_rate", mutation_rate)?,
            tie_break,
        })
    }

    /// Pure imitation with the incumbent tie-break and no mutation.
    pub const fn deterministic() -> Self {
        Self {
            mutation_rate: 0.0,
            tie_break: TieBreak::Incumbent,
        }
    }

    /// Mutation probability.
    pub const fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Tie-break policy.
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}

impl Default for ImitationRule {
    fn default() -> Self {
        Self::deterministic()
    }
}

/// Pick the pending strategy for `agent`.
///
/// 1. No neighbors: the imitated strategy is the agent's own.
/// 2. Otherwise the best candidate among the agent and its neighbors is
///    chosen according to the rule's [`TieBreak`].
/// 3. With probability `mutation_rate` the result is replaced by a
///    uniformly random strategy.
///
/// `agent` is only read; the caller stores the result.
pub fn determine_next_strategy<R: Rng + ?Sized>(
    agent: &Agent,
    neighbors: &[&Agent],
    rule: &ImitationRule,
    rng: &mut R,
) -> Strategy {
    let imitated = match rule.tie_break {
        TieBreak::Incumbent => incumbent_best(agent, neighbors),
        TieBreak::Random => random_best(agent, neighbors, rng),
    };

    if rng.random_bool(rule.mutation_rate) {
        random_strategy(rng)
    } else {
        imitated
    }
}

/// Compute and store the pending strategy of every agent.
///
/// All decisions read the same frozen scores and committed strategies;
/// pending strategies are written only after every decision is made.
/// Returns how many agents plan to switch.
pub fn plan_updates<R: Rng + ?Sized>(
    population: &mut Population,
    kind: NeighborhoodType,
    rule: &ImitationRule,
    rng: &mut R,
) -> usize {
    let pending: Vec<Strategy> = population
        .agents()
        .iter()
        .map(|agent| {
            let neighbors = population.neighbors(agent.id(), kind);
            determine_next_strategy(agent, &neighbors, rule, rng)
        })
        .collect();

    let mut switching: usize = 0;
    for (agent, next) in population.agents_mut().iter_mut().zip(pending) {
        if agent.strategy() != next {
            switching = switching.saturating_add(1);
        }
        agent.set_next_strategy(next);
    }

    trace!(switching, "Pending strategies planned");
    switching
}

/// The agent wins ties; a neighbor replaces the current best only with a
/// strictly greater score.
fn incumbent_best(agent: &Agent, neighbors: &[&Agent]) -> Strategy {
    let mut best_strategy = agent.strategy();
    let mut best_score = agent.score();
    for neighbor in neighbors {
        if neighbor.score() > best_score {
            best_strategy = neighbor.strategy();
            best_score = neighbor.score();
        }
    }
    best_strategy
}

/// Uniform choice among every candidate at the maximum score.
fn random_best<R: Rng + ?Sized>(agent: &Agent, neighbors: &[&Agent], rng: &mut R) -> Strategy {
    let top = neighbors
        .iter()
        .copied()
        .map(Agent::score)
        .fold(agent.score(), f64::max);

    let leaders: Vec<Strategy> = std::iter::once(agent)
        .chain(neighbors.iter().copied())
        .filter(|candidate| candidate.score() >= top)
        .map(Agent::strategy)
        .collect();

    if leaders.len() > 1 {
        let pick = rng.random_range(0..leaders.len());
        leaders.get(pick).copied().unwrap_or_else(|| agent.strategy())
    } else {
        leaders.first().copied().unwrap_or_else(|| agent.strategy())
    }
}

/// A uniformly random strategy.
fn random_strategy<R: Rng + ?Sized>(rng: &mut R) -> Strategy {
    Strategy::ALL
        .choose(rng)
        .copied()
        .unwrap_or(Strategy::Defect)
}
