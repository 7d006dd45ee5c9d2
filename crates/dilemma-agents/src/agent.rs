//! Agent records and the population arena.
//!
//! A [`Population`] owns the [`Lattice`] together with an arena of
//! [`Agent`] values indexed by [`AgentId`]. The lattice stores ids only,
//! so there are no agent <-> lattice reference cycles, and the two halves
//! are always built together: the arena has exactly one agent per
//! occupied cell, in id order.
//!
//! Agents are created once and never move. Only their strategy, pending
//! strategy, score and lifetime counters change, and only through the
//! phase functions of this crate ([`interaction`], [`imitation`]) and the
//! commit methods on [`Population`].
//!
//! [`interaction`]: crate::interaction
//! [`imitation`]: crate::imitation

use dilemma_types::{AgentId, AgentSnapshot, NeighborhoodType, Position, Strategy};
use dilemma_world::Lattice;
use rand::Rng;
use tracing::debug;

use crate::error::{AgentError, check_probability};

/// One player on the lattice.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Agent {
    /// Stable identifier (arena index).
    id: AgentId,
    /// Cell the agent occupies for its whole lifetime.
    position: Position,
    /// Strategy played during the current tick.
    strategy: Strategy,
    /// Strategy chosen by imitation, applied at commit.
    next_strategy: Strategy,
    /// Payoff accumulated during the current tick.
    score: f64,
    /// Sum of every per-tick score so far.
    total_score: f64,
    /// Games played while cooperating.
    cooperative_games: u64,
    /// Games played while defecting.
    defecting_games: u64,
}

impl Agent {
    /// Create an agent with zero score and empty statistics.
    pub const fn new(id: AgentId, position: Position, strategy: Strategy) -> Self {
        Self {
            id,
            position,
            strategy,
            next_strategy: strategy,
            score: 0.0,
            total_score: 0.0,
            cooperative_games: 0,
            defecting_games: 0,
        }
    }

    /// Agent identifier.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Occupied cell.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Committed strategy.
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Pending strategy for the next commit.
    pub const fn next_strategy(&self) -> Strategy {
        self.next_strategy
    }

    /// Score accumulated in the current tick.
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Cumulative score over the agent's lifetime.
    pub const fn total_score(&self) -> f64 {
        self.total_score
    }

    /// Games played while cooperating.
    pub const fn cooperative_games(&self) -> u64 {
        self.cooperative_games
    }

    /// Games played while defecting.
    pub const fn defecting_games(&self) -> u64 {
        self.defecting_games
    }

    /// Fraction of this agent's games that were played cooperatively.
    ///
    /// Returns `0.0` for an agent that has not played yet.
    #[allow(clippy::cast_precision_loss)]
    pub fn cooperation_ratio(&self) -> f64 {
        let total = self.cooperative_games.saturating_add(self.defecting_games);
        if total == 0 {
            return 0.0;
        }
        self.cooperative_games as f64 / total as f64
    }

    /// Read-only export view.
    pub const fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            strategy: self.strategy,
            score: self.score,
            total_score: self.total_score,
            cooperative_games: self.cooperative_games,
            defecting_games: self.defecting_games,
        }
    }

    /// Start-of-tick reset: zero score, pending strategy = current.
    pub(crate) const fn begin_tick(&mut self) {
        self.score = 0.0;
        self.next_strategy = self.strategy;
    }

    /// Record the outcome of a scoring phase.
    pub(crate) fn record_games(&mut self, score: f64, games: u64) {
        self.score = score;
        self.total_score += score;
        if self.strategy.is_cooperative() {
            self.cooperative_games = self.cooperative_games.saturating_add(games);
        } else {
            self.defecting_games = self.defecting_games.saturating_add(games);
        }
    }

    /// Store the imitation result.
    pub(crate) const fn set_next_strategy(&mut self, next: Strategy) {
        self.next_strategy = next;
    }

    /// Apply the pending strategy. Returns whether the strategy changed.
    const fn commit(&mut self) -> bool {
        let changed = !matches!(
            (self.strategy, self.next_strategy),
            (Strategy::Cooperate, Strategy::Cooperate) | (Strategy::Defect, Strategy::Defect)
        );
        self.strategy = self.next_strategy;
        changed
    }
}

/// Outcome of a commit phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Agents whose pending strategy was applied.
    pub committed: usize,
    /// Committed agents whose strategy actually changed.
    pub switched: usize,
}

/// The lattice plus the agent arena that populates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    /// Cell -> agent id association.
    lattice: Lattice,
    /// Agents indexed by `AgentId::index()`.
    agents: Vec<Agent>,
}

impl Population {
    /// Scatter agents over a fresh lattice.
    ///
    /// Places `round(width * height * density)` agents on distinct random
    /// cells, then draws each agent's strategy in id order: cooperate
    /// with probability `initial_cooperation_rate`, defect otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidProbability`] for a rate outside
    /// `[0, 1]` and [`AgentError::World`] for invalid dimensions or
    /// density. Nothing is drawn from `rng` when validation fails.
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        density: f64,
        initial_cooperation_rate: f64,
        rng: &mut R,
    ) -> Result<Self, AgentError> {
        let rate = check_probability("initial_cooperation_rate", initial_cooperation_rate)?;
        let lattice = Lattice::scatter(width, height, density, rng)?;

        let agents: Vec<Agent> = lattice
            .occupants()
            .map(|(id, position)| {
                let strategy = if rng.random_bool(rate) {
                    Strategy::Cooperate
                } else {
                    Strategy::Defect
                };
                Agent::new(id, position, strategy)
            })
            .collect();

        debug!(
            agents = agents.len(),
            cooperators = agents.iter().filter(|a| a.strategy.is_cooperative()).count(),
            "Population generated"
        );
        Ok(Self { lattice, agents })
    }

    /// Build a population from a row-major grid of optional strategies.
    ///
    /// `cells[y * width + x]` is the strategy of the agent at `(x, y)`, or
    /// `None` for an empty cell. Agent ids follow row-major order. Meant
    /// for hand-crafted scenarios.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::GridSizeMismatch`] if `cells.len()` is not
    /// `width * height`, and [`AgentError::World`] for invalid dimensions.
    pub fn from_strategies(
        width: usize,
        height: usize,
        cells: &[Option<Strategy>],
    ) -> Result<Self, AgentError> {
        let expected = width.saturating_mul(height);
        if cells.len() != expected {
            return Err(AgentError::GridSizeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        let placed: Vec<(Position, Strategy)> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .zip(cells.iter())
            .filter_map(|(pos, cell)| cell.map(|s| (pos, s)))
            .collect();

        let lattice = Lattice::from_occupants(width, height, placed.iter().map(|(p, _)| *p))?;
        let agents = lattice
            .occupants()
            .zip(placed.iter())
            .map(|((id, position), (_, strategy))| Agent::new(id, position, *strategy))
            .collect();

        Ok(Self { lattice, agents })
    }

    /// The underlying lattice.
    pub const fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// All agents in id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents.
    pub const fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the lattice is empty.
    pub const fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up an agent by id.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    /// Look up the agent occupying `position`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::World`] if `position` is outside the lattice.
    pub fn agent_at(&self, position: Position) -> Result<Option<&Agent>, AgentError> {
        Ok(self
            .lattice
            .agent_at(position)?
            .and_then(|id| self.agent(id)))
    }

    /// Neighbors of `id` under `kind`, in lattice scan order.
    pub fn neighbors(&self, id: AgentId, kind: NeighborhoodType) -> Vec<&Agent> {
        self.lattice
            .neighbor_agents(id, kind)
            .into_iter()
            .filter_map(|n| self.agent(n))
            .collect()
    }

    /// Start-of-tick reset for every agent.
    pub fn begin_tick(&mut self) {
        for agent in &mut self.agents {
            agent.begin_tick();
        }
    }

    /// Synchronous commit: apply every pending strategy.
    pub fn commit_all(&mut self) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        for agent in &mut self.agents {
            outcome.committed = outcome.committed.saturating_add(1);
            if agent.commit() {
                outcome.switched = outcome.switched.saturating_add(1);
            }
        }
        outcome
    }

    /// Asynchronous commit: apply pending strategies of `ids` only.
    ///
    /// Every other agent keeps its strategy and its pending strategy is
    /// discarded (reset to the current one). Unknown ids are ignored.
    pub fn commit_agents(&mut self, ids: &[AgentId]) -> CommitOutcome {
        let mut outcome = CommitOutcome::default();
        for id in ids {
            if let Some(agent) = self.agents.get_mut(id.index()) {
                outcome.committed = outcome.committed.saturating_add(1);
                if agent.commit() {
                    outcome.switched = outcome.switched.saturating_add(1);
                }
            }
        }
        for agent in &mut self.agents {
            agent.next_strategy = agent.strategy;
        }
        outcome
    }

    /// Mutable access for the phase functions.
    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    const C: Option<Strategy> = Some(Strategy::Cooperate);
    const D: Option<Strategy> = Some(Strategy::Defect);

    #[test]
    fn generate_draws_strategies_at_requested_rate() {
        let mut rng = StdRng::seed_from_u64(3);
        let pop = Population::generate(40, 40, 1.0, 0.0, &mut rng).ok();
        let pop = pop.unwrap_or_else(|| panic!("population"));
        assert_eq!(pop.len(), 1600);
        assert!(pop.agents().iter().all(|a| a.strategy() == Strategy::Defect));

        let all_c = Population::generate(5, 5, 1.0, 1.0, &mut rng).ok();
        assert!(
            all_c
                .iter()
                .flat_map(Population::agents)
                .all(|a| a.strategy() == Strategy::Cooperate)
        );
    }

    #[test]
    fn generate_rejects_bad_rate_before_placing() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = Population::generate(4, 4, 1.0, 1.2, &mut rng);
        assert!(matches!(
            result,
            Err(AgentError::InvalidProbability {
                field: "initial_cooperation_rate",
                ..
            })
        ));
    }

    #[test]
    fn agents_match_lattice_occupancy() {
        let mut rng = StdRng::seed_from_u64(11);
        let pop = Population::generate(6, 5, 0.6, 0.5, &mut rng).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(pop.len(), pop.lattice().agent_count());
        for agent in pop.agents() {
            assert_eq!(pop.lattice().position_of(agent.id()), Some(agent.position()));
            assert_eq!(
                pop.lattice().agent_at(agent.position()).ok().flatten(),
                Some(agent.id())
            );
        }
    }

    #[test]
    fn from_strategies_assigns_row_major_ids() {
        let pop = Population::from_strategies(2, 2, &[C, None, None, D])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(pop.len(), 2);
        let first = pop.agent(AgentId(0)).map(|a| (a.position(), a.strategy()));
        let second = pop.agent(AgentId(1)).map(|a| (a.position(), a.strategy()));
        assert_eq!(first, Some((Position::new(0, 0), Strategy::Cooperate)));
        assert_eq!(second, Some((Position::new(1, 1), Strategy::Defect)));
    }

    #[test]
    fn from_strategies_rejects_wrong_length() {
        let result = Population::from_strategies(3, 3, &[C, D]);
        assert!(matches!(
            result,
            Err(AgentError::GridSizeMismatch { expected: 9, actual: 2 })
        ));
    }

    #[test]
    fn commit_agents_discards_uncommitted_pending() {
        let mut pop = Population::from_strategies(2, 1, &[C, C]).unwrap_or_else(|e| panic!("{e}"));
        for agent in pop.agents_mut() {
            agent.set_next_strategy(Strategy::Defect);
        }
        let outcome = pop.commit_agents(&[AgentId(1)]);
        assert_eq!(outcome, CommitOutcome { committed: 1, switched: 1 });

        let a0 = pop.agent(AgentId(0)).map(|a| (a.strategy(), a.next_strategy()));
        let a1 = pop.agent(AgentId(1)).map(Agent::strategy);
        assert_eq!(a0, Some((Strategy::Cooperate, Strategy::Cooperate)));
        assert_eq!(a1, Some(Strategy::Defect));
    }

    #[test]
    fn commit_all_counts_switches() {
        let mut pop = Population::from_strategies(3, 1, &[C, D, C]).unwrap_or_else(|e| panic!("{e}"));
        for agent in pop.agents_mut() {
            agent.set_next_strategy(Strategy::Defect);
        }
        let outcome = pop.commit_all();
        assert_eq!(outcome, CommitOutcome { committed: 3, switched: 2 });
    }

    #[test]
    fn cooperation_ratio_tracks_games() {
        let mut agent = Agent::new(AgentId(0), Position::new(0, 0), Strategy::Cooperate);
        assert!(agent.cooperation_ratio().abs() < f64::EPSILON);
        agent.record_games(6.0, 3);
        agent.strategy = Strategy::Defect;
        agent.record_games(1.0, 1);
        assert!((agent.cooperation_ratio() - 0.75).abs() < f64::EPSILON);
        assert!((agent.total_score() - 7.0).abs() < f64::EPSILON);
        assert_eq!(agent.snapshot().defecting_games, 1);
    }
}
