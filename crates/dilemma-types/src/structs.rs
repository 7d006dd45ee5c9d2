//! Read-only views of simulation state handed to renderers and exporters.
//!
//! None of these types are used by the update rule itself. They are
//! produced by the engine after a tick commits and carry everything a
//! visualization or export layer needs without reaching into engine
//! internals.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Strategy;
use crate::ids::{AgentId, Position};

// ---------------------------------------------------------------------------
// Agent snapshot
// ---------------------------------------------------------------------------

/// Committed state of one occupied cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Agent identifier.
    pub id: AgentId,
    /// Cell the agent occupies.
    pub position: Position,
    /// Strategy after the last commit.
    pub strategy: Strategy,
    /// Score earned during the last scoring phase.
    pub score: f64,
    /// Sum of all per-tick scores since the population was created.
    pub total_score: f64,
    /// Games played while cooperating.
    pub cooperative_games: u64,
    /// Games played while defecting.
    pub defecting_games: u64,
}

// ---------------------------------------------------------------------------
// Lattice snapshot
// ---------------------------------------------------------------------------

/// Committed state of the whole lattice at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LatticeSnapshot {
    /// Number of ticks completed when the snapshot was taken.
    pub tick: u64,
    /// Lattice width in cells.
    pub width: usize,
    /// Lattice height in cells.
    pub height: usize,
    /// One entry per occupied cell, ordered by agent id.
    pub agents: Vec<AgentSnapshot>,
}

impl LatticeSnapshot {
    /// Return the snapshot entry for the agent at `position`, if any.
    pub fn agent_at(&self, position: Position) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.position == position)
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Aggregate statistics over the committed population.
///
/// Degenerate populations (no agents, no cooperators) report `0.0` for
/// every ratio rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MetricsReport {
    /// Number of ticks completed.
    pub tick: u64,
    /// Number of agents on the lattice.
    pub total_agents: usize,
    /// Agents currently cooperating.
    pub cooperators: usize,
    /// Agents currently defecting.
    pub defectors: usize,
    /// `cooperators / total_agents`.
    pub cooperation_rate: f64,
    /// Mean of the current-step scores.
    pub average_score: f64,
    /// Population variance (divisor `N`) of the current-step scores.
    pub score_variance: f64,
    /// Mean number of occupied neighbor cells per agent.
    pub average_neighbors: f64,
    /// Mean fraction of cooperating neighbors over cooperators that have
    /// at least one neighbor.
    pub cooperator_clustering: f64,
}

// ---------------------------------------------------------------------------
// Payoff summary
// ---------------------------------------------------------------------------

/// The four entries of a payoff table under their classical names.
///
/// Each value is the payoff to the row player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PayoffSummary {
    /// Cooperate against Cooperate.
    pub reward: f64,
    /// Cooperate against Defect.
    pub sucker: f64,
    /// Defect against Cooperate.
    pub temptation: f64,
    /// Defect against Defect.
    pub punishment: f64,
}
