//! Enumeration types for the spatial dilemma simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// The single decision variable of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Strategy {
    /// Play the cooperative move against every neighbor.
    Cooperate,
    /// Play the defecting move against every neighbor.
    Defect,
}

impl Strategy {
    /// Every strategy, cooperative first.
    pub const ALL: [Self; 2] = [Self::Cooperate, Self::Defect];

    /// Whether this is [`Strategy::Cooperate`].
    pub const fn is_cooperative(self) -> bool {
        matches!(self, Self::Cooperate)
    }
}

impl core::fmt::Display for Strategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Cooperate => f.write_str("C"),
            Self::Defect => f.write_str("D"),
        }
    }
}

// ---------------------------------------------------------------------------
// Neighborhood
// ---------------------------------------------------------------------------

/// Which surrounding cells count as neighbors.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NeighborhoodType {
    /// The 8 surrounding cells, diagonals included.
    #[default]
    Moore,
    /// The 4 orthogonally adjacent cells.
    VonNeumann,
}

// ---------------------------------------------------------------------------
// Update scheme
// ---------------------------------------------------------------------------

/// How pending strategies are committed at the end of a tick.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum UpdateType {
    /// Every agent commits at once.
    #[default]
    Synchronous,
    /// Only a random subset of agents commits each tick.
    Asynchronous,
}

// ---------------------------------------------------------------------------
// Tie-break policy
// ---------------------------------------------------------------------------

/// How imitation resolves several candidates sharing the best score.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TieBreak {
    /// The agent itself wins ties; a neighbor only replaces the current
    /// best when its score is strictly greater, in scan order.
    #[default]
    Incumbent,
    /// A uniformly random candidate among all those at the maximum score,
    /// the agent itself included.
    Random,
}

// ---------------------------------------------------------------------------
// Run mode
// ---------------------------------------------------------------------------

/// What the batch binary does with a configuration.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RunMode {
    /// One simulation with the configured payoff table.
    #[default]
    Batch,
    /// The built-in game presets run one after another on the same
    /// lattice and seed.
    Compare,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_each_strategy_once() {
        assert_eq!(Strategy::ALL.len(), 2);
        assert!(Strategy::ALL.first().is_some_and(|s| s.is_cooperative()));
        assert!(Strategy::ALL.get(1).is_some_and(|s| !s.is_cooperative()));
    }

    #[test]
    fn neighborhood_serializes_snake_case() {
        let json = serde_json::to_string(&NeighborhoodType::VonNeumann).ok();
        assert_eq!(json.as_deref(), Some("\"von_neumann\""));
        let back: Result<NeighborhoodType, _> = serde_json::from_str("\"moore\"");
        assert_eq!(back.ok(), Some(NeighborhoodType::Moore));
    }

    #[test]
    fn defaults_match_classic_setup() {
        assert_eq!(NeighborhoodType::default(), NeighborhoodType::Moore);
        assert_eq!(UpdateType::default(), UpdateType::Synchronous);
        assert_eq!(TieBreak::default(), TieBreak::Incumbent);
        assert_eq!(RunMode::default(), RunMode::Batch);
    }
}
