//! Identifier and coordinate types.
//!
//! Agents are stored in an arena, so an [`AgentId`] is a dense index
//! rather than a random token: ids are handed out `0, 1, 2, ...` at
//! population creation and stay stable for the lifetime of the run.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for an agent on the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentId(pub u32);

impl AgentId {
    /// Build an identifier from an arena index.
    ///
    /// Returns `None` if the index does not fit in the identifier range.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    /// Return the arena index this identifier refers to.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<AgentId> for u32 {
    fn from(id: AgentId) -> Self {
        id.0
    }
}

/// A cell coordinate on the lattice.
///
/// `x` is the column (`0..width`) and `y` the row (`0..height`). Values
/// are only meaningful relative to a particular lattice; the lattice
/// rejects positions outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Position {
    /// Create a position from a column and row.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_index_roundtrip() {
        let id = AgentId::from_index(17);
        assert_eq!(id, Some(AgentId(17)));
        assert_eq!(id.map(AgentId::index), Some(17));
    }

    #[test]
    fn agent_id_rejects_oversized_index() {
        let too_big = usize::try_from(u64::from(u32::MAX) + 1).ok();
        if let Some(index) = too_big {
            assert!(AgentId::from_index(index).is_none());
        }
    }

    #[test]
    fn agent_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&AgentId(5)).ok();
        assert_eq!(json.as_deref(), Some("5"));
    }

    #[test]
    fn display_formats() {
        assert_eq!(AgentId(3).to_string(), "agent-3");
        assert_eq!(Position::new(1, 2).to_string(), "(1, 2)");
    }
}
