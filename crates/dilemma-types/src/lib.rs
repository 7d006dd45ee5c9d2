//! Shared type definitions for the spatial dilemma simulation.
//!
//! This crate is the single source of truth for the value types passed
//! between the lattice, the agent rules, the engine, and any external
//! renderer or exporter. Types flow downstream to `TypeScript` via `ts-rs`
//! for the lattice viewer.
//!
//! # Modules
//!
//! - [`ids`] -- Agent identifiers and lattice coordinates
//! - [`enums`] -- Strategy, neighborhood, update scheme, tie-break policy
//! - [`structs`] -- Snapshots, metrics reports, payoff summaries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{NeighborhoodType, RunMode, Strategy, TieBreak, UpdateType};
pub use ids::{AgentId, Position};
pub use structs::{AgentSnapshot, LatticeSnapshot, MetricsReport, PayoffSummary};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::Position::export_all();

        let _ = crate::enums::Strategy::export_all();
        let _ = crate::enums::NeighborhoodType::export_all();
        let _ = crate::enums::UpdateType::export_all();
        let _ = crate::enums::TieBreak::export_all();
        let _ = crate::enums::RunMode::export_all();

        let _ = crate::structs::AgentSnapshot::export_all();
        let _ = crate::structs::LatticeSnapshot::export_all();
        let _ = crate::structs::MetricsReport::export_all();
        let _ = crate::structs::PayoffSummary::export_all();
    }
}
