//! Lattice geometry and occupancy for the spatial dilemma simulation.
//!
//! This crate models where agents are, not what they do: a fixed-size
//! toroidal grid, random placement at a given density, and neighbor
//! enumeration under periodic boundary conditions for both Moore and
//! Von Neumann neighborhoods.
//!
//! # Modules
//!
//! - [`error`] -- Error types for lattice construction and lookup.
//! - [`lattice`] -- The [`Lattice`] grid, placement, and `neighbors_of`.

pub mod error;
pub mod lattice;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use lattice::Lattice;
