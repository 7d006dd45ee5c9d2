//! Error types for the `dilemma-world` crate.
//!
//! All fallible lattice operations return [`WorldError`]. Every variant
//! is a construction or lookup failure; a lattice that exists is always
//! internally consistent.

use dilemma_types::Position;

/// Errors that can occur while building or querying a lattice.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// Width or height is zero.
    #[error("lattice dimensions must be positive (width: {width}, height: {height})")]
    ZeroDimension {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// `width * height` does not fit in memory-addressable range.
    #[error("lattice of {width}x{height} cells is too large")]
    TooLarge {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Density is outside `[0, 1]` or not a number.
    #[error("density must be within [0, 1], got {0}")]
    InvalidDensity(f64),

    /// A coordinate lies outside the lattice.
    #[error("position {position} is outside the {width}x{height} lattice")]
    OutOfBounds {
        /// The offending position.
        position: Position,
        /// Lattice width.
        width: usize,
        /// Lattice height.
        height: usize,
    },

    /// Two agents were assigned to the same cell.
    #[error("cell {0} is already occupied")]
    CellOccupied(Position),

    /// More agents than the identifier range can address.
    #[error("too many agents for the identifier range")]
    TooManyAgents,
}
