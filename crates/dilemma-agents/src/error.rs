//! Error types for the dilemma-agents crate.
//!
//! Every variant describes bad input at construction time. Once a
//! [`Population`] or [`PayoffMatrix`] exists, scoring and imitation
//! cannot fail.
//!
//! [`Population`]: crate::Population
//! [`PayoffMatrix`]: crate::PayoffMatrix

/// Errors that can occur while building agent state or rules.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A probability parameter is outside `[0, 1]` or not a number.
    #[error("{field} must be within [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A payoff entry is infinite or not a number.
    #[error("payoff entry {entry} must be finite, got {value}")]
    NonFinitePayoff {
        /// Name of the offending entry (`cc`, `cd`, `dc`, `dd`).
        entry: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A strategy grid does not have one entry per lattice cell.
    #[error("strategy grid has {actual} cells, expected {expected}")]
    GridSizeMismatch {
        /// `width * height`.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },

    /// The lattice could not be built.
    #[error("lattice error: {source}")]
    World {
        /// The underlying lattice error.
        #[from]
        source: dilemma_world::WorldError,
    },
}

/// Reject probabilities outside `[0, 1]`, NaN included.
pub(crate) fn check_probability(field: &'static str, value: f64) -> Result<f64, AgentError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AgentError::InvalidProbability { field, value })
    }
}
