//! Agent state and the rules of the game.
//!
//! This crate owns everything an agent is and does: its record, the
//! population arena that ties agents to lattice cells, the payoff table,
//! the scoring phase, and the imitation phase. It knows nothing about
//! ticks, configuration files, or reporting; `dilemma-core` sequences the
//! phases defined here.
//!
//! # Modules
//!
//! - [`agent`] -- [`Agent`] records and the [`Population`] arena
//! - [`error`] -- Error types for invalid parameters and grids
//! - [`payoff`] -- The 2x2 [`PayoffMatrix`]
//! - [`interaction`] -- Scoring against every neighbor
//! - [`imitation`] -- Best-neighbor imitation with mutation

pub mod agent;
pub mod error;
pub mod imitation;
pub mod interaction;
pub mod payoff;

pub use agent::{Agent, CommitOutcome, Population};
pub use error::AgentError;
pub use imitation::{ImitationRule, determine_next_strategy, plan_updates};
pub use interaction::{ScoringSummary, compute_scores};
pub use payoff::PayoffMatrix;
