//! Error types for the scheduling engine.
//!
//! Per-session failures ([`SchedulingError::ExhaustedCandidates`],
//! [`SchedulingError::HardConstraintViolation`]) are non-fatal to a batch:
//! they are collected next to the successful assignments. The remaining
//! variants abort the request before anything is written.

use thiserror::Error;

use crate::commit::StoreError;
use crate::filter::FilterStage;
use crate::models::{ResourceKey, SessionRef};
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SchedulingError>;

/// Scheduling engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    /// A hard filter stage removed every option for a session.
    #[error("no candidates left for session {session} at stage '{stage}'")]
    ExhaustedCandidates {
        session: SessionRef,
        stage: FilterStage,
    },

    /// The final safety re-check found an overlap on an exclusive resource.
    #[error("hard constraint violated by session {session} ({} conflicting resource(s))", .conflicts.len())]
    HardConstraintViolation {
        session: SessionRef,
        conflicts: Vec<ResourceKey>,
    },

    /// Backtracking finished without a conflict-free completion.
    #[error("no conflict-free schedule found: explored_nodes={explored_nodes}, budget_exhausted={budget_exhausted}")]
    NoSolutionFound {
        explored_nodes: u64,
        budget_exhausted: bool,
    },

    /// Required catalog or request data is absent.
    #[error("input data missing: {0}")]
    InputDataMissing(String),

    /// Structural validation failed.
    #[error("invalid input: {} error(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),

    /// The solver configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The atomic batch write failed and was rolled back.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SchedulingError {
    /// Whether the error concerns a single session only.
    pub fn is_per_session(&self) -> bool {
        matches!(
            self,
            SchedulingError::ExhaustedCandidates { .. }
                | SchedulingError::HardConstraintViolation { .. }
        )
    }
}
