//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Rejected hierarchy edits.
///
/// Every variant is a recoverable user-input error: the relationship store is
/// left exactly as it was before the failed edit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("unknown employee: {0}")]
    InvalidReference(String),

    #[error("employee cannot report to themselves: {0}")]
    SelfReport(String),

    #[error("placing {subordinate} under {manager} would form a cycle")]
    CycleWouldForm { subordinate: String, manager: String },

    #[error("{id} would sit at level {level}, maximum is {max}")]
    DepthExceeded { id: String, level: usize, max: usize },

    #[error("cycle detected in hierarchy: {0}")]
    CycleDetected(String),
}

/// Rejected roster input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("duplicate employee id in roster: {0}")]
    DuplicateEmployee(String),
}

/// Result type for hierarchy edits.
pub type EditResult<T> = Result<T, EditError>;
