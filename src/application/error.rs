//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::{EditError, RosterError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Edit(#[from] EditError),

    #[error("{0}")]
    Roster(#[from] RosterError),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
