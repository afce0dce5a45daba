//! Infrastructure layer: roster I/O
//!
//! This layer implements the roster source boundary.

pub mod error;
pub mod roster;

pub use error::{InfraError, InfraResult};
pub use roster::{RosterFile, RosterSource};
