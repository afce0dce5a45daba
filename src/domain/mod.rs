//! Domain layer: entities and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod forest;
pub mod store;
pub mod view;

pub use builder::{TreeBuilder, DEFAULT_MAX_LEVEL};
pub use entities::{EmployeeRecord, Relationship, RosterIndex};
pub use error::{EditError, EditResult, RosterError};
pub use forest::{Forest, HierarchyNode};
pub use store::RelationshipStore;
pub use view::{flatten, visible_chart, ChartNode, FlatRow, ViewState};
