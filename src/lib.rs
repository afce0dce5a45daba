//! orgtree: build an organizational hierarchy from a roster
//!
//! Layers, innermost first:
//! - [`domain`]: records, relationship store, forest builder, view flattening
//! - [`application`]: [`application::HierarchyService`], the edit operations
//! - [`infrastructure`]: roster files
//! - [`cli`]: argument parsing, rendering and the edit session

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
