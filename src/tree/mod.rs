//! In-memory configuration tree.
//!
//! This module handles:
//! - The block/row/column data model
//! - Typed lookups with defaults (plain, self and nested forms)
//! - Structural introspection and in-place edits
//! - Rendering a tree back to config file syntax

pub mod edit;
pub mod query;
pub mod types;
pub mod writer;

pub use query::ColumnValue;
pub use types::{Block, ConfigTree, Row};
