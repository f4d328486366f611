//! Config file loading for blockconf.
//!
//! This module handles:
//! - Line cleaning and classification
//! - Recursive block parsing and `%include` expansion
//! - Lenient and strict handling of unusable lines

pub mod line;
pub mod loader;
pub mod options;

pub use loader::{parse_config_file, parse_config_str};
pub use options::{DEFAULT_MAX_INCLUDE_DEPTH, LoadOptions};
