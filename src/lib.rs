//! blockconf - hierarchical block/row/column configuration files.
//!
//! This library provides:
//! - Loading config files, with `%include` expansion and nested `%block`s
//! - Typed lookups that fall back to a caller-supplied default
//! - Structural introspection and in-place edits
//! - Writing a tree back to the same text format
//!
//! # Format
//!
//! ```text
//! # comments run to end of line
//! %include ~/shared/common.cfg
//!
//! %block server
//! {
//!     listen  :: host=0.0.0.0; port=8080;
//!     +=         workers=8;          # continues the "listen" row
//!
//!     %block tls
//!     {
//!         files :: cert=/etc/cert.pem; key=/etc/key.pem;
//!     }
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use blockconf::{LoadOptions, Registry};
//! use std::path::Path;
//!
//! let mut registry = Registry::new();
//! let config = registry
//!     .load("server", Path::new("~/server.cfg"), &LoadOptions::default())
//!     .unwrap();
//!
//! let port = config.get_int("server", "listen", "port", 80);
//! let cert = config.get_nested_str(&["server", "tls"], "files", "cert", "");
//! println!("port={port} cert={cert}");
//! ```

pub mod error;
pub mod parser;
pub mod paths;
pub mod registry;
pub mod tree;

pub use error::{BlockconfError, Result};
pub use parser::{LoadOptions, parse_config_file, parse_config_str};
pub use registry::Registry;
pub use tree::{Block, ColumnValue, ConfigTree, Row};
