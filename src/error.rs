use std::path::PathBuf;

/// Library-level structured errors for blockconf.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
///
/// Lookups never produce these: a missing or malformed value falls back to the
/// caller's default. Only loading, writing and registration can fail.
#[derive(Debug, thiserror::Error)]
pub enum BlockconfError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Included file not found: {path} (included from {included_from})")]
	IncludeNotFound {
		path: PathBuf,
		included_from: PathBuf,
	},

	#[error("Include nesting deeper than {max_depth} levels at {path}")]
	IncludeDepthExceeded { path: PathBuf, max_depth: usize },

	#[error("{path}:{line}: {reason}: {text}")]
	Syntax {
		path: PathBuf,
		line: usize,
		text: String,
		reason: String,
	},

	#[error("Failed to write config file: {path}")]
	WriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Config already registered under name: {name}")]
	AlreadyRegistered { name: String },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using BlockconfError.
pub type Result<T> = std::result::Result<T, BlockconfError>;
