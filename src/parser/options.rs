/// Default limit on how deeply `%include` directives may nest.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 64;

/// Knobs for a single load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
	/// Report each opened file at `info` level instead of `debug`.
	pub verbose: bool,

	/// Fail the load on the first line that cannot be classified, instead of
	/// logging it and moving on.
	pub strict: bool,

	/// Maximum include nesting; exceeding it fails the load.
	pub max_include_depth: usize,
}

impl Default for LoadOptions {
	fn default() -> Self {
		LoadOptions {
			verbose: false,
			strict: false,
			max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
		}
	}
}

impl LoadOptions {
	pub fn verbose(mut self, verbose: bool) -> Self {
		self.verbose = verbose;
		self
	}

	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = strict;
		self
	}

	pub fn max_include_depth(mut self, depth: usize) -> Self {
		self.max_include_depth = depth;
		self
	}
}
