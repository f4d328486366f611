use crate::error::{BlockconfError, Result};
use crate::parser::{LoadOptions, parse_config_file};
use crate::tree::ConfigTree;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

/// Named configurations loaded by an application.
///
/// Loading is idempotent by name: once a name is registered, later loads under
/// that name return the registered tree and never touch the filesystem again,
/// even if the file changed or a different path is given.
#[derive(Debug, Default)]
pub struct Registry {
	configs: HashMap<String, ConfigTree>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the tree registered as `name`, loading it from `path` on first use.
	///
	/// A failed load registers nothing.
	pub fn load(
		&mut self,
		name: &str,
		path: &Path,
		options: &LoadOptions,
	) -> Result<&mut ConfigTree> {
		match self.configs.entry(name.to_string()) {
			Entry::Occupied(entry) => {
				tracing::debug!(name, "config already registered");
				Ok(entry.into_mut())
			}
			Entry::Vacant(entry) => {
				let tree = parse_config_file(name, path, options)?;
				tracing::debug!(
					name,
					path = %path.display(),
					blocks = tree.children.len(),
					"config registered"
				);
				Ok(entry.insert(tree))
			}
		}
	}

	/// Register an empty tree under `name`, for building a config in memory.
	pub fn new_empty(&mut self, name: &str) -> Result<&mut ConfigTree> {
		match self.configs.entry(name.to_string()) {
			Entry::Occupied(_) => Err(BlockconfError::AlreadyRegistered {
				name: name.to_string(),
			}),
			Entry::Vacant(entry) => Ok(entry.insert(ConfigTree::new(name))),
		}
	}

	pub fn get(&self, name: &str) -> Option<&ConfigTree> {
		self.configs.get(name)
	}

	pub fn get_mut(&mut self, name: &str) -> Option<&mut ConfigTree> {
		self.configs.get_mut(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.configs.contains_key(name)
	}

	/// Registered names, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.configs.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn len(&self) -> usize {
		self.configs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.configs.is_empty()
	}
}
