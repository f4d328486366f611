use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

/// A named set of column/value pairs inside a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
	/// Row name, trimmed.
	#[serde(skip)]
	pub name: String,

	/// Column name to value text, both trimmed.
	pub columns: BTreeMap<String, String>,
}

/// A named container of rows and nested child blocks.
///
/// Each block owns its rows and children outright; traversal is always
/// top-down so no parent link is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Block {
	/// Block name, trimmed.
	#[serde(skip)]
	pub name: String,

	/// The file this block was defined in, if it came from a file.
	#[serde(skip)]
	pub source_file: Option<PathBuf>,

	/// Rows of this block (not of its children).
	#[serde(skip_serializing_if = "BTreeMap::is_empty")]
	pub rows: BTreeMap<String, Row>,

	/// Child blocks.
	#[serde(rename = "blocks", skip_serializing_if = "BTreeMap::is_empty")]
	pub children: BTreeMap<String, Block>,
}

/// A complete configuration: the root block plus the name it is known by.
///
/// Dereferences to the root [`Block`], so all lookups, introspection and edits
/// are called directly on the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigTree {
	/// Registration name; also the name of the root block.
	pub name: String,

	/// The root block.
	pub root: Block,
}

impl Row {
	pub fn new(name: impl Into<String>) -> Self {
		Row {
			name: name.into(),
			columns: BTreeMap::new(),
		}
	}

	/// Value text of a column.
	pub fn column(&self, name: &str) -> Option<&str> {
		self.columns.get(name).map(String::as_str)
	}
}

impl Block {
	pub fn new(name: impl Into<String>) -> Self {
		Block {
			name: name.into(),
			..Default::default()
		}
	}

	/// Create a block that remembers which file defined it.
	pub fn with_source(name: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
		Block {
			name: name.into(),
			source_file: Some(source_file.into()),
			..Default::default()
		}
	}

	/// A direct child block.
	pub fn child(&self, name: &str) -> Option<&Block> {
		self.children.get(name)
	}

	/// A row of this block.
	pub fn row(&self, name: &str) -> Option<&Row> {
		self.rows.get(name)
	}

	/// True when the block holds neither rows nor children.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty() && self.children.is_empty()
	}
}

impl ConfigTree {
	/// Create an empty tree, ready to be filled with edits.
	pub fn new(name: impl Into<String>) -> Self {
		let name = name.into();
		ConfigTree {
			root: Block::new(name.clone()),
			name,
		}
	}
}

impl Deref for ConfigTree {
	type Target = Block;

	fn deref(&self) -> &Block {
		&self.root
	}
}

impl DerefMut for ConfigTree {
	fn deref_mut(&mut self) -> &mut Block {
		&mut self.root
	}
}
