use crate::tree::types::Block;
use std::collections::BTreeSet;

/// A type that a column's text can be read as.
///
/// Parsing is all-or-nothing: text that is not entirely a valid `Self` (after
/// trimming) yields `None`, and lookups fall back to the caller's default.
pub trait ColumnValue: Sized {
	fn parse_column(text: &str) -> Option<Self>;
}

impl ColumnValue for String {
	fn parse_column(text: &str) -> Option<Self> {
		Some(text.to_string())
	}
}

macro_rules! column_value_from_str {
	($($ty:ty),+) => {
		$(
			impl ColumnValue for $ty {
				fn parse_column(text: &str) -> Option<Self> {
					text.trim().parse().ok()
				}
			}
		)+
	};
}

column_value_from_str!(i32, i64, u32, u64, usize, f64);

impl ColumnValue for bool {
	fn parse_column(text: &str) -> Option<Self> {
		match text.trim().to_ascii_lowercase().as_str() {
			"true" | "yes" | "on" | "1" => Some(true),
			"false" | "no" | "off" | "0" => Some(false),
			_ => None,
		}
	}
}

impl Block {
	/// Follow a path of child block names down from this block.
	pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&Block> {
		let mut current = self;
		for segment in path {
			let segment: &str = segment.as_ref();
			match current.children.get(segment) {
				Some(child) => current = child,
				None => {
					tracing::debug!(
						path = %join_path(path),
						missing = segment,
						"block path did not resolve"
					);
					return None;
				}
			}
		}
		Some(current)
	}

	/// Mutable form of [`Block::resolve`].
	pub fn resolve_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Block> {
		let mut current = self;
		for segment in path {
			let segment: &str = segment.as_ref();
			current = current.children.get_mut(segment)?;
		}
		Some(current)
	}

	/// Raw value text at `block.row.col`, where `block` is a direct child.
	pub fn value(&self, block: &str, row: &str, col: &str) -> Option<&str> {
		let Some(child) = self.children.get(block) else {
			tracing::debug!(block, "block not found");
			return None;
		};
		child.self_value(row, col)
	}

	/// Raw value text at `row.col` of this block.
	pub fn self_value(&self, row: &str, col: &str) -> Option<&str> {
		let Some(found) = self.rows.get(row) else {
			tracing::debug!(block = %self.name, row, "row not found");
			return None;
		};
		found.column(col)
	}

	/// Look up `block.row.col` below this block, falling back to `default` when
	/// anything is missing or the text does not parse as `T`.
	pub fn get<T: ColumnValue>(&self, block: &str, row: &str, col: &str, default: T) -> T {
		parse_or(self.value(block, row, col), default)
	}

	/// Look up `row.col` of this block itself.
	pub fn get_self<T: ColumnValue>(&self, row: &str, col: &str, default: T) -> T {
		parse_or(self.self_value(row, col), default)
	}

	/// Look up `row.col` in the block found by descending `path`.
	///
	/// An empty path reads this block's own rows; otherwise the last path
	/// element names the block holding the row.
	pub fn get_nested<T: ColumnValue, S: AsRef<str>>(
		&self,
		path: &[S],
		row: &str,
		col: &str,
		default: T,
	) -> T {
		match path.split_last() {
			None => self.get_self(row, col, default),
			Some((last, parents)) => match self.resolve(parents) {
				Some(parent) => parent.get(last.as_ref(), row, col, default),
				None => default,
			},
		}
	}

	pub fn get_str(&self, block: &str, row: &str, col: &str, default: &str) -> String {
		self.get(block, row, col, default.to_string())
	}

	pub fn get_self_str(&self, row: &str, col: &str, default: &str) -> String {
		self.get_self(row, col, default.to_string())
	}

	pub fn get_nested_str<S: AsRef<str>>(
		&self,
		path: &[S],
		row: &str,
		col: &str,
		default: &str,
	) -> String {
		self.get_nested(path, row, col, default.to_string())
	}

	pub fn get_int(&self, block: &str, row: &str, col: &str, default: i32) -> i32 {
		self.get(block, row, col, default)
	}

	pub fn get_self_int(&self, row: &str, col: &str, default: i32) -> i32 {
		self.get_self(row, col, default)
	}

	pub fn get_nested_int<S: AsRef<str>>(
		&self,
		path: &[S],
		row: &str,
		col: &str,
		default: i32,
	) -> i32 {
		self.get_nested(path, row, col, default)
	}

	pub fn get_int64(&self, block: &str, row: &str, col: &str, default: i64) -> i64 {
		self.get(block, row, col, default)
	}

	pub fn get_self_int64(&self, row: &str, col: &str, default: i64) -> i64 {
		self.get_self(row, col, default)
	}

	pub fn get_nested_int64<S: AsRef<str>>(
		&self,
		path: &[S],
		row: &str,
		col: &str,
		default: i64,
	) -> i64 {
		self.get_nested(path, row, col, default)
	}

	pub fn get_float64(&self, block: &str, row: &str, col: &str, default: f64) -> f64 {
		self.get(block, row, col, default)
	}

	pub fn get_self_float64(&self, row: &str, col: &str, default: f64) -> f64 {
		self.get_self(row, col, default)
	}

	pub fn get_nested_float64<S: AsRef<str>>(
		&self,
		path: &[S],
		row: &str,
		col: &str,
		default: f64,
	) -> f64 {
		self.get_nested(path, row, col, default)
	}

	/// Names of the direct child blocks.
	pub fn list_blocks(&self) -> Vec<String> {
		self.children.keys().cloned().collect()
	}

	/// Names of the rows in child `block`; empty if there is no such block.
	pub fn list_rows(&self, block: &str) -> Vec<String> {
		match self.children.get(block) {
			Some(child) => child.rows.keys().cloned().collect(),
			None => {
				tracing::debug!(block, "block not found");
				Vec::new()
			}
		}
	}

	/// Column names of `block.row`; empty if either is missing.
	pub fn list_columns(&self, block: &str, row: &str) -> Vec<String> {
		self.children
			.get(block)
			.and_then(|child| child.rows.get(row))
			.map(|found| found.columns.keys().cloned().collect())
			.unwrap_or_default()
	}

	pub fn row_exists(&self, block: &str, row: &str) -> bool {
		self.children
			.get(block)
			.is_some_and(|child| child.rows.contains_key(row))
	}

	/// Comma-split the string value at `block.row.col`.
	///
	/// Pieces are trimmed and empty pieces dropped, so a missing value with an
	/// empty default gives an empty list. Unlike a raw `split(',')`, `"a,,b"`
	/// yields `["a", "b"]`, not `["a", "", "b"]`.
	pub fn split_value(&self, block: &str, row: &str, col: &str, default: &str) -> Vec<String> {
		split_list(&self.get_str(block, row, col, default))
	}

	/// Expand a list of keys into the union of the lists they name.
	///
	/// The value at `block.row.source_col` is a comma list of keys; each key is a
	/// column of `block.target_row` holding another comma list. All members are
	/// collected into one set.
	pub fn expand_list(
		&self,
		block: &str,
		row: &str,
		source_col: &str,
		target_row: &str,
	) -> BTreeSet<String> {
		let mut members = BTreeSet::new();
		if block.is_empty() || row.is_empty() || source_col.is_empty() || target_row.is_empty() {
			return members;
		}

		for key in self.split_value(block, row, source_col, "") {
			members.extend(self.split_value(block, target_row, &key, ""));
		}
		members
	}
}

fn parse_or<T: ColumnValue>(text: Option<&str>, default: T) -> T {
	match text {
		Some(text) => match T::parse_column(text) {
			Some(value) => value,
			None => {
				tracing::debug!(text, "value does not parse, using default");
				default
			}
		},
		None => default,
	}
}

fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|piece| !piece.is_empty())
		.map(str::to_string)
		.collect()
}

fn join_path<S: AsRef<str>>(path: &[S]) -> String {
	path.iter()
		.map(|segment| segment.as_ref())
		.collect::<Vec<&str>>()
		.join(":")
}
