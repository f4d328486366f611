use crate::tree::types::{Block, Row};

impl Block {
	/// Child block `name`, created empty when it does not exist yet.
	pub fn child_entry(&mut self, name: &str) -> &mut Block {
		self.children
			.entry(name.to_string())
			.or_insert_with(|| Block::new(name))
	}

	/// Row `name` of this block, created empty when it does not exist yet.
	pub fn row_entry(&mut self, name: &str) -> &mut Row {
		self.rows
			.entry(name.to_string())
			.or_insert_with(|| Row::new(name))
	}

	/// Set `block.row.col` to `value`, creating the child block and row as needed.
	pub fn edit_entry(&mut self, block: &str, row: &str, col: &str, value: impl Into<String>) {
		self.child_entry(block).edit_self_entry(row, col, value);
	}

	/// Set `row.col` of this block to `value`, creating the row as needed.
	pub fn edit_self_entry(&mut self, row: &str, col: &str, value: impl Into<String>) {
		self.row_entry(row)
			.columns
			.insert(col.to_string(), value.into());
	}
}
