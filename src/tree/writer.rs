use crate::error::{BlockconfError, Result};
use crate::parser::line::{Line, classify, clean_line};
use crate::paths::expand_user;
use crate::tree::types::{Block, Row};
use std::fmt::Write as _;
use std::path::Path;

impl Block {
	/// Render every child block (recursively) in config file syntax.
	///
	/// The rows held directly by this block are not part of the output; only
	/// blocks are written. Comments and the original line order are not
	/// preserved.
	pub fn render(&self) -> String {
		let mut out = String::new();
		for child in self.children.values() {
			render_block(&mut out, child, 0);
		}
		out
	}

	/// Write [`Block::render`] output to `path`, replacing any existing file.
	pub fn write(&self, path: &Path) -> Result<()> {
		let path = expand_user(path)?;
		tracing::debug!(path = %path.display(), "writing config");

		std::fs::write(&path, self.render()).map_err(|source| BlockconfError::WriteError {
			path: path.clone(),
			source,
		})
	}
}

fn render_block(out: &mut String, block: &Block, depth: usize) {
	let indent = "\t".repeat(depth);
	let header = format!("%block {}", block.name);
	if !reads_back_as_block(&header, &block.name) {
		tracing::warn!(block = %block.name, "block name will not read back as the same block");
	}

	out.push('\n');
	let _ = writeln!(out, "{indent}{header}");
	let _ = writeln!(out, "{indent}{{");
	for row in block.rows.values() {
		render_row(out, row, &block.name, depth + 1);
	}
	for child in block.children.values() {
		render_block(out, child, depth + 1);
	}
	let _ = writeln!(out, "{indent}}}");
}

fn render_row(out: &mut String, row: &Row, block_name: &str, depth: usize) {
	let mut line = format!("{}\t::", row.name);
	for (col, value) in &row.columns {
		warn_if_lossy("column", col, block_name);
		if col.contains('=') {
			tracing::warn!(
				block = block_name,
				column = %col,
				"column name contains '=' and will not read back"
			);
		}
		warn_if_lossy("value", value, block_name);
		let _ = write!(line, " {col}={value};");
	}

	if !reads_back_as_row(&line, &row.name) {
		tracing::warn!(
			block = block_name,
			row = %row.name,
			"row name will not read back as the same row"
		);
	}

	out.push_str(&"\t".repeat(depth));
	out.push_str(&line);
	out.push('\n');
}

/// Whether the loader would read `header` as the start of block `name`.
fn reads_back_as_block(header: &str, name: &str) -> bool {
	!header.contains(['\n', '\r'])
		&& matches!(classify(clean_line(header)), Line::BlockStart(parsed) if parsed == name)
}

/// Whether the loader would read `line` as a fresh definition of row `name`.
fn reads_back_as_row(line: &str, name: &str) -> bool {
	!line.contains(['\n', '\r'])
		&& matches!(
			classify(clean_line(line)),
			Line::Row { name: parsed, merge: false, .. } if parsed == name
		)
}

/// Flag column text that the line format cannot carry unchanged.
fn warn_if_lossy(kind: &str, text: &str, block_name: &str) {
	let unsafe_char = text.contains(['#', ';', '\n', '\r']);
	let untrimmed = text.trim() != text;
	if unsafe_char || untrimmed {
		tracing::warn!(
			kind,
			text,
			block = block_name,
			"text will not survive write-back unchanged"
		);
	}
}
