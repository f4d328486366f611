use crate::error::{BlockconfError, Result};
use crate::parser::line::{Line, classify, clean_line, parse_columns};
use crate::parser::options::LoadOptions;
use crate::paths::expand_user;
use crate::tree::{Block, ConfigTree, Row};
use std::iter::Enumerate;
use std::path::{Path, PathBuf};
use std::str::Lines;

/// Load and parse a config file (and, recursively, every file it includes).
///
/// The returned tree's root block is named `name`. A missing file, or a missing
/// included file, fails the whole load; no partial tree is returned.
pub fn parse_config_file(name: &str, path: &Path, options: &LoadOptions) -> Result<ConfigTree> {
	let path = expand_user(path)?;
	let loader = Loader { options };
	let content = loader.read_config(&path, None)?;

	let mut tree = ConfigTree::new(name);
	tree.root.source_file = Some(path.clone());

	let mut source = Source::new(Some(&path), &content);
	loader.load_scope(&mut tree.root, &mut source, 0, false)?;
	Ok(tree)
}

/// Parse config text held in memory (useful for testing).
///
/// `%include` directives inside the text still read from the filesystem.
pub fn parse_config_str(name: &str, content: &str, options: &LoadOptions) -> Result<ConfigTree> {
	let loader = Loader { options };
	let mut tree = ConfigTree::new(name);

	let mut source = Source::new(None, content);
	loader.load_scope(&mut tree.root, &mut source, 0, false)?;
	Ok(tree)
}

impl ConfigTree {
	/// See [`parse_config_file`].
	pub fn load(name: &str, path: &Path, options: &LoadOptions) -> Result<ConfigTree> {
		parse_config_file(name, path, options)
	}

	/// See [`parse_config_str`].
	pub fn parse_str(name: &str, content: &str, options: &LoadOptions) -> Result<ConfigTree> {
		parse_config_str(name, content, options)
	}
}

/// The lines of one file being consumed, shared by every block scope opened in
/// that file.
struct Source<'a> {
	path: Option<&'a Path>,
	lines: Enumerate<Lines<'a>>,
	line: usize,
}

impl<'a> Source<'a> {
	fn new(path: Option<&'a Path>, content: &'a str) -> Self {
		Source {
			path,
			lines: content.lines().enumerate(),
			line: 0,
		}
	}

	/// Next raw line; also records its 1-based number for diagnostics.
	fn next_line(&mut self) -> Option<&'a str> {
		let (index, raw) = self.lines.next()?;
		self.line = index + 1;
		Some(raw)
	}

	fn origin(&self) -> PathBuf {
		self.path
			.map(Path::to_path_buf)
			.unwrap_or_else(|| PathBuf::from("<string>"))
	}
}

struct Loader<'o> {
	options: &'o LoadOptions,
}

impl Loader<'_> {
	/// Consume lines into `block` until its closing brace (when `nested`) or the
	/// end of the source.
	fn load_scope(
		&self,
		block: &mut Block,
		source: &mut Source,
		depth: usize,
		nested: bool,
	) -> Result<()> {
		// Rows are tracked per scope: a continuation never reaches past a block
		// boundary or into an included file.
		let mut previous_row: Option<String> = None;

		while let Some(raw) = source.next_line() {
			let line = clean_line(raw);
			if line.is_empty() {
				continue;
			}

			match classify(line) {
				Line::Include(target) => {
					self.include(block, Path::new(target), source, depth)?;
				}
				Line::BlockEnd => {
					// At the top of a file a stray brace still ends the file: the
					// remaining lines are dropped and the includer carries on.
					if !nested {
						self.reject(source, line, "closing brace without an open block")?;
					}
					return Ok(());
				}
				Line::BlockStart(name) => {
					let mut child = Block::new(name);
					child.source_file = source.path.map(Path::to_path_buf);
					tracing::debug!(block = name, parent = %block.name, "entering block");

					self.load_scope(&mut child, source, depth, true)?;
					block.children.insert(name.to_string(), child);
				}
				Line::Continuation(columns) => match previous_row.as_deref() {
					Some(row) => merge_columns(block.row_entry(row), columns),
					None => {
						self.reject(source, line, "continuation without a preceding row")?;
					}
				},
				Line::OpenBrace => {}
				Line::Row { name, columns, merge } => {
					if merge {
						merge_columns(block.row_entry(name), columns);
					} else {
						let mut row = Row::new(name);
						merge_columns(&mut row, columns);
						block.rows.insert(name.to_string(), row);
					}
					previous_row = Some(name.to_string());
				}
				Line::Unclassified(reason) => {
					self.reject(source, line, reason)?;
				}
			}
		}

		if nested {
			self.reject(source, &block.name, "block not closed before end of file")?;
		}
		Ok(())
	}

	/// Process an included file's lines in the current block scope.
	fn include(
		&self,
		block: &mut Block,
		target: &Path,
		source: &Source,
		depth: usize,
	) -> Result<()> {
		let path = expand_user(target)?;
		if depth >= self.options.max_include_depth {
			return Err(BlockconfError::IncludeDepthExceeded {
				path,
				max_depth: self.options.max_include_depth,
			});
		}

		let content = self.read_config(&path, Some(&source.origin()))?;
		let mut included = Source::new(Some(&path), &content);
		self.load_scope(block, &mut included, depth + 1, false)
	}

	/// Report a line that cannot be used; fatal only in strict mode.
	fn reject(&self, source: &Source, text: &str, reason: &str) -> Result<()> {
		let path = source.origin();
		let line = source.line;

		if self.options.strict {
			return Err(BlockconfError::Syntax {
				path,
				line,
				text: text.to_string(),
				reason: reason.to_string(),
			});
		}

		tracing::warn!(path = %path.display(), line, text, reason, "skipping config line");
		Ok(())
	}

	/// Read a whole config file, telling a missing file apart from other I/O
	/// failures.
	fn read_config(&self, path: &Path, included_from: Option<&Path>) -> Result<String> {
		if self.options.verbose {
			tracing::info!(path = %path.display(), "opening config file");
		} else {
			tracing::debug!(path = %path.display(), "opening config file");
		}

		std::fs::read_to_string(path).map_err(|source| match (source.kind(), included_from) {
			(std::io::ErrorKind::NotFound, Some(parent)) => BlockconfError::IncludeNotFound {
				path: path.to_path_buf(),
				included_from: parent.to_path_buf(),
			},
			(std::io::ErrorKind::NotFound, None) => BlockconfError::ConfigNotFound {
				path: path.to_path_buf(),
			},
			_ => BlockconfError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			},
		})
	}
}

fn merge_columns(row: &mut Row, columns: &str) {
	for (key, value) in parse_columns(columns) {
		row.columns.insert(key.to_string(), value.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn parse(content: &str) -> ConfigTree {
		parse_config_str("test", content, &LoadOptions::default()).unwrap()
	}

	#[test]
	fn test_parse_empty_config() {
		let tree = parse("");
		assert!(tree.is_empty());
		assert_eq!(tree.name, "test");

		let tree = parse("# only a comment\n\n   \n");
		assert!(tree.is_empty());
	}

	#[test]
	fn test_parse_block_rows_and_columns() {
		let tree = parse(
			r#"
# a comment line
%block thirdblock
{
	some-row   :: numProcs=8; user = nobody ;   # trailing comment
	anotherrow :: end_time=235000;
}
"#,
		);

		assert_eq!(tree.list_blocks(), vec!["thirdblock"]);
		assert_eq!(tree.get_int("thirdblock", "some-row", "numProcs", -1), 8);
		assert_eq!(tree.get_int("thirdblock", "some-row", "missingCol", -1), -1);
		assert_eq!(tree.get_str("thirdblock", "some-row", "user", ""), "nobody");
		assert_eq!(tree.get_str("thirdblock", "anotherrow", "end_time", "BLANK"), "235000");
	}

	#[test]
	fn test_continuation_merges_into_one_row() {
		let tree = parse(
			r#"
%block b
{
	name :: a=1;
	+= b=2;
	+= a=3; c=4
}
"#,
		);

		assert_eq!(tree.list_rows("b"), vec!["name"]);
		assert_eq!(tree.list_columns("b", "name"), vec!["a", "b", "c"]);
		assert_eq!(tree.get_int("b", "name", "a", 0), 3);
		assert_eq!(tree.get_int("b", "name", "b", 0), 2);
	}

	#[test]
	fn test_redefinition_replaces_columns() {
		let tree = parse(
			r#"
%block b
{
	name :: a=1; b=2;
	name :: c=3;
}
"#,
		);

		assert_eq!(tree.list_columns("b", "name"), vec!["c"]);
	}

	#[test]
	fn test_named_continuation() {
		let tree = parse(
			r#"
%block b
{
	first  :: a=1;
	second :: x=1;
	first  += b=2;
	fresh  += z=9;
	+= y=8;
}
"#,
		);

		assert_eq!(tree.list_columns("b", "first"), vec!["a", "b"]);
		assert_eq!(tree.list_columns("b", "second"), vec!["x"]);
		// A named continuation of an unknown row creates it, and becomes the
		// target of the next bare continuation.
		assert_eq!(tree.list_columns("b", "fresh"), vec!["y", "z"]);
	}

	#[test]
	fn test_nested_blocks() {
		let tree = parse(
			r#"
%block oneblock
{
	outer :: x=1;
	%block lowerblock0
	{
		%block lowerblock
		{
			inner-row :: user=nobody; age=41; milli=2; ratio=0.25;
		}
	}
	+= y=2;
}
"#,
		);

		let path = ["oneblock", "lowerblock0", "lowerblock"];
		assert_eq!(tree.get_nested_int(&path, "inner-row", "age", 1), 41);
		assert_eq!(tree.get_nested_str(&path, "inner-row", "user", ""), "nobody");
		// The outer scope's previous row survives the nested block.
		assert_eq!(tree.list_columns("oneblock", "outer"), vec!["x", "y"]);
	}

	#[test]
	fn test_top_level_rows_belong_to_root() {
		let tree = parse("toprow :: debug=true;\n%block b\n{\n}\n");
		assert!(tree.get_self("toprow", "debug", false));
		assert!(tree.child("b").unwrap().is_empty());
	}

	#[test]
	fn test_inline_open_brace_on_block_line() {
		let tree = parse("%block inline {\n\tr :: c=v;\n}\n");
		assert_eq!(tree.get_str("inline", "r", "c", ""), "v");
	}

	#[test]
	fn test_lenient_mode_skips_bad_lines() {
		let tree = parse(
			r#"
%block b
{
	this line means nothing
	+= orphan=1;
	good :: a=1;
}
%block after
{
	r :: c=v;
}
"#,
		);

		assert_eq!(tree.list_rows("b"), vec!["good"]);
		assert_eq!(tree.get_str("after", "r", "c", ""), "v");
	}

	#[test]
	fn test_stray_closing_brace_ends_file() {
		let tree = parse("first :: a=1;\n%block b\n{\n}\n}\nlate :: a=2;\n%block after\n{\n}\n");

		assert_eq!(tree.rows.keys().collect::<Vec<_>>(), vec!["first"]);
		assert_eq!(tree.list_blocks(), vec!["b"]);
	}

	#[test]
	fn test_stray_closing_brace_ends_included_file_only() {
		let temp_dir = tempfile::tempdir().unwrap();
		let part = temp_dir.path().join("part.cfg");
		let main = temp_dir.path().join("main.cfg");

		fs::write(&part, "a :: x=1;\n}\nb :: y=2;\n").unwrap();
		fs::write(
			&main,
			format!("%block blk\n{{\n\t%include {}\n\tc :: z=3;\n}}\n", part.display()),
		)
		.unwrap();

		let tree = parse_config_file("inc", &main, &LoadOptions::default()).unwrap();
		assert_eq!(tree.list_rows("blk"), vec!["a", "c"]);

		let strict = LoadOptions::default().strict(true);
		match parse_config_file("inc", &main, &strict).unwrap_err() {
			BlockconfError::Syntax { path, line, .. } => {
				assert_eq!(path, part);
				assert_eq!(line, 2);
			}
			other => panic!("Expected Syntax error, got {other:?}"),
		}
	}

	#[test]
	fn test_strict_mode_rejects_bad_lines() {
		let content = "%block b\n{\n\tgood :: a=1;\n\tthis line means nothing\n}\n";
		let options = LoadOptions::default().strict(true);
		let result = parse_config_str("strict", content, &options);

		match result.unwrap_err() {
			BlockconfError::Syntax { path, line, text, .. } => {
				assert_eq!(path, PathBuf::from("<string>"));
				assert_eq!(line, 4);
				assert_eq!(text, "this line means nothing");
			}
			other => panic!("Expected Syntax error, got {other:?}"),
		}
	}

	#[test]
	fn test_strict_mode_rejects_orphan_continuation_and_brace() {
		let options = LoadOptions::default().strict(true);
		assert!(parse_config_str("s", "+= a=1;\n", &options).is_err());
		assert!(parse_config_str("s", "}\n", &options).is_err());
		assert!(parse_config_str("s", "%block open\n{\n", &options).is_err());
	}

	#[test]
	fn test_unclosed_block_is_closed_at_end_of_file() {
		let tree = parse("%block open\n{\n\tr :: c=v;\n");
		assert_eq!(tree.get_str("open", "r", "c", ""), "v");
	}

	#[test]
	fn test_missing_file_fails() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("missing.cfg");

		match parse_config_file("missing", &path, &LoadOptions::default()).unwrap_err() {
			BlockconfError::ConfigNotFound { path: reported } => assert_eq!(reported, path),
			other => panic!("Expected ConfigNotFound, got {other:?}"),
		}
	}

	#[test]
	fn test_include_is_inlined_in_current_scope() {
		let temp_dir = tempfile::tempdir().unwrap();
		let common = temp_dir.path().join("common.cfg");
		let main = temp_dir.path().join("main.cfg");

		fs::write(
			&common,
			"shared :: level=info;\n%block fromcommon\n{\n\tr :: c=1;\n}\n",
		)
		.unwrap();
		fs::write(
			&main,
			format!(
				"%block app\n{{\n\tname :: id=7;\n\t%include \"{}\"\n}}\n",
				common.display()
			),
		)
		.unwrap();

		let tree = parse_config_file("inc", &main, &LoadOptions::default()).unwrap();
		assert_eq!(tree.source_file.as_deref(), Some(main.as_path()));
		assert_eq!(tree.get_int("app", "name", "id", 0), 7);
		assert_eq!(tree.get_str("app", "shared", "level", ""), "info");

		let app = tree.child("app").unwrap();
		assert_eq!(app.source_file.as_deref(), Some(main.as_path()));
		assert_eq!(app.get_int("fromcommon", "r", "c", 0), 1);
		assert_eq!(
			app.child("fromcommon").unwrap().source_file.as_deref(),
			Some(common.as_path())
		);
	}

	#[test]
	fn test_missing_include_fails_whole_load() {
		let temp_dir = tempfile::tempdir().unwrap();
		let main = temp_dir.path().join("main.cfg");
		let absent = temp_dir.path().join("absent.cfg");
		fs::write(&main, format!("%include {}\n", absent.display())).unwrap();

		match parse_config_file("inc", &main, &LoadOptions::default()).unwrap_err() {
			BlockconfError::IncludeNotFound { path, included_from } => {
				assert_eq!(path, absent);
				assert_eq!(included_from, main);
			}
			other => panic!("Expected IncludeNotFound, got {other:?}"),
		}
	}

	#[test]
	fn test_self_include_hits_depth_limit() {
		let temp_dir = tempfile::tempdir().unwrap();
		let main = temp_dir.path().join("loop.cfg");
		fs::write(&main, format!("r :: c=1;\n%include {}\n", main.display())).unwrap();

		let options = LoadOptions::default().max_include_depth(4);
		match parse_config_file("loop", &main, &options).unwrap_err() {
			BlockconfError::IncludeDepthExceeded { max_depth, .. } => assert_eq!(max_depth, 4),
			other => panic!("Expected IncludeDepthExceeded, got {other:?}"),
		}
	}

	#[test]
	fn test_sample_fixture() {
		let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.cfg");
		let options = LoadOptions::default().strict(true);
		let tree = parse_config_file("sample", &path, &options).unwrap();

		assert_eq!(
			tree.list_blocks(),
			vec!["anotherblock", "block4", "oneblock", "someblock", "thirdblock"]
		);
		assert_eq!(tree.get_int("thirdblock", "some-row", "numProcs", -1), 8);
		assert_eq!(tree.get_int("thirdblock", "some-row", "missingCol", -1), -1);
		assert_eq!(tree.get_int64("block4", "anotherrow", "millis", 0), 123_456_789);
		assert!((tree.get_float64("anotherblock", "job", "ratio", 9999.99) - 0.3).abs() < 1e-6);
		assert_eq!(
			tree.list_rows("someblock"),
			vec!["another-row", "lmirror", "proxy", "somerow"]
		);
		assert_eq!(
			tree.list_columns("anotherblock", "job"),
			vec![
				"TZ", "actionlist", "active", "datelist", "days", "end_time", "freq", "period",
				"prereqlist", "ratio", "region", "start_time", "watch_path",
			]
		);
		assert_eq!(tree.get_str("anotherblock", "job", "datelist", "BLANK"), "");
		assert_eq!(
			tree.split_value("someblock", "lmirror", "plugins", ""),
			vec!["transpath", "split"]
		);
		assert_eq!(
			tree.expand_list("anotherblock", "groups", "members", "expand")
				.into_iter()
				.collect::<Vec<_>>(),
			vec!["a", "b", "c"]
		);

		let path = ["oneblock", "lowerblock0", "lowerblock"];
		assert_eq!(tree.get_nested_int64(&path, "inner-row", "milli", 0), 2);
		assert!((tree.get_nested_float64(&path, "inner-row", "ratio", 0.0) - 0.1).abs() < 1e-9);
		assert_eq!(tree.get_self_str("toplevel", "owner", ""), "ops");
	}
}
