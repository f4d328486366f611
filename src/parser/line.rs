use regex::Regex;
use std::sync::LazyLock;

static INCLUDE_DIRECTIVE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)^%include\s+(.+)$").expect("include pattern is valid"));

static BLOCK_DIRECTIVE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)^%block\s+(.*)$").expect("block pattern is valid"));

const NEW_ROW: &str = "::";
const CONTINUE_ROW: &str = "+=";

/// What a cleaned, non-empty line means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
	/// `%include <path>`, with quotes removed from the path.
	Include(&'a str),

	/// `}`: the current block ends.
	BlockEnd,

	/// `%block <name>`: a child block begins.
	BlockStart(&'a str),

	/// `+= ...`: more columns for the most recent row.
	Continuation(&'a str),

	/// `{`: opening brace of a block, nothing to do.
	OpenBrace,

	/// `name :: ...` defines a row; `name += ...` merges into a named row.
	Row {
		name: &'a str,
		columns: &'a str,
		merge: bool,
	},

	/// Anything else; carries the reason for diagnostics.
	Unclassified(&'static str),
}

/// Strip a `#` comment and surrounding blanks.
pub fn clean_line(raw: &str) -> &str {
	let without_comment = match raw.find('#') {
		Some(pos) => &raw[..pos],
		None => raw,
	};
	without_comment.trim()
}

/// Classify a cleaned line. Checks run in a fixed order and the first hit wins.
pub fn classify(line: &str) -> Line<'_> {
	if let Some(caps) = INCLUDE_DIRECTIVE.captures(line)
		&& let Some(target) = caps.get(1)
	{
		return Line::Include(unquote(target.as_str().trim()));
	}

	if line.starts_with('}') {
		return Line::BlockEnd;
	}

	if let Some(caps) = BLOCK_DIRECTIVE.captures(line) {
		let raw_name = caps.get(1).map_or("", |m| m.as_str()).trim();
		let name = raw_name.strip_suffix('{').unwrap_or(raw_name).trim_end();
		if name.is_empty() {
			return Line::Unclassified("block directive without a name");
		}
		return Line::BlockStart(name);
	}

	if let Some(rest) = line.strip_prefix(CONTINUE_ROW) {
		return Line::Continuation(rest.trim());
	}

	if line.starts_with('{') {
		return Line::OpenBrace;
	}

	classify_row(line)
}

/// Split a row line on whichever of `::` and `+=` comes first.
///
/// `::` starts (or replaces) a row. `+=` extends the row named before it.
fn classify_row(line: &str) -> Line<'_> {
	let new_at = line.find(NEW_ROW);
	let continue_at = line.find(CONTINUE_ROW).filter(|&pos| pos > 0);

	let (split_at, merge) = match (new_at, continue_at) {
		(Some(new_pos), Some(continue_pos)) if continue_pos < new_pos => (continue_pos, true),
		(Some(new_pos), _) => (new_pos, false),
		(None, Some(continue_pos)) => (continue_pos, true),
		(None, None) => return Line::Unclassified("expected '::' or '+=' after a row name"),
	};

	let name = line[..split_at].trim();
	if name.is_empty() {
		return Line::Unclassified("row without a name");
	}

	Line::Row {
		name,
		columns: line[split_at + 2..].trim(),
		merge,
	}
}

/// Iterate the `key=value` pairs of a `;`-separated column list.
///
/// Keys and values are trimmed. Pieces without `=` or with an empty key are
/// skipped.
pub fn parse_columns(text: &str) -> impl Iterator<Item = (&str, &str)> {
	text.split(';').filter_map(|piece| {
		let (key, value) = piece.split_once('=')?;
		let key = key.trim();
		if key.is_empty() {
			return None;
		}
		Some((key, value.trim()))
	})
}

fn unquote(text: &str) -> &str {
	text.strip_prefix('"')
		.and_then(|inner| inner.strip_suffix('"'))
		.unwrap_or(text)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_clean_line() {
		assert_eq!(clean_line("  \tfoo :: a=1; # trailing comment"), "foo :: a=1;");
		assert_eq!(clean_line("# whole line"), "");
		assert_eq!(clean_line("   "), "");
	}

	#[test]
	fn test_include_directive() {
		assert_eq!(classify("%include /etc/common.cfg"), Line::Include("/etc/common.cfg"));
		assert_eq!(classify("%include \"~/my conf.cfg\""), Line::Include("~/my conf.cfg"));
		assert_eq!(classify("%INCLUDE\tshared.cfg"), Line::Include("shared.cfg"));
		// No path: falls through to row classification and is rejected
		assert!(matches!(classify("%include"), Line::Unclassified(_)));
	}

	#[test]
	fn test_block_directives() {
		assert_eq!(classify("%block someblock"), Line::BlockStart("someblock"));
		assert_eq!(classify("%Block  spaced name "), Line::BlockStart("spaced name"));
		assert_eq!(classify("%block inline {"), Line::BlockStart("inline"));
		assert!(matches!(classify("%block {"), Line::Unclassified(_)));
		assert_eq!(classify("{"), Line::OpenBrace);
		assert_eq!(classify("}"), Line::BlockEnd);
		assert_eq!(classify("} extra"), Line::BlockEnd);
	}

	#[test]
	fn test_row_definition() {
		assert_eq!(
			classify("some-row :: numProcs=8;"),
			Line::Row {
				name: "some-row",
				columns: "numProcs=8;",
				merge: false,
			}
		);
	}

	#[test]
	fn test_continuation_prefix() {
		assert_eq!(classify("+= b=2;"), Line::Continuation("b=2;"));
		assert_eq!(classify("+="), Line::Continuation(""));
	}

	#[test]
	fn test_earliest_operator_wins() {
		// '::' first: a new row whose value happens to contain '+='
		assert_eq!(
			classify("row :: expr=a+=b;"),
			Line::Row {
				name: "row",
				columns: "expr=a+=b;",
				merge: false,
			}
		);

		// '+=' first: continuation of the row named before it
		assert_eq!(
			classify("row += path=a::b;"),
			Line::Row {
				name: "row",
				columns: "path=a::b;",
				merge: true,
			}
		);

		assert_eq!(
			classify("row += c=3;"),
			Line::Row {
				name: "row",
				columns: "c=3;",
				merge: true,
			}
		);
	}

	#[test]
	fn test_unclassified_lines() {
		assert!(matches!(classify("just some words"), Line::Unclassified(_)));
		assert!(matches!(classify(":: a=1;"), Line::Unclassified(_)));
	}

	#[test]
	fn test_parse_columns() {
		let text = " a = 1 ; b=two words;; =orphan; novalue; c=x=y";
		let pairs: Vec<_> = parse_columns(text).collect();
		assert_eq!(pairs, vec![("a", "1"), ("b", "two words"), ("c", "x=y")]);
	}
}
