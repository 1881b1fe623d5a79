use crate::remap::table::RemappingTable;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::trace;

/// Leading whitespace, the word `import`, then at least one whitespace character.
static IMPORT_LINE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)^\s*import\s").expect("valid import regex"));

/// Check whether `line` is an import statement eligible for remapping.
pub fn is_import_line(line: &str) -> bool {
	IMPORT_LINE.is_match(line)
}

/// Apply the first matching remapping to an import line.
///
/// Non-import lines, and import lines no rule matches, are returned as-is.
/// At most one substitution is made: the first occurrence of the first
/// matching rule's `from`.
pub fn transform_line<'a>(line: &'a str, table: &RemappingTable) -> Cow<'a, str> {
	if !is_import_line(line) {
		return Cow::Borrowed(line);
	}

	match table.find_rule(line) {
		Some(rule) => {
			trace!(from = %rule.from, to = %rule.to, line, "remapping import");
			Cow::Owned(line.replacen(rule.from.as_str(), &rule.to, 1))
		}
		None => Cow::Borrowed(line),
	}
}
