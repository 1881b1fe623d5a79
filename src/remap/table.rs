use crate::error::{RemapError, Result};
use std::path::Path;
use tracing::debug;

/// A single `from=to` import remapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappingRule {
	/// Substring to look for in an import line. Never empty.
	pub from: String,

	/// Replacement for the first occurrence of `from`.
	pub to: String,
}

impl RemappingRule {
	/// Parse one trimmed, non-blank line. `line_number` is 1-based and only
	/// used for error reporting.
	fn parse(content: &str, line_number: usize) -> Result<Self> {
		let malformed = || RemapError::MalformedRule {
			line: line_number,
			content: content.to_string(),
		};

		let (from, to) = content.split_once('=').ok_or_else(malformed)?;
		if from.is_empty() {
			return Err(malformed());
		}

		Ok(RemappingRule {
			from: from.to_string(),
			to: to.to_string(),
		})
	}
}

/// Ordered remapping rules. Earlier rules take precedence.
///
/// The table is read-only once built; load it once and share it by reference
/// across every line being transformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemappingTable {
	rules: Vec<RemappingRule>,
}

impl RemappingTable {
	/// Rules in precedence order.
	pub fn rules(&self) -> &[RemappingRule] {
		&self.rules
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Find the first rule whose `from` occurs anywhere in `line`.
	///
	/// This does not check whether `line` is an import statement; see
	/// [`transform_line`](crate::remap::transform_line) for that.
	pub fn find_rule(&self, line: &str) -> Option<&RemappingRule> {
		for rule in &self.rules {
			if line.contains(rule.from.as_str()) {
				return Some(rule);
			}
		}
		None
	}
}

impl FromIterator<RemappingRule> for RemappingTable {
	fn from_iter<I: IntoIterator<Item = RemappingRule>>(iter: I) -> Self {
		RemappingTable {
			rules: iter.into_iter().collect(),
		}
	}
}

/// Parse remapping rules from text, one `from=to` pair per line.
///
/// Each line is trimmed, blank lines are skipped, and the line is split on
/// its first `=`. A line without `=`, or with nothing before it, is an error.
pub fn load_rules(source: &str) -> Result<RemappingTable> {
	let table = source
		.lines()
		.enumerate()
		.map(|(i, line)| (i + 1, line.trim()))
		.filter(|(_, line)| !line.is_empty())
		.map(|(n, line)| RemappingRule::parse(line, n))
		.collect::<Result<RemappingTable>>()?;

	debug!(rules = table.len(), "loaded remappings");
	Ok(table)
}

/// Read and parse a remappings file.
pub fn load_rules_file(path: &Path) -> Result<RemappingTable> {
	let content = std::fs::read_to_string(path).map_err(|source| {
		if source.kind() == std::io::ErrorKind::NotFound {
			RemapError::RemappingsNotFound {
				path: path.to_path_buf(),
			}
		} else {
			RemapError::RemappingsRead {
				path: path.to_path_buf(),
				source,
			}
		}
	})?;

	load_rules(&content).map_err(|source| RemapError::RemappingsParse {
		path: path.to_path_buf(),
		source: Box::new(source),
	})
}
