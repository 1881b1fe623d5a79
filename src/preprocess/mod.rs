//! Source preprocessing for solremap.
//!
//! This module handles:
//! - Remapping every import line of a source text, preserving line endings
//! - Collecting project sources and writing remapped copies to the cache

use crate::config::{LoadedConfig, project_relative};
use crate::error::{RemapError, Result};
use crate::remap::{RemappingTable, transform_line};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A remapped source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
	/// The full text after remapping.
	pub text: String,

	/// Number of lines that changed.
	pub rewritten: usize,
}

/// Summary of a project preprocessing run.
#[derive(Debug, Clone, Default)]
pub struct PreprocessReport {
	/// Number of source files processed.
	pub files: usize,

	/// Total number of rewritten import lines.
	pub rewritten_lines: usize,

	/// Files written to the cache directory, in processing order.
	pub outputs: Vec<PathBuf>,
}

/// Remap every line of `source`.
///
/// `\n` and `\r\n` terminators are kept as they were, including a missing
/// newline at the end of the text.
pub fn transform_source(source: &str, table: &RemappingTable) -> Transformed {
	let mut text = String::with_capacity(source.len());
	let mut rewritten = 0;

	for chunk in source.split_inclusive('\n') {
		let body = chunk
			.strip_suffix("\r\n")
			.or_else(|| chunk.strip_suffix('\n'))
			.unwrap_or(chunk);
		let terminator = &chunk[body.len()..];

		let line = transform_line(body, table);
		if *line != *body {
			rewritten += 1;
		}
		text.push_str(&line);
		text.push_str(terminator);
	}

	Transformed { text, rewritten }
}

/// Read `path` and remap its contents.
pub fn preprocess_file(path: &Path, table: &RemappingTable) -> Result<Transformed> {
	let source = std::fs::read_to_string(path).map_err(|source| RemapError::SourceRead {
		path: path.to_path_buf(),
		source,
	})?;

	Ok(transform_source(&source, table))
}

/// Collect source files under `dir` whose extension is in `extensions`.
///
/// A directory that doesn't exist yields no files.
pub fn collect_sources(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
	if !dir.exists() {
		debug!(dir = %dir.display(), "source directory does not exist, skipping");
		return Ok(Vec::new());
	}

	let mut files = Vec::new();
	for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
		let entry = entry.map_err(|e| RemapError::SourceRead {
			path: e.path().unwrap_or(dir).to_path_buf(),
			source: e.into(),
		})?;

		if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
			files.push(entry.into_path());
		}
	}

	Ok(files)
}

/// Match the file name suffix so multi-part extensions like `t.sol` work.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
	let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
		return false;
	};
	extensions
		.iter()
		.any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}")))
}

/// Remap every source and test file of a project into its cache directory.
///
/// Each file lands at `cache/<configured dir>/<path below that dir>`. Source
/// and test directories must stay inside the project root.
pub fn preprocess_project(loaded: &LoadedConfig, table: &RemappingTable) -> Result<PreprocessReport> {
	let paths = &loaded.config.paths;
	let cache_dir = loaded.cache_dir();
	let mut report = PreprocessReport::default();

	for configured in [&paths.sources, &paths.tests] {
		let label = project_relative(configured).ok_or_else(|| RemapError::InvalidConfig {
			reason: format!(
				"{} must be a relative path inside the project",
				configured.display()
			),
		})?;
		let dir = loaded.root.join(configured);

		for file in collect_sources(&dir, &paths.extensions)? {
			if file.starts_with(&cache_dir) {
				warn!(path = %file.display(), "skipping file inside cache directory");
				continue;
			}

			let relative = file.strip_prefix(&dir).unwrap_or(&file);
			let output = cache_dir.join(&label).join(relative);
			if !output.starts_with(&cache_dir) {
				return Err(RemapError::InvalidConfig {
					reason: format!(
						"output for {} falls outside {}",
						file.display(),
						cache_dir.display()
					),
				});
			}

			let transformed = preprocess_file(&file, table)?;
			write_output(&output, &transformed.text)?;

			debug!(
				path = %file.display(),
				rewritten = transformed.rewritten,
				"preprocessed source"
			);
			report.files += 1;
			report.rewritten_lines += transformed.rewritten;
			report.outputs.push(output);
		}
	}

	Ok(report)
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
	let write_err = |source| RemapError::OutputWrite {
		path: path.to_path_buf(),
		source,
	};

	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).map_err(write_err)?;
	}
	std::fs::write(path, contents).map_err(write_err)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::Config;
	use crate::remap::load_rules;
	use std::fs;

	fn oz_table() -> RemappingTable {
		load_rules("@oz/=lib/openzeppelin/\nforge-std/=lib/forge-std/src/\n").unwrap()
	}

	#[test]
	fn test_transform_source_counts_rewrites() {
		let source = "pragma solidity 0.8.21;\n\
			import \"@oz/token/ERC20.sol\";\n\
			import \"./Local.sol\";\n\
			import {Test} from \"forge-std/Test.sol\";\n\
			contract A {}\n";

		let out = transform_source(source, &oz_table());

		assert_eq!(out.rewritten, 2);
		assert_eq!(
			out.text,
			"pragma solidity 0.8.21;\n\
			import \"lib/openzeppelin/token/ERC20.sol\";\n\
			import \"./Local.sol\";\n\
			import {Test} from \"lib/forge-std/src/Test.sol\";\n\
			contract A {}\n"
		);
	}

	#[test]
	fn test_transform_source_preserves_crlf_and_missing_final_newline() {
		let source = "import \"@oz/A.sol\";\r\n\r\ncontract A {}";
		let out = transform_source(source, &oz_table());

		assert_eq!(out.text, "import \"lib/openzeppelin/A.sol\";\r\n\r\ncontract A {}");
		assert_eq!(out.rewritten, 1);
	}

	#[test]
	fn test_transform_source_empty() {
		let out = transform_source("", &oz_table());
		assert_eq!(out.text, "");
		assert_eq!(out.rewritten, 0);
	}

	#[test]
	fn test_has_extension() {
		let sol = vec!["sol".to_string()];
		assert!(has_extension(Path::new("a/Token.sol"), &sol));
		assert!(has_extension(Path::new("a/Token.t.sol"), &sol));
		assert!(!has_extension(Path::new("a/Token.json"), &sol));
		assert!(!has_extension(Path::new("a/.sol"), &sol));

		let tests_only = vec!["t.sol".to_string()];
		assert!(has_extension(Path::new("Token.t.sol"), &tests_only));
		assert!(!has_extension(Path::new("Token.sol"), &tests_only));
	}

	#[test]
	fn test_collect_sources_missing_dir() {
		let temp_dir = tempfile::tempdir().unwrap();
		let files = collect_sources(&temp_dir.path().join("nope"), &["sol".to_string()]).unwrap();
		assert!(files.is_empty());
	}

	#[test]
	fn test_collect_sources_sorted_and_filtered() {
		let temp_dir = tempfile::tempdir().unwrap();
		let dir = temp_dir.path();
		fs::create_dir_all(dir.join("nested")).unwrap();
		fs::write(dir.join("B.sol"), "").unwrap();
		fs::write(dir.join("A.sol"), "").unwrap();
		fs::write(dir.join("notes.md"), "").unwrap();
		fs::write(dir.join("nested").join("C.sol"), "").unwrap();

		let files = collect_sources(dir, &["sol".to_string()]).unwrap();

		assert_eq!(
			files,
			vec![
				dir.join("A.sol"),
				dir.join("B.sol"),
				dir.join("nested").join("C.sol"),
			]
		);
	}

	#[test]
	fn test_preprocess_project_writes_cache() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("script")).unwrap();
		fs::create_dir_all(root.join("test")).unwrap();
		fs::write(root.join("script").join("Deploy.s.sol"), "import \"@oz/A.sol\";\n").unwrap();
		fs::write(
			root.join("test").join("A.t.sol"),
			"import \"forge-std/Test.sol\";\nimport \"@oz/B.sol\";\n",
		)
		.unwrap();

		let loaded = LoadedConfig::defaults(root);
		let report = preprocess_project(&loaded, &oz_table()).unwrap();

		assert_eq!(report.files, 2);
		assert_eq!(report.rewritten_lines, 3);

		let cache = root.join("cache_hardhat");
		assert_eq!(
			fs::read_to_string(cache.join("script").join("Deploy.s.sol")).unwrap(),
			"import \"lib/openzeppelin/A.sol\";\n"
		);
		assert_eq!(
			fs::read_to_string(cache.join("test").join("A.t.sol")).unwrap(),
			"import \"lib/forge-std/src/Test.sol\";\nimport \"lib/openzeppelin/B.sol\";\n"
		);
		// Sources are left untouched.
		assert_eq!(
			fs::read_to_string(root.join("script").join("Deploy.s.sol")).unwrap(),
			"import \"@oz/A.sol\";\n"
		);
	}

	#[test]
	fn test_preprocess_project_skips_cache_inside_sources() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		let mut config = Config::default();
		config.paths.sources = PathBuf::from("src");
		config.paths.cache = PathBuf::from("src/cache");
		let loaded = LoadedConfig {
			config,
			path: None,
			root: root.to_path_buf(),
		};

		fs::create_dir_all(root.join("src").join("cache").join("src")).unwrap();
		fs::write(root.join("src").join("A.sol"), "import \"@oz/A.sol\";\n").unwrap();
		fs::write(
			root.join("src").join("cache").join("src").join("A.sol"),
			"stale\n",
		)
		.unwrap();

		let report = preprocess_project(&loaded, &oz_table()).unwrap();

		assert_eq!(report.files, 1);
		assert_eq!(report.outputs, vec![root.join("src/cache/src/A.sol")]);
	}

	#[test]
	fn test_transform_source_identity_rule_not_counted() {
		let table = load_rules("@oz/=@oz/\n").unwrap();
		let out = transform_source("import \"@oz/A.sol\";\n", &table);

		assert_eq!(out.text, "import \"@oz/A.sol\";\n");
		assert_eq!(out.rewritten, 0);
	}

	fn loaded_with_sources(root: &Path, sources: PathBuf) -> LoadedConfig {
		let mut config = Config::default();
		config.paths.sources = sources;
		LoadedConfig {
			config,
			path: None,
			root: root.to_path_buf(),
		}
	}

	#[test]
	fn test_preprocess_project_rejects_absolute_sources() {
		let temp_dir = tempfile::tempdir().unwrap();
		let outside = tempfile::tempdir().unwrap();
		let source = outside.path().join("A.sol");
		fs::write(&source, "import \"@oz/A.sol\";\n").unwrap();

		let loaded = loaded_with_sources(temp_dir.path(), outside.path().to_path_buf());
		let result = preprocess_project(&loaded, &oz_table());

		assert!(matches!(result.unwrap_err(), RemapError::InvalidConfig { .. }));
		assert_eq!(fs::read_to_string(&source).unwrap(), "import \"@oz/A.sol\";\n");
	}

	#[test]
	fn test_preprocess_project_rejects_sources_outside_root() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path().join("proj");
		let shared = temp_dir.path().join("shared");
		fs::create_dir_all(&root).unwrap();
		fs::create_dir_all(&shared).unwrap();
		fs::write(shared.join("A.sol"), "import \"@oz/A.sol\";\n").unwrap();

		let loaded = loaded_with_sources(&root, PathBuf::from("../shared"));
		let result = preprocess_project(&loaded, &oz_table());

		assert!(matches!(result.unwrap_err(), RemapError::InvalidConfig { .. }));
		assert!(!temp_dir.path().join("shared").join("cache_hardhat").exists());
		assert!(!root.join("cache_hardhat").exists());
	}

	#[test]
	fn test_preprocess_project_outputs_stay_in_cache() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("contracts/token")).unwrap();
		fs::write(root.join("contracts/token/A.sol"), "import \"@oz/A.sol\";\n").unwrap();

		let loaded = loaded_with_sources(root, PathBuf::from("./contracts/"));
		let report = preprocess_project(&loaded, &oz_table()).unwrap();

		let cache = root.join("cache_hardhat");
		assert_eq!(report.outputs, vec![cache.join("contracts/token/A.sol")]);
		assert!(report.outputs.iter().all(|o| o.starts_with(&cache)));
	}

	#[test]
	fn test_preprocess_file_missing() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("Missing.sol");

		match preprocess_file(&path, &oz_table()).unwrap_err() {
			RemapError::SourceRead { path: p, .. } => assert_eq!(p, path),
			other => panic!("Expected SourceRead error, got {other:?}"),
		}
	}
}
