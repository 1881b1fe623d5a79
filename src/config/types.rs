use crate::error::RemapError;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Top-level configuration from a `.solremap.toml` file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
	/// Remappings file, one `from=to` pair per line.
	#[serde(default = "default_remappings")]
	pub remappings: PathBuf,

	/// Project directories.
	#[serde(default)]
	pub paths: PathsConfig,
}

/// Directory layout of a project, relative to the project root.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PathsConfig {
	/// Contract sources to preprocess.
	#[serde(default = "default_sources")]
	pub sources: PathBuf,

	/// Test sources to preprocess.
	#[serde(default = "default_tests")]
	pub tests: PathBuf,

	/// Where preprocessed sources are written.
	#[serde(default = "default_cache")]
	pub cache: PathBuf,

	/// File extensions (without the dot) treated as sources.
	#[serde(default = "default_extensions")]
	pub extensions: Vec<String>,
}

fn default_remappings() -> PathBuf {
	PathBuf::from("remappings.txt")
}

fn default_sources() -> PathBuf {
	PathBuf::from("script")
}

fn default_tests() -> PathBuf {
	PathBuf::from("test")
}

fn default_cache() -> PathBuf {
	PathBuf::from("cache_hardhat")
}

fn default_extensions() -> Vec<String> {
	vec!["sol".to_string()]
}

impl Default for Config {
	fn default() -> Self {
		Config {
			remappings: default_remappings(),
			paths: PathsConfig::default(),
		}
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		PathsConfig {
			sources: default_sources(),
			tests: default_tests(),
			cache: default_cache(),
			extensions: default_extensions(),
		}
	}
}

impl Config {
	/// Reject layouts the preprocessor cannot work with.
	pub fn validate(&self) -> Result<(), RemapError> {
		if self.paths.extensions.is_empty() {
			return Err(RemapError::InvalidConfig {
				reason: "paths.extensions must not be empty".to_string(),
			});
		}

		for (name, dir) in [("sources", &self.paths.sources), ("tests", &self.paths.tests)] {
			let Some(dir) = project_relative(dir) else {
				return Err(RemapError::InvalidConfig {
					reason: format!("paths.{name} must be a relative path inside the project"),
				});
			};
			if dir.starts_with(normalize(&self.paths.cache)) {
				return Err(RemapError::InvalidConfig {
					reason: format!("paths.cache must not contain paths.{name}"),
				});
			}
		}

		Ok(())
	}
}

/// Strip `.` components so `./test` and `test` compare equal.
fn normalize(path: &Path) -> PathBuf {
	path.components()
		.filter(|c| !matches!(c, Component::CurDir))
		.collect()
}

/// Normalize `path` if it stays below the project root.
///
/// Absolute paths and paths with `..` components yield `None`.
pub fn project_relative(path: &Path) -> Option<PathBuf> {
	let escapes = path
		.components()
		.any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
	(!escapes).then(|| normalize(path))
}

/// A loaded configuration along with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The file this config was loaded from, if any.
	pub path: Option<PathBuf>,

	/// Directory that relative paths in `config` resolve against.
	pub root: PathBuf,
}

impl LoadedConfig {
	/// Built-in defaults rooted at `root`.
	pub fn defaults(root: &Path) -> Self {
		LoadedConfig {
			config: Config::default(),
			path: None,
			root: root.to_path_buf(),
		}
	}

	pub fn remappings_path(&self) -> PathBuf {
		self.root.join(&self.config.remappings)
	}

	pub fn sources_dir(&self) -> PathBuf {
		self.root.join(&self.config.paths.sources)
	}

	pub fn tests_dir(&self) -> PathBuf {
		self.root.join(&self.config.paths.tests)
	}

	pub fn cache_dir(&self) -> PathBuf {
		self.root.join(&self.config.paths.cache)
	}
}
