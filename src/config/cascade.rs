use crate::config::parser::parse_config_file;
use crate::config::types::LoadedConfig;
use crate::error::{RemapError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-project config file.
pub const CONFIG_FILE_NAME: &str = ".solremap.toml";

/// Environment variable that, if truthy, skips the ~/.solremap.toml fallback.
pub const NO_USER_CONFIG_ENV: &str = "SOLREMAP_NO_USER_CONFIG";

/// Find the effective config for `start_dir`.
///
/// The lookup order is:
/// 1. Walk up from `start_dir`; the first `.solremap.toml` wins and its
///    directory becomes the project root
/// 2. Otherwise use ~/.solremap.toml (unless disabled), rooted at `start_dir`
/// 3. Otherwise the built-in defaults, rooted at `start_dir`
pub fn discover_config(start_dir: &Path) -> Result<LoadedConfig> {
	for dir in start_dir.ancestors() {
		let config_path = dir.join(CONFIG_FILE_NAME);

		if config_path.is_file() {
			let config = parse_config_file(&config_path)?;
			debug!(path = %config_path.display(), "using project config");
			return Ok(LoadedConfig {
				config,
				path: Some(config_path),
				root: dir.to_path_buf(),
			});
		}
	}

	if let Some(user_config) = load_user_config(start_dir)? {
		return Ok(user_config);
	}

	debug!(root = %start_dir.display(), "no config found, using defaults");
	Ok(LoadedConfig::defaults(start_dir))
}

/// Load the user's ~/.solremap.toml if it exists and isn't disabled.
fn load_user_config(start_dir: &Path) -> Result<Option<LoadedConfig>> {
	if is_env_truthy(NO_USER_CONFIG_ENV) {
		return Ok(None);
	}

	let Some(home_dir) = dirs::home_dir() else {
		return Ok(None);
	};
	let user_config_path = home_dir.join(CONFIG_FILE_NAME);

	if user_config_path.is_file() {
		let config = parse_config_file(&user_config_path)?;
		debug!(path = %user_config_path.display(), "using user config");
		Ok(Some(LoadedConfig {
			config,
			path: Some(user_config_path),
			root: start_dir.to_path_buf(),
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(RemapError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}

/// Template written by `solremap --init`.
pub fn generate_init_template() -> String {
	r#"# solremap project configuration.
# Relative paths are resolved against the directory holding this file.

# One `from=to` pair per line; the first matching rule wins.
remappings = "remappings.txt"

[paths]
sources = "script"
tests = "test"
cache = "cache_hardhat"
extensions = ["sol"]
"#
	.to_string()
}
