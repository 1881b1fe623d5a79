//! Configuration loading and parsing for solremap.
//!
//! This module handles:
//! - TOML config file parsing and validation
//! - Project config discovery with a user-level fallback

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	CONFIG_FILE_NAME, NO_USER_CONFIG_ENV, discover_config, generate_init_template, user_config_path,
};
pub use parser::{parse_config_file, parse_config_str};
pub use types::{Config, LoadedConfig, PathsConfig, project_relative};
