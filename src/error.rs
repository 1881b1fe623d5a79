use std::path::PathBuf;

/// Library-level structured errors for solremap.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum RemapError {
	#[error("Malformed remapping on line {line}: {content:?} (expected `from=to`)")]
	MalformedRule { line: usize, content: String },

	#[error("Remappings file not found: {path}")]
	RemappingsNotFound { path: PathBuf },

	#[error("Failed to read remappings file: {path}")]
	RemappingsRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse remappings file: {path}")]
	RemappingsParse {
		path: PathBuf,
		#[source]
		source: Box<RemapError>,
	},

	#[error("Failed to read config file: {path}")]
	ConfigRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid config: {reason}")]
	InvalidConfig { reason: String },

	#[error("Failed to read source file: {path}")]
	SourceRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write output: {path}")]
	OutputWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using RemapError.
pub type Result<T> = std::result::Result<T, RemapError>;
