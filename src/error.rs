use std::path::PathBuf;

/// Library-level structured errors for editorconfig resolution and editing.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum EditorConfigError {
	#[error("Invalid argument `{name}`: {reason}")]
	InvalidArgument { name: &'static str, reason: String },

	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Config file is not valid UTF-8: {path}")]
	InvalidEncoding { path: PathBuf },

	#[error("Duplicate property `{key}` in section [{section}]")]
	DuplicateKey { section: String, key: String },

	#[error("Property `{key}` is not allowed before the first section (only `root` is)")]
	GlobalPropertyNotAllowed { key: String },

	#[error("Invalid line: {reason}")]
	InvalidLine { reason: String },

	#[error("Invalid rule-set version: {version}")]
	InvalidVersion {
		version: String,
		#[source]
		source: semver::Error,
	},

	#[error("Config file is locked by another edit session: {path}")]
	Locked { path: PathBuf },

	#[error("Failed to write config file: {path}")]
	ConfigWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl EditorConfigError {
	pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
		EditorConfigError::InvalidArgument {
			name,
			reason: reason.into(),
		}
	}
}

/// Result type alias using EditorConfigError.
pub type Result<T> = std::result::Result<T, EditorConfigError>;
