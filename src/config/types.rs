use crate::error::{EditorConfigError, Result};
use semver::Version;
use serde::Deserialize;

/// Default name of the files holding editorconfig values.
pub const DEFAULT_CONFIG_FILE_NAME: &str = ".editorconfig";

/// Latest editorconfig rule-set version this crate implements.
pub const EDITORCONFIG_VERSION: &str = "0.17.2";

/// The rule-set version used unless a caller asks for an older one.
pub fn current_version() -> Version {
	Version::new(0, 17, 2)
}

/// Parse a rule-set version, accepting `major.minor` and `major` shorthands.
pub fn parse_version(input: &str) -> Result<Version> {
	let trimmed = input.trim();
	let padded = match trimmed.matches('.').count() {
		0 => format!("{trimmed}.0.0"),
		1 => format!("{trimmed}.0"),
		_ => trimmed.to_string(),
	};

	Version::parse(&padded).map_err(|source| EditorConfigError::InvalidVersion {
		version: input.to_string(),
		source,
	})
}

/// Settings for a [`Resolver`](crate::resolve::Resolver).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ResolverOptions {
	/// Name of the config files looked up in each ancestor directory.
	pub config_file_name: String,

	/// Rule-set version; some defaulting rules only apply from a given version.
	pub version: Version,
}

impl Default for ResolverOptions {
	fn default() -> Self {
		ResolverOptions {
			config_file_name: DEFAULT_CONFIG_FILE_NAME.to_string(),
			version: current_version(),
		}
	}
}

impl ResolverOptions {
	pub fn with_config_file_name(mut self, name: impl Into<String>) -> Self {
		self.config_file_name = name.into();
		self
	}

	pub fn with_version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	/// Validate that the config file name is usable as a plain file name.
	pub fn validate(&self) -> Result<()> {
		let name = self.config_file_name.trim();
		if name.is_empty() {
			return Err(EditorConfigError::invalid_argument(
				"config_file_name",
				"must be non-empty",
			));
		}
		if name.contains(['/', '\\']) {
			return Err(EditorConfigError::invalid_argument(
				"config_file_name",
				format!("`{name}` must be a file name, not a path"),
			));
		}
		Ok(())
	}
}

/// How an [`EditSession`](crate::document::EditSession) writes a file back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditOptions {
	/// Keep newly added blank lines even when they follow another blank line.
	pub allow_consecutive_empty_lines: bool,

	/// Separate an edited section from the next one with a blank line
	/// when it ends with a property.
	pub end_section_with_blank_line_or_comment: bool,

	/// Drop blank lines at the end of the written file.
	pub trim_empty_line_from_end_of_file: bool,
}

impl Default for EditOptions {
	fn default() -> Self {
		EditOptions {
			allow_consecutive_empty_lines: false,
			end_section_with_blank_line_or_comment: true,
			trim_empty_line_from_end_of_file: false,
		}
	}
}
