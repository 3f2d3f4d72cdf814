//! Options for resolution and editing.
//!
//! This module handles:
//! - Config file name and rule-set version used by the resolver
//! - Serialization options for edit sessions

pub mod types;

pub use types::{
	DEFAULT_CONFIG_FILE_NAME, EDITORCONFIG_VERSION, EditOptions, ResolverOptions, current_version,
	parse_version,
};
