//! Settings resolution for a target file.
//!
//! This module handles:
//! - Discovering config files in ancestor directories, stopping at a root file
//! - Anchoring section globs to the directory of the declaring file
//! - Merging the properties of matching sections

pub mod cascade;
pub mod glob;
pub mod resolver;

pub use cascade::{config_file_candidates, discover_config_files};
pub use glob::{GlobMatcher, RegexGlobMatcher};
pub use resolver::{Resolver, anchor_glob};
