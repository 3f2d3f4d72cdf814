//! editorconfig-tool - resolve editorconfig settings and edit `.editorconfig` files.
//!
//! This library provides:
//! - Config file discovery up the directory tree, stopping at `root = true`
//! - Section glob anchoring and matching
//! - Merging of matching properties into typed settings
//! - A line-addressable document model with locked edit sessions
//!
//! # Example
//!
//! ```no_run
//! use editorconfig_tool::{Resolver, ResolverOptions};
//!
//! let resolver = Resolver::new(ResolverOptions::default())?;
//! let settings = resolver.resolve("src/main.rs")?;
//!
//! for (key, value) in settings.properties() {
//!     println!("{key}={value}");
//! }
//! # Ok::<(), editorconfig_tool::EditorConfigError>(())
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod resolve;
pub mod settings;

pub use config::{EditOptions, ResolverOptions};
pub use document::{Document, EditSession, Line, Section};
pub use error::{EditorConfigError, Result};
pub use resolve::{GlobMatcher, RegexGlobMatcher, Resolver};
pub use settings::ResolvedSettings;
