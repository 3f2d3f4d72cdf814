//! Typed view of resolved properties.

pub mod resolved;
pub mod types;

pub use resolved::{KNOWN_PROPERTIES, ResolvedSettings, sanitize};
pub use types::{Charset, EndOfLine, IndentSize, IndentStyle};
