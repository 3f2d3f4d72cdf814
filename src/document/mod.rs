//! Line-addressable model of a single `.editorconfig` file.
//!
//! This module handles:
//! - Typed lines that keep their original text
//! - Sections with unique property keys
//! - Parsing a file into a document and writing it back
//! - Locked, staged edit sessions

pub mod edit;
pub mod file;
pub mod line;
mod lock;
pub mod section;

pub use edit::EditSession;
pub use file::{Document, LineEnding, TextEncoding};
pub use line::{Comment, Line, LineId, LineKind, Property};
pub use section::{GLOBAL_SECTION_NAME, Located, ROOT_KEY, Section};
