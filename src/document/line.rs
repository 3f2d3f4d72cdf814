use crate::error::{EditorConfigError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\s*[#;](.*)").expect("comment pattern is valid"));

static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*([\w.\-]+)\s*[=:]\s*(.*?)\s*([#;].*)?$").expect("property pattern is valid")
});

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*\[(([^#;]|\\#|\\;)+)\]\s*([#;].*)?$").expect("section pattern is valid")
});

/// Stable handle to a line inside a [`Section`](super::Section).
///
/// Handles survive staging into an edit session, so a line found through a
/// parsed document can be removed or replaced in the staged copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub(crate) u32);

/// A `# text` or `; text` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
	text: String,
}

impl Comment {
	/// Comment text without the marker and surrounding whitespace.
	pub fn text(&self) -> &str {
		&self.text
	}
}

/// A `key = value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
	key: String,
	value: String,
}

impl Property {
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn value(&self) -> &str {
		&self.value
	}
}

/// What a physical line holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
	Comment(Comment),
	Property(Property),
	SectionHeader(String),
	Empty,
}

/// One physical line of a config file.
///
/// Lines read from disk keep their exact text and serialize it verbatim.
/// Lines built through the constructors serialize canonically.
#[derive(Debug, Clone)]
pub struct Line {
	kind: LineKind,
	original: Option<String>,
}

impl Line {
	/// Classify a raw line. Never fails: anything unrecognized becomes an empty line
	/// that still remembers its text.
	pub(crate) fn parse(raw: &str) -> Self {
		let kind = if let Some(caps) = COMMENT_RE.captures(raw) {
			LineKind::Comment(Comment {
				text: caps[1].trim().to_string(),
			})
		} else if let Some(caps) = PROPERTY_RE.captures(raw) {
			LineKind::Property(Property {
				key: caps[1].trim().to_string(),
				value: caps[2].trim().to_string(),
			})
		} else if let Some(caps) = SECTION_RE.captures(raw) {
			LineKind::SectionHeader(caps[1].to_string())
		} else {
			LineKind::Empty
		};

		Line {
			kind,
			original: Some(raw.to_string()),
		}
	}

	/// Build a comment line, rendered as `# text`.
	pub fn comment(text: impl Into<String>) -> Result<Self> {
		let text = text.into();
		reject_line_breaks(&text)?;
		Ok(Line {
			kind: LineKind::Comment(Comment {
				text: text.trim().to_string(),
			}),
			original: None,
		})
	}

	/// Build a property line, rendered as `key = value`.
	///
	/// The rendered text must read back as the same property, so keys are limited
	/// to word characters, `.` and `-`, and values cannot carry comment markers.
	pub fn property(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
		let property = Property {
			key: key.into().trim().to_string(),
			value: value.into().trim().to_string(),
		};
		let line = Line {
			kind: LineKind::Property(property.clone()),
			original: None,
		};

		match Line::parse(&line.to_string()).kind {
			LineKind::Property(parsed) if parsed == property => Ok(line),
			_ => Err(EditorConfigError::InvalidLine {
				reason: format!(
					"`{} = {}` does not read back as a property",
					property.key, property.value
				),
			}),
		}
	}

	/// Build a section header line, rendered as `[pattern]`.
	pub fn section_header(pattern: impl Into<String>) -> Result<Self> {
		let pattern = pattern.into();
		let line = Line {
			kind: LineKind::SectionHeader(pattern.clone()),
			original: None,
		};

		match Line::parse(&line.to_string()).kind {
			LineKind::SectionHeader(parsed) if parsed == pattern => Ok(line),
			_ => Err(EditorConfigError::InvalidLine {
				reason: format!("`[{pattern}]` is not a valid section header"),
			}),
		}
	}

	/// Build a blank line.
	pub fn empty() -> Self {
		Line {
			kind: LineKind::Empty,
			original: None,
		}
	}

	pub fn kind(&self) -> &LineKind {
		&self.kind
	}

	pub fn as_property(&self) -> Option<&Property> {
		match &self.kind {
			LineKind::Property(property) => Some(property),
			_ => None,
		}
	}

	pub fn as_comment(&self) -> Option<&Comment> {
		match &self.kind {
			LineKind::Comment(comment) => Some(comment),
			_ => None,
		}
	}

	pub fn is_empty(&self) -> bool {
		matches!(self.kind, LineKind::Empty)
	}

	pub fn is_comment(&self) -> bool {
		matches!(self.kind, LineKind::Comment(_))
	}

	pub fn is_section_header(&self) -> bool {
		matches!(self.kind, LineKind::SectionHeader(_))
	}

	/// The text this line was parsed from, if it came from disk.
	pub fn original_text(&self) -> Option<&str> {
		self.original.as_deref()
	}
}

impl fmt::Display for Line {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(ref original) = self.original {
			return f.write_str(original);
		}

		match &self.kind {
			LineKind::Comment(comment) => write!(f, "# {}", comment.text),
			LineKind::Property(property) => write!(f, "{} = {}", property.key, property.value),
			LineKind::SectionHeader(pattern) => write!(f, "[{pattern}]"),
			LineKind::Empty => Ok(()),
		}
	}
}

fn reject_line_breaks(text: &str) -> Result<()> {
	if text.contains(['\r', '\n']) {
		return Err(EditorConfigError::InvalidLine {
			reason: "line text cannot contain line breaks".to_string(),
		});
	}
	Ok(())
}
