use crate::document::line::{Comment, Line, LineId, LineKind, Property};
use crate::error::{EditorConfigError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Source of line handles, shared by every section so no two lines get the same one.
static NEXT_LINE_ID: AtomicU32 = AtomicU32::new(0);

/// Name given to the implicit section holding lines before the first header.
pub const GLOBAL_SECTION_NAME: &str = "Global";

/// The only key allowed in the global section.
pub const ROOT_KEY: &str = "root";

/// A line found inside a section, with its position.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a, T> {
	/// Handle usable with the section's mutation methods.
	pub id: LineId,

	/// Zero-based index within the section; a header is offset 0.
	pub offset: usize,

	/// One-based line number in the file, when the section came straight from a parse.
	pub line_number: Option<usize>,

	pub item: &'a T,
}

/// An ordered block of lines scoped by a `[glob]` header, or the implicit global block.
///
/// A non-global section stores its header as its first line. Property keys are
/// unique within a section.
#[derive(Debug, Clone)]
pub struct Section {
	name: String,
	is_global: bool,
	lines: Vec<(LineId, Line)>,
	properties: HashMap<String, LineId>,
	first_line: Option<usize>,
	modified: bool,
}

impl Section {
	/// Create a new section headed by `[pattern]`.
	pub fn new(pattern: impl Into<String>) -> Result<Self> {
		let pattern = pattern.into();
		let header = Line::section_header(pattern.clone())?;
		let mut section = Section::empty(pattern, false);
		section.push(header);
		section.modified = true;
		Ok(section)
	}

	/// Create the implicit section for lines before the first header.
	pub fn global() -> Self {
		Section::empty(GLOBAL_SECTION_NAME.to_string(), true)
	}

	/// Start a section from a header parsed at `first_line` (one-based).
	pub(crate) fn from_header(pattern: String, header: Line, first_line: usize) -> Self {
		let mut section = Section::empty(pattern, false);
		section.push(header);
		section.first_line = Some(first_line);
		section
	}

	pub(crate) fn parsed_global() -> Self {
		let mut section = Section::global();
		section.first_line = Some(1);
		section
	}

	fn empty(name: String, is_global: bool) -> Self {
		Section {
			name,
			is_global,
			lines: Vec::new(),
			properties: HashMap::new(),
			first_line: None,
			modified: false,
		}
	}

	/// Copy for staging: same handles, no line numbers, unmodified.
	pub(crate) fn detached(&self) -> Self {
		let mut copy = self.clone();
		copy.first_line = None;
		copy.modified = false;
		copy
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_global(&self) -> bool {
		self.is_global
	}

	/// Number of lines, including the header.
	pub fn len(&self) -> usize {
		self.lines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	pub(crate) fn is_modified(&self) -> bool {
		self.modified
	}

	pub fn header(&self) -> Option<&Line> {
		self.lines
			.first()
			.map(|(_, line)| line)
			.filter(|line| line.is_section_header())
	}

	/// All lines in file order.
	pub fn lines(&self) -> impl Iterator<Item = (LineId, &Line)> {
		self.lines.iter().map(|(id, line)| (*id, line))
	}

	pub fn properties(&self) -> impl Iterator<Item = &Property> {
		self.lines.iter().filter_map(|(_, line)| line.as_property())
	}

	pub fn comments(&self) -> impl Iterator<Item = &Comment> {
		self.lines.iter().filter_map(|(_, line)| line.as_comment())
	}

	pub fn last_line(&self) -> Option<&Line> {
		self.lines.last().map(|(_, line)| line)
	}

	/// Index just past the last line that is not blank; the natural place to
	/// insert a new property without separating it from its neighbours.
	pub fn end_of_content(&self) -> usize {
		let lowest = if self.is_global { 0 } else { 1 };
		self.lines
			.iter()
			.rposition(|(_, line)| !line.is_empty())
			.map_or(lowest, |index| index + 1)
			.max(lowest)
	}

	/// One-based file line number of the line at `offset`, if known.
	pub fn line_number(&self, offset: usize) -> Option<usize> {
		self.first_line.map(|first| first + offset)
	}

	/// Append a line.
	///
	/// Fails with `DuplicateKey` when a property with the same key is already
	/// present, and with `GlobalPropertyNotAllowed` for any key other than `root`
	/// in the global section.
	pub fn add_line(&mut self, line: Line) -> Result<LineId> {
		self.check_insertable(&line, None)?;
		self.modified = true;
		Ok(self.push(line))
	}

	/// Append a line read from disk; same checks as `add_line`, not a modification.
	pub(crate) fn add_parsed_line(&mut self, line: Line) -> Result<LineId> {
		self.check_insertable(&line, None)?;
		Ok(self.push(line))
	}

	/// Insert a line at `index`. A non-global section keeps its header at index 0.
	pub fn insert_line(&mut self, index: usize, line: Line) -> Result<LineId> {
		let lowest = if self.is_global { 0 } else { 1 };
		if index < lowest || index > self.lines.len() {
			return Err(EditorConfigError::invalid_argument(
				"index",
				format!(
					"{index} is outside {lowest}..={} for section [{}]",
					self.lines.len(),
					self.name
				),
			));
		}
		self.check_insertable(&line, None)?;

		let id = next_line_id();
		if let Some(property) = line.as_property() {
			self.properties.insert(property.key().to_string(), id);
		}
		self.lines.insert(index, (id, line));
		self.modified = true;
		Ok(id)
	}

	/// Remove the line with this handle.
	///
	/// Returns `false` when the line is not present (or is the header).
	pub fn remove_line(&mut self, id: LineId) -> bool {
		let Some(position) = self.position(id) else {
			return false;
		};
		if self.lines[position].1.is_section_header() {
			return false;
		}

		let (_, line) = self.lines.remove(position);
		if let Some(property) = line.as_property() {
			self.properties.remove(property.key());
		}
		self.modified = true;
		true
	}

	/// Replace the line with this handle, keeping the handle.
	///
	/// Returns `Ok(false)` when no such line is present.
	pub fn replace_line(&mut self, id: LineId, line: Line) -> Result<bool> {
		let Some(position) = self.position(id) else {
			return Ok(false);
		};
		if self.lines[position].1.is_section_header() {
			return Err(EditorConfigError::InvalidLine {
				reason: "a section header cannot be replaced; remove the section instead".to_string(),
			});
		}
		self.check_insertable(&line, Some(id))?;

		if let Some(old) = self.lines[position].1.as_property() {
			self.properties.remove(old.key());
		}
		if let Some(property) = line.as_property() {
			self.properties.insert(property.key().to_string(), id);
		}
		self.lines[position].1 = line;
		self.modified = true;
		Ok(true)
	}

	/// Look up a property by exact key.
	pub fn try_get_property(&self, key: &str) -> Option<Located<'_, Property>> {
		let id = *self.properties.get(key)?;
		let offset = self.position(id)?;
		let item = self.lines[offset].1.as_property()?;
		Some(Located {
			id,
			offset,
			line_number: self.line_number(offset),
			item,
		})
	}

	/// First comment whose text equals `text`, ignoring case.
	pub fn try_find_comment(&self, text: &str) -> Result<Option<Located<'_, Comment>>> {
		if text.trim().is_empty() {
			return Err(EditorConfigError::invalid_argument(
				"text",
				"comment text must be non-empty",
			));
		}

		let found = self.lines.iter().enumerate().find_map(|(offset, (id, line))| {
			line.as_comment()
				.filter(|comment| comment.text().to_lowercase() == text.to_lowercase())
				.map(|item| Located {
					id: *id,
					offset,
					line_number: self.line_number(offset),
					item,
				})
		});
		Ok(found)
	}

	fn check_insertable(&self, line: &Line, replacing: Option<LineId>) -> Result<()> {
		match line.kind() {
			LineKind::SectionHeader(_) => Err(EditorConfigError::InvalidLine {
				reason: format!("a section header cannot be added inside [{}]", self.name),
			}),
			LineKind::Property(property) => {
				if self.is_global && !property.key().eq_ignore_ascii_case(ROOT_KEY) {
					return Err(EditorConfigError::GlobalPropertyNotAllowed {
						key: property.key().to_string(),
					});
				}
				match self.properties.get(property.key()) {
					Some(existing) if Some(*existing) != replacing => {
						Err(EditorConfigError::DuplicateKey {
							section: self.name.clone(),
							key: property.key().to_string(),
						})
					}
					_ => Ok(()),
				}
			}
			LineKind::Comment(_) | LineKind::Empty => Ok(()),
		}
	}

	fn push(&mut self, line: Line) -> LineId {
		let id = next_line_id();
		if let Some(property) = line.as_property() {
			self.properties.insert(property.key().to_string(), id);
		}
		self.lines.push((id, line));
		id
	}

	fn position(&self, id: LineId) -> Option<usize> {
		self.lines.iter().position(|(line_id, _)| *line_id == id)
	}
}

fn next_line_id() -> LineId {
	LineId(NEXT_LINE_ID.fetch_add(1, Ordering::Relaxed))
}
