use crate::document::edit::EditSession;
use crate::document::line::{Comment, Line, LineKind, Property};
use crate::document::section::{Located, ROOT_KEY, Section};
use crate::config::EditOptions;
use crate::error::{EditorConfigError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
	#[default]
	Utf8,
	/// UTF-8 preceded by a byte-order mark, which is written back on save.
	Utf8Bom,
}

/// Line terminator used when writing a file back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
	#[default]
	Lf,
	CrLf,
	Cr,
}

impl LineEnding {
	pub fn as_str(&self) -> &'static str {
		match self {
			LineEnding::Lf => "\n",
			LineEnding::CrLf => "\r\n",
			LineEnding::Cr => "\r",
		}
	}
}

/// A parsed `.editorconfig` file.
///
/// The document keeps every physical line so that untouched lines are written
/// back exactly. It is only ever rebuilt by a full re-parse.
#[derive(Debug, Clone)]
pub struct Document {
	full_path: PathBuf,
	directory: PathBuf,
	encoding: TextEncoding,
	line_ending: LineEnding,
	trailing_newline: bool,
	source: String,
	lines: Vec<String>,
	global: Section,
	sections: Vec<Section>,
	section_index: HashMap<String, usize>,
	is_root: bool,
}

impl Document {
	/// Read and parse the config file at `path`.
	pub fn parse(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		if path.as_os_str().to_string_lossy().trim().is_empty() {
			return Err(EditorConfigError::invalid_argument(
				"path",
				"the given path must be non-empty",
			));
		}
		if !path.is_file() {
			return Err(EditorConfigError::ConfigNotFound {
				path: path.to_path_buf(),
			});
		}

		let bytes = std::fs::read(path).map_err(|source| EditorConfigError::ConfigReadError {
			path: path.to_path_buf(),
			source,
		})?;

		let (encoding, body) = match bytes.strip_prefix(UTF8_BOM) {
			Some(rest) => (TextEncoding::Utf8Bom, rest),
			None => (TextEncoding::Utf8, bytes.as_slice()),
		};
		let content = std::str::from_utf8(body).map_err(|_| EditorConfigError::InvalidEncoding {
			path: path.to_path_buf(),
		})?;

		let mut document = Document::parse_str(content, path)?;
		document.encoding = encoding;
		Ok(document)
	}

	/// Parse config text as if it had been read from `path`.
	pub fn parse_str(content: &str, path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let mut document = Document {
			full_path: path.to_path_buf(),
			directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
			encoding: TextEncoding::default(),
			line_ending: LineEnding::default(),
			trailing_newline: true,
			source: String::new(),
			lines: Vec::new(),
			global: Section::parsed_global(),
			sections: Vec::new(),
			section_index: HashMap::new(),
			is_root: false,
		};
		document.load(content)?;
		Ok(document)
	}

	/// Replace the content with freshly written text and re-parse it.
	pub(crate) fn load(&mut self, content: &str) -> Result<()> {
		let split = split_lines(content);
		self.reset_to(split.lines)?;
		self.line_ending = split.ending.unwrap_or(self.line_ending);
		self.trailing_newline = split.trailing_newline;
		self.source = content.to_string();
		Ok(())
	}

	/// Discard all parsed state and rebuild it from `lines`.
	///
	/// On failure the document is left as it was.
	pub fn reset_to(&mut self, lines: Vec<String>) -> Result<()> {
		let (global, sections) = parse_sections(&lines)?;

		self.is_root = global
			.properties()
			.find(|property| property.key().eq_ignore_ascii_case(ROOT_KEY))
			.and_then(|property| parse_bool(property.value()))
			.unwrap_or(false);

		self.section_index.clear();
		for (index, section) in sections.iter().enumerate() {
			self.section_index
				.entry(section.name().to_string())
				.or_insert(index);
		}

		self.source = join_lines(&lines, self.line_ending, self.trailing_newline);
		self.lines = lines;
		self.global = global;
		self.sections = sections;
		Ok(())
	}

	pub fn full_path(&self) -> &Path {
		&self.full_path
	}

	/// Directory holding the file; section globs are anchored here.
	pub fn directory(&self) -> &Path {
		&self.directory
	}

	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	pub fn line_ending(&self) -> LineEnding {
		self.line_ending
	}

	pub(crate) fn trailing_newline(&self) -> bool {
		self.trailing_newline
	}

	/// True when the global section declares `root = true`.
	pub fn is_root(&self) -> bool {
		self.is_root
	}

	pub fn global(&self) -> &Section {
		&self.global
	}

	/// Sections in file order, excluding the global section.
	pub fn sections(&self) -> &[Section] {
		&self.sections
	}

	/// First section with this name.
	pub fn section(&self, name: &str) -> Option<&Section> {
		self.section_index
			.get(name)
			.and_then(|index| self.sections.get(*index))
	}

	/// Physical lines as read.
	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	/// Look up a property in one of this document's sections.
	pub fn try_get_property<'a>(
		&self,
		section: &'a Section,
		key: &str,
	) -> Result<Option<Located<'a, Property>>> {
		if key.trim().is_empty() {
			return Err(EditorConfigError::invalid_argument(
				"key",
				"property key must be non-empty",
			));
		}
		Ok(section.try_get_property(key))
	}

	/// Find a comment in one of this document's sections, ignoring case.
	pub fn try_find_comment<'a>(
		&self,
		section: &'a Section,
		text: &str,
	) -> Result<Option<Located<'a, Comment>>> {
		section.try_find_comment(text)
	}

	/// Start an edit session with default options.
	pub fn edit(&mut self) -> Result<EditSession<'_>> {
		self.edit_with(EditOptions::default())
	}

	/// Start an edit session. Holds an exclusive lock on the file until dropped.
	pub fn edit_with(&mut self, options: EditOptions) -> Result<EditSession<'_>> {
		EditSession::new(self, options)
	}

	/// Exact text the document was last loaded from, without any byte-order mark.
	pub(crate) fn source(&self) -> &str {
		&self.source
	}

	pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
		if self.encoding == TextEncoding::Utf8Bom {
			bytes.extend_from_slice(UTF8_BOM);
		}
		bytes.extend_from_slice(text.as_bytes());
		bytes
	}
}

fn parse_sections(lines: &[String]) -> Result<(Section, Vec<Section>)> {
	let mut global = Section::parsed_global();
	let mut sections: Vec<Section> = Vec::new();

	for (current_line_number, raw) in lines.iter().enumerate() {
		let line = Line::parse(raw);

		if let LineKind::SectionHeader(pattern) = line.kind() {
			let pattern = pattern.clone();
			sections.push(Section::from_header(pattern, line, current_line_number + 1));
			continue;
		}

		let active = sections.last_mut().unwrap_or(&mut global);
		active.add_parsed_line(line)?;
	}

	Ok((global, sections))
}

/// Parse a boolean the way config values are compared: trimmed, case-insensitive.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
	let value = value.trim();
	if value.eq_ignore_ascii_case("true") {
		Some(true)
	} else if value.eq_ignore_ascii_case("false") {
		Some(false)
	} else {
		None
	}
}

pub(crate) struct SplitLines {
	pub(crate) lines: Vec<String>,
	pub(crate) ending: Option<LineEnding>,
	pub(crate) trailing_newline: bool,
}

/// Split on `\r\n`, `\n` or `\r`, remembering the first terminator seen.
pub(crate) fn split_lines(content: &str) -> SplitLines {
	let bytes = content.as_bytes();
	let mut lines = Vec::new();
	let mut ending = None;
	let mut start = 0;
	let mut i = 0;

	while i < bytes.len() {
		match bytes[i] {
			b'\n' => {
				lines.push(content[start..i].to_string());
				ending.get_or_insert(LineEnding::Lf);
				i += 1;
				start = i;
			}
			b'\r' => {
				lines.push(content[start..i].to_string());
				if bytes.get(i + 1) == Some(&b'\n') {
					ending.get_or_insert(LineEnding::CrLf);
					i += 2;
				} else {
					ending.get_or_insert(LineEnding::Cr);
					i += 1;
				}
				start = i;
			}
			_ => i += 1,
		}
	}

	let trailing_newline = start == bytes.len();
	if !trailing_newline {
		lines.push(content[start..].to_string());
	}

	SplitLines {
		lines,
		ending,
		trailing_newline,
	}
}

pub(crate) fn join_lines(lines: &[String], ending: LineEnding, trailing_newline: bool) -> String {
	let mut text = lines.join(ending.as_str());
	if trailing_newline && !lines.is_empty() {
		text.push_str(ending.as_str());
	}
	text
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const SAMPLE: &str = "\
# top of file
root = true
# GLOBAL COMMENT

[*]
indent_style = space
beforecomment = 1
# SECTION COMMENT
aftercomment = 2

[*.md]
trim_trailing_whitespace = false
";

	#[test]
	fn test_parse_sample_structure() {
		let doc = Document::parse_str(SAMPLE, "/project/.editorconfig").unwrap();

		assert!(doc.is_root());
		assert_eq!(doc.directory(), Path::new("/project"));
		assert_eq!(doc.sections().len(), 2);
		assert_eq!(doc.sections()[0].name(), "*");
		assert_eq!(doc.sections()[1].name(), "*.md");
		assert_eq!(doc.global().len(), 4);
		assert!(doc.global().is_global());
	}

	#[test]
	fn test_absolute_line_numbers() {
		let doc = Document::parse_str(SAMPLE, "/project/.editorconfig").unwrap();

		let global = doc.global();
		let comment = doc.try_find_comment(global, "global comment").unwrap().unwrap();
		assert_eq!(comment.line_number, Some(3));

		let section = doc.section("*").unwrap();
		let comment = doc.try_find_comment(section, "SECTION COMMENT").unwrap().unwrap();
		assert_eq!(comment.line_number, Some(8));

		let property = doc.try_get_property(section, "aftercomment").unwrap().unwrap();
		assert_eq!(property.line_number, Some(9));
		assert_eq!(doc.lines()[8], "aftercomment = 2");

		let md = doc.section("*.md").unwrap();
		let property = doc
			.try_get_property(md, "trim_trailing_whitespace")
			.unwrap()
			.unwrap();
		assert_eq!(property.line_number, Some(12));
	}

	#[test]
	fn test_duplicate_key_fails_whole_parse() {
		let result = Document::parse_str("[*]\nfoo = 1\nfoo = 2\n", "/p/.editorconfig");
		assert!(matches!(result, Err(EditorConfigError::DuplicateKey { .. })));
	}

	#[test]
	fn test_same_key_in_different_sections_is_fine() {
		let doc = Document::parse_str("[*]\nfoo = 1\n[*.x]\nfoo = 2\n", "/p/.editorconfig").unwrap();
		assert_eq!(doc.sections().len(), 2);
	}

	#[test]
	fn test_property_before_first_section_fails() {
		let result = Document::parse_str("indent_size = 2\n[*]\n", "/p/.editorconfig");
		assert!(matches!(
			result,
			Err(EditorConfigError::GlobalPropertyNotAllowed { .. })
		));
	}

	#[test]
	fn test_root_flag_values() {
		let parse = |text: &str| Document::parse_str(text, "/p/.editorconfig").unwrap();

		assert!(parse("root = TRUE\n").is_root());
		assert!(!parse("root = false\n").is_root());
		assert!(!parse("root = maybe\n").is_root());
		assert!(!parse("[*]\n").is_root());
		// root inside a section does not count
		assert!(!parse("[*]\nroot = true\n").is_root());
	}

	#[test]
	fn test_duplicate_section_names_resolve_to_first() {
		let doc = Document::parse_str("[*]\na = 1\n[*]\nb = 2\n", "/p/.editorconfig").unwrap();
		assert_eq!(doc.sections().len(), 2);
		assert!(doc.section("*").unwrap().try_get_property("a").is_some());
	}

	#[test]
	fn test_split_lines_endings() {
		let split = split_lines("a\r\nb\r\n");
		assert_eq!(split.lines, vec!["a", "b"]);
		assert_eq!(split.ending, Some(LineEnding::CrLf));
		assert!(split.trailing_newline);

		let split = split_lines("a\rb");
		assert_eq!(split.lines, vec!["a", "b"]);
		assert_eq!(split.ending, Some(LineEnding::Cr));
		assert!(!split.trailing_newline);

		let split = split_lines("");
		assert!(split.lines.is_empty());
		assert_eq!(split.ending, None);
	}

	#[test]
	fn test_parse_from_disk_with_bom() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join(".editorconfig");
		let mut bytes = UTF8_BOM.to_vec();
		bytes.extend_from_slice(b"root = true\r\n[*]\r\nindent_size = 4\r\n");
		fs::write(&path, &bytes).unwrap();

		let doc = Document::parse(&path).unwrap();
		assert_eq!(doc.encoding(), TextEncoding::Utf8Bom);
		assert_eq!(doc.line_ending(), LineEnding::CrLf);
		assert!(doc.is_root());
		assert_eq!(doc.encode(doc.source()), bytes);
	}

	#[test]
	fn test_parse_rejects_bad_paths() {
		assert!(matches!(
			Document::parse("  "),
			Err(EditorConfigError::InvalidArgument { .. })
		));

		let dir = TempDir::new().unwrap();
		assert!(matches!(
			Document::parse(dir.path().join("missing")),
			Err(EditorConfigError::ConfigNotFound { .. })
		));
	}

	#[test]
	fn test_parse_rejects_invalid_utf8() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join(".editorconfig");
		fs::write(&path, b"[*]\nkey = \xFF\n").unwrap();

		assert!(matches!(
			Document::parse(&path),
			Err(EditorConfigError::InvalidEncoding { .. })
		));
	}

	#[test]
	fn test_reset_to_failure_keeps_previous_state() {
		let mut doc = Document::parse_str(SAMPLE, "/p/.editorconfig").unwrap();
		let result = doc.reset_to(vec!["[*]".into(), "a=1".into(), "a=2".into()]);

		assert!(result.is_err());
		assert_eq!(doc.sections().len(), 2);
		assert!(doc.is_root());
	}
}
