use crate::config::EditOptions;
use crate::document::file::{Document, join_lines};
use crate::document::lock::FileLock;
use crate::document::section::Section;
use crate::error::{EditorConfigError, Result};
use std::io::Write;
use std::path::Path;

/// A locked, staged edit of a [`Document`].
///
/// Mutations only touch the staged copy. Nothing reaches disk until
/// [`commit`](EditSession::commit); dropping the session without committing
/// leaves the file and the document as they were.
#[derive(Debug)]
pub struct EditSession<'a> {
	document: &'a mut Document,
	options: EditOptions,
	lock: Option<FileLock>,
	global: Section,
	sections: Vec<Section>,
	sections_changed: bool,
}

impl<'a> EditSession<'a> {
	pub(crate) fn new(document: &'a mut Document, options: EditOptions) -> Result<Self> {
		let lock = FileLock::acquire(document.full_path())?;
		let global = document.global().detached();
		let sections = document.sections().iter().map(Section::detached).collect();

		Ok(EditSession {
			document,
			options,
			lock: Some(lock),
			global,
			sections,
			sections_changed: false,
		})
	}

	pub fn options(&self) -> &EditOptions {
		&self.options
	}

	pub fn global(&self) -> &Section {
		&self.global
	}

	pub fn global_mut(&mut self) -> &mut Section {
		&mut self.global
	}

	/// Staged sections in the order they will be written.
	pub fn sections(&self) -> &[Section] {
		&self.sections
	}

	pub fn section(&self, name: &str) -> Option<&Section> {
		self.sections.iter().find(|section| section.name() == name)
	}

	pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
		self.sections.iter_mut().find(|section| section.name() == name)
	}

	/// The staged section with this name, appending an empty one if there is none.
	pub fn get_or_add_section(&mut self, name: &str) -> Result<&mut Section> {
		if name.trim().is_empty() {
			return Err(EditorConfigError::invalid_argument(
				"name",
				"section name must be non-empty",
			));
		}

		let index = match self.sections.iter().position(|section| section.name() == name) {
			Some(index) => index,
			None => {
				self.sections.push(Section::new(name)?);
				self.sections_changed = true;
				self.sections.len() - 1
			}
		};
		Ok(&mut self.sections[index])
	}

	/// Append a fully built section.
	pub fn add_section(&mut self, section: Section) -> Result<()> {
		if section.is_global() {
			return Err(EditorConfigError::invalid_argument(
				"section",
				"the global section cannot be added",
			));
		}
		self.sections.push(section);
		self.sections_changed = true;
		Ok(())
	}

	/// Remove the first staged section with this name.
	pub fn remove_section(&mut self, name: &str) -> bool {
		match self.sections.iter().position(|section| section.name() == name) {
			Some(index) => {
				self.sections.remove(index);
				self.sections_changed = true;
				true
			}
			None => false,
		}
	}

	/// Whether anything has been staged since the session started or last committed.
	pub fn has_changes(&self) -> bool {
		self.sections_changed
			|| self.global.is_modified()
			|| self.sections.iter().any(Section::is_modified)
	}

	/// The lines a commit would write.
	pub fn render(&self) -> Vec<String> {
		let blocks: Vec<&Section> = std::iter::once(&self.global)
			.chain(self.sections.iter())
			.filter(|section| !section.is_empty())
			.collect();

		let mut out: Vec<String> = Vec::new();
		let mut previous_blank = false;

		for (index, section) in blocks.iter().enumerate() {
			for (_, line) in section.lines() {
				let text = line.to_string();
				let blank = line.is_empty() && text.trim().is_empty();
				let is_new = line.original_text().is_none();

				if blank && is_new && previous_blank && !self.options.allow_consecutive_empty_lines {
					continue;
				}
				out.push(text);
				previous_blank = blank;
			}

			let followed_by_section = index + 1 < blocks.len();
			let ends_open = section
				.last_line()
				.is_some_and(|line| !line.is_comment() && !line.is_empty());

			if section.is_modified()
				&& followed_by_section
				&& ends_open
				&& self.options.end_section_with_blank_line_or_comment
			{
				out.push(String::new());
				previous_blank = true;
			}
		}

		if self.options.trim_empty_line_from_end_of_file {
			while out.last().is_some_and(|line| line.trim().is_empty()) {
				out.pop();
			}
		}

		out
	}

	/// Write the staged document to disk and re-parse the backing document from it.
	///
	/// If nothing was staged the original bytes are written back unchanged. On
	/// failure the session stays open with its staged changes, so it can be retried.
	pub fn commit(&mut self) -> Result<()> {
		let path = self.document.full_path().to_path_buf();

		let text = if self.has_changes() {
			let lines = self.render();
			let trailing_newline =
				self.document.trailing_newline() || self.document.lines().is_empty();
			join_lines(&lines, self.document.line_ending(), trailing_newline)
		} else {
			self.document.source().to_string()
		};
		let bytes = self.document.encode(&text);

		if !path.is_file() {
			return Err(EditorConfigError::ConfigWriteError {
				path,
				source: std::io::Error::new(
					std::io::ErrorKind::NotFound,
					"config file was removed during the edit session",
				),
			});
		}

		// The lock handle is exclusive on some platforms, so write through a fresh one.
		self.lock.take();
		let written = write_existing(&path, &bytes);
		let relocked = FileLock::acquire(&path);
		written?;
		self.lock = Some(relocked?);

		self.document.load(&text)?;
		self.global = self.document.global().detached();
		self.sections = self.document.sections().iter().map(Section::detached).collect();
		self.sections_changed = false;

		tracing::debug!(
			path = %path.display(),
			lines = self.document.lines().len(),
			"committed edit session"
		);
		Ok(())
	}

	/// End the session without writing anything.
	pub fn dispose(self) {}
}

fn write_existing(path: &Path, bytes: &[u8]) -> Result<()> {
	let to_error = |source| EditorConfigError::ConfigWriteError {
		path: path.to_path_buf(),
		source,
	};

	let mut file = std::fs::OpenOptions::new()
		.write(true)
		.truncate(true)
		.open(path)
		.map_err(to_error)?;
	file.write_all(bytes).map_err(to_error)?;
	file.flush().map_err(to_error)
}
