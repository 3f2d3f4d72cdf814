use crate::document::Document;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Candidate config file locations for `file`, nearest directory first.
///
/// Every ancestor directory is listed, up to and including the filesystem root.
pub fn config_file_candidates(file: &Path, config_file_name: &str) -> Vec<PathBuf> {
	file.ancestors()
		.skip(1)
		.map(|dir| dir.join(config_file_name))
		.collect()
}

/// Discover and load all config files that apply to `file`.
///
/// The cascade order is:
/// 1. Start in the directory holding `file` and look for `config_file_name`
/// 2. If found and it declares `root = true`, stop there
/// 3. Otherwise, continue up the directory tree until the filesystem root
///
/// Returns documents nearest first.
pub fn discover_config_files(file: &Path, config_file_name: &str) -> Result<Vec<Document>> {
	let mut documents = Vec::new();

	for config_path in config_file_candidates(file, config_file_name) {
		if !config_path.is_file() {
			continue;
		}

		let document = Document::parse(&config_path)?;
		debug!(
			path = %config_path.display(),
			root = document.is_root(),
			sections = document.sections().len(),
			"loaded config file"
		);

		let is_root = document.is_root();
		documents.push(document);

		if is_root {
			debug!(path = %config_path.display(), "root config file, parent directories ignored");
			break;
		}
	}

	Ok(documents)
}
