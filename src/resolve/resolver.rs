use crate::config::ResolverOptions;
use crate::document::Document;
use crate::error::{EditorConfigError, Result};
use crate::resolve::cascade::discover_config_files;
use crate::resolve::glob::{GlobMatcher, RegexGlobMatcher};
use crate::settings::{ResolvedSettings, sanitize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Characters with a meaning in section globs.
const GLOB_META: [char; 8] = ['*', '?', '[', ']', '{', '}', ',', '\\'];

/// Resolves the effective settings of files from the config files above them.
#[derive(Debug)]
pub struct Resolver<M = RegexGlobMatcher> {
	options: ResolverOptions,
	matcher: M,
}

impl Resolver {
	pub fn new(options: ResolverOptions) -> Result<Self> {
		Resolver::with_matcher(options, RegexGlobMatcher::new())
	}
}

impl Default for Resolver {
	fn default() -> Self {
		Resolver {
			options: ResolverOptions::default(),
			matcher: RegexGlobMatcher::new(),
		}
	}
}

impl<M: GlobMatcher> Resolver<M> {
	/// Create a resolver that tests section globs with `matcher`.
	pub fn with_matcher(options: ResolverOptions, matcher: M) -> Result<Self> {
		options.validate()?;
		Ok(Resolver { options, matcher })
	}

	pub fn options(&self) -> &ResolverOptions {
		&self.options
	}

	/// Resolve the settings for one file.
	///
	/// Sections are applied from the outermost config file inwards and in file
	/// order within each, so the last matching assignment of a key wins.
	pub fn resolve(&self, path: &str) -> Result<ResolvedSettings> {
		let file_name = path.trim();
		let full_path = absolute_path(file_name)?;
		let target = to_glob_path(&full_path);
		let documents = self.config_files_for(&full_path)?;

		let mut properties = BTreeMap::new();
		for document in &documents {
			for section in document.sections() {
				let glob = anchor_glob(section.name(), document.directory());
				let matched = self.matcher.is_match(&glob, &target);
				trace!(glob = %glob, path = %target, matched, "section glob");
				if !matched {
					continue;
				}

				for property in section.properties() {
					let (key, value) = sanitize(property.key(), property.value());
					properties.insert(key, value);
				}
			}
		}

		debug!(
			path = %target,
			config_files = documents.len(),
			properties = properties.len(),
			"resolved settings"
		);
		Ok(ResolvedSettings::new(
			self.options.version.clone(),
			file_name,
			properties,
		))
	}

	/// Resolve several files, in order. The first failure aborts.
	pub fn resolve_many<I, S>(&self, paths: I) -> Result<Vec<ResolvedSettings>>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		paths
			.into_iter()
			.map(|path| self.resolve(path.as_ref()))
			.collect()
	}

	/// The config files that apply to `path`, outermost first.
	pub fn config_files(&self, path: &str) -> Result<Vec<Document>> {
		let full_path = absolute_path(path.trim())?;
		self.config_files_for(&full_path)
	}

	fn config_files_for(&self, full_path: &Path) -> Result<Vec<Document>> {
		let mut documents = discover_config_files(full_path, &self.options.config_file_name)?;
		documents.reverse();
		Ok(documents)
	}
}

/// Anchor a section pattern to the directory of the file declaring it.
///
/// A pattern without `/` may match at any depth below the directory; a
/// leading `/` only anchors it to the directory.
pub fn anchor_glob(pattern: &str, directory: &Path) -> String {
	let pattern = match pattern.find('/') {
		None => format!("**/{pattern}"),
		Some(0) => pattern[1..].to_string(),
		Some(_) => pattern.to_string(),
	};

	let mut directory = escape_glob(&to_glob_path(directory));
	if !directory.ends_with('/') {
		directory.push('/');
	}
	format!("{directory}{pattern}")
}

fn escape_glob(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		if GLOB_META.contains(&c) {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}

fn to_glob_path(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}

fn absolute_path(file_name: &str) -> Result<PathBuf> {
	if file_name.is_empty() {
		return Err(EditorConfigError::invalid_argument(
			"path",
			"the file name must be non-empty",
		));
	}

	let absolute = std::path::absolute(file_name).map_err(|err| {
		EditorConfigError::invalid_argument("path", format!("cannot make `{file_name}` absolute: {err}"))
	})?;
	Ok(normalize_lexically(&absolute))
}

/// Drop `.` and resolve `..` against the preceding component, without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				// `..` at the root stays at the root
				if !matches!(
					normalized.components().next_back(),
					None | Some(Component::RootDir | Component::Prefix(_))
				) {
					normalized.pop();
				}
			}
			other => normalized.push(other),
		}
	}
	normalized
}

#[cfg(test)]
mod tests {
	use super::*;
	use semver::Version;
	use std::fs;
	use tempfile::TempDir;

	fn write(root: &Path, relative: &str, content: &str) {
		let path = root.join(relative);
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent).unwrap();
		}
		fs::write(path, content).unwrap();
	}

	fn resolve(root: &Path, relative: &str) -> ResolvedSettings {
		Resolver::default()
			.resolve(&root.join(relative).to_string_lossy())
			.unwrap()
	}

	#[test]
	fn test_anchor_glob() {
		let dir = Path::new("/a/b");
		assert_eq!(anchor_glob("*.x", dir), "/a/b/**/*.x");
		assert_eq!(anchor_glob("/f.x", dir), "/a/b/f.x");
		assert_eq!(anchor_glob("sub/*.x", dir), "/a/b/sub/*.x");
		assert_eq!(anchor_glob("*", Path::new("/")), "/**/*");
	}

	#[test]
	fn test_anchor_glob_escapes_directory() {
		let dir = Path::new("/a[1]/{b,c}");
		assert_eq!(anchor_glob("*.x", dir), r"/a\[1\]/\{b\,c\}/**/*.x");
	}

	#[test]
	fn test_normalize_lexically() {
		assert_eq!(normalize_lexically(Path::new("/a/b/../f.x")), PathBuf::from("/a/f.x"));
		assert_eq!(normalize_lexically(Path::new("/a/./b/f.x")), PathBuf::from("/a/b/f.x"));
		assert_eq!(normalize_lexically(Path::new("/../f.x")), PathBuf::from("/f.x"));
	}

	#[test]
	fn test_parent_components_do_not_pull_in_sibling_configs() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n[*]\nindent_size = 4\n");
		write(temp.path(), "sub/.editorconfig", "[*]\nonly_sub = leaked\n");

		let dotted = temp.path().join("sub").join("..").join("f.x");
		let resolver = Resolver::default();
		let settings = resolver.resolve(&dotted.to_string_lossy()).unwrap();
		assert_eq!(settings.get("only_sub"), None);
		assert_eq!(settings.get("indent_size"), Some("4"));

		let documents = resolver.config_files(&dotted.to_string_lossy()).unwrap();
		assert_eq!(documents.len(), 1);
		assert_eq!(documents[0].full_path(), temp.path().join(".editorconfig"));
	}

	#[test]
	fn test_resolves_matching_sections() {
		let temp = TempDir::new().unwrap();
		write(
			temp.path(),
			".editorconfig",
			"root = true\n\n[*]\nend_of_line = lf\n\n[*.x]\nindent_style = space\n\n[*.y]\nindent_style = tab\n",
		);

		let settings = resolve(temp.path(), "f.x");
		assert_eq!(settings.get("end_of_line"), Some("lf"));
		assert_eq!(settings.get("indent_style"), Some("space"));
		assert_eq!(settings.properties().len(), 2);
	}

	#[test]
	fn test_later_sections_and_nearer_files_win() {
		let temp = TempDir::new().unwrap();
		write(
			temp.path(),
			".editorconfig",
			"root = true\n[*]\na = outer\nb = outer\n[*.x]\nb = later\n",
		);
		write(temp.path(), "sub/.editorconfig", "[*]\na = inner\n");

		let settings = resolve(temp.path(), "sub/f.x");
		assert_eq!(settings.get("a"), Some("inner"));
		assert_eq!(settings.get("b"), Some("later"));
	}

	#[test]
	fn test_root_file_hides_parent_directories() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n[*]\na = outer\nb = outer\n");
		write(temp.path(), "sub/.editorconfig", "root = true\n[*]\na = inner\n");

		let settings = resolve(temp.path(), "sub/f.x");
		assert_eq!(settings.get("a"), Some("inner"));
		assert_eq!(settings.get("b"), None);
	}

	#[test]
	fn test_globs_are_anchored_to_declaring_directory() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n");
		write(temp.path(), "a/b/.editorconfig", "[*.x]\nk = v\n");

		assert_eq!(resolve(temp.path(), "a/b/f.x").get("k"), Some("v"));
		assert_eq!(resolve(temp.path(), "a/b/c/f.x").get("k"), Some("v"));
		assert_eq!(resolve(temp.path(), "a/other/f.x").get("k"), None);
	}

	#[test]
	fn test_leading_slash_and_path_patterns() {
		let temp = TempDir::new().unwrap();
		write(
			temp.path(),
			".editorconfig",
			"root = true\n[/f.x]\ntop = yes\n[sub/*.x]\nnested = yes\n",
		);

		let top = resolve(temp.path(), "f.x");
		assert_eq!(top.get("top"), Some("yes"));
		assert_eq!(top.get("nested"), None);

		let nested = resolve(temp.path(), "sub/f.x");
		assert_eq!(nested.get("top"), None);
		assert_eq!(nested.get("nested"), Some("yes"));

		assert_eq!(resolve(temp.path(), "sub/deeper/f.x").get("nested"), None);
	}

	#[test]
	fn test_directory_with_glob_characters() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), "a[1]/.editorconfig", "root = true\n[*.x]\nk = v\n");

		assert_eq!(resolve(temp.path(), "a[1]/f.x").get("k"), Some("v"));
	}

	#[test]
	fn test_keys_and_known_values_are_lowercased() {
		let temp = TempDir::new().unwrap();
		write(
			temp.path(),
			".editorconfig",
			"root = true\n[*]\nINDENT_STYLE = TAB\nMy_Key = MixedCase\n",
		);

		let settings = resolve(temp.path(), "f.x");
		assert_eq!(settings.get("indent_style"), Some("tab"));
		assert_eq!(settings.get("my_key"), Some("MixedCase"));
		assert_eq!(settings.get("indent_size"), Some("tab"));
	}

	#[test]
	fn test_version_is_threaded_through() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n[*]\nindent_style = tab\n");

		let options = ResolverOptions::default().with_version(Version::new(0, 9, 0));
		let settings = Resolver::new(options)
			.unwrap()
			.resolve(&temp.path().join("f.x").to_string_lossy())
			.unwrap();
		assert_eq!(settings.get("indent_size"), None);
		assert_eq!(settings.version(), &Version::new(0, 9, 0));
	}

	#[test]
	fn test_no_config_files_gives_empty_settings() {
		let temp = TempDir::new().unwrap();
		let options =
			ResolverOptions::default().with_config_file_name(".no-such-editorconfig-file");
		let resolver = Resolver::new(options).unwrap();

		let path = format!("  {}\n", temp.path().join("f.x").display());
		let settings = resolver.resolve(&path).unwrap();
		assert!(settings.properties().is_empty());
		assert_eq!(settings.file_name(), path.trim());
	}

	#[test]
	fn test_blank_path_is_rejected() {
		let resolver = Resolver::default();
		assert!(matches!(
			resolver.resolve("   "),
			Err(EditorConfigError::InvalidArgument { name: "path", .. })
		));
	}

	#[test]
	fn test_invalid_config_file_name_is_rejected() {
		let options = ResolverOptions::default().with_config_file_name("");
		assert!(Resolver::new(options).is_err());
	}

	#[test]
	fn test_config_files_are_outermost_first() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n");
		write(temp.path(), "a/.editorconfig", "[*]\nk = v\n");

		let documents = Resolver::default()
			.config_files(&temp.path().join("a/f.x").to_string_lossy())
			.unwrap();
		assert_eq!(documents.len(), 2);
		assert!(documents[0].is_root());
		assert_eq!(documents[1].directory(), temp.path().join("a"));
	}

	#[test]
	fn test_resolve_many_keeps_input_order() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n[*.x]\nk = x\n[*.y]\nk = y\n");

		let paths = [temp.path().join("f.y"), temp.path().join("f.x")]
			.map(|path| path.to_string_lossy().into_owned());
		let results = Resolver::default().resolve_many(&paths).unwrap();
		assert_eq!(results.len(), 2);
		assert_eq!(results[0].get("k"), Some("y"));
		assert_eq!(results[1].get("k"), Some("x"));
	}

	#[test]
	fn test_custom_matcher() {
		let temp = TempDir::new().unwrap();
		write(temp.path(), ".editorconfig", "root = true\n[*.nothing]\nk = v\n");

		let always = |_pattern: &str, _path: &str| true;
		let resolver = Resolver::with_matcher(ResolverOptions::default(), always).unwrap();
		let settings = resolver
			.resolve(&temp.path().join("f.x").to_string_lossy())
			.unwrap();
		assert_eq!(settings.get("k"), Some("v"));
	}
}
