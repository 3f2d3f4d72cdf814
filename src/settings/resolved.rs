use crate::document::file::parse_bool;
use crate::settings::types::{Charset, EndOfLine, IndentSize, IndentStyle, parse_positive};
use semver::Version;
use serde::Serialize;
use std::collections::BTreeMap;

/// Keys whose values are case-insensitive and therefore lowercased.
pub const KNOWN_PROPERTIES: [&str; 9] = [
	"indent_style",
	"indent_size",
	"tab_width",
	"end_of_line",
	"charset",
	"trim_trailing_whitespace",
	"insert_final_newline",
	"max_line_length",
	"root",
];

/// Normalize one key/value pair: the key is lowercased, and so is the value of a known key.
pub fn sanitize(key: &str, value: &str) -> (String, String) {
	let key = key.to_lowercase();
	let value = if KNOWN_PROPERTIES.contains(&key.as_str()) {
		value.to_lowercase()
	} else {
		value.to_string()
	};
	(key, value)
}

/// The merged editorconfig settings for one file.
///
/// The raw map keeps every property, including unknown keys and values that
/// did not parse; the typed accessors are only set for recognized values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSettings {
	file_name: String,
	version: Version,
	properties: BTreeMap<String, String>,
	indent_style: Option<IndentStyle>,
	indent_size: Option<IndentSize>,
	tab_width: Option<u32>,
	end_of_line: Option<EndOfLine>,
	charset: Option<Charset>,
	trim_trailing_whitespace: Option<bool>,
	insert_final_newline: Option<bool>,
	max_line_length: Option<u32>,
}

impl ResolvedSettings {
	/// Apply the cross-field defaults for `version` and parse the known keys.
	pub fn new(
		version: Version,
		file_name: impl Into<String>,
		mut properties: BTreeMap<String, String>,
	) -> Self {
		apply_defaults(&mut properties, &version);

		let value = |key: &str| properties.get(key).map(String::as_str);

		let indent_size = value("indent_size").and_then(IndentSize::from_value);

		// tab_width follows a numeric indent_size unless it is given itself
		let tab_width = value("tab_width")
			.and_then(parse_positive)
			.or_else(|| indent_size.and_then(|size| size.number_of_columns()));

		ResolvedSettings {
			indent_style: value("indent_style").and_then(IndentStyle::from_value),
			indent_size,
			tab_width,
			end_of_line: value("end_of_line").and_then(EndOfLine::from_value),
			charset: value("charset").and_then(Charset::from_value),
			trim_trailing_whitespace: value("trim_trailing_whitespace").and_then(parse_bool),
			insert_final_newline: value("insert_final_newline").and_then(parse_bool),
			max_line_length: value("max_line_length").and_then(parse_positive),
			file_name: file_name.into(),
			version,
			properties,
		}
	}

	/// The file name the settings were asked for.
	pub fn file_name(&self) -> &str {
		&self.file_name
	}

	/// Rule-set version the settings were resolved with.
	pub fn version(&self) -> &Version {
		&self.version
	}

	/// Every merged property, sanitized, after defaulting.
	pub fn properties(&self) -> &BTreeMap<String, String> {
		&self.properties
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.properties.get(key).map(String::as_str)
	}

	pub fn indent_style(&self) -> Option<IndentStyle> {
		self.indent_style
	}

	pub fn indent_size(&self) -> Option<IndentSize> {
		self.indent_size
	}

	pub fn tab_width(&self) -> Option<u32> {
		self.tab_width
	}

	pub fn end_of_line(&self) -> Option<EndOfLine> {
		self.end_of_line
	}

	pub fn charset(&self) -> Option<Charset> {
		self.charset
	}

	pub fn trim_trailing_whitespace(&self) -> Option<bool> {
		self.trim_trailing_whitespace
	}

	pub fn insert_final_newline(&self) -> Option<bool> {
		self.insert_final_newline
	}

	pub fn max_line_length(&self) -> Option<u32> {
		self.max_line_length
	}
}

fn apply_defaults(properties: &mut BTreeMap<String, String>, version: &Version) {
	let is = |properties: &BTreeMap<String, String>, key: &str, expected: &str| {
		properties.get(key).is_some_and(|value| value == expected)
	};

	if is(properties, "indent_style", "tab")
		&& !properties.contains_key("indent_size")
		&& *version >= Version::new(0, 10, 0)
	{
		properties.insert("indent_size".to_string(), "tab".to_string());
	}

	if let Some(size) = properties.get("indent_size")
		&& size != "tab"
		&& !properties.contains_key("tab_width")
		&& size.parse::<u32>().is_ok()
	{
		let size = size.clone();
		properties.insert("tab_width".to_string(), size);
	}

	if is(properties, "indent_size", "tab")
		&& let Some(width) = properties.get("tab_width")
	{
		let width = width.clone();
		properties.insert("indent_size".to_string(), width);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn resolve(pairs: &[(&str, &str)]) -> ResolvedSettings {
		resolve_with(Version::new(0, 17, 2), pairs)
	}

	fn resolve_with(version: Version, pairs: &[(&str, &str)]) -> ResolvedSettings {
		let properties = pairs
			.iter()
			.map(|(k, v)| sanitize(k, v))
			.collect::<BTreeMap<_, _>>();
		ResolvedSettings::new(version, "f.x", properties)
	}

	#[test]
	fn test_sanitize_known_and_unknown_keys() {
		assert_eq!(
			sanitize("INDENT_STYLE", "TAB"),
			("indent_style".to_string(), "tab".to_string())
		);
		assert_eq!(
			sanitize("My_Key", "MixedCase"),
			("my_key".to_string(), "MixedCase".to_string())
		);
	}

	#[test]
	fn test_indent_size_defaults_tab_width() {
		let settings = resolve(&[("indent_size", "2")]);
		assert_eq!(settings.indent_size(), Some(IndentSize::Columns(2)));
		assert_eq!(settings.tab_width(), Some(2));
		assert_eq!(settings.get("tab_width"), Some("2"));
		assert_eq!(settings.properties().len(), 2);
	}

	#[test]
	fn test_tab_style_defaults_indent_size_to_tab() {
		let settings = resolve(&[("indent_style", "tab")]);
		let size = settings.indent_size().unwrap();
		assert!(size.use_tab_width());
		assert_eq!(size.number_of_columns(), None);
		assert_eq!(settings.get("indent_size"), Some("tab"));
		assert_eq!(settings.tab_width(), None);
	}

	#[test]
	fn test_tab_style_before_0_10_leaves_indent_size_alone() {
		let settings = resolve_with(Version::new(0, 9, 0), &[("indent_style", "tab")]);
		assert_eq!(settings.indent_size(), None);
		assert!(!settings.properties().contains_key("indent_size"));
	}

	#[test]
	fn test_tab_indent_size_takes_tab_width() {
		let settings = resolve(&[("indent_size", "tab"), ("tab_width", "4")]);
		assert_eq!(settings.tab_width(), Some(4));
		assert_eq!(settings.indent_size(), Some(IndentSize::Columns(4)));
	}

	#[test]
	fn test_explicit_tab_width_wins() {
		let settings = resolve(&[("indent_size", "2"), ("tab_width", "8")]);
		assert_eq!(settings.tab_width(), Some(8));
	}

	#[test]
	fn test_negative_values_are_unset() {
		let settings = resolve(&[("indent_size", "-1")]);
		assert_eq!(settings.indent_size(), None);
		assert!(!settings.properties().contains_key("tab_width"));

		let settings = resolve(&[("tab_width", "-1")]);
		assert_eq!(settings.tab_width(), None);

		let settings = resolve(&[("max_line_length", "0")]);
		assert_eq!(settings.max_line_length(), None);
	}

	#[test]
	fn test_bogus_values_stay_in_map() {
		let settings = resolve(&[("charset", "bogus")]);
		assert_eq!(settings.charset(), None);
		assert_eq!(settings.get("charset"), Some("bogus"));
		assert_eq!(settings.properties().len(), 1);

		let settings = resolve(&[("indent_size", "bogus")]);
		assert_eq!(settings.indent_size(), None);
		assert_eq!(settings.properties().len(), 1);

		let settings = resolve(&[("trim_trailing_whitespace", "bogus")]);
		assert_eq!(settings.trim_trailing_whitespace(), None);
	}

	#[test]
	fn test_typed_values() {
		let settings = resolve(&[
			("end_of_line", "CRLF"),
			("charset", "utf-8"),
			("trim_trailing_whitespace", "true"),
			("insert_final_newline", "false"),
			("max_line_length", "120"),
			("indent_size", "unset"),
		]);
		assert_eq!(settings.end_of_line(), Some(EndOfLine::Crlf));
		assert_eq!(settings.charset(), Some(Charset::Utf8));
		assert_eq!(settings.trim_trailing_whitespace(), Some(true));
		assert_eq!(settings.insert_final_newline(), Some(false));
		assert_eq!(settings.max_line_length(), Some(120));
		assert_eq!(settings.indent_size(), Some(IndentSize::Unset));
	}

	#[test]
	fn test_empty_map() {
		let settings = resolve(&[]);
		assert!(settings.properties().is_empty());
		assert_eq!(settings.file_name(), "f.x");
		assert_eq!(settings.indent_style(), None);
	}

	#[test]
	fn test_serializes_version_as_string() {
		let settings = resolve(&[("indent_style", "space")]);
		let json = serde_json::to_value(&settings).unwrap();
		assert_eq!(json["version"], "0.17.2");
		assert_eq!(json["indent_style"], "space");
		assert_eq!(json["properties"]["indent_style"], "space");
	}
}
