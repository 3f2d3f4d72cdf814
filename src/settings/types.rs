use serde::Serialize;

/// `indent_style`: hard tabs or soft tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
	Space,
	Tab,
}

impl IndentStyle {
	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"space" => Some(IndentStyle::Space),
			"tab" => Some(IndentStyle::Tab),
			_ => None,
		}
	}
}

/// `indent_size`: columns per indentation level.
///
/// When set to `tab`, the value of `tab_width` is used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentSize {
	/// Explicitly `unset`.
	Unset,
	/// `tab`: follow `tab_width`.
	UseTabWidth,
	Columns(u32),
}

impl IndentSize {
	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"unset" => Some(IndentSize::Unset),
			"tab" => Some(IndentSize::UseTabWidth),
			other => parse_positive(other).map(IndentSize::Columns),
		}
	}

	pub fn number_of_columns(&self) -> Option<u32> {
		match self {
			IndentSize::Columns(columns) => Some(*columns),
			_ => None,
		}
	}

	pub fn use_tab_width(&self) -> bool {
		matches!(self, IndentSize::UseTabWidth)
	}
}

/// `end_of_line`: how line breaks are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
	Lf,
	Cr,
	Crlf,
}

impl EndOfLine {
	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"lf" => Some(EndOfLine::Lf),
			"cr" => Some(EndOfLine::Cr),
			"crlf" => Some(EndOfLine::Crlf),
			_ => None,
		}
	}
}

/// `charset`. Use of `utf-8-bom` is discouraged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Charset {
	#[serde(rename = "latin1")]
	Latin1,
	#[serde(rename = "utf-8")]
	Utf8,
	#[serde(rename = "utf-8-bom")]
	Utf8Bom,
	#[serde(rename = "utf-16be")]
	Utf16Be,
	#[serde(rename = "utf-16le")]
	Utf16Le,
}

impl Charset {
	pub fn from_value(value: &str) -> Option<Self> {
		match value {
			"latin1" => Some(Charset::Latin1),
			"utf-8" => Some(Charset::Utf8),
			"utf-8-bom" => Some(Charset::Utf8Bom),
			"utf-16be" => Some(Charset::Utf16Be),
			"utf-16le" => Some(Charset::Utf16Le),
			_ => None,
		}
	}
}

/// A whole number greater than zero.
pub(crate) fn parse_positive(value: &str) -> Option<u32> {
	value.parse::<u32>().ok().filter(|n| *n > 0)
}
