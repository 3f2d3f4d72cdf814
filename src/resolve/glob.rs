use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

/// Decides whether a path matches a glob pattern.
///
/// The resolver only anchors patterns and hands them over; any closure of
/// the form `Fn(&str, &str) -> bool` works as a matcher too.
pub trait GlobMatcher {
	fn is_match(&self, pattern: &str, path: &str) -> bool;
}

impl<F> GlobMatcher for F
where
	F: Fn(&str, &str) -> bool,
{
	fn is_match(&self, pattern: &str, path: &str) -> bool {
		self(pattern, path)
	}
}

/// Glob matcher that compiles each pattern into an anchored regex.
///
/// Compiled patterns are cached for the lifetime of the matcher.
#[derive(Debug, Default)]
pub struct RegexGlobMatcher {
	cache: RefCell<HashMap<String, Option<CompiledGlob>>>,
}

impl RegexGlobMatcher {
	pub fn new() -> Self {
		Self::default()
	}
}

impl GlobMatcher for RegexGlobMatcher {
	fn is_match(&self, pattern: &str, path: &str) -> bool {
		if let Some(cached) = self.cache.borrow().get(pattern) {
			return cached.as_ref().is_some_and(|glob| glob.is_match(path));
		}

		let compiled = match CompiledGlob::compile(pattern) {
			Ok(glob) => Some(glob),
			Err(err) => {
				tracing::warn!(pattern, error = %err, "glob does not compile, treating it as matching nothing");
				None
			}
		};
		let matched = compiled.as_ref().is_some_and(|glob| glob.is_match(path));
		self.cache.borrow_mut().insert(pattern.to_string(), compiled);
		matched
	}
}

#[derive(Debug, Clone)]
struct CompiledGlob {
	regex: Regex,
	/// Bounds for each numeric range, in capture group order.
	ranges: Vec<(i64, i64)>,
}

impl CompiledGlob {
	fn compile(pattern: &str) -> std::result::Result<Self, regex::Error> {
		let chars: Vec<char> = pattern.chars().collect();
		let mut translator = Translator::default();
		let body = translator.translate(&chars);
		let regex = Regex::new(&format!("^{body}$"))?;
		Ok(CompiledGlob {
			regex,
			ranges: translator.ranges,
		})
	}

	fn is_match(&self, path: &str) -> bool {
		if self.ranges.is_empty() {
			return self.regex.is_match(path);
		}

		let Some(captures) = self.regex.captures(path) else {
			return false;
		};
		self.ranges
			.iter()
			.enumerate()
			.all(|(index, (min, max))| match captures.get(index + 1) {
				Some(number) => number
					.as_str()
					.parse::<i64>()
					.is_ok_and(|n| *min <= n && n <= *max),
				// range sits in an alternative that did not take part in the match
				None => true,
			})
	}
}

/// Glob to regex translation. Only numeric ranges open capture groups.
#[derive(Debug, Default)]
struct Translator {
	ranges: Vec<(i64, i64)>,
}

impl Translator {
	fn translate(&mut self, glob: &[char]) -> String {
		let mut out = String::new();
		let mut i = 0;

		while i < glob.len() {
			match glob[i] {
				'\\' => match glob.get(i + 1) {
					Some(&next) => {
						push_literal(&mut out, next);
						i += 2;
					}
					None => {
						push_literal(&mut out, '\\');
						i += 1;
					}
				},
				'*' if glob.get(i + 1) == Some(&'*') => {
					let at_segment_start = i == 0 || glob[i - 1] == '/';
					if at_segment_start && glob.get(i + 2) == Some(&'/') {
						// zero or more whole directories
						out.push_str("(?:.*/)?");
						i += 3;
					} else {
						out.push_str(".*");
						i += 2;
					}
				}
				'*' => {
					out.push_str("[^/]*");
					i += 1;
				}
				'?' => {
					out.push_str("[^/]");
					i += 1;
				}
				'[' => match class_end(glob, i) {
					Some(end) => {
						out.push_str(&class(&glob[i + 1..end]));
						i = end + 1;
					}
					None => {
						push_literal(&mut out, '[');
						i += 1;
					}
				},
				'{' => match brace_end(glob, i) {
					Some(end) => {
						let braces = self.braces(&glob[i + 1..end]);
						out.push_str(&braces);
						i = end + 1;
					}
					None => {
						push_literal(&mut out, '{');
						i += 1;
					}
				},
				other => {
					push_literal(&mut out, other);
					i += 1;
				}
			}
		}

		out
	}

	fn braces(&mut self, content: &[char]) -> String {
		if let Some((low, high)) = numeric_range(content) {
			self.ranges.push((low.min(high), low.max(high)));
			return r"([+-]?\d+)".to_string();
		}

		let alternatives = split_alternatives(content);
		if alternatives.len() < 2 {
			return format!(r"\{{{}\}}", self.translate(content));
		}

		let branches: Vec<String> = alternatives
			.into_iter()
			.map(|alternative| self.translate(alternative))
			.collect();
		format!("(?:{})", branches.join("|"))
	}
}

fn push_literal(out: &mut String, c: char) {
	let mut buf = [0; 4];
	out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Index of the `]` closing the class opened at `start`, if the class is well formed.
fn class_end(glob: &[char], start: usize) -> Option<usize> {
	let mut i = start + 1;
	if matches!(glob.get(i), Some('!' | '^')) {
		i += 1;
	}
	// a leading `]` is a member of the set
	if glob.get(i) == Some(&']') {
		i += 1;
	}

	while i < glob.len() {
		match glob[i] {
			'\\' => i += 2,
			'/' => return None,
			']' => return Some(i),
			_ => i += 1,
		}
	}
	None
}

fn class(content: &[char]) -> String {
	let (negated, set) = match content.first() {
		Some('!' | '^') => (true, &content[1..]),
		_ => (false, content),
	};

	let mut members = String::new();
	let mut i = 0;
	while i < set.len() {
		let escaped = set[i] == '\\' && i + 1 < set.len();
		if escaped {
			i += 1;
		}
		let c = set[i];
		let is_range = c == '-' && !escaped && i > 0 && i + 1 < set.len();
		if is_range {
			members.push('-');
		} else if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
			members.push('\\');
			members.push(c);
		} else {
			members.push(c);
		}
		i += 1;
	}

	if negated {
		format!("[^/{members}]")
	} else {
		format!("[{members}&&[^/]]")
	}
}

/// Index of the `}` closing the brace opened at `start`, honoring nesting.
fn brace_end(glob: &[char], start: usize) -> Option<usize> {
	let mut depth = 0usize;
	let mut i = start;
	while i < glob.len() {
		match glob[i] {
			'\\' => {
				i += 2;
				continue;
			}
			'{' => depth += 1,
			'}' => {
				depth -= 1;
				if depth == 0 {
					return Some(i);
				}
			}
			_ => {}
		}
		i += 1;
	}
	None
}

fn split_alternatives(content: &[char]) -> Vec<&[char]> {
	let mut alternatives = Vec::new();
	let mut depth = 0usize;
	let mut begin = 0;
	let mut i = 0;

	while i < content.len() {
		match content[i] {
			'\\' => i += 1,
			'{' => depth += 1,
			'}' => depth = depth.saturating_sub(1),
			',' if depth == 0 => {
				alternatives.push(&content[begin..i]);
				begin = i + 1;
			}
			_ => {}
		}
		i += 1;
	}
	alternatives.push(&content[begin.min(content.len())..]);
	alternatives
}

fn numeric_range(content: &[char]) -> Option<(i64, i64)> {
	let text: String = content.iter().collect();
	let (low, high) = text.split_once("..")?;
	Some((parse_integer(low)?, parse_integer(high)?))
}

fn parse_integer(text: &str) -> Option<i64> {
	let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	text.parse().ok()
}
