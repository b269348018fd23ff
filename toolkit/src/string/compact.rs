use once_cell::sync::Lazy;
use regex::Regex;

static NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("newline regex should be valid"));
static WHITESPACE_RUN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should be valid"));

/// Options for [`compact_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactOptions {
  /// Maximum number of characters kept before `omission` is appended.
  /// `None` or `Some(0)` keeps everything.
  pub max_length: Option<usize>,
  /// Replace newlines with the two characters `\n`. When off they become a
  /// space.
  pub replace_newlines: bool,
  /// Collapse runs of whitespace into a single space.
  pub collapse_whitespace: bool,
  pub omission: String,
}

impl Default for CompactOptions {
  fn default() -> Self {
    Self {
      max_length: None,
      replace_newlines: true,
      collapse_whitespace: true,
      omission: "...".to_string(),
    }
  }
}

/// Squeezes `text` onto one line, e.g. for log output.
///
/// ```
/// use sundry_toolkit::{compact_str, CompactOptions};
///
/// let text = "\n  Hello,\n       world!\n";
/// let opts = CompactOptions { replace_newlines: false, ..Default::default() };
/// assert_eq!(compact_str(text, &opts), "Hello, world!");
/// assert_eq!(compact_str(text, &CompactOptions::default()), r"\n Hello,\n world!\n");
/// ```
pub fn compact_str(text: &str, options: &CompactOptions) -> String {
  if text.is_empty() {
    return String::new();
  }

  let newline = if options.replace_newlines { r"\n" } else { " " };
  let mut result = NEWLINE.replace_all(text, newline).into_owned();
  if options.collapse_whitespace {
    result = WHITESPACE_RUN.replace_all(&result, " ").into_owned();
  }
  let result = result.trim();

  match options.max_length {
    Some(max) if max > 0 && result.chars().count() > max => {
      let mut truncated: String = result.chars().take(max).collect();
      truncated.push_str(&options.omission);
      truncated
    }
    _ => result.to_string(),
  }
}
