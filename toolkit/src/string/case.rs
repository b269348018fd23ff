use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SNAKE_SEGMENT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"_([a-zA-Z])").expect("snake case regex should be valid"));
static UPPERCASE_LETTER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[A-Z]").expect("camel case regex should be valid"));

/// `user_name` -> `userName`. Underscores not followed by a letter are kept.
pub fn snake_to_camel(s: &str) -> String {
  SNAKE_SEGMENT
    .replace_all(s, |caps: &Captures<'_>| caps[1].to_ascii_uppercase())
    .into_owned()
}

/// `shouldComponentUpdate` -> `should_component_update`.
pub fn camel_to_snake(s: &str) -> String {
  UPPERCASE_LETTER
    .replace_all(s, |caps: &Captures<'_>| format!("_{}", caps[0].to_ascii_lowercase()))
    .into_owned()
}

/// Uppercases the first character only.
pub fn capitalize(s: &str) -> String {
  map_first_char(s, |c| c.to_uppercase().collect())
}

/// Lowercases the first character only.
pub fn decapitalize(s: &str) -> String {
  map_first_char(s, |c| c.to_lowercase().collect())
}

fn map_first_char(s: &str, f: impl FnOnce(char) -> String) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => f(first) + chars.as_str(),
    None => String::new(),
  }
}
