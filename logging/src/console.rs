//! `println!`-style helpers that prefix a message with the wall-clock time
//! and the caller's source location.

use std::fmt::{Display, Write};
use std::panic::Location;

use chrono::{Local, NaiveTime};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Which prefixes [`log`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
  /// `[HH:MM:SS]`
  pub time: bool,
  /// `[file.rs:LINE]` of the call site.
  pub file_name: bool,
}

impl Default for LogOptions {
  fn default() -> Self {
    Self {
      time: true,
      file_name: true,
    }
  }
}

/// Prints `[HH:MM:SS] [file.rs:LINE] message` to stdout.
///
/// The location is the line that called `log`, not this function.
#[track_caller]
pub fn log(message: impl Display, options: &LogOptions) {
  let line = format_log_line(Local::now().time(), Location::caller(), &message, options);
  println!("{}", line);
}

/// Prints the local time followed by the space-joined `args`.
pub fn time_log<I>(args: I)
where
  I: IntoIterator,
  I::Item: Display,
{
  println!("{}", format_time_log(Local::now().time(), args));
}

/// Renders a [`log`] line for a fixed time and location.
pub fn format_log_line(
  time: NaiveTime,
  location: &Location<'_>,
  message: &dyn Display,
  options: &LogOptions,
) -> String {
  let mut line = String::new();
  if options.time {
    let _ = write!(line, "[{}] ", time.format(TIME_FORMAT));
  }
  if options.file_name {
    let _ = write!(line, "[{}:{}] ", short_file_name(location.file()), location.line());
  }
  let _ = write!(line, "{}", message);
  line
}

/// Renders a [`time_log`] line for a fixed time.
pub fn format_time_log<I>(time: NaiveTime, args: I) -> String
where
  I: IntoIterator,
  I::Item: Display,
{
  let mut line = time.format(TIME_FORMAT).to_string();
  for arg in args {
    let _ = write!(line, " {}", arg);
  }
  line
}

fn short_file_name(path: &str) -> &str {
  // `Location::file` uses the host separator; strip both kinds.
  match path.rsplit(['/', '\\']).next() {
    Some(name) if !name.is_empty() => name,
    _ => path,
  }
}
