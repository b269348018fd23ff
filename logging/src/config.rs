use crate::error::{Error, Result};

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How each event is rendered on the console.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
  #[default]
  Full,
  Compact,
  Json,
}

/// Subscriber settings, usually read from `sundry_logging.yaml`.
///
/// ```yaml
/// level: debug
/// format: compact
/// ansi: false
/// directives:
///   sundry_cache: trace
///   hyper: warn
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
  /// Default level for every target without a directive.
  #[serde(default = "default_level")]
  pub level: String,
  #[serde(default)]
  pub format: LogFormat,
  /// Colorize output.
  #[serde(default = "default_true")]
  pub ansi: bool,
  /// Print the event target (module path).
  #[serde(default = "default_true")]
  pub targets: bool,
  /// Per-target levels, e.g. `sundry_net: debug`.
  #[serde(default)]
  pub directives: BTreeMap<String, String>,
}

fn default_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
      format: LogFormat::default(),
      ansi: true,
      targets: true,
      directives: BTreeMap::new(),
    }
  }
}

impl LoggingConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(yaml)?)
  }

  pub fn from_file(path: &Path) -> Result<Self> {
    let file = std::fs::File::open(path)?;
    Ok(serde_yaml::from_reader(std::io::BufReader::new(file))?)
  }

  /// The filter string fed to `EnvFilter`: the default level followed by
  /// one `target=level` directive per entry.
  pub fn filter_directives(&self) -> String {
    let mut parts = vec![self.level.trim().to_string()];
    parts.extend(
      self
        .directives
        .iter()
        .map(|(target, level)| format!("{}={}", target.trim(), level.trim())),
    );
    parts.join(",")
  }

  /// The most verbose level any target is allowed to log at.
  pub fn max_level(&self) -> Result<LevelFilter> {
    let mut max = parse_level("level", &self.level)?;
    for (target, level) in &self.directives {
      max = max.max(parse_level(&format!("directives.{target}"), level)?);
    }
    Ok(max)
  }

  /// Builds and validates the `EnvFilter` for this configuration.
  pub fn env_filter(&self) -> Result<EnvFilter> {
    self.max_level()?;
    EnvFilter::builder()
      .parse(self.filter_directives())
      .map_err(|e| Error::InvalidConfigValue {
        field: "directives".to_string(),
        message: e.to_string(),
      })
  }
}

fn parse_level(field: &str, level: &str) -> Result<LevelFilter> {
  level
    .trim()
    .parse::<LevelFilter>()
    .map_err(|e| Error::InvalidConfigValue {
      field: field.to_string(),
      message: format!("'{}': {}", level, e),
    })
}
