use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};

use std::env;
use std::path::{Path, PathBuf};

use tracing_subscriber::filter::LevelFilter;

const DEFAULT_CONFIG_BASE_NAME: &str = "sundry_logging";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

/// Finds the configuration file in the working directory.
///
/// With an environment suffix (given, or read from `SUNDRY_ENV` then
/// `APP_ENV`) `sundry_logging.<env>.yaml` is preferred over
/// `sundry_logging.yaml`.
pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf> {
  find_config_file_in(Path::new("."), environment_suffix)
}

/// Like [`find_config_file`], searching `dir` instead of the working directory.
pub fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Result<PathBuf> {
  let env_from_var = environment_suffix
    .map(|s| s.to_string())
    .or_else(|| env::var("SUNDRY_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok());

  let mut files_to_check: Vec<String> = Vec::new();
  if let Some(env_str) = env_from_var.as_deref().map(str::trim) {
    if !env_str.is_empty() {
      files_to_check.push(format!(
        "{}.{}.{}",
        DEFAULT_CONFIG_BASE_NAME, env_str, DEFAULT_CONFIG_EXTENSION
      ));
    }
  }
  files_to_check.push(format!("{}.{}", DEFAULT_CONFIG_BASE_NAME, DEFAULT_CONFIG_EXTENSION));

  for file_name in &files_to_check {
    let path = dir.join(file_name);
    if path.is_file() {
      return Ok(path);
    }
  }

  Err(Error::ConfigNotFound(format!(
    "Searched for: {:?} in {:?}. Provide a config file or check SUNDRY_ENV/APP_ENV.",
    files_to_check, dir
  )))
}

/// Reads a YAML configuration file and installs the global subscriber.
pub fn init_from_file(config_path: &Path) -> Result<()> {
  println!("[sundry_logging] Initializing from config file: {:?}", config_path);
  let config = LoggingConfig::from_file(config_path)?;
  init(&config)
}

/// Installs the global subscriber from the discovered configuration file, or
/// from `LoggingConfig::default()` when there is none.
pub fn init_default() -> Result<()> {
  match find_config_file(None) {
    Ok(path) => init_from_file(&path),
    Err(Error::ConfigNotFound(_)) => init(&LoggingConfig::default()),
    Err(e) => Err(e),
  }
}

/// Installs a `tracing-subscriber` fmt subscriber for `config` as the global
/// default and routes records from the `log` crate into it.
///
/// Fails if a global subscriber or logger is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
  let filter = config.env_filter()?;
  let max_level = config.max_level()?;

  tracing_log::LogTracer::builder()
    .with_max_level(as_log_filter(max_level))
    .init()
    .map_err(|e| Error::LogBridgeInit(e.to_string()))?;

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_ansi(config.ansi)
    .with_target(config.targets);

  let installed = match config.format {
    LogFormat::Full => tracing::subscriber::set_global_default(builder.finish()),
    LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
    LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
  };
  installed.map_err(|e| Error::GlobalSubscriberSet(e.to_string()))?;

  tracing::debug!(directives = %config.filter_directives(), format = ?config.format, "logging initialized");
  Ok(())
}

fn as_log_filter(level: LevelFilter) -> log::LevelFilter {
  if level == LevelFilter::OFF {
    log::LevelFilter::Off
  } else if level == LevelFilter::ERROR {
    log::LevelFilter::Error
  } else if level == LevelFilter::WARN {
    log::LevelFilter::Warn
  } else if level == LevelFilter::INFO {
    log::LevelFilter::Info
  } else if level == LevelFilter::DEBUG {
    log::LevelFilter::Debug
  } else {
    log::LevelFilter::Trace
  }
}
