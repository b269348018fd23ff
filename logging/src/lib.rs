//! `sundry_logging` - console helpers and subscriber setup.
//!
//! [`log`] and [`time_log`] print human-oriented lines with a timestamp and
//! the caller's location. [`init`] and friends install a `tracing`
//! subscriber configured from `sundry_logging.yaml`, which also receives the
//! `trace!`/`debug!` events emitted by the other sundry crates.

pub mod config;
pub mod console;
pub mod error;
pub mod init;

pub use config::{LogFormat, LoggingConfig};
pub use console::{log, time_log, LogOptions};
pub use error::{Error, Result};
pub use init::{find_config_file, find_config_file_in, init, init_default, init_from_file};
