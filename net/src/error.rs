use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by [`Fetcher`](crate::Fetcher).
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("invalid request url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("unsupported url scheme `{0}`: expected http or https")]
  UnsupportedScheme(String),

  #[error("invalid request options: {0}")]
  Options(#[source] serde_json::Error),

  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("request failed: {0}")]
  Request(#[source] reqwest::Error),

  /// The server answered with a non-2xx status. `body` holds the parsed
  /// error document when the response was `application/json`.
  #[error("server responded with {status}")]
  Status { status: StatusCode, body: Option<Value> },

  #[error("failed to decode response body: {0}")]
  Decode(#[source] serde_json::Error),
}

impl FetchError {
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      FetchError::Status { status, .. } => Some(*status),
      FetchError::Request(e) => e.status(),
      _ => None,
    }
  }
}

pub type Result<T, E = FetchError> = std::result::Result<T, E>;
