use crate::error::{FetchError, Result};

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sundry_toolkit::merge_objects;

/// Request settings shared by a [`Fetcher`](crate::Fetcher) and overridable
/// per call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
  #[serde(default)]
  pub headers: BTreeMap<String, String>,
  /// Query parameters. `null` values are left out of the query string.
  #[serde(default)]
  pub params: Map<String, Value>,
  /// HTTP(S) proxy URL, e.g. `http://127.0.0.1:7890`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub proxy: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_ms: Option<u64>,
}

impl RequestOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.headers.insert(name.into(), value.into());
    self
  }

  pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
    self.params.insert(name.into(), value.into());
    self
  }

  pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
    self.proxy = Some(proxy.into());
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
    self
  }

  /// Layers `overrides` on top of `self`: headers and params merge key by
  /// key, everything `overrides` sets wins.
  pub fn merged_with(&self, overrides: &RequestOptions) -> Result<RequestOptions> {
    let base = serde_json::to_value(self).map_err(FetchError::Options)?;
    let overlay = serde_json::to_value(overrides).map_err(FetchError::Options)?;
    serde_json::from_value(merge_objects(&base, &overlay)).map_err(FetchError::Options)
  }

  /// The query pairs in parameter order, skipping `null` values.
  pub fn query_pairs(&self) -> Vec<(String, String)> {
    self
      .params
      .iter()
      .filter(|(_, value)| !value.is_null())
      .map(|(name, value)| (name.clone(), query_value(value)))
      .collect()
  }
}

fn query_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
    other => other.to_string(),
  }
}
