use crate::error::{FetchError, Result};
use crate::options::RequestOptions;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// A JSON HTTP client bound to a base URL and default options.
///
/// Every call merges its own [`RequestOptions`] over the defaults, appends
/// `params` as a query string, sends bodies as JSON and decodes JSON
/// responses into the requested type.
///
/// Wrap calls in `sundry_cache::with_cache_async` to memoize them:
///
/// ```no_run
/// use std::sync::Arc;
/// use serde_json::Value;
/// use sundry_cache::{with_cache_async, Ttl};
/// use sundry_net::{Fetcher, RequestOptions};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Arc::new(Fetcher::new("https://example.com", RequestOptions::new())?);
/// let get_blog = with_cache_async(
///   move |_ttl, path: String| {
///     let api = api.clone();
///     async move { api.get::<Value>(&path).await }
///   },
///   Ttl::from_secs(60),
/// );
/// let first = get_blog.call("/blogs".to_string()).await?;
/// let again = get_blog.call("/blogs".to_string()).await?; // no request
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
  base_url: String,
  base_options: RequestOptions,
  client: Client,
}

impl Fetcher {
  /// `base_url` is prefixed to every request path; pass `""` to call with
  /// absolute URLs.
  pub fn new(base_url: impl Into<String>, base_options: RequestOptions) -> Result<Self> {
    let client = build_client(base_options.proxy.as_deref())?;
    Ok(Self {
      base_url: base_url.into(),
      base_options,
      client,
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn base_options(&self) -> &RequestOptions {
    &self.base_options
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self.get_with(path, &RequestOptions::default()).await
  }

  /// `GET` with per-call `options` layered over the defaults.
  pub async fn get_with<T: DeserializeOwned>(&self, path: &str, options: &RequestOptions) -> Result<T> {
    self.request(Method::GET, path, None::<&()>, options).await
  }

  pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self.post_with(path, body, &RequestOptions::default()).await
  }

  pub async fn post_with<T, B>(&self, path: &str, body: &B, options: &RequestOptions) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self.request(Method::POST, path, Some(body), options).await
  }

  pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self.put_with(path, body, &RequestOptions::default()).await
  }

  pub async fn put_with<T, B>(&self, path: &str, body: &B, options: &RequestOptions) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    self.request(Method::PUT, path, Some(body), options).await
  }

  pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    self.delete_with(path, &RequestOptions::default()).await
  }

  pub async fn delete_with<T: DeserializeOwned>(&self, path: &str, options: &RequestOptions) -> Result<T> {
    self.request(Method::DELETE, path, None::<&()>, options).await
  }

  /// Sends one request with per-call `options` layered over the defaults.
  pub async fn request<T, B>(
    &self,
    method: Method,
    path: &str,
    body: Option<&B>,
    options: &RequestOptions,
  ) -> Result<T>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    let options = self.base_options.merged_with(options)?;
    let url = self.build_url(path, &options)?;
    tracing::debug!(%method, %url, "sending request");

    let client = if options.proxy == self.base_options.proxy {
      self.client.clone()
    } else {
      build_client(options.proxy.as_deref())?
    };

    let mut request = client.request(method, url).headers(header_map(&options));
    if let Some(body) = body {
      let json = serde_json::to_vec(body).map_err(FetchError::Options)?;
      request = request.header(CONTENT_TYPE, "application/json").body(json);
    }
    if let Some(ms) = options.timeout_ms {
      request = request.timeout(Duration::from_millis(ms));
    }

    let response = request.send().await.map_err(FetchError::Request)?;
    decode(response).await
  }

  fn build_url(&self, path: &str, options: &RequestOptions) -> Result<Url> {
    let mut url = if self.base_url.is_empty() {
      Url::parse(path)?
    } else {
      Url::parse(&format!("{}{}", self.base_url, path))?
    };
    let pairs = options.query_pairs();
    if !pairs.is_empty() {
      url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
  }
}

fn build_client(proxy: Option<&str>) -> Result<Client> {
  let builder = match proxy {
    Some(proxy) => Client::builder().proxy(reqwest::Proxy::all(proxy).map_err(FetchError::Client)?),
    None => Client::builder().no_proxy(),
  };
  builder.build().map_err(FetchError::Client)
}

fn header_map(options: &RequestOptions) -> HeaderMap {
  let mut headers = HeaderMap::new();
  for (name, value) in &options.headers {
    match (name.parse::<HeaderName>(), value.parse::<HeaderValue>()) {
      (Ok(name), Ok(value)) => {
        headers.insert(name, value);
      }
      _ => tracing::warn!(header = %name, "skipping header that is not valid HTTP"),
    }
  }
  headers
}

fn is_json(headers: &HeaderMap) -> bool {
  headers
    .get(CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| v.starts_with("application/json"))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
  let status = response.status();
  let json = is_json(response.headers());
  let bytes = response.bytes().await.map_err(FetchError::Request)?;

  if !status.is_success() {
    let body = if json {
      serde_json::from_slice::<Value>(&bytes).ok()
    } else {
      None
    };
    tracing::debug!(%status, "request failed with error status");
    return Err(FetchError::Status { status, body });
  }

  if bytes.is_empty() {
    return serde_json::from_value(Value::Null).map_err(FetchError::Decode);
  }
  serde_json::from_slice(&bytes).map_err(FetchError::Decode)
}
