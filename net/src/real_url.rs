use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Method};

/// Resolves one redirect hop: sends `HEAD` without following redirects and
/// returns the `Location` header. Falls back to `origin_url` when the
/// request fails or there is no redirect.
pub async fn get_real_url(origin_url: &str) -> String {
  let client = match Client::builder().redirect(Policy::none()).no_proxy().build() {
    Ok(client) => client,
    Err(e) => {
      tracing::debug!(error = %e, "could not build client for redirect lookup");
      return origin_url.to_string();
    }
  };

  match client.request(Method::HEAD, origin_url).send().await {
    Ok(response) => response
      .headers()
      .get(LOCATION)
      .and_then(|v| v.to_str().ok())
      .filter(|v| !v.is_empty())
      .map(str::to_string)
      .unwrap_or_else(|| origin_url.to_string()),
    Err(e) => {
      tracing::debug!(url = origin_url, error = %e, "redirect lookup failed");
      origin_url.to_string()
    }
  }
}
