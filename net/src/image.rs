//! Image URLs to `data:` URLs.

use crate::error::{FetchError, Result};

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

pub const DEFAULT_QUALITY: f32 = 0.92;

/// Assumed when the response carries no `Content-Type`.
const FALLBACK_MIME: &str = "image/jpeg";

pub type CompressError = Box<dyn std::error::Error + Send + Sync>;

type CompressFn = dyn Fn(&[u8], &str, f32) -> std::result::Result<Vec<u8>, CompressError> + Send + Sync;

/// Options for [`image_url_to_base64`].
///
/// Without a compressor the image is encoded as fetched. A compressor is
/// only consulted for JPEG and PNG images; it receives the raw bytes, the
/// MIME type and `quality`, and returns the bytes to encode.
#[derive(Clone)]
pub struct ImageOptions {
  quality: f32,
  compressor: Option<Arc<CompressFn>>,
}

impl Default for ImageOptions {
  fn default() -> Self {
    Self {
      quality: DEFAULT_QUALITY,
      compressor: None,
    }
  }
}

impl fmt::Debug for ImageOptions {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ImageOptions")
      .field("quality", &self.quality)
      .field("compressor", &self.compressor.is_some())
      .finish()
  }
}

impl ImageOptions {
  pub fn new() -> Self {
    Self::default()
  }

  /// Compression quality in `0.0..=1.0`; out-of-range values are clamped.
  pub fn quality(mut self, quality: f32) -> Self {
    self.quality = quality.clamp(0.0, 1.0);
    self
  }

  pub fn compressor<F>(mut self, compress: F) -> Self
  where
    F: Fn(&[u8], &str, f32) -> std::result::Result<Vec<u8>, CompressError> + Send + Sync + 'static,
  {
    self.compressor = Some(Arc::new(compress));
    self
  }

  pub fn get_quality(&self) -> f32 {
    self.quality
  }
}

/// Downloads an image and returns it as a `data:<mime>;base64,...` URL.
///
/// Only `http` and `https` URLs are accepted. A non-2xx response fails with
/// [`FetchError::Status`]. If the compressor fails, the original bytes are
/// encoded instead.
pub async fn image_url_to_base64(image_url: &str, options: &ImageOptions) -> Result<String> {
  let url = Url::parse(image_url)?;
  if !matches!(url.scheme(), "http" | "https") {
    return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
  }

  let client = Client::builder().no_proxy().build().map_err(FetchError::Client)?;
  tracing::debug!(%url, "fetching image");
  let response = client.get(url).send().await.map_err(FetchError::Request)?;

  let status = response.status();
  if !status.is_success() {
    return Err(FetchError::Status { status, body: None });
  }

  let mime = response
    .headers()
    .get(CONTENT_TYPE)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(';').next())
    .map(|v| v.trim().to_ascii_lowercase())
    .filter(|v| !v.is_empty())
    .unwrap_or_else(|| FALLBACK_MIME.to_string());
  let bytes = response.bytes().await.map_err(FetchError::Request)?;

  Ok(encode_image(&bytes, &mime, options))
}

/// Encodes already-fetched image bytes, running the compressor for JPEG and
/// PNG images.
pub fn encode_image(bytes: &[u8], mime: &str, options: &ImageOptions) -> String {
  let compressible = matches!(mime, "image/jpeg" | "image/png");
  let payload = match &options.compressor {
    Some(compress) if compressible => match compress(bytes, mime, options.quality) {
      Ok(compressed) => Cow::Owned(compressed),
      Err(e) => {
        tracing::warn!(mime, error = %e, "image compression failed; encoding the original bytes");
        Cow::Borrowed(bytes)
      }
    },
    _ => Cow::Borrowed(bytes),
  };
  to_data_url(mime, &payload)
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
  format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
