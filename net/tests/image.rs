mod common;

use common::{Reply, StubServer};

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sundry_net::{image_url_to_base64, FetchError, ImageOptions, StatusCode};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

fn data_url(mime: &str, bytes: &[u8]) -> String {
  format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// A compressor that reverses the bytes and records what it was asked.
fn recording_compressor() -> (ImageOptions, Arc<Mutex<Vec<(String, f32)>>>) {
  let calls = Arc::new(Mutex::new(Vec::new()));
  let options = ImageOptions::new().quality(0.5).compressor({
    let calls = calls.clone();
    move |bytes: &[u8], mime: &str, quality: f32| {
      calls.lock().push((mime.to_string(), quality));
      Ok(bytes.iter().rev().copied().collect())
    }
  });
  (options, calls)
}

#[tokio::test]
async fn test_image_without_compressor_is_encoded_as_fetched() {
  let server = StubServer::start(|_| Reply::bytes(200, Some("image/png"), PNG_BYTES)).await;

  let encoded = image_url_to_base64(&format!("{}/logo.png", server.url()), &ImageOptions::default())
    .await
    .unwrap();
  assert_eq!(encoded, data_url("image/png", PNG_BYTES));
  assert_eq!(server.requests()[0].target, "/logo.png");
}

#[tokio::test]
async fn test_image_compressor_runs_for_png() {
  let server = StubServer::start(|_| Reply::bytes(200, Some("image/png"), PNG_BYTES)).await;
  let (options, calls) = recording_compressor();

  let encoded = image_url_to_base64(&format!("{}/logo.png", server.url()), &options).await.unwrap();

  let reversed: Vec<u8> = PNG_BYTES.iter().rev().copied().collect();
  assert_eq!(encoded, data_url("image/png", &reversed));
  assert_eq!(*calls.lock(), vec![("image/png".to_string(), 0.5)]);
}

#[tokio::test]
async fn test_image_compressor_is_skipped_for_other_types() {
  let server = StubServer::start(|_| Reply::bytes(200, Some("image/gif"), b"GIF89a")).await;
  let (options, calls) = recording_compressor();

  let encoded = image_url_to_base64(&format!("{}/spin.gif", server.url()), &options).await.unwrap();
  assert_eq!(encoded, data_url("image/gif", b"GIF89a"));
  assert!(calls.lock().is_empty());
}

#[tokio::test]
async fn test_image_missing_content_type_is_treated_as_jpeg() {
  let server = StubServer::start(|_| Reply::bytes(200, None, b"\xff\xd8\xff")).await;
  let (options, calls) = recording_compressor();

  let encoded = image_url_to_base64(&format!("{}/photo", server.url()), &options).await.unwrap();
  assert_eq!(encoded, data_url("image/jpeg", b"\xff\xd8\xff"));
  assert_eq!(calls.lock()[0].0, "image/jpeg");
}

#[tokio::test]
async fn test_image_failed_compression_falls_back_to_original_bytes() {
  let server = StubServer::start(|_| Reply::bytes(200, Some("image/jpeg"), b"jpeg-bytes")).await;
  let options = ImageOptions::new().compressor(|_: &[u8], _: &str, _: f32| Err("codec unavailable".into()));

  let encoded = image_url_to_base64(&format!("{}/a.jpg", server.url()), &options).await.unwrap();
  assert_eq!(encoded, data_url("image/jpeg", b"jpeg-bytes"));
}

#[tokio::test]
async fn test_image_error_status_is_reported() {
  let server = StubServer::start(|_| Reply::text(404, "no such image")).await;

  let err = image_url_to_base64(&format!("{}/gone.png", server.url()), &ImageOptions::default())
    .await
    .unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_image_url_must_be_http() {
  let err = image_url_to_base64("ftp://example.com/a.png", &ImageOptions::default())
    .await
    .unwrap_err();
  assert!(matches!(err, FetchError::UnsupportedScheme(ref scheme) if scheme == "ftp"), "{err}");

  let err = image_url_to_base64("logo.png", &ImageOptions::default()).await.unwrap_err();
  assert!(matches!(err, FetchError::InvalidUrl(_)), "{err}");
}
