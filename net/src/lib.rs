//! A small JSON HTTP client on top of `reqwest`.
//!
//! [`Fetcher`] carries a base URL and default [`RequestOptions`]; each call
//! may layer its own options on top. [`get_real_url`] resolves a single
//! redirect without following it. [`image_url_to_base64`] downloads an image
//! into a `data:` URL.

pub mod error;
pub mod fetcher;
pub mod image;
pub mod options;
pub mod real_url;

pub use error::{FetchError, Result};
pub use fetcher::Fetcher;
pub use image::{image_url_to_base64, ImageOptions};
pub use options::RequestOptions;
pub use real_url::get_real_url;

pub use reqwest::{Method, StatusCode};
