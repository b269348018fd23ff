use std::fmt;
use std::sync::Arc;

/// The argument list of a call could not be turned into a cache key.
///
/// Keys must be injective: arguments that would collapse onto another
/// argument's key are rejected instead.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
  /// A float was NaN or infinite. JSON renders all of these as `null`.
  NonFiniteFloat(f64),
  /// A map key serialized to something other than a string, number or bool.
  UnsupportedMapKey,
  /// The argument's `Serialize` impl reported an error.
  Serialize(String),
}

impl fmt::Display for KeyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("cannot derive a cache key from call arguments: ")?;
    match self {
      KeyError::NonFiniteFloat(v) => write!(f, "non-finite float {} has no canonical form", v),
      KeyError::UnsupportedMapKey => f.write_str("map keys must serialize to strings, numbers or booleans"),
      KeyError::Serialize(msg) => f.write_str(msg),
    }
  }
}

impl std::error::Error for KeyError {}

impl serde::ser::Error for KeyError {
  fn custom<T: fmt::Display>(msg: T) -> Self {
    KeyError::Serialize(msg.to_string())
  }
}

/// Errors returned by an asynchronous memoized call.
///
/// Computation failures are shared: every caller that joined the same
/// in-flight computation receives a clone of the same `Arc<E>`.
pub enum MemoError<E> {
  /// The arguments could not be keyed; the function was not invoked.
  Key(KeyError),
  /// The wrapped computation failed. The cache slot was evicted.
  Compute(Arc<E>),
}

impl<E> MemoError<E> {
  /// Returns the computation error, if that is what this is.
  pub fn compute_error(&self) -> Option<&E> {
    match self {
      MemoError::Compute(e) => Some(e),
      MemoError::Key(_) => None,
    }
  }
}

impl<E> From<KeyError> for MemoError<E> {
  fn from(e: KeyError) -> Self {
    MemoError::Key(e)
  }
}

impl<E: fmt::Debug> fmt::Debug for MemoError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MemoError::Key(e) => f.debug_tuple("MemoError::Key").field(e).finish(),
      MemoError::Compute(e) => f.debug_tuple("MemoError::Compute").field(e).finish(),
    }
  }
}

impl<E: fmt::Display> fmt::Display for MemoError<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MemoError::Key(e) => fmt::Display::fmt(e, f),
      MemoError::Compute(e) => write!(f, "memoized computation failed: {}", e),
    }
  }
}

impl<E> std::error::Error for MemoError<E>
where
  E: std::error::Error + 'static,
{
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      MemoError::Key(e) => Some(e),
      MemoError::Compute(e) => Some(&**e),
    }
  }
}

/// Errors raised when constructing an [`LruCache`](crate::LruCache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LruError {
  /// An LRU cache must hold at least one entry.
  ZeroCapacity,
}

impl fmt::Display for LruError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LruError::ZeroCapacity => write!(f, "lru cache capacity cannot be zero"),
    }
  }
}

impl std::error::Error for LruError {}
