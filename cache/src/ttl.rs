use crate::time::{self, NEVER};

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// How long a memoized result stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ttl {
  /// The result never expires.
  #[default]
  Never,
  /// The result expires this long after it was computed.
  After(Duration),
}

impl Ttl {
  /// Interprets a signed second count, where any negative value (the
  /// conventional `-1`) means [`Ttl::Never`].
  pub fn from_secs(secs: i64) -> Self {
    match u64::try_from(secs) {
      Ok(secs) => Ttl::After(Duration::from_secs(secs)),
      Err(_) => Ttl::Never,
    }
  }

  /// Returns the duration, or `None` for [`Ttl::Never`].
  pub fn as_duration(&self) -> Option<Duration> {
    match self {
      Ttl::Never => None,
      Ttl::After(d) => Some(*d),
    }
  }

  /// The expiration timestamp for an entry written at `now_nanos`.
  #[inline]
  pub(crate) fn expires_at(&self, now_nanos: u64) -> u64 {
    match self {
      Ttl::Never => NEVER,
      Ttl::After(d) => now_nanos.saturating_add(time::as_nanos(*d)).min(NEVER - 1),
    }
  }
}

impl From<Duration> for Ttl {
  fn from(d: Duration) -> Self {
    Ttl::After(d)
  }
}

impl From<Option<Duration>> for Ttl {
  fn from(d: Option<Duration>) -> Self {
    d.map_or(Ttl::Never, Ttl::After)
  }
}

/// The mutation handle passed to a memoized function.
///
/// Calling [`TtlHandle::set_ttl`] while computing a result overrides the TTL
/// of that one result. The wrapper's default TTL is not touched; use
/// `update_ttl` on the wrapper for that.
#[derive(Debug, Clone, Default)]
pub struct TtlHandle {
  requested: Arc<Mutex<Option<Ttl>>>,
}

impl TtlHandle {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub fn set_ttl(&self, ttl: impl Into<Ttl>) {
    *self.requested.lock() = Some(ttl.into());
  }

  /// Shorthand for `set_ttl(Ttl::from_secs(secs))`.
  pub fn set_ttl_secs(&self, secs: i64) {
    self.set_ttl(Ttl::from_secs(secs));
  }

  /// The override requested so far, if any.
  pub fn requested(&self) -> Option<Ttl> {
    *self.requested.lock()
  }
}
