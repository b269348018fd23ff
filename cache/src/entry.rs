use crate::loader::LoadFuture;
use crate::time::NEVER;

use std::sync::Arc;

/// What a slot currently holds.
pub(crate) enum Slot<V, E> {
  Ready(Arc<V>),
  /// A computation is in flight; same-key callers join it.
  Pending(Arc<LoadFuture<V, E>>),
}

/// A container for a memoized value, holding its expiration metadata.
pub(crate) struct CacheEntry<V, E> {
  pub(crate) slot: Slot<V, E>,
  /// Expiration timestamp in nanoseconds on the cache clock. `NEVER` means
  /// no TTL.
  pub(crate) expires_at: u64,
}

impl<V, E> CacheEntry<V, E> {
  pub(crate) fn pending(load: Arc<LoadFuture<V, E>>, expires_at: u64) -> Self {
    Self {
      slot: Slot::Pending(load),
      expires_at,
    }
  }

  /// Checks if the entry is expired at `now_nanos`.
  #[inline]
  pub(crate) fn is_expired(&self, now_nanos: u64) -> bool {
    self.expires_at != NEVER && now_nanos >= self.expires_at
  }

  /// Whether this entry is the pending slot for `load`.
  #[inline]
  pub(crate) fn is_pending_for(&self, load: &Arc<LoadFuture<V, E>>) -> bool {
    matches!(&self.slot, Slot::Pending(current) if Arc::ptr_eq(current, load))
  }
}
