use crate::handles::{AsyncMemoized, Memoized};
use crate::key::Keyer;
use crate::shared::MemoShared;
use crate::time::{Clock, SystemClock};
use crate::ttl::{Ttl, TtlHandle};

use core::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;

/// A builder for creating `Memoized` and `AsyncMemoized` wrappers.
///
/// ```
/// use std::time::Duration;
/// use sundry_cache::MemoBuilder;
///
/// let square = MemoBuilder::<u64>::new()
///   .time_to_live(Duration::from_secs(60))
///   .build(|_ttl, n: &u64| n * n);
///
/// assert_eq!(*square.call(&12).unwrap(), 144);
/// assert_eq!(square.metrics().misses, 1);
/// ```
pub struct MemoBuilder<A> {
  time_to_live: Ttl,
  clock: Arc<dyn Clock>,
  keyer: Keyer<A>,
}

// Manual Debug implementation for MemoBuilder.
impl<A> fmt::Debug for MemoBuilder<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MemoBuilder")
      .field("time_to_live", &self.time_to_live)
      .finish_non_exhaustive()
  }
}

impl<A: Serialize> MemoBuilder<A> {
  /// Creates a builder that keys calls by the canonical JSON form of their
  /// arguments. Results never expire unless a TTL is configured.
  pub fn new() -> Self {
    Self {
      time_to_live: Ttl::Never,
      clock: Arc::new(SystemClock),
      keyer: Keyer::canonical(),
    }
  }
}

impl<A: Serialize> Default for MemoBuilder<A> {
  fn default() -> Self {
    Self::new()
  }
}

impl<A> MemoBuilder<A> {
  /// Creates a builder that keys calls with `key_fn` instead of serializing
  /// the arguments. Use this for argument types that are not `Serialize`, or
  /// when only part of the arguments should discriminate calls.
  pub fn keyed_by<K>(key_fn: K) -> Self
  where
    K: Fn(&A) -> String + Send + Sync + 'static,
  {
    Self {
      time_to_live: Ttl::Never,
      clock: Arc::new(SystemClock),
      keyer: Keyer::custom(key_fn),
    }
  }

  /// Sets the default time-to-live of computed results.
  pub fn time_to_live(mut self, ttl: impl Into<Ttl>) -> Self {
    self.time_to_live = ttl.into();
    self
  }

  /// Replaces the clock used for expiration decisions.
  pub fn clock<C: Clock>(mut self, clock: C) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  /// Wraps a synchronous function.
  ///
  /// The function receives the per-call [`TtlHandle`] first, then a reference
  /// to the call arguments.
  pub fn build<R, F>(self, f: F) -> Memoized<A, R, F>
  where
    F: Fn(&TtlHandle, &A) -> R,
  {
    Memoized {
      shared: Arc::new(MemoShared::new(self.time_to_live, self.clock)),
      keyer: self.keyer,
      func: Arc::new(f),
    }
  }

  /// Wraps an asynchronous, fallible function.
  ///
  /// The returned future is stored as the pending computation for its key
  /// until it settles. A failure is handed to every waiting caller and the
  /// slot is evicted so that the next call retries.
  pub fn build_async<R, E, F, Fut>(self, f: F) -> AsyncMemoized<A, R, E>
  where
    A: 'static,
    R: 'static,
    E: 'static,
    F: Fn(TtlHandle, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
  {
    let func = move |ttl: TtlHandle, args: A| -> BoxFuture<'static, Result<R, E>> {
      f(ttl, args).boxed()
    };
    AsyncMemoized {
      shared: Arc::new(MemoShared::new(self.time_to_live, self.clock)),
      keyer: self.keyer,
      func: Arc::new(func),
    }
  }
}
