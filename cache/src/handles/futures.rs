use crate::error::{KeyError, MemoError};
use crate::key::Keyer;
use crate::loader::Outcome;
use crate::shared::{LeaderGuard, Lookup, MemoShared};
use crate::ttl::{Ttl, TtlHandle};
use crate::MetricsSnapshot;

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

type AsyncFn<A, R, E> = dyn Fn(TtlHandle, A) -> BoxFuture<'static, Result<R, E>> + Send + Sync;

/// A memoized asynchronous function.
///
/// The pending computation for a key is stored before it settles, so callers
/// arriving while it is in flight await it instead of starting their own.
pub struct AsyncMemoized<A, R, E> {
  pub(crate) shared: Arc<MemoShared<R, E>>,
  pub(crate) keyer: Keyer<A>,
  pub(crate) func: Arc<AsyncFn<A, R, E>>,
}

impl<A, R, E> Clone for AsyncMemoized<A, R, E> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
      keyer: self.keyer.clone(),
      func: self.func.clone(),
    }
  }
}

impl<A, R, E> fmt::Debug for AsyncMemoized<A, R, E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AsyncMemoized")
      .field("ttl", &self.shared.ttl())
      .field("entries", &self.shared.len())
      .finish_non_exhaustive()
  }
}

impl<A, R, E> AsyncMemoized<A, R, E> {
  /// Calls the wrapped function, joins an identical call already in flight,
  /// or returns the stored result.
  ///
  /// If the computation fails, every caller waiting on it receives the same
  /// `Arc<E>` and the slot is evicted, so the next call computes again. If the
  /// caller that started the computation is dropped before it finishes, the
  /// slot is released and the remaining waiters retry.
  ///
  /// The computation must not await a call for its own key: unlike the
  /// synchronous handle, a task cannot be told apart from the one leading the
  /// computation, so such a call joins itself and never completes. The same
  /// holds for two computations awaiting each other's keys.
  pub async fn call(&self, args: A) -> Result<Arc<R>, MemoError<E>> {
    let key = self.keyer.key(&args)?;

    loop {
      match self.shared.lookup(&key) {
        Lookup::Hit(value) => return Ok(value),

        Lookup::Join(load) => match (&*load).await {
          Outcome::Complete(value) => return Ok(value),
          Outcome::Failed(error) => return Err(MemoError::Compute(error)),
          Outcome::Abandoned => continue,
        },

        Lookup::Lead(lead) => {
          let guard = LeaderGuard::new(&self.shared, &key, lead);
          let handle = TtlHandle::new();
          return match (self.func)(handle.clone(), args).await {
            Ok(value) => {
              let value = Arc::new(value);
              guard.succeed(value.clone(), handle.requested());
              Ok(value)
            }
            Err(error) => {
              let error = Arc::new(error);
              guard.fail(error.clone());
              Err(MemoError::Compute(error))
            }
          };
        }
      }
    }
  }

  /// Whether a call with `args` would currently be answered without starting
  /// a computation (stored and fresh, or in flight).
  pub fn contains(&self, args: &A) -> Result<bool, KeyError> {
    let key = self.keyer.key(args)?;
    Ok(self.shared.contains(&key))
  }

  /// Removes every stored result. Computations in flight still resolve their
  /// callers but are not stored.
  pub fn clear(&self) {
    self.shared.clear();
  }

  /// Sets the default TTL for future computations and extends every entry
  /// that has not expired yet to `now + ttl`. Expired entries stay expired.
  pub fn update_ttl(&self, ttl: impl Into<Ttl>) {
    self.shared.update_ttl(ttl.into());
  }

  /// The current default TTL.
  pub fn ttl(&self) -> Ttl {
    self.shared.ttl()
  }

  /// Number of stored entries, including pending and expired ones.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics()
  }
}
