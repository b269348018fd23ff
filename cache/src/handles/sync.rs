use crate::error::KeyError;
use crate::key::Keyer;
use crate::loader::Outcome;
use crate::shared::{LeaderGuard, Lookup, MemoShared};
use crate::ttl::{Ttl, TtlHandle};
use crate::MetricsSnapshot;

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// A memoized synchronous function.
///
/// Cloning the handle is cheap; clones share the same cache and TTL state.
/// Handles built separately never share anything.
///
/// When several threads ask for the same key at once, one computes and the
/// others park until it is done. A computation that panics releases its slot
/// and the parked threads retry.
pub struct Memoized<A, R, F> {
  pub(crate) shared: Arc<MemoShared<R, Infallible>>,
  pub(crate) keyer: Keyer<A>,
  pub(crate) func: Arc<F>,
}

impl<A, R, F> Clone for Memoized<A, R, F> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
      keyer: self.keyer.clone(),
      func: self.func.clone(),
    }
  }
}

impl<A, R, F> fmt::Debug for Memoized<A, R, F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Memoized")
      .field("ttl", &self.shared.ttl())
      .field("entries", &self.shared.len())
      .finish_non_exhaustive()
  }
}

impl<A, R, F> Memoized<A, R, F>
where
  F: Fn(&TtlHandle, &A) -> R,
{
  /// Calls the wrapped function, or returns the stored result for
  /// argument-equal calls that have not expired.
  pub fn call(&self, args: &A) -> Result<Arc<R>, KeyError> {
    let key = self.keyer.key(args)?;

    loop {
      match self.shared.lookup(&key) {
        Lookup::Hit(value) => return Ok(value),

        Lookup::Join(load) => {
          // The function asked for its own key. Waiting would never end.
          if load.led_by_current_thread() {
            tracing::trace!(key = %key, "re-entrant call computed without caching");
            return Ok(Arc::new((self.func)(&TtlHandle::new(), args)));
          }
          match load.wait_blocking() {
            Outcome::Complete(value) => return Ok(value),
            Outcome::Failed(never) => match *never {},
            Outcome::Abandoned => continue,
          }
        }

        Lookup::Lead(lead) => {
          let guard = LeaderGuard::new(&self.shared, &key, lead);
          let handle = TtlHandle::new();
          let value = Arc::new((self.func)(&handle, args));
          guard.succeed(value.clone(), handle.requested());
          return Ok(value);
        }
      }
    }
  }

  /// Whether a call with `args` would currently be answered from the cache.
  pub fn contains(&self, args: &A) -> Result<bool, KeyError> {
    let key = self.keyer.key(args)?;
    Ok(self.shared.contains(&key))
  }
}

impl<A, R, F> Memoized<A, R, F> {
  /// Removes every stored result.
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

  /// Number of stored entries, including expired ones not yet overwritten.
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
