use crate::entry::{CacheEntry, Slot};
use crate::loader::LoadFuture;
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::time::{self, Clock};
use crate::ttl::Ttl;

use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use parking_lot::Mutex;

/// The mutable state of one memoized function: its entries and default TTL.
/// Both live under one lock so `update_ttl` is atomic with respect to calls.
pub(crate) struct Store<V, E> {
  pub(crate) entries: HashMap<String, CacheEntry<V, E>>,
  pub(crate) ttl: Ttl,
}

/// The core shared by a memoized function handle.
pub(crate) struct MemoShared<V, E> {
  pub(crate) store: Mutex<Store<V, E>>,
  pub(crate) clock: Arc<dyn Clock>,
  pub(crate) metrics: Metrics,
}

/// The result of looking a key up on the call path.
pub(crate) enum Lookup<V, E> {
  /// A fresh value is stored.
  Hit(Arc<V>),
  /// Someone else is computing this key; wait for them.
  Join(Arc<LoadFuture<V, E>>),
  /// We claimed the slot and must compute it.
  Lead(Lead<V, E>),
}

pub(crate) struct Lead<V, E> {
  pub(crate) load: Arc<LoadFuture<V, E>>,
  pub(crate) started_at: u64,
}

impl<V, E> MemoShared<V, E> {
  pub(crate) fn new(ttl: Ttl, clock: Arc<dyn Clock>) -> Self {
    Self {
      store: Mutex::new(Store {
        entries: HashMap::new(),
        ttl,
      }),
      clock,
      metrics: Metrics::new(),
    }
  }

  #[inline]
  pub(crate) fn now(&self) -> u64 {
    time::now_nanos(&*self.clock)
  }

  /// Returns the stored value, joins an in-flight computation, or claims the
  /// slot by storing a fresh pending entry. Claiming happens under the same
  /// lock as the lookup, so at most one caller leads a given key.
  pub(crate) fn lookup(&self, key: &str) -> Lookup<V, E> {
    let now = self.now();
    let mut store = self.store.lock();

    if let Some(entry) = store.entries.get(key) {
      match &entry.slot {
        Slot::Pending(load) => {
          Metrics::bump(&self.metrics.coalesced);
          tracing::trace!(key, "joining in-flight computation");
          return Lookup::Join(load.clone());
        }
        Slot::Ready(value) if !entry.is_expired(now) => {
          Metrics::bump(&self.metrics.hits);
          tracing::trace!(key, "memo hit");
          return Lookup::Hit(value.clone());
        }
        Slot::Ready(_) => {
          tracing::trace!(key, "memo entry expired");
        }
      }
    }

    Metrics::bump(&self.metrics.misses);
    tracing::trace!(key, "memo miss");
    let load = Arc::new(LoadFuture::new());
    let expires_at = store.ttl.expires_at(now);
    store
      .entries
      .insert(key.to_owned(), CacheEntry::pending(load.clone(), expires_at));

    Lookup::Lead(Lead {
      load,
      started_at: now,
    })
  }

  /// Replaces the pending marker with the computed value. If the slot was
  /// cleared or superseded meanwhile, the value is only handed to waiters.
  pub(crate) fn settle_ok(
    &self,
    key: &str,
    lead: &Lead<V, E>,
    value: Arc<V>,
    requested: Option<Ttl>,
  ) {
    {
      let mut store = self.store.lock();
      match store.entries.get_mut(key) {
        Some(entry) if entry.is_pending_for(&lead.load) => {
          entry.slot = Slot::Ready(value.clone());
          if let Some(ttl) = requested {
            entry.expires_at = ttl.expires_at(lead.started_at);
          }
          Metrics::bump(&self.metrics.inserts);
        }
        _ => tracing::trace!(key, "slot was cleared during computation; result not stored"),
      }
    }
    lead.load.complete(value);
  }

  /// Evicts the pending slot so the next call retries, then wakes waiters
  /// with the shared error.
  pub(crate) fn settle_err(&self, key: &str, lead: &Lead<V, E>, error: Arc<E>) {
    self.evict_pending(key, lead);
    Metrics::bump(&self.metrics.failures);
    tracing::debug!(key, "memoized computation failed; slot evicted");
    lead.load.fail(error);
  }

  /// The leader went away without a result. Waiters will retry.
  pub(crate) fn abandon(&self, key: &str, lead: &Lead<V, E>) {
    self.evict_pending(key, lead);
    Metrics::bump(&self.metrics.abandoned);
    tracing::debug!(key, "memoized computation abandoned before settling");
    lead.load.abandon();
  }

  fn evict_pending(&self, key: &str, lead: &Lead<V, E>) {
    let mut store = self.store.lock();
    if store
      .entries
      .get(key)
      .is_some_and(|entry| entry.is_pending_for(&lead.load))
    {
      store.entries.remove(key);
    }
  }

  pub(crate) fn clear(&self) {
    let dropped = {
      let mut store = self.store.lock();
      let n = store.entries.len();
      store.entries.clear();
      n
    };
    Metrics::bump(&self.metrics.clears);
    tracing::debug!(dropped, "memo cache cleared");
  }

  /// Sets the default TTL and renews every entry that has not yet expired.
  pub(crate) fn update_ttl(&self, ttl: Ttl) {
    let now = self.now();
    let renewed = {
      let mut store = self.store.lock();
      store.ttl = ttl;
      let new_expiry = ttl.expires_at(now);
      let mut renewed = 0u64;
      for entry in store.entries.values_mut() {
        if !entry.is_expired(now) {
          entry.expires_at = new_expiry;
          renewed += 1;
        }
      }
      renewed
    };
    self
      .metrics
      .renewals
      .fetch_add(renewed, std::sync::atomic::Ordering::Relaxed);
    tracing::debug!(?ttl, renewed, "memo ttl updated");
  }

  pub(crate) fn ttl(&self) -> Ttl {
    self.store.lock().ttl
  }

  /// Whether a call for `key` would be served without invoking the function.
  pub(crate) fn contains(&self, key: &str) -> bool {
    let now = self.now();
    self.store.lock().entries.get(key).is_some_and(|entry| match entry.slot {
      Slot::Pending(_) => true,
      Slot::Ready(_) => !entry.is_expired(now),
    })
  }

  pub(crate) fn len(&self) -> usize {
    self.store.lock().entries.len()
  }

  pub(crate) fn metrics(&self) -> MetricsSnapshot {
    let entries = self.len();
    self.metrics.snapshot(entries)
  }
}

/// Owns a claimed slot for the duration of a computation.
///
/// If it is dropped without being settled (the function panicked, or the
/// calling future was dropped mid-await) the slot is released and waiters are
/// told to retry.
pub(crate) struct LeaderGuard<'a, V, E> {
  shared: &'a MemoShared<V, E>,
  key: &'a str,
  lead: Lead<V, E>,
  settled: bool,
}

impl<'a, V, E> LeaderGuard<'a, V, E> {
  pub(crate) fn new(shared: &'a MemoShared<V, E>, key: &'a str, lead: Lead<V, E>) -> Self {
    Self {
      shared,
      key,
      lead,
      settled: false,
    }
  }

  pub(crate) fn succeed(mut self, value: Arc<V>, requested: Option<Ttl>) {
    self.settled = true;
    self.shared.settle_ok(self.key, &self.lead, value, requested);
  }

  pub(crate) fn fail(mut self, error: Arc<E>) {
    self.settled = true;
    self.shared.settle_err(self.key, &self.lead, error);
  }
}

impl<V, E> Drop for LeaderGuard<'_, V, E> {
  fn drop(&mut self) {
    if !self.settled {
      self.shared.abandon(self.key, &self.lead);
    }
  }
}
