use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for a memoized function.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookups ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) coalesced: CachePadded<AtomicU64>,

  // --- Computations ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) failures: CachePadded<AtomicU64>,
  pub(crate) abandoned: CachePadded<AtomicU64>,

  // --- Management ---
  pub(crate) clears: CachePadded<AtomicU64>,
  pub(crate) renewals: CachePadded<AtomicU64>,

  created_at: Instant,
}

// Manual implementation of Default to handle the non-default `Instant`.
impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      coalesced: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      failures: CachePadded::new(AtomicU64::new(0)),
      abandoned: CachePadded::new(AtomicU64::new(0)),
      clears: CachePadded::new(AtomicU64::new(0)),
      renewals: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  #[inline]
  pub(crate) fn bump(counter: &CachePadded<AtomicU64>) {
    counter.fetch_add(1, Ordering::Relaxed);
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self, entries: usize) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let coalesced = self.coalesced.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let served_without_compute = hits + coalesced;
    let total_lookups = served_without_compute + misses;

    MetricsSnapshot {
      hits,
      misses,
      coalesced,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        served_without_compute as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      failures: self.failures.load(Ordering::Relaxed),
      abandoned: self.abandoned.load(Ordering::Relaxed),
      clears: self.clears.load(Ordering::Relaxed),
      renewals: self.renewals.load(Ordering::Relaxed),
      entries,
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of a memoized function's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Calls answered from a fresh stored value.
  pub hits: u64,
  /// Calls that invoked the wrapped function.
  pub misses: u64,
  /// Calls that joined a computation already in flight.
  pub coalesced: u64,
  /// (hits + coalesced) / all calls.
  pub hit_ratio: f64,
  /// Results stored after a successful computation.
  pub inserts: u64,
  /// Computations that failed and evicted their slot.
  pub failures: u64,
  /// Computations whose leader went away before settling.
  pub abandoned: u64,
  /// Calls to `clear`.
  pub clears: u64,
  /// Entries whose expiry was extended by `update_ttl`.
  pub renewals: u64,
  /// Entries currently stored, expired ones included.
  pub entries: usize,
  /// Seconds since the wrapper was built.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("coalesced", &self.coalesced)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("inserts", &self.inserts)
      .field("failures", &self.failures)
      .field("abandoned", &self.abandoned)
      .field("clears", &self.clears)
      .field("renewals", &self.renewals)
      .field("entries", &self.entries)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
