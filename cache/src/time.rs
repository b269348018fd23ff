use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// The single, static reference point for all time calculations in the cache.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Expiration timestamp meaning "never expires".
pub(crate) const NEVER: u64 = u64::MAX;

/// A source of monotonic time for expiration decisions.
///
/// `now` returns the time elapsed since an arbitrary but fixed origin. Only
/// differences between two readings of the same clock are meaningful.
pub trait Clock: Send + Sync + 'static {
  fn now(&self) -> Duration;
}

/// The default clock, backed by `Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  #[inline]
  fn now(&self) -> Duration {
    Instant::now().saturating_duration_since(*CACHE_EPOCH)
  }
}

/// A clock that only moves when told to. Clones share the same time.
///
/// ```
/// use sundry_cache::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_secs(30));
/// assert_eq!(clock.now(), Duration::from_secs(30));
/// ```
#[derive(Clone, Default)]
pub struct ManualClock {
  nanos: Arc<AtomicU64>,
}

impl ManualClock {
  pub fn new() -> Self {
    Self::default()
  }

  /// Moves the clock forward by `by`.
  pub fn advance(&self, by: Duration) {
    self.nanos.fetch_add(as_nanos(by), Ordering::SeqCst);
  }

  /// Jumps the clock to an absolute reading.
  pub fn set(&self, to: Duration) {
    self.nanos.store(as_nanos(to), Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> Duration {
    Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
  }
}

impl fmt::Debug for ManualClock {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ManualClock")
      .field("now", &self.now())
      .finish()
  }
}

/// Saturating conversion; `NEVER` is reserved, so real readings stop one short.
#[inline]
pub(crate) fn as_nanos(duration: Duration) -> u64 {
  u64::try_from(duration.as_nanos()).map_or(NEVER - 1, |n| n.min(NEVER - 1))
}

/// Reads `clock` as nanoseconds since its origin.
#[inline]
pub(crate) fn now_nanos(clock: &dyn Clock) -> u64 {
  as_nanos(clock.now())
}
