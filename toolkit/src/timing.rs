//! Timer helpers on the Tokio runtime.
//!
//! [`Debounced`] and [`Throttled`] spawn their delayed calls onto the current
//! runtime, so `call` must be made from inside one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const DEFAULT_SLEEP: Duration = Duration::from_millis(150);
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Waits `duration`, or 150ms when `None`.
pub async fn sleep(duration: Option<Duration>) {
  tokio::time::sleep(duration.unwrap_or(DEFAULT_SLEEP)).await;
}

/// Wraps `f` so that only the last call of a burst runs, once `delay`
/// (300ms when `None`) has passed without another call.
pub fn debounce<A, F>(f: F, delay: Option<Duration>) -> Debounced<A>
where
  A: Send + 'static,
  F: Fn(A) + Send + Sync + 'static,
{
  Debounced {
    inner: TimerInner::new(Box::new(f), delay),
  }
}

/// Wraps `f` so that it runs at most once per `delay` window (300ms when
/// `None`). The first call opens the window and runs with its arguments
/// when the window closes; calls made while it is open are dropped.
pub fn throttle<A, F>(f: F, delay: Option<Duration>) -> Throttled<A>
where
  A: Send + 'static,
  F: Fn(A) + Send + Sync + 'static,
{
  Throttled {
    inner: TimerInner::new(Box::new(f), delay),
  }
}

type BoxedFn<A> = Box<dyn Fn(A) + Send + Sync>;

/// The scheduled call. `generation` changes whenever the call is replaced or
/// cancelled, so a task that already woke up can tell it is stale.
#[derive(Default)]
struct Slot {
  generation: u64,
  handle: Option<JoinHandle<()>>,
}

impl Slot {
  fn cancel(&mut self) {
    self.generation = self.generation.wrapping_add(1);
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
  }
}

struct TimerInner<A> {
  func: BoxedFn<A>,
  delay: Duration,
  slot: Mutex<Slot>,
}

impl<A: Send + 'static> TimerInner<A> {
  fn new(func: BoxedFn<A>, delay: Option<Duration>) -> Arc<Self> {
    Arc::new(Self {
      func,
      delay: delay.unwrap_or(DEFAULT_DELAY),
      slot: Mutex::new(Slot::default()),
    })
  }

  /// Replaces whatever is scheduled with `args`, due `delay` from now.
  fn schedule(self: &Arc<Self>, slot: &mut Slot, args: A) {
    slot.cancel();
    let generation = slot.generation;
    let deadline = Instant::now() + self.delay;
    let inner = self.clone();
    slot.handle = Some(tokio::spawn(async move {
      tokio::time::sleep_until(deadline).await;
      {
        let mut slot = inner.slot.lock();
        if slot.generation != generation {
          return;
        }
        slot.handle = None;
      }
      (inner.func)(args);
    }));
  }
}

impl<A> TimerInner<A> {
  fn cancel(&self) {
    self.slot.lock().cancel();
  }

  fn is_scheduled(&self) -> bool {
    self.slot.lock().handle.is_some()
  }
}

/// A debounced function. Clones share the same timer.
pub struct Debounced<A> {
  inner: Arc<TimerInner<A>>,
}

impl<A> Clone for Debounced<A> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<A> fmt::Debug for Debounced<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Debounced")
      .field("delay", &self.inner.delay)
      .field("pending", &self.is_pending())
      .finish()
  }
}

impl<A: Send + 'static> Debounced<A> {
  /// Restarts the quiet period; `args` replace those of any earlier
  /// pending call.
  ///
  /// # Panics
  ///
  /// Outside a Tokio runtime.
  pub fn call(&self, args: A) {
    let mut slot = self.inner.slot.lock();
    self.inner.schedule(&mut slot, args);
  }
}

impl<A> Debounced<A> {
  /// Drops the pending call, if any.
  pub fn cancel(&self) {
    self.inner.cancel();
  }

  pub fn is_pending(&self) -> bool {
    self.inner.is_scheduled()
  }
}

/// A throttled function. Clones share the same window.
pub struct Throttled<A> {
  inner: Arc<TimerInner<A>>,
}

impl<A> Clone for Throttled<A> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl<A> fmt::Debug for Throttled<A> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Throttled")
      .field("delay", &self.inner.delay)
      .field("open", &self.is_open())
      .finish()
  }
}

impl<A: Send + 'static> Throttled<A> {
  /// Opens a window that runs `args` when it closes. Returns `false` when a
  /// window is already open and the call was dropped.
  ///
  /// # Panics
  ///
  /// Outside a Tokio runtime.
  pub fn call(&self, args: A) -> bool {
    let mut slot = self.inner.slot.lock();
    if slot.handle.is_some() {
      tracing::trace!("throttled call dropped");
      return false;
    }
    self.inner.schedule(&mut slot, args);
    true
  }
}

impl<A> Throttled<A> {
  /// Whether a window is open (a call is scheduled).
  pub fn is_open(&self) -> bool {
    self.inner.is_scheduled()
  }

  /// Closes the window without running its call.
  pub fn cancel(&self) {
    self.inner.cancel();
  }
}
