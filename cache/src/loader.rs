use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread, ThreadId};

/// Represents a waiter in the queue for a `LoadFuture`.
pub(crate) enum Waiter {
  Sync(Thread),
  Async(Waker),
}

impl Waiter {
  fn wake(self) {
    match self {
      Waiter::Sync(thread) => thread.unpark(),
      Waiter::Async(waker) => waker.wake(),
    }
  }
}

/// The internal state of a value being computed.
pub(crate) enum State<V, E> {
  Computing,
  Complete(Arc<V>),
  Failed(Arc<E>),
  /// The leader went away (panicked or was dropped) without settling.
  Abandoned,
}

/// What a waiter observes once the computation settles.
pub(crate) enum Outcome<V, E> {
  Complete(Arc<V>),
  Failed(Arc<E>),
  Abandoned,
}

/// The internal, mutex-protected core of the LoadFuture.
pub(crate) struct Inner<V, E> {
  pub(crate) state: State<V, E>,
  pub(crate) waiters: VecDeque<Waiter>,
}

impl<V, E> Inner<V, E> {
  fn outcome(&self) -> Option<Outcome<V, E>> {
    match &self.state {
      State::Computing => None,
      State::Complete(v) => Some(Outcome::Complete(v.clone())),
      State::Failed(e) => Some(Outcome::Failed(e.clone())),
      State::Abandoned => Some(Outcome::Abandoned),
    }
  }
}

/// A pending computation stored in place of a value.
///
/// It can be awaited by multiple sync threads and async tasks simultaneously;
/// all of them observe the single outcome the leader settles it with.
pub(crate) struct LoadFuture<V, E> {
  pub(crate) inner: Mutex<Inner<V, E>>,
  leader: ThreadId,
}

impl<V, E> LoadFuture<V, E> {
  /// Creates a new `LoadFuture` in the "Computing" state, owned by the
  /// current thread.
  pub fn new() -> Self {
    Self {
      inner: Mutex::new(Inner {
        state: State::Computing,
        waiters: VecDeque::new(),
      }),
      leader: thread::current().id(),
    }
  }

  /// Whether the calling thread is the one that started this computation.
  #[inline]
  pub fn led_by_current_thread(&self) -> bool {
    self.leader == thread::current().id()
  }

  pub fn complete(&self, value: Arc<V>) {
    self.settle(State::Complete(value));
  }

  pub fn fail(&self, error: Arc<E>) {
    self.settle(State::Failed(error));
  }

  pub fn abandon(&self) {
    self.settle(State::Abandoned);
  }

  /// Moves to a terminal state, waking all waiters. Only the first call wins.
  fn settle(&self, state: State<V, E>) {
    let mut inner = self.inner.lock();
    if !matches!(inner.state, State::Computing) {
      return;
    }
    inner.state = state;
    for waiter in inner.waiters.drain(..) {
      waiter.wake();
    }
  }

  /// Blocks the current thread until the computation settles.
  pub fn wait_blocking(&self) -> Outcome<V, E> {
    let mut inner = self.inner.lock();
    loop {
      if let Some(outcome) = inner.outcome() {
        return outcome;
      }
      inner.waiters.push_back(Waiter::Sync(thread::current()));
      drop(inner); // Unlock before parking.
      thread::park();
      inner = self.inner.lock();
    }
  }
}

impl<V, E> Future for &LoadFuture<V, E> {
  type Output = Outcome<V, E>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let mut inner = self.inner.lock();
    if let Some(outcome) = inner.outcome() {
      return Poll::Ready(outcome);
    }
    let already_queued = inner.waiters.iter().any(|w| match w {
      Waiter::Async(waker) => waker.will_wake(cx.waker()),
      Waiter::Sync(_) => false,
    });
    if !already_queued {
      inner.waiters.push_back(Waiter::Async(cx.waker().clone()));
    }
    Poll::Pending
  }
}
