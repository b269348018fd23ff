#![allow(dead_code)]

use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;

use sundry_cache::{ManualClock, MemoBuilder, Memoized, Ttl, TtlHandle};

/// Counts how many times a wrapped function actually ran.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn hit(&self) -> usize {
    self.0.fetch_add(1, Ordering::SeqCst) + 1
  }

  pub fn count(&self) -> usize {
    self.0.load(Ordering::SeqCst)
  }
}

pub fn secs(n: u64) -> Duration {
  Duration::from_secs(n)
}

/// A memoized `str -> "<arg>#<n>"` function where `n` is the invocation
/// number, so recomputation is visible in the returned value.
pub fn build_counting_memo(
  ttl: Ttl,
) -> (
  Memoized<String, String, impl Fn(&TtlHandle, &String) -> String>,
  CallCounter,
  ManualClock,
) {
  let counter = CallCounter::new();
  let clock = ManualClock::new();
  let memo = MemoBuilder::new().time_to_live(ttl).clock(clock.clone()).build({
    let counter = counter.clone();
    move |_ttl: &TtlHandle, arg: &String| format!("{}#{}", arg, counter.hit())
  });
  (memo, counter, clock)
}
