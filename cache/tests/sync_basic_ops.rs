mod common;

use common::{build_counting_memo, secs, CallCounter};

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use sundry_cache::{with_cache, KeyError, ManualClock, MemoBuilder, Ttl, TtlHandle};

#[test]
fn test_sync_hit_avoids_recomputation() {
  let (memo, counter, _clock) = build_counting_memo(Ttl::After(secs(60)));

  let first = memo.call(&"x".to_string()).unwrap();
  let second = memo.call(&"x".to_string()).unwrap();

  assert_eq!(*first, "x#1");
  assert_eq!(*second, "x#1");
  assert!(Arc::ptr_eq(&first, &second), "Both calls should share the stored value");
  assert_eq!(counter.count(), 1);

  let metrics = memo.metrics();
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.hits, 1);
  assert_eq!(metrics.inserts, 1);
  assert_eq!(metrics.entries, 1);
}

#[test]
fn test_sync_distinct_arguments_are_distinct_entries() {
  let (memo, counter, _clock) = build_counting_memo(Ttl::Never);

  assert_eq!(*memo.call(&"a".to_string()).unwrap(), "a#1");
  assert_eq!(*memo.call(&"b".to_string()).unwrap(), "b#2");
  assert_eq!(*memo.call(&"a".to_string()).unwrap(), "a#1");
  assert_eq!(counter.count(), 2);
  assert_eq!(memo.len(), 2);
}

#[test]
fn test_sync_never_expire_by_default() {
  let counter = CallCounter::new();
  let clock = ManualClock::new();
  let memo = MemoBuilder::<u32>::new().clock(clock.clone()).build({
    let counter = counter.clone();
    move |_: &TtlHandle, n: &u32| {
      counter.hit();
      n + 1
    }
  });

  for _ in 0..5 {
    assert_eq!(*memo.call(&41).unwrap(), 42);
    clock.advance(Duration::from_secs(60 * 60 * 24 * 365));
  }
  assert_eq!(counter.count(), 1, "A never-expiring entry should be computed once");
}

#[test]
fn test_sync_minus_one_seconds_means_never() {
  let counter = CallCounter::new();
  let memo = with_cache(
    {
      let counter = counter.clone();
      move |_: &TtlHandle, s: &String| {
        counter.hit();
        s.to_uppercase()
      }
    },
    Ttl::from_secs(-1),
  );

  assert_eq!(memo.ttl(), Ttl::Never);
  memo.call(&"q".to_string()).unwrap();
  memo.call(&"q".to_string()).unwrap();
  assert_eq!(counter.count(), 1);
}

#[test]
fn test_sync_clear_forces_recomputation() {
  let (memo, counter, _clock) = build_counting_memo(Ttl::Never);

  memo.call(&"a".to_string()).unwrap();
  memo.call(&"b".to_string()).unwrap();
  assert_eq!(counter.count(), 2);

  memo.clear();
  assert!(memo.is_empty());
  assert!(!memo.contains(&"a".to_string()).unwrap());

  assert_eq!(*memo.call(&"a".to_string()).unwrap(), "a#3");
  assert_eq!(*memo.call(&"b".to_string()).unwrap(), "b#4");
  assert_eq!(memo.metrics().clears, 1);
}

#[test]
fn test_sync_independent_wrappers_share_nothing() {
  let (first, first_counter, _) = build_counting_memo(Ttl::Never);
  let (second, second_counter, _) = build_counting_memo(Ttl::Never);

  first.call(&"k".to_string()).unwrap();
  second.call(&"k".to_string()).unwrap();
  first.clear();

  assert_eq!(first_counter.count(), 1);
  assert_eq!(second_counter.count(), 1);
  assert!(second.contains(&"k".to_string()).unwrap());
  assert!(!first.contains(&"k".to_string()).unwrap());
}

#[test]
fn test_sync_clones_share_state() {
  let (memo, counter, _clock) = build_counting_memo(Ttl::Never);
  let clone = memo.clone();

  memo.call(&"k".to_string()).unwrap();
  clone.call(&"k".to_string()).unwrap();
  assert_eq!(counter.count(), 1);

  clone.clear();
  assert!(memo.is_empty());
}

#[test]
fn test_sync_map_argument_order_is_irrelevant() {
  let counter = CallCounter::new();
  let memo = MemoBuilder::<HashMap<String, u32>>::new().build({
    let counter = counter.clone();
    move |_: &TtlHandle, m: &HashMap<String, u32>| {
      counter.hit();
      m.values().sum::<u32>()
    }
  });

  let mut forward = HashMap::new();
  let mut backward = HashMap::new();
  for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate() {
    forward.insert(k.to_string(), i as u32);
  }
  for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate().rev() {
    backward.insert(k.to_string(), i as u32);
  }

  assert_eq!(*memo.call(&forward).unwrap(), 10);
  assert_eq!(*memo.call(&backward).unwrap(), 10);
  assert_eq!(counter.count(), 1);
}

#[test]
fn test_sync_unserializable_arguments_fail_fast() {
  let counter = CallCounter::new();
  let memo = MemoBuilder::<BTreeMap<(u8, u8), u8>>::new().build({
    let counter = counter.clone();
    move |_: &TtlHandle, m: &BTreeMap<(u8, u8), u8>| {
      counter.hit();
      m.len()
    }
  });

  let mut args = BTreeMap::new();
  args.insert((1, 2), 3);

  let err = memo.call(&args).unwrap_err();
  assert!(err.to_string().contains("cache key"));
  assert_eq!(counter.count(), 0, "The function must not run without a key");
  assert!(memo.is_empty());
}

#[test]
fn test_sync_non_finite_float_arguments_fail_fast() {
  let counter = CallCounter::new();
  let memo = MemoBuilder::<Option<f64>>::new().build({
    let counter = counter.clone();
    move |_: &TtlHandle, x: &Option<f64>| {
      counter.hit();
      format!("{x:?}")
    }
  });

  let err = memo.call(&Some(f64::INFINITY)).unwrap_err();
  assert!(err.to_string().contains("non-finite float inf"), "{err}");
  assert!(matches!(memo.call(&Some(f64::NAN)), Err(KeyError::NonFiniteFloat(_))));
  assert!(matches!(memo.contains(&Some(f64::NEG_INFINITY)), Err(KeyError::NonFiniteFloat(_))));
  assert_eq!(counter.count(), 0, "The function must not run without a key");
  assert!(memo.is_empty());

  assert_eq!(*memo.call(&None).unwrap(), "None");
  assert_eq!(*memo.call(&Some(1.5)).unwrap(), "Some(1.5)");
  assert_eq!(counter.count(), 2, "None and a finite float are distinct entries");
}

#[test]
fn test_sync_custom_key_function() {
  struct Request {
    path: &'static str,
    trace_id: u64,
  }

  let counter = CallCounter::new();
  let memo = MemoBuilder::keyed_by(|r: &Request| r.path.to_string()).build({
    let counter = counter.clone();
    move |_: &TtlHandle, r: &Request| {
      counter.hit();
      format!("{} via {}", r.path, r.trace_id)
    }
  });

  let a = memo.call(&Request { path: "/blogs", trace_id: 1 }).unwrap();
  let b = memo.call(&Request { path: "/blogs", trace_id: 2 }).unwrap();
  assert_eq!(*a, "/blogs via 1");
  assert_eq!(*b, "/blogs via 1");
  assert_eq!(counter.count(), 1);
}

#[test]
fn test_sync_thundering_herd_computes_once() {
  let num_threads = 16;
  let counter = CallCounter::new();
  let memo = MemoBuilder::<u32>::new().build({
    let counter = counter.clone();
    move |_: &TtlHandle, n: &u32| {
      counter.hit();
      thread::sleep(Duration::from_millis(100));
      n * 10
    }
  });

  let barrier = Arc::new(Barrier::new(num_threads));
  let handles: Vec<_> = (0..num_threads)
    .map(|_| {
      let memo = memo.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        *memo.call(&99).unwrap()
      })
    })
    .collect();

  for handle in handles {
    assert_eq!(handle.join().unwrap(), 990);
  }

  assert_eq!(counter.count(), 1, "Thundering herd protection failed");
  let metrics = memo.metrics();
  assert_eq!(metrics.misses, 1);
  assert_eq!(metrics.hits + metrics.coalesced, (num_threads - 1) as u64);
}

#[test]
fn test_sync_panicking_leader_releases_the_slot() {
  let counter = CallCounter::new();
  let memo = MemoBuilder::<u32>::new().build({
    let counter = counter.clone();
    move |_: &TtlHandle, n: &u32| {
      if counter.hit() == 1 {
        panic!("first computation blows up");
      }
      *n
    }
  });

  let crashing = memo.clone();
  let result = thread::spawn(move || crashing.call(&5).map(|v| *v)).join();
  assert!(result.is_err(), "The panic should reach the caller");

  assert!(memo.is_empty(), "An abandoned slot must not stay cached");
  assert_eq!(*memo.call(&5).unwrap(), 5);
  assert_eq!(counter.count(), 2);
  assert_eq!(memo.metrics().abandoned, 1);
}

#[test]
fn test_sync_reentrant_same_key_call_does_not_deadlock() {
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::OnceLock;

  type Doubler = sundry_cache::Memoized<u64, u64, Box<dyn Fn(&TtlHandle, &u64) -> u64 + Send + Sync>>;
  static SELF_REF: OnceLock<Doubler> = OnceLock::new();
  static ENTERED: AtomicBool = AtomicBool::new(false);

  let memo: Doubler = MemoBuilder::new().build(Box::new(|_: &TtlHandle, n: &u64| {
    if !ENTERED.swap(true, Ordering::SeqCst) {
      // Ask for our own key while it is still pending.
      let inner = SELF_REF.get().unwrap().call(n).unwrap();
      return *inner + 1;
    }
    n * 2
  }) as Box<dyn Fn(&TtlHandle, &u64) -> u64 + Send + Sync>);
  let _ = SELF_REF.set(memo);

  let memo = SELF_REF.get().unwrap();
  assert_eq!(*memo.call(&5).unwrap(), 11);
  assert_eq!(*memo.call(&5).unwrap(), 11, "The outer result is the cached one");
  assert_eq!(memo.len(), 1);
}
