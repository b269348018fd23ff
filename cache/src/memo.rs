use crate::builder::MemoBuilder;
use crate::handles::{AsyncMemoized, Memoized};
use crate::ttl::{Ttl, TtlHandle};

use std::future::Future;

use serde::Serialize;

/// Memoizes a synchronous function, keyed by its serialized arguments.
///
/// `ttl` is the default lifetime of a result; pass `Ttl::Never` (or
/// `Ttl::from_secs(-1)`) to keep results until [`Memoized::clear`]. The
/// function may shorten or extend the lifetime of the result it is computing
/// through the [`TtlHandle`] it receives.
///
/// ```
/// use std::time::Duration;
/// use sundry_cache::{with_cache, Ttl};
///
/// let greet = with_cache(
///   |ttl, name: &String| {
///     if name.is_empty() {
///       ttl.set_ttl(Duration::ZERO);
///     }
///     format!("hello, {name}")
///   },
///   Ttl::from_secs(60),
/// );
///
/// assert_eq!(*greet.call(&"ada".to_string()).unwrap(), "hello, ada");
/// assert!(greet.contains(&"ada".to_string()).unwrap());
/// ```
pub fn with_cache<A, R, F>(f: F, ttl: impl Into<Ttl>) -> Memoized<A, R, F>
where
  A: Serialize,
  F: Fn(&TtlHandle, &A) -> R,
{
  MemoBuilder::new().time_to_live(ttl).build(f)
}

/// Memoizes an asynchronous, fallible function, keyed by its serialized
/// arguments. Concurrent calls with equal arguments share one computation.
///
/// ```
/// use sundry_cache::{with_cache_async, Ttl};
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let lookup = with_cache_async(
///   |_ttl, id: u32| async move { Ok::<_, std::io::Error>(format!("user-{id}")) },
///   Ttl::Never,
/// );
///
/// let (a, b) = tokio::join!(lookup.call(7), lookup.call(7));
/// assert_eq!(*a.unwrap(), "user-7");
/// assert_eq!(*b.unwrap(), "user-7");
/// assert_eq!(lookup.metrics().misses, 1);
/// # }
/// ```
pub fn with_cache_async<A, R, E, F, Fut>(f: F, ttl: impl Into<Ttl>) -> AsyncMemoized<A, R, E>
where
  A: Serialize + 'static,
  R: 'static,
  E: 'static,
  F: Fn(TtlHandle, A) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<R, E>> + Send + 'static,
{
  MemoBuilder::new().time_to_live(ttl).build_async(f)
}
