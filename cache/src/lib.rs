//! Memoization with time-to-live expiry, plus a small LRU map.
//!
//! # Features
//! - **TTL memoization**: wrap a function once with [`with_cache`] or
//!   [`with_cache_async`]; argument-equal calls reuse the stored result until
//!   it expires.
//! - **In-flight de-duplication**: while a computation for a key is running,
//!   every other call for that key waits for it instead of starting another.
//! - **Per-result TTL**: the wrapped function receives a [`TtlHandle`] and can
//!   override the lifetime of the result it is producing.
//! - **Live TTL updates**: [`Memoized::update_ttl`] changes the default TTL and
//!   renews every entry that has not expired yet.
//! - **Failure eviction**: a failed asynchronous computation is reported to
//!   all of its waiters and never cached.
//! - **Injectable clock**: [`ManualClock`] makes expiry deterministic in tests.

// Public modules that form the API
pub mod builder;
pub mod error;
pub mod handles;
pub mod key;
pub mod lru;
pub mod metrics;
pub mod time;
pub mod ttl;

// Internal, crate-only modules
mod entry;
mod loader;
mod memo;
mod shared;

// Re-export the primary user-facing types for convenience
pub use builder::MemoBuilder;
pub use error::{KeyError, LruError, MemoError};
pub use handles::{AsyncMemoized, Memoized};
pub use key::canonical_key;
pub use lru::LruCache;
pub use memo::{with_cache, with_cache_async};
pub use metrics::MetricsSnapshot;
pub use time::{Clock, ManualClock, SystemClock};
pub use ttl::{Ttl, TtlHandle};
