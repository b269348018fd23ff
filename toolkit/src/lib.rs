//! Everyday helpers shared by the sundry crates.
//!
//! - [`string`]: case conversion and single-line compaction.
//! - [`object`]: deep merge and recursive key/value mapping of JSON values.
//! - [`is`]: nil/object/primitive checks and JavaScript-style truthiness.
//! - [`number`]: `random_int` over an inclusive range.
//! - [`timing`]: `sleep`, `debounce` and `throttle` on the Tokio timer.
//! - [`retry`]: `loop_until`, repeating an async step until it is good enough.

pub mod error;
pub mod is;
pub mod number;
pub mod object;
pub mod retry;
pub mod string;
pub mod timing;

pub use error::LoopError;
pub use is::{is_falsy, is_nil, is_object, is_primitive, is_truthy};
pub use number::random_int;
pub use object::{map_keys, map_values, merge_all, merge_objects, MapKey};
pub use retry::{loop_until, LoopOptions};
pub use string::{camel_to_snake, capitalize, compact_str, decapitalize, snake_to_camel, CompactOptions};
pub use timing::{debounce, sleep, throttle, Debounced, Throttled};
