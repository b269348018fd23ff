mod map;
mod merge;

pub use map::{map_keys, map_values, MapKey};
pub use merge::{merge_all, merge_objects};
