mod case;
mod compact;

pub use case::{camel_to_snake, capitalize, decapitalize, snake_to_camel};
pub use compact::{compact_str, CompactOptions};
