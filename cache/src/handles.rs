mod futures;
mod sync;

pub use futures::AsyncMemoized;
pub use sync::Memoized;
