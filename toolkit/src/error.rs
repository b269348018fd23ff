use thiserror::Error;

/// Failure of [`loop_until`](crate::loop_until).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
  #[error("gave up after {max_retries} attempts without meeting the stop condition")]
  Exhausted { max_retries: usize },
}
