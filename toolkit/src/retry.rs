use crate::error::LoopError;

use std::fmt;
use std::future::Future;

type StopFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Options for [`loop_until`].
pub struct LoopOptions<T> {
  /// How many times the step runs at most. Defaults to 5.
  pub max_retries: usize,
  /// Accepts a result and ends the loop early.
  pub should_stop: Option<StopFn<T>>,
}

impl<T> Default for LoopOptions<T> {
  fn default() -> Self {
    Self {
      max_retries: 5,
      should_stop: None,
    }
  }
}

impl<T> fmt::Debug for LoopOptions<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LoopOptions")
      .field("max_retries", &self.max_retries)
      .field("should_stop", &self.should_stop.is_some())
      .finish()
  }
}

impl<T> LoopOptions<T> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn max_retries(mut self, max_retries: usize) -> Self {
    self.max_retries = max_retries;
    self
  }

  pub fn should_stop<P>(mut self, predicate: P) -> Self
  where
    P: Fn(&T) -> bool + Send + Sync + 'static,
  {
    self.should_stop = Some(Box::new(predicate));
    self
  }
}

/// Runs `step(attempt)` (attempt counting from 0) until `should_stop`
/// accepts a result.
///
/// Without `should_stop` the step runs exactly `max_retries` times and the
/// last result is returned. With it, running out of attempts is an error.
///
/// ```
/// use sundry_toolkit::{loop_until, LoopOptions};
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let third = loop_until(
///   |attempt| async move { attempt * 10 },
///   LoopOptions::new().should_stop(|n: &usize| *n >= 20),
/// )
/// .await;
/// assert_eq!(third, Ok(20));
/// # }
/// ```
pub async fn loop_until<T, F, Fut>(mut step: F, options: LoopOptions<T>) -> Result<T, LoopError>
where
  F: FnMut(usize) -> Fut,
  Fut: Future<Output = T>,
{
  let mut last = None;

  for attempt in 0..options.max_retries {
    let result = step(attempt).await;
    if let Some(stop) = &options.should_stop {
      if stop(&result) {
        return Ok(result);
      }
      tracing::trace!(attempt, "stop condition not met");
    }
    last = Some(result);
  }

  match (last, &options.should_stop) {
    (Some(result), None) => Ok(result),
    _ => {
      tracing::debug!(max_retries = options.max_retries, "loop exhausted");
      Err(LoopError::Exhausted {
        max_retries: options.max_retries,
      })
    }
  }
}
