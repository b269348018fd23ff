//! Numeric helpers.

use rand::Rng;

/// A uniformly random integer in the closed range `[min, max]`.
///
/// The bounds may be given in either order.
///
/// ```
/// let roll = sundry_toolkit::random_int(1, 6);
/// assert!((1..=6).contains(&roll));
/// ```
pub fn random_int(min: i64, max: i64) -> i64 {
  let (low, high) = if min <= max { (min, max) } else { (max, min) };
  rand::rng().random_range(low..=high)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn stays_within_inclusive_bounds() {
    let mut seen = [false; 3];
    for _ in 0..1_000 {
      let n = random_int(1, 3);
      assert!((1..=3).contains(&n), "{n} is out of range");
      seen[(n - 1) as usize] = true;
    }
    assert_eq!(seen, [true; 3], "Both ends of the range should be reachable");
  }

  #[test]
  fn equal_bounds_return_that_value() {
    assert_eq!(random_int(7, 7), 7);
    assert_eq!(random_int(i64::MIN, i64::MIN), i64::MIN);
  }

  #[test]
  fn reversed_bounds_are_swapped() {
    for _ in 0..100 {
      assert!((-5..=5).contains(&random_int(5, -5)));
    }
  }
}
