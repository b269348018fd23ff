//! Type and truthiness checks over JSON values.

use serde_json::Value;

/// `null`. JSON has no separate "undefined".
pub fn is_nil(value: &Value) -> bool {
  value.is_null()
}

/// A plain object (not an array).
pub fn is_object(value: &Value) -> bool {
  value.is_object()
}

/// Anything that is neither an object nor an array.
pub fn is_primitive(value: &Value) -> bool {
  !matches!(value, Value::Object(_) | Value::Array(_))
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are falsy, every
/// other value (empty arrays and objects included) is truthy.
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

pub fn is_falsy(value: &Value) -> bool {
  !is_truthy(value)
}
