use serde_json::{Map, Value};

/// Deep-merges `overlay` onto `base`.
///
/// For each key of `overlay`: two arrays concatenate, two objects merge
/// recursively, anything else takes the overlay value. When either argument
/// is not an object, the overlay wins outright.
///
/// ```
/// use serde_json::json;
/// use sundry_toolkit::merge_objects;
///
/// let base = json!({ "headers": { "Accept": "*/*" }, "tags": ["a"], "page": 1 });
/// let call = json!({ "headers": { "Authorization": "Bearer t" }, "tags": ["b"], "page": 2 });
///
/// assert_eq!(
///   merge_objects(&base, &call),
///   json!({
///     "headers": { "Accept": "*/*", "Authorization": "Bearer t" },
///     "tags": ["a", "b"],
///     "page": 2,
///   })
/// );
/// ```
pub fn merge_objects(base: &Value, overlay: &Value) -> Value {
  match (base, overlay) {
    (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_maps(base.clone(), overlay)),
    _ => overlay.clone(),
  }
}

/// Folds [`merge_objects`] over `values`, starting from an empty object.
/// Non-object values are skipped.
pub fn merge_all<'a, I>(values: I) -> Value
where
  I: IntoIterator<Item = &'a Value>,
{
  let merged = values
    .into_iter()
    .filter_map(Value::as_object)
    .fold(Map::new(), |acc, next| merge_maps(acc, next));
  Value::Object(merged)
}

fn merge_maps(mut acc: Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
  for (key, incoming) in overlay {
    let merged = match (acc.remove(key), incoming) {
      (Some(Value::Array(mut existing)), Value::Array(more)) => {
        existing.extend(more.iter().cloned());
        Value::Array(existing)
      }
      (Some(Value::Object(existing)), Value::Object(more)) => Value::Object(merge_maps(existing, more)),
      (_, incoming) => incoming.clone(),
    };
    acc.insert(key.clone(), merged);
  }
  acc
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[test]
  fn nested_objects_merge_recursively() {
    let a = json!({ "a": { "b": { "c": 1, "d": 2 } } });
    let b = json!({ "a": { "b": { "d": 3, "e": 4 } } });
    assert_eq!(merge_objects(&a, &b), json!({ "a": { "b": { "c": 1, "d": 3, "e": 4 } } }));
  }

  #[test]
  fn mismatched_shapes_take_the_overlay() {
    let a = json!({ "x": [1], "y": { "k": 1 }, "z": 1 });
    let b = json!({ "x": { "k": 2 }, "y": null, "z": [2] });
    assert_eq!(merge_objects(&a, &b), b);
  }

  #[test]
  fn inputs_are_not_modified() {
    let a = json!({ "list": [1] });
    let b = json!({ "list": [2] });
    let _ = merge_objects(&a, &b);
    assert_eq!(a, json!({ "list": [1] }));
  }

  #[test]
  fn merge_all_skips_non_objects() {
    let parts = [json!({ "a": [1] }), json!("ignored"), json!({ "a": [2], "b": true }), json!(null)];
    assert_eq!(merge_all(&parts), json!({ "a": [1, 2], "b": true }));
    assert_eq!(merge_all(&Vec::<Value>::new()), json!({}));
  }
}
