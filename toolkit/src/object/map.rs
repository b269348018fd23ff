use serde_json::{Map, Value};

/// Where a leaf sits in its parent: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKey<'a> {
  Name(&'a str),
  Index(usize),
}

/// Rewrites every object key, recursing through nested objects and arrays.
///
/// ```
/// use serde_json::json;
/// use sundry_toolkit::{map_keys, snake_to_camel};
///
/// let row = json!({ "user_name": "ada", "last_login": { "ip_addr": "::1" } });
/// assert_eq!(
///   map_keys(&row, snake_to_camel),
///   json!({ "userName": "ada", "lastLogin": { "ipAddr": "::1" } })
/// );
/// ```
pub fn map_keys<F>(value: &Value, f: F) -> Value
where
  F: Fn(&str) -> String,
{
  map_keys_with(value, &f)
}

fn map_keys_with(value: &Value, f: &dyn Fn(&str) -> String) -> Value {
  match value {
    Value::Array(items) => Value::Array(items.iter().map(|item| map_keys_with(item, f)).collect()),
    Value::Object(map) => Value::Object(
      map
        .iter()
        .map(|(key, value)| (f(key), map_keys_with(value, f)))
        .collect(),
    ),
    other => other.clone(),
  }
}

/// Rewrites every leaf (non-container) value, recursing through nested
/// objects and arrays.
///
/// `filter`, when given, sees each entry after mapping and drops it when it
/// returns `false`; nested containers are filtered as whole entries too.
/// A leaf passed at the top level is returned unchanged.
pub fn map_values<F>(
  value: &Value,
  f: F,
  filter: Option<&dyn Fn(&Value, MapKey<'_>) -> bool>,
) -> Value
where
  F: Fn(&Value, MapKey<'_>) -> Value,
{
  map_values_with(value, &f, filter)
}

type ValueFn<'f> = &'f dyn Fn(&Value, MapKey<'_>) -> Value;
type FilterFn<'f> = Option<&'f dyn Fn(&Value, MapKey<'_>) -> bool>;

fn map_values_with(value: &Value, f: ValueFn<'_>, filter: FilterFn<'_>) -> Value {
  let keep = |mapped: &Value, key: MapKey<'_>| filter.map_or(true, |pred| pred(mapped, key));

  match value {
    Value::Array(items) => {
      let mut out = Vec::with_capacity(items.len());
      for (index, item) in items.iter().enumerate() {
        let mapped = map_entry(item, MapKey::Index(index), f, filter);
        if keep(&mapped, MapKey::Index(index)) {
          out.push(mapped);
        }
      }
      Value::Array(out)
    }
    Value::Object(map) => {
      let mut out = Map::new();
      for (name, item) in map {
        let mapped = map_entry(item, MapKey::Name(name), f, filter);
        if keep(&mapped, MapKey::Name(name)) {
          out.insert(name.clone(), mapped);
        }
      }
      Value::Object(out)
    }
    leaf => leaf.clone(),
  }
}

fn map_entry(item: &Value, key: MapKey<'_>, f: ValueFn<'_>, filter: FilterFn<'_>) -> Value {
  match item {
    Value::Array(_) | Value::Object(_) => map_values_with(item, f, filter),
    leaf => f(leaf, key),
  }
}
