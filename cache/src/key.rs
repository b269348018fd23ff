use crate::error::KeyError;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

mod serializer;

use serializer::KeySerializer;

/// Derives the canonical cache key for an argument list.
///
/// Arguments are lowered to a `serde_json::Value` and written out as compact
/// JSON with every object's keys sorted, so two maps holding the same entries
/// produce the same key whatever their insertion order. Arguments with no
/// faithful JSON form (NaN or infinite floats, maps keyed by structs, failing
/// `Serialize` impls) are reported as errors rather than keyed.
pub fn canonical_key<A>(args: &A) -> Result<String, KeyError>
where
  A: Serialize + ?Sized,
{
  let value = args.serialize(KeySerializer)?;
  let mut key = String::new();
  write_sorted(&value, &mut key);
  Ok(key)
}

// Sorts explicitly: `serde_json::Map` keeps insertion order when any crate in
// the build enables `preserve_order`.
fn write_sorted(value: &Value, out: &mut String) {
  match value {
    Value::Array(items) => {
      out.push('[');
      for (i, item) in items.iter().enumerate() {
        if i > 0 {
          out.push(',');
        }
        write_sorted(item, out);
      }
      out.push(']');
    }
    Value::Object(map) => {
      let mut entries: Vec<(&String, &Value)> = map.iter().collect();
      entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
      out.push('{');
      for (i, (name, item)) in entries.into_iter().enumerate() {
        if i > 0 {
          out.push(',');
        }
        out.push_str(&Value::from(name.as_str()).to_string());
        out.push(':');
        write_sorted(item, out);
      }
      out.push('}');
    }
    leaf => out.push_str(&leaf.to_string()),
  }
}

type KeyFn<A> = dyn Fn(&A) -> Result<String, KeyError> + Send + Sync;

/// Turns call arguments into cache keys.
pub(crate) struct Keyer<A> {
  derive: Arc<KeyFn<A>>,
}

impl<A> Keyer<A> {
  pub(crate) fn canonical() -> Self
  where
    A: Serialize,
  {
    Self {
      derive: Arc::new(|args: &A| canonical_key(args)),
    }
  }

  pub(crate) fn custom<F>(f: F) -> Self
  where
    F: Fn(&A) -> String + Send + Sync + 'static,
  {
    Self {
      derive: Arc::new(move |args: &A| Ok(f(args))),
    }
  }

  #[inline]
  pub(crate) fn key(&self, args: &A) -> Result<String, KeyError> {
    (self.derive)(args)
  }
}

impl<A> Clone for Keyer<A> {
  fn clone(&self) -> Self {
    Self {
      derive: self.derive.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::Map;
  use std::collections::{BTreeMap, HashMap};

  #[derive(Serialize)]
  struct Query<'a> {
    path: &'a str,
    page: u32,
  }

  #[test]
  fn tuples_serialize_as_arrays() {
    assert_eq!(canonical_key(&("x", 1)).unwrap(), r#"["x",1]"#);
    assert_eq!(canonical_key(&()).unwrap(), "null");
  }

  #[test]
  fn map_insertion_order_does_not_matter() {
    let mut a = HashMap::new();
    a.insert("zeta", 1);
    a.insert("alpha", 2);
    a.insert("mid", 3);

    let mut b = HashMap::new();
    b.insert("mid", 3);
    b.insert("alpha", 2);
    b.insert("zeta", 1);

    let key = canonical_key(&(&a,)).unwrap();
    assert_eq!(key, canonical_key(&(&b,)).unwrap());
    assert_eq!(key, r#"[{"alpha":2,"mid":3,"zeta":1}]"#);
  }

  #[test]
  fn struct_fields_are_sorted_too() {
    let key = canonical_key(&Query { path: "/blogs", page: 2 }).unwrap();
    assert_eq!(key, r#"{"page":2,"path":"/blogs"}"#);
  }

  #[test]
  fn non_string_map_keys_are_rejected() {
    let mut map = BTreeMap::new();
    map.insert((1, 2), "pair");
    let err = canonical_key(&map).unwrap_err();
    assert!(err.to_string().contains("cache key"), "{err}");
  }

  #[test]
  fn non_finite_floats_are_rejected() {
    for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
      match canonical_key(&Some(v)) {
        Err(KeyError::NonFiniteFloat(got)) => assert_eq!(got.to_bits(), v.to_bits()),
        other => panic!("expected a non-finite float error for {v}, got {other:?}"),
      }
    }
    assert!(matches!(canonical_key(&vec![1.0f32, f32::NAN]), Err(KeyError::NonFiniteFloat(_))));
    assert_eq!(canonical_key(&None::<f64>).unwrap(), "null");
    assert_eq!(canonical_key(&Some(1.5f64)).unwrap(), "1.5");
  }

  #[test]
  fn nested_objects_are_written_with_sorted_keys() {
    let mut outer = Map::new();
    let mut inner = Map::new();
    inner.insert("y".into(), Value::from(1));
    inner.insert("b".into(), Value::from("two"));
    outer.insert("z".into(), Value::Array(vec![Value::Object(inner)]));
    outer.insert("a".into(), Value::Null);

    let mut key = String::new();
    write_sorted(&Value::Object(outer), &mut key);
    assert_eq!(key, r#"{"a":null,"z":[{"b":"two","y":1}]}"#);
  }

  #[test]
  fn enums_keep_their_variant_names() {
    #[derive(Serialize)]
    enum Shape {
      Dot,
      Circle(u32),
      Rect { w: u32, h: u32 },
    }
    assert_eq!(canonical_key(&Shape::Dot).unwrap(), r#""Dot""#);
    assert_eq!(canonical_key(&Shape::Circle(3)).unwrap(), r#"{"Circle":3}"#);
    assert_eq!(canonical_key(&Shape::Rect { w: 2, h: 1 }).unwrap(), r#"{"Rect":{"h":1,"w":2}}"#);
  }

  #[test]
  fn numeric_map_keys_become_strings() {
    let mut map = BTreeMap::new();
    map.insert(10u32, "ten");
    map.insert(2u32, "two");
    assert_eq!(canonical_key(&map).unwrap(), r#"{"10":"ten","2":"two"}"#);
  }

  #[test]
  fn custom_keyer_bypasses_serde() {
    struct Opaque(u8);
    let keyer = Keyer::custom(|o: &Opaque| format!("opaque-{}", o.0));
    assert_eq!(keyer.key(&Opaque(7)).unwrap(), "opaque-7");
  }
}
