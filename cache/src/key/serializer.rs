use crate::error::KeyError;

use serde::ser::{self, Serialize};
use serde_json::{Map, Number, Value};

/// Lowers call arguments to a `serde_json::Value`, refusing anything whose
/// JSON form would be shared with a different argument.
///
/// `serde_json::to_value` maps NaN and the infinities to `null`, which would
/// key `Some(f64::NAN)` the same as `None`. Here they are errors.
pub(crate) struct KeySerializer;

fn tagged(variant: &'static str, value: Value) -> Value {
  let mut map = Map::new();
  map.insert(variant.to_owned(), value);
  Value::Object(map)
}

fn lower<T: ?Sized + Serialize>(value: &T) -> Result<Value, KeyError> {
  value.serialize(KeySerializer)
}

impl ser::Serializer for KeySerializer {
  type Ok = Value;
  type Error = KeyError;

  type SerializeSeq = SeqBuilder;
  type SerializeTuple = SeqBuilder;
  type SerializeTupleStruct = SeqBuilder;
  type SerializeTupleVariant = SeqBuilder;
  type SerializeMap = MapBuilder;
  type SerializeStruct = MapBuilder;
  type SerializeStructVariant = MapBuilder;

  fn serialize_bool(self, v: bool) -> Result<Value, KeyError> {
    Ok(Value::Bool(v))
  }

  fn serialize_i8(self, v: i8) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_i16(self, v: i16) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_i32(self, v: i32) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_i64(self, v: i64) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_i128(self, v: i128) -> Result<Value, KeyError> {
    if let Ok(v) = i64::try_from(v) {
      Ok(Value::from(v))
    } else if let Ok(v) = u64::try_from(v) {
      Ok(Value::from(v))
    } else {
      Err(KeyError::Serialize(format!("integer {v} is out of range")))
    }
  }

  fn serialize_u8(self, v: u8) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_u16(self, v: u16) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_u32(self, v: u32) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_u64(self, v: u64) -> Result<Value, KeyError> {
    Ok(Value::from(v))
  }

  fn serialize_u128(self, v: u128) -> Result<Value, KeyError> {
    u64::try_from(v)
      .map(Value::from)
      .map_err(|_| KeyError::Serialize(format!("integer {v} is out of range")))
  }

  fn serialize_f32(self, v: f32) -> Result<Value, KeyError> {
    self.serialize_f64(f64::from(v))
  }

  fn serialize_f64(self, v: f64) -> Result<Value, KeyError> {
    Number::from_f64(v).map(Value::Number).ok_or(KeyError::NonFiniteFloat(v))
  }

  fn serialize_char(self, v: char) -> Result<Value, KeyError> {
    Ok(Value::String(v.to_string()))
  }

  fn serialize_str(self, v: &str) -> Result<Value, KeyError> {
    Ok(Value::String(v.to_owned()))
  }

  fn serialize_bytes(self, v: &[u8]) -> Result<Value, KeyError> {
    Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
  }

  fn serialize_none(self) -> Result<Value, KeyError> {
    Ok(Value::Null)
  }

  fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, KeyError> {
    value.serialize(self)
  }

  fn serialize_unit(self) -> Result<Value, KeyError> {
    Ok(Value::Null)
  }

  fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, KeyError> {
    Ok(Value::Null)
  }

  fn serialize_unit_variant(
    self,
    _name: &'static str,
    _index: u32,
    variant: &'static str,
  ) -> Result<Value, KeyError> {
    Ok(Value::String(variant.to_owned()))
  }

  fn serialize_newtype_struct<T: ?Sized + Serialize>(
    self,
    _name: &'static str,
    value: &T,
  ) -> Result<Value, KeyError> {
    value.serialize(self)
  }

  fn serialize_newtype_variant<T: ?Sized + Serialize>(
    self,
    _name: &'static str,
    _index: u32,
    variant: &'static str,
    value: &T,
  ) -> Result<Value, KeyError> {
    Ok(tagged(variant, lower(value)?))
  }

  fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, KeyError> {
    Ok(SeqBuilder::new(None, len.unwrap_or(0)))
  }

  fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, KeyError> {
    Ok(SeqBuilder::new(None, len))
  }

  fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder, KeyError> {
    Ok(SeqBuilder::new(None, len))
  }

  fn serialize_tuple_variant(
    self,
    _name: &'static str,
    _index: u32,
    variant: &'static str,
    len: usize,
  ) -> Result<SeqBuilder, KeyError> {
    Ok(SeqBuilder::new(Some(variant), len))
  }

  fn serialize_map(self, _len: Option<usize>) -> Result<MapBuilder, KeyError> {
    Ok(MapBuilder::new(None))
  }

  fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<MapBuilder, KeyError> {
    Ok(MapBuilder::new(None))
  }

  fn serialize_struct_variant(
    self,
    _name: &'static str,
    _index: u32,
    variant: &'static str,
    _len: usize,
  ) -> Result<MapBuilder, KeyError> {
    Ok(MapBuilder::new(Some(variant)))
  }
}

pub(crate) struct SeqBuilder {
  variant: Option<&'static str>,
  items: Vec<Value>,
}

impl SeqBuilder {
  fn new(variant: Option<&'static str>, len: usize) -> Self {
    Self {
      variant,
      items: Vec::with_capacity(len),
    }
  }

  fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
    self.items.push(lower(value)?);
    Ok(())
  }

  fn finish(self) -> Result<Value, KeyError> {
    let array = Value::Array(self.items);
    Ok(match self.variant {
      Some(variant) => tagged(variant, array),
      None => array,
    })
  }
}

impl ser::SerializeSeq for SeqBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
    self.push(value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}

impl ser::SerializeTuple for SeqBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
    self.push(value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}

impl ser::SerializeTupleStruct for SeqBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
    self.push(value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}

impl ser::SerializeTupleVariant for SeqBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
    self.push(value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}

pub(crate) struct MapBuilder {
  variant: Option<&'static str>,
  map: Map<String, Value>,
  next_key: Option<String>,
}

impl MapBuilder {
  fn new(variant: Option<&'static str>) -> Self {
    Self {
      variant,
      map: Map::new(),
      next_key: None,
    }
  }

  fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<(), KeyError> {
    self.map.insert(key, lower(value)?);
    Ok(())
  }

  fn finish(self) -> Result<Value, KeyError> {
    let object = Value::Object(self.map);
    Ok(match self.variant {
      Some(variant) => tagged(variant, object),
      None => object,
    })
  }
}

// Same key coercions serde_json accepts: numbers and bools become strings.
fn map_key(key: Value) -> Result<String, KeyError> {
  match key {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    Value::Bool(b) => Ok(b.to_string()),
    _ => Err(KeyError::UnsupportedMapKey),
  }
}

impl ser::SerializeMap for MapBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), KeyError> {
    self.next_key = Some(map_key(lower(key)?)?);
    Ok(())
  }

  fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), KeyError> {
    let key = self
      .next_key
      .take()
      .ok_or_else(|| KeyError::Serialize("map value serialized before its key".to_owned()))?;
    self.insert(key, value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}

impl ser::SerializeStruct for MapBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError> {
    self.insert(key.to_owned(), value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}

impl ser::SerializeStructVariant for MapBuilder {
  type Ok = Value;
  type Error = KeyError;

  fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), KeyError> {
    self.insert(key.to_owned(), value)
  }

  fn end(self) -> Result<Value, KeyError> {
    self.finish()
  }
}
