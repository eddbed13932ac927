use {
    super::map_key::string_key,
    crate::error::{Error, Result},
    serde::{
        Serialize, Serializer,
        ser::{
            SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
            SerializeTupleStruct, SerializeTupleVariant,
        },
    },
    serde_json::{Map, Value},
    tap::Pipe,
};

/// Integers wider than json numbers degrade to their decimal text.
pub(super) fn i128_value(v: i128) -> Value {
    i64::try_from(v)
        .map(Value::from)
        .or_else(|_| u64::try_from(v).map(Value::from))
        .unwrap_or_else(|_| Value::String(v.to_string()))
}

pub(super) fn u128_value(v: u128) -> Value {
    u64::try_from(v)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(v.to_string()))
}

/// Converts a value kept whole inside a leaf (a sequence element) into json.
///
/// Follows the same key rule as flattening: a mapping with a non-string key comes out
/// as an empty object, just as it contributes no entries when flattened directly.
pub(super) struct LeafSerializer;

impl Serializer for LeafSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqLeaf;
    type SerializeTuple = SeqLeaf;
    type SerializeTupleStruct = SeqLeaf;
    type SerializeTupleVariant = Tagged<SeqLeaf>;
    type SerializeMap = MapLeaf;
    type SerializeStruct = MapLeaf;
    type SerializeStructVariant = Tagged<MapLeaf>;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(i128_value(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(u128_value(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(v.iter().copied().map(Value::from).collect())
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self).map(|value| tagged(variant, value))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqLeaf> {
        Ok(SeqLeaf(Vec::with_capacity(len.unwrap_or_default())))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqLeaf> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqLeaf> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Tagged<SeqLeaf>> {
        self.serialize_seq(Some(len)).map(|inner| Tagged { variant, inner })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapLeaf> {
        Ok(MapLeaf {
            entries: Map::new(),
            key: None,
            string_keyed: true,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapLeaf> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Tagged<MapLeaf>> {
        self.serialize_map(Some(len)).map(|inner| Tagged { variant, inner })
    }
}

fn tagged(variant: &'static str, value: Value) -> Value {
    Map::from_iter([(variant.to_owned(), value)]).pipe(Value::Object)
}

pub(super) struct SeqLeaf(Vec<Value>);

impl SeqLeaf {
    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(LeafSerializer).map(|value| self.0.push(value))
    }
}

impl SerializeSeq for SeqLeaf {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.0))
    }
}

impl SerializeTuple for SeqLeaf {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.0))
    }
}

impl SerializeTupleStruct for SeqLeaf {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Array(self.0))
    }
}

pub(super) struct MapLeaf {
    entries: Map<String, Value>,
    key: Option<String>,
    string_keyed: bool,
}

impl MapLeaf {
    fn finish(self) -> Value {
        match self.string_keyed {
            true => Value::Object(self.entries),
            false => {
                tracing::debug!("dropping entries of a mapping with non-string keys");
                Value::Object(Map::new())
            }
        }
    }
}

impl SerializeMap for MapLeaf {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        match string_key(key)? {
            Some(key) => self.key = Some(key),
            None => self.string_keyed = false,
        }
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        if !self.string_keyed {
            return Ok(());
        }
        match self.key.take() {
            Some(key) => {
                let value = value.serialize(LeafSerializer)?;
                self.entries.insert(key, value);
                Ok(())
            }
            None => Err(Error::Serialize("map value serialized before its key".to_owned())),
        }
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl SerializeStruct for MapLeaf {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let value = value.serialize(LeafSerializer)?;
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

/// Externally tagged enum payload: `{variant: inner}`.
pub(super) struct Tagged<S> {
    variant: &'static str,
    inner: S,
}

impl SerializeTupleVariant for Tagged<SeqLeaf> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.inner.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.variant, Value::Array(self.inner.0)))
    }
}

impl SerializeStructVariant for Tagged<MapLeaf> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(tagged(self.variant, self.inner.finish()))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde_json::json,
        std::collections::{BTreeMap, HashMap},
    };

    #[test]
    fn test_matches_serde_json_for_string_keys() {
        #[derive(Serialize)]
        enum Shape {
            Point,
            Circle(f64),
            Line(u8, u8),
            Rect { w: u8, h: u8 },
        }

        #[derive(Serialize)]
        struct Drawing {
            name: &'static str,
            shapes: Vec<Shape>,
            meta: BTreeMap<&'static str, Option<u8>>,
        }

        let drawing = Drawing {
            name: "d",
            shapes: vec![
                Shape::Point,
                Shape::Circle(1.5),
                Shape::Line(1, 2),
                Shape::Rect { w: 3, h: 4 },
            ],
            meta: BTreeMap::from([("a", Some(1)), ("b", None)]),
        };
        assert_eq!(
            drawing.serialize(LeafSerializer).unwrap(),
            serde_json::to_value(&drawing).unwrap()
        );
    }

    #[test]
    fn test_non_string_keyed_mapping_is_empty() {
        let ints = HashMap::from([(1, 2)]);
        assert_eq!(ints.serialize(LeafSerializer).unwrap(), json!({}));

        let tuples = vec![BTreeMap::from([((1, 2), 3)])];
        assert_eq!(tuples.serialize(LeafSerializer).unwrap(), json!([{}]));
    }

    #[test]
    fn test_wide_integers_degrade_to_text() {
        assert_eq!(u128_value(7), json!(7));
        assert_eq!(u128_value(u128::MAX), json!(u128::MAX.to_string()));
        assert_eq!(i128_value(-7), json!(-7));
        assert_eq!(i128_value(u64::MAX as i128), json!(u64::MAX));
        assert_eq!(i128_value(i128::MIN), json!(i128::MIN.to_string()));
    }
}
