use {
    super::{
        FlatMap, Separator,
        leaf::{self, LeafSerializer},
        map_key::string_key,
    },
    crate::error::{Error, Result},
    serde::{
        Serialize, Serializer,
        ser::{
            SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTuple,
            SerializeTupleStruct, SerializeTupleVariant,
        },
    },
    serde_json::Value,
    tap::Pipe,
    tracing::instrument,
};

/// Writes every leaf of `value` into `out`, keyed by its path below `prefix`.
///
/// Existing entries with the same key are overwritten.
#[instrument(skip(value, out))]
pub fn flatten_into<T>(
    value: &T,
    prefix: &str,
    separator: &Separator,
    out: &mut FlatMap,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    value.serialize(FlattenSerializer {
        prefix: prefix.to_owned(),
        separator,
        out,
    })
}

pub fn flattened<T>(value: &T, prefix: &str, separator: &Separator) -> Result<FlatMap>
where
    T: Serialize + ?Sized,
{
    FlatMap::new().pipe(|mut out| flatten_into(value, prefix, separator, &mut out).map(|()| out))
}

/// Serializer whose output is a set of entries in `out`: containers recurse with a
/// longer prefix, anything else lands under `prefix` as a single leaf.
struct FlattenSerializer<'a> {
    prefix: String,
    separator: &'a Separator,
    out: &'a mut FlatMap,
}

impl<'a> FlattenSerializer<'a> {
    /// A leaf without a path has nowhere to go, so a bare root scalar yields nothing.
    fn leaf(self, value: Value) -> Result<()> {
        if !self.prefix.is_empty() {
            self.out.insert(self.prefix, value);
        }
        Ok(())
    }

    fn child_prefix(&self, key: &str) -> String {
        format!("{}{key}", self.separator.base(&self.prefix))
    }

    fn into_record(self) -> RecordFlattener<'a> {
        RecordFlattener {
            base: self.separator.base(&self.prefix),
            separator: self.separator,
            out: self.out,
        }
    }
}

impl<'a> Serializer for FlattenSerializer<'a> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = OpaqueSeq<'a>;
    type SerializeTuple = OpaqueSeq<'a>;
    type SerializeTupleStruct = OpaqueSeq<'a>;
    type SerializeTupleVariant = OpaqueSeq<'a>;
    type SerializeMap = MappingFlattener<'a>;
    type SerializeStruct = RecordFlattener<'a>;
    type SerializeStructVariant = RecordFlattener<'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.leaf(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.leaf(leaf::i128_value(v))
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.leaf(leaf::u128_value(v))
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.leaf(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.leaf(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.leaf(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.leaf(v.iter().copied().map(Value::from).collect())
    }

    // `None` is the nil pointer: a null leaf rather than a missing entry.
    fn serialize_none(self) -> Result<()> {
        self.leaf(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.leaf(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.leaf(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.leaf(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
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
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let prefix = self.child_prefix(variant);
        value.serialize(FlattenSerializer { prefix, ..self })
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<OpaqueSeq<'a>> {
        Ok(OpaqueSeq {
            items: Vec::with_capacity(len.unwrap_or_default()),
            target: self,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<OpaqueSeq<'a>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<OpaqueSeq<'a>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<OpaqueSeq<'a>> {
        let prefix = self.child_prefix(variant);
        FlattenSerializer { prefix, ..self }.serialize_seq(Some(len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MappingFlattener<'a>> {
        Ok(MappingFlattener {
            base: self.separator.base(&self.prefix),
            separator: self.separator,
            out: self.out,
            entries: FlatMap::new(),
            key: None,
            string_keyed: true,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<RecordFlattener<'a>> {
        Ok(self.into_record())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<RecordFlattener<'a>> {
        let prefix = self.child_prefix(variant);
        Ok(FlattenSerializer { prefix, ..self }.into_record())
    }
}

/// Sequences are leaves: their elements are converted whole into a json array.
struct OpaqueSeq<'a> {
    target: FlattenSerializer<'a>,
    items: Vec<Value>,
}

impl OpaqueSeq<'_> {
    fn push<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(LeafSerializer)?.pipe(|value| self.items.push(value));
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.target.leaf(Value::Array(self.items))
    }
}

impl SerializeSeq for OpaqueSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl SerializeTuple for OpaqueSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl SerializeTupleStruct for OpaqueSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl SerializeTupleVariant for OpaqueSeq<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

/// Buffers the entries of one mapping and commits them to `out` only if every key
/// turned out to be a string.
struct MappingFlattener<'a> {
    base: String,
    separator: &'a Separator,
    out: &'a mut FlatMap,
    entries: FlatMap,
    key: Option<String>,
    string_keyed: bool,
}

impl SerializeMap for MappingFlattener<'_> {
    type Ok = ();
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
            Some(key) => value.serialize(FlattenSerializer {
                prefix: format!("{}{key}", self.base),
                separator: self.separator,
                out: &mut self.entries,
            }),
            None => Err(Error::Serialize("map value serialized before its key".to_owned())),
        }
    }

    fn end(self) -> Result<()> {
        match self.string_keyed {
            true => self.out.extend(self.entries),
            false => tracing::debug!(base = %self.base, "skipping mapping with non-string keys"),
        }
        Ok(())
    }
}

/// Struct fields, visited in declaration order; serde-skipped fields never show up.
struct RecordFlattener<'a> {
    base: String,
    separator: &'a Separator,
    out: &'a mut FlatMap,
}

impl RecordFlattener<'_> {
    fn field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(FlattenSerializer {
            prefix: format!("{}{key}", self.base),
            separator: self.separator,
            out: &mut *self.out,
        })
    }
}

impl SerializeStruct for RecordFlattener<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl SerializeStructVariant for RecordFlattener<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}
