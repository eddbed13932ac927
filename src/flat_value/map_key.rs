use {
    crate::error::{Error, Result},
    serde::{Serialize, Serializer, ser::Impossible},
    std::fmt::Display,
};

/// The one place deciding whether a mapping can be walked: `None` when `key` is not
/// string-like, in which case the whole mapping is skipped rather than reported.
pub(super) fn string_key<T>(key: &T) -> Result<Option<String>>
where
    T: Serialize + ?Sized,
{
    match key.serialize(MapKeySerializer) {
        Ok(key) => Ok(Some(key)),
        Err(KeyError::NotAString) => Ok(None),
        Err(KeyError::Custom(message)) => Err(Error::Serialize(message)),
    }
}

#[derive(Debug, thiserror::Error)]
enum KeyError {
    #[error("map key is not a string")]
    NotAString,
    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for KeyError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Accepts string-like keys only; everything else reports [`KeyError::NotAString`].
struct MapKeySerializer;

impl Serializer for MapKeySerializer {
    type Ok = String;
    type Error = KeyError;

    type SerializeSeq = Impossible<String, KeyError>;
    type SerializeTuple = Impossible<String, KeyError>;
    type SerializeTupleStruct = Impossible<String, KeyError>;
    type SerializeTupleVariant = Impossible<String, KeyError>;
    type SerializeMap = Impossible<String, KeyError>;
    type SerializeStruct = Impossible<String, KeyError>;
    type SerializeStructVariant = Impossible<String, KeyError>;

    fn serialize_str(self, v: &str) -> std::result::Result<String, KeyError> {
        Ok(v.to_owned())
    }

    fn serialize_char(self, v: char) -> std::result::Result<String, KeyError> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> std::result::Result<String, KeyError> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T>(
        self,
        _name: &'static str,
        value: &T,
    ) -> std::result::Result<String, KeyError>
    where
        T: Serialize + ?Sized,
    {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_i8(self, _v: i8) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_i16(self, _v: i16) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_i32(self, _v: i32) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_i64(self, _v: i64) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_i128(self, _v: i128) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_u8(self, _v: u8) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_u16(self, _v: u16) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_u32(self, _v: u32) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_u64(self, _v: u64) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_u128(self, _v: u128) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_f32(self, _v: f32) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_f64(self, _v: f64) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_bytes(self, _v: &[u8]) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_none(self) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_some<T>(self, _value: &T) -> std::result::Result<String, KeyError>
    where
        T: Serialize + ?Sized,
    {
        Err(KeyError::NotAString)
    }

    fn serialize_unit(self) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> std::result::Result<String, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> std::result::Result<String, KeyError>
    where
        T: Serialize + ?Sized,
    {
        Err(KeyError::NotAString)
    }

    fn serialize_seq(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeSeq, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self::SerializeTuple, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_map(
        self,
        _len: Option<usize>,
    ) -> std::result::Result<Self::SerializeMap, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStruct, KeyError> {
        Err(KeyError::NotAString)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, KeyError> {
        Err(KeyError::NotAString)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde::Serialize};

    #[derive(Serialize)]
    enum Color {
        Red,
    }

    #[derive(Serialize)]
    struct Name(&'static str);

    #[test]
    fn test_string_like_keys() {
        assert_eq!(string_key("plain").unwrap().as_deref(), Some("plain"));
        assert_eq!(string_key(&'c').unwrap().as_deref(), Some("c"));
        assert_eq!(string_key(&Color::Red).unwrap().as_deref(), Some("Red"));
        assert_eq!(string_key(&Name("wrapped")).unwrap().as_deref(), Some("wrapped"));
    }

    #[test]
    fn test_other_keys_are_not_strings() {
        assert_eq!(string_key(&1u8).unwrap(), None);
        assert_eq!(string_key(&(1, 2)).unwrap(), None);
        assert_eq!(string_key(&true).unwrap(), None);
        assert_eq!(string_key(&Some("x")).unwrap(), None);
    }
}
