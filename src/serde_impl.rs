use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde::de::{DeserializeOwned, IntoDeserializer, Visitor};
use serde::ser::{Impossible, SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

use crate::value::{Dictionary, Integer, Value};
use crate::{BencodeError, DecodeOptions, ErrorCode};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(i) => {
                if let Some(v) = i.as_i64() {
                    serializer.serialize_i64(v)
                } else if let Some(v) = i.to_i128() {
                    serializer.serialize_i128(v)
                } else if let Some(v) = i.to_u128() {
                    serializer.serialize_u128(v)
                } else {
                    Err(serde::ser::Error::custom("integer exceeds 128 bits"))
                }
            }
            Self::ByteString(b) => serializer.serialize_bytes(b),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dictionary(dict) => {
                let entries = dict.canonical_entries();
                let mut m = serializer.serialize_map(Some(entries.size_hint().0))?;
                for (k, v) in entries {
                    m.serialize_entry(&RawKey(k), v)?;
                }
                m.end()
            }
        }
    }
}

struct RawKey<'a>(&'a [u8]);

impl Serialize for RawKey<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer, byte string, list or dictionary")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Value::int(i64::from(v)))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Value::int(v))
    }

    fn visit_i128<E>(self, v: i128) -> Result<Self::Value, E> {
        Ok(Value::Integer(Integer::from_i128(v)))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Value::Integer(Integer::from(v)))
    }

    fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E> {
        Ok(Value::Integer(Integer::from_u128(v)))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Value::str(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
        Ok(Value::ByteString(v.into_bytes()))
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(Value::bytes(v))
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E> {
        Ok(Value::ByteString(v))
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut items: Vec<Value> = Vec::new();
        while let Some(v) = seq.next_element::<Value>()? {
            items.push(v);
        }
        Ok(Value::List(items))
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: serde::de::MapAccess<'de>,
    {
        let mut entries: Vec<(Vec<u8>, Value)> = Vec::new();
        while let Some((k, v)) = map.next_entry::<KeyBuf, Value>()? {
            entries.push((k.0, v));
        }
        let dict = Dictionary::try_from_entries(entries)
            .map_err(|_| <M::Error as serde::de::Error>::custom("duplicate dictionary key"))?;
        Ok(Value::Dictionary(dict))
    }
}

/// Owned dictionary key accepted from text or bytes.
struct KeyBuf(Vec<u8>);

impl<'de> Deserialize<'de> for KeyBuf {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = KeyBuf;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte string key")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(KeyBuf(v.as_bytes().to_vec()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(KeyBuf(v.into_bytes()))
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(KeyBuf(v.to_vec()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(KeyBuf(v))
            }
        }

        deserializer.deserialize_bytes(KeyVisitor)
    }
}

/// Serialize a Rust value into canonical Bencode bytes.
///
/// # Errors
///
/// Returns an error if the value has no Bencode representation (floats, bare `None` or unit).
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    to_value(value)?.encode()
}

/// Deserialize a Rust value from Bencode bytes decoded under `options`.
///
/// # Errors
///
/// Returns an error if bytes are invalid or if the decoded value doesn't match the target type.
pub fn from_slice<T: DeserializeOwned>(
    bytes: &[u8],
    options: DecodeOptions,
) -> Result<T, BencodeError> {
    let v = crate::decode(bytes, options)?;
    from_value(&v)
}

/// Convert a Rust value into a [`Value`].
///
/// # Errors
///
/// Returns an error if the value has no Bencode representation (floats, bare `None` or unit).
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, BencodeError> {
    value
        .serialize(ValueSerializer)
        .map_err(|err| BencodeError::new(err.code(), 0))
}

/// Deserialize a Rust value from a [`Value`].
///
/// # Errors
///
/// Returns an error if the value doesn't match the target type.
pub fn from_value<'de, T: Deserialize<'de>>(value: &'de Value) -> Result<T, BencodeError> {
    T::deserialize(ValueDeserializer::new(value)).map_err(|err| BencodeError::new(err.code(), 0))
}

#[derive(Debug, Clone, Copy)]
struct SerdeError {
    code: ErrorCode,
    absent: bool,
}

impl SerdeError {
    const fn with_code(code: ErrorCode) -> Self {
        Self {
            code,
            absent: false,
        }
    }

    /// `None` or unit: dropped by dictionaries, rejected anywhere else.
    const fn absent() -> Self {
        Self {
            code: ErrorCode::Unsupported,
            absent: true,
        }
    }

    const fn code(self) -> ErrorCode {
        self.code
    }

    const fn reject_absent(self) -> Self {
        Self {
            code: self.code,
            absent: false,
        }
    }
}

impl fmt::Display for SerdeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "serde conversion error: {}", BencodeError::new(self.code, 0))
    }
}

impl std::error::Error for SerdeError {}

impl serde::ser::Error for SerdeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self::with_code(ErrorCode::SerdeError)
    }
}

impl serde::de::Error for SerdeError {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Self::with_code(ErrorCode::SerdeError)
    }

    fn missing_field(_field: &'static str) -> Self {
        Self::with_code(ErrorCode::MissingKey)
    }

    fn unknown_variant(_variant: &str, _expected: &'static [&'static str]) -> Self {
        Self::with_code(ErrorCode::UnknownVariant)
    }

    fn invalid_length(_len: usize, _exp: &dyn serde::de::Expected) -> Self {
        Self::with_code(ErrorCode::ListLenMismatch)
    }
}

fn element(value: Result<Value, SerdeError>) -> Result<Value, SerdeError> {
    value.map_err(SerdeError::reject_absent)
}

/// Push an entry unless the value serialized as absent.
fn field_entry(
    entries: &mut Vec<(Vec<u8>, Value)>,
    key: Vec<u8>,
    value: Result<Value, SerdeError>,
) -> Result<(), SerdeError> {
    match value {
        Ok(v) => {
            entries.push((key, v));
            Ok(())
        }
        Err(err) if err.absent => Ok(()),
        Err(err) => Err(err),
    }
}

fn dict_from(entries: Vec<(Vec<u8>, Value)>) -> Result<Value, SerdeError> {
    Dictionary::try_from_entries(entries)
        .map(Value::Dictionary)
        .map_err(|err| SerdeError::with_code(err.code))
}

fn enum_dict(variant: &str, value: Value) -> Result<Value, SerdeError> {
    let mut dict = Dictionary::with_capacity(1);
    dict.push(variant.as_bytes(), value);
    Ok(Value::Dictionary(dict))
}

struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = SerdeError;

    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = SeqSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = MapSerializer;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Integer(Integer::from_i128(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        Ok(Value::int(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Integer(Integer::from(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        Ok(Value::Integer(Integer::from_u128(v)))
    }

    fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::Unsupported))
    }

    fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::Unsupported))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        let mut buf = [0u8; 4];
        Ok(Value::str(v.encode_utf8(&mut buf)))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        Ok(Value::str(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(Value::bytes(v))
    }

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        Err(SerdeError::absent())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        Err(SerdeError::absent())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        Err(SerdeError::absent())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(Value::str(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        let inner = element(value.serialize(Self))?;
        enum_dict(variant, inner)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SeqSerializer::new(None, len))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(SeqSerializer::new(None, Some(len)))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(SeqSerializer::new(None, Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(SeqSerializer::new(Some(variant), Some(len)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapSerializer::new(None, len))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(MapSerializer::new(None, Some(len)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(MapSerializer::new(Some(variant), Some(len)))
    }
}

/// Lists, tuples and tuple variants. A variant name wraps the list in a single-entry dictionary.
struct SeqSerializer {
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqSerializer {
    fn new(variant: Option<&'static str>, len: Option<usize>) -> Self {
        let items = len.map_or_else(Vec::new, Vec::with_capacity);
        Self { variant, items }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerdeError> {
        self.items.push(element(value.serialize(ValueSerializer))?);
        Ok(())
    }

    fn finish(self) -> Result<Value, SerdeError> {
        let list = Value::List(self.items);
        match self.variant {
            Some(variant) => enum_dict(variant, list),
            None => Ok(list),
        }
    }
}

impl SerializeSeq for SeqSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl serde::ser::SerializeTuple for SeqSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleVariant for SeqSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

/// Maps, structs and struct variants. Absent values drop their key.
struct MapSerializer {
    variant: Option<&'static str>,
    entries: Vec<(Vec<u8>, Value)>,
    next_key: Option<Vec<u8>>,
}

impl MapSerializer {
    fn new(variant: Option<&'static str>, len: Option<usize>) -> Self {
        let entries = len.map_or_else(Vec::new, Vec::with_capacity);
        Self {
            variant,
            entries,
            next_key: None,
        }
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<(), SerdeError> {
        field_entry(
            &mut self.entries,
            key.as_bytes().to_vec(),
            value.serialize(ValueSerializer),
        )
    }

    fn finish(self) -> Result<Value, SerdeError> {
        let dict = dict_from(self.entries)?;
        match self.variant {
            Some(variant) => enum_dict(variant, dict),
            None => Ok(dict),
        }
    }
}

impl SerializeMap for MapSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::SerdeError))?;
        field_entry(&mut self.entries, key, value.serialize(ValueSerializer))
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl serde::ser::SerializeStruct for MapSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.field(key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl serde::ser::SerializeStructVariant for MapSerializer {
    type Ok = Value;
    type Error = SerdeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.field(key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

/// Dictionary keys: text and bytes as-is, integers as decimal text, unit variants by name.
struct KeySerializer;

macro_rules! serialize_key_int {
    ($($method:ident: $t:ty),* $(,)?) => {$(
        fn $method(self, v: $t) -> Result<Self::Ok, Self::Error> {
            Ok(v.to_string().into_bytes())
        }
    )*};
}

macro_rules! reject_key {
    ($($method:ident($($arg:ty),*)),* $(,)?) => {$(
        fn $method(self, $(_: $arg),*) -> Result<Self::Ok, Self::Error> {
            Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
        }
    )*};
}

impl Serializer for KeySerializer {
    type Ok = Vec<u8>;
    type Error = SerdeError;

    type SerializeSeq = Impossible<Vec<u8>, SerdeError>;
    type SerializeTuple = Impossible<Vec<u8>, SerdeError>;
    type SerializeTupleStruct = Impossible<Vec<u8>, SerdeError>;
    type SerializeTupleVariant = Impossible<Vec<u8>, SerdeError>;
    type SerializeMap = Impossible<Vec<u8>, SerdeError>;
    type SerializeStruct = Impossible<Vec<u8>, SerdeError>;
    type SerializeStructVariant = Impossible<Vec<u8>, SerdeError>;

    fn serialize_str(self, value: &str) -> Result<Self::Ok, Self::Error> {
        Ok(value.as_bytes().to_vec())
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Self::Ok, Self::Error> {
        Ok(value.to_vec())
    }

    fn serialize_char(self, value: char) -> Result<Self::Ok, Self::Error> {
        let mut buf = [0u8; 4];
        Ok(value.encode_utf8(&mut buf).as_bytes().to_vec())
    }

    serialize_key_int!(
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
    );

    reject_key!(
        serialize_bool(bool),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_none(),
        serialize_unit(),
        serialize_unit_struct(&'static str),
    );

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        Ok(variant.as_bytes().to_vec())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(SerdeError::with_code(ErrorCode::DictKeyMustBeBytes))
    }
}

struct ValueDeserializer<'de> {
    value: &'de Value,
}

impl<'de> ValueDeserializer<'de> {
    const fn new(value: &'de Value) -> Self {
        Self { value }
    }

    fn integer(&self) -> Result<&'de Integer, SerdeError> {
        self.value
            .as_integer()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::ExpectedInteger))
    }

    fn i128(&self) -> Result<i128, SerdeError> {
        self.integer()?
            .to_i128()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::IntegerOutOfRange))
    }

    fn u128(&self) -> Result<u128, SerdeError> {
        self.integer()?
            .to_u128()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::IntegerOutOfRange))
    }

    fn bytes(&self) -> Result<&'de [u8], SerdeError> {
        self.value
            .as_bytes()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::ExpectedBytes))
    }

    fn str(&self) -> Result<&'de str, SerdeError> {
        crate::utf8::validate(self.bytes()?)
            .map_err(|()| SerdeError::with_code(ErrorCode::Utf8Invalid))
    }

    fn list(&self) -> Result<&'de [Value], SerdeError> {
        self.value
            .as_list()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::ExpectedList))
    }

    fn dict(&self) -> Result<&'de Dictionary, SerdeError> {
        self.value
            .as_dict()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::ExpectedDict))
    }
}

macro_rules! deserialize_narrow {
    ($($method:ident => $visit:ident: $t:ty via $wide:ident),* $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            let v = <$t>::try_from(self.$wide()?)
                .map_err(|_| SerdeError::with_code(ErrorCode::IntegerOutOfRange))?;
            visitor.$visit(v)
        }
    )*};
}

impl<'de> serde::de::Deserializer<'de> for ValueDeserializer<'de> {
    type Error = SerdeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Integer(i) => {
                if let Some(v) = i.as_i64() {
                    visitor.visit_i64(v)
                } else if let Some(v) = i.to_i128() {
                    visitor.visit_i128(v)
                } else if let Some(v) = i.to_u128() {
                    visitor.visit_u128(v)
                } else {
                    Err(SerdeError::with_code(ErrorCode::IntegerOutOfRange))
                }
            }
            Value::ByteString(b) => match crate::utf8::validate(b) {
                Ok(s) => visitor.visit_borrowed_str(s),
                Err(()) => visitor.visit_borrowed_bytes(b),
            },
            Value::List(items) => visitor.visit_seq(SeqAccess { items, idx: 0 }),
            Value::Dictionary(dict) => visitor.visit_map(MapAccess::new(dict.iter())),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.i128()? {
            0 => visitor.visit_bool(false),
            1 => visitor.visit_bool(true),
            _ => Err(SerdeError::with_code(ErrorCode::IntegerOutOfRange)),
        }
    }

    deserialize_narrow!(
        deserialize_i8 => visit_i8: i8 via i128,
        deserialize_i16 => visit_i16: i16 via i128,
        deserialize_i32 => visit_i32: i32 via i128,
        deserialize_i64 => visit_i64: i64 via i128,
        deserialize_u8 => visit_u8: u8 via u128,
        deserialize_u16 => visit_u16: u16 via u128,
        deserialize_u32 => visit_u32: u32 via u128,
        deserialize_u64 => visit_u64: u64 via u128,
    );

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_i128(self.i128()?)
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u128(self.u128()?)
    }

    fn deserialize_f32<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(SerdeError::with_code(ErrorCode::Unsupported))
    }

    fn deserialize_f64<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(SerdeError::with_code(ErrorCode::Unsupported))
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let mut chars = self.str()?.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            visitor.visit_char(c)
        } else {
            Err(SerdeError::with_code(ErrorCode::SerdeError))
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.str()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.bytes()?)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    /// A present value is always `Some`; `None` is a missing dictionary key.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(SerdeError::with_code(ErrorCode::Unsupported))
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(SeqAccess {
            items: self.list()?,
            idx: 0,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(MapAccess::new(self.dict()?.iter()))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::ByteString(_) => visitor.visit_enum(EnumAccess {
                variant: self.str()?,
                value: None,
            }),
            Value::Dictionary(dict) => visitor.visit_enum(EnumAccess::from_dict(dict)?),
            _ => Err(SerdeError::with_code(ErrorCode::ExpectedDict)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Dictionary keys seen by typed code: text where possible, integers parsed from decimal text.
struct KeyDeserializer<'de> {
    key: &'de [u8],
}

macro_rules! deserialize_key_int {
    ($($method:ident => $visit:ident: $t:ty),* $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: Visitor<'de>,
        {
            let v: $t = self
                .text()?
                .parse()
                .map_err(|_| SerdeError::with_code(ErrorCode::IntegerOutOfRange))?;
            visitor.$visit(v)
        }
    )*};
}

impl<'de> KeyDeserializer<'de> {
    fn text(&self) -> Result<&'de str, SerdeError> {
        crate::utf8::validate(self.key).map_err(|()| SerdeError::with_code(ErrorCode::Utf8Invalid))
    }
}

impl<'de> serde::de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = SerdeError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match crate::utf8::validate(self.key) {
            Ok(s) => visitor.visit_borrowed_str(s),
            Err(()) => visitor.visit_borrowed_bytes(self.key),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.key)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.key)
    }

    deserialize_key_int!(
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
    );

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let variant = self.text()?;
        visitor.visit_enum(IntoDeserializer::<'de, SerdeError>::into_deserializer(variant))
    }

    serde::forward_to_deserialize_any! {
        bool f32 f64 char str string unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct SeqAccess<'de> {
    items: &'de [Value],
    idx: usize,
}

impl<'de> serde::de::SeqAccess<'de> for SeqAccess<'de> {
    type Error = SerdeError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        let Some(value) = self.items.get(self.idx) else {
            return Ok(None);
        };
        self.idx += 1;
        seed.deserialize(ValueDeserializer::new(value)).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len() - self.idx)
    }
}

struct MapAccess<'de, I>
where
    I: Iterator<Item = (&'de [u8], &'de Value)>,
{
    iter: I,
    pending: Option<&'de Value>,
}

impl<'de, I> MapAccess<'de, I>
where
    I: Iterator<Item = (&'de [u8], &'de Value)>,
{
    const fn new(iter: I) -> Self {
        Self {
            iter,
            pending: None,
        }
    }
}

impl<'de, I> serde::de::MapAccess<'de> for MapAccess<'de, I>
where
    I: Iterator<Item = (&'de [u8], &'de Value)>,
{
    type Error = SerdeError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: serde::de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            None => Ok(None),
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            }
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| SerdeError::with_code(ErrorCode::SerdeError))?;
        seed.deserialize(ValueDeserializer::new(value))
    }
}

struct EnumAccess<'de> {
    variant: &'de str,
    value: Option<&'de Value>,
}

impl<'de> EnumAccess<'de> {
    fn from_dict(dict: &'de Dictionary) -> Result<Self, SerdeError> {
        let mut entries = dict.iter();
        let (Some((key, value)), None) = (entries.next(), entries.next()) else {
            return Err(SerdeError::with_code(ErrorCode::SerdeError));
        };
        let variant = crate::utf8::validate(key)
            .map_err(|()| SerdeError::with_code(ErrorCode::Utf8Invalid))?;
        Ok(Self {
            variant,
            value: Some(value),
        })
    }
}

impl<'de> serde::de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = SerdeError;
    type Variant = VariantAccess<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: serde::de::DeserializeSeed<'de>,
    {
        let val = seed.deserialize(IntoDeserializer::<'de, SerdeError>::into_deserializer(
            self.variant,
        ))?;
        Ok((val, VariantAccess { value: self.value }))
    }
}

struct VariantAccess<'de> {
    value: Option<&'de Value>,
}

impl<'de> serde::de::VariantAccess<'de> for VariantAccess<'de> {
    type Error = SerdeError;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            None => Ok(()),
            Some(_) => Err(SerdeError::with_code(ErrorCode::SerdeError)),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: serde::de::DeserializeSeed<'de>,
    {
        let value = self
            .value
            .ok_or_else(|| SerdeError::with_code(ErrorCode::SerdeError))?;
        seed.deserialize(ValueDeserializer::new(value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.value.and_then(Value::as_list).map_or_else(
            || Err(SerdeError::with_code(ErrorCode::ExpectedList)),
            |items| visitor.visit_seq(SeqAccess { items, idx: 0 }),
        )
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.value.and_then(Value::as_dict).map_or_else(
            || Err(SerdeError::with_code(ErrorCode::ExpectedDict)),
            |dict| visitor.visit_map(MapAccess::new(dict.iter())),
        )
    }
}

/// Serde helper module for `#[serde(with = "strict_bencode::serde_value")]`.
pub mod serde_value {
    use super::Value;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Value` using Serde's data model.
    ///
    /// # Errors
    ///
    /// Returns any serialization error from the underlying serializer.
    pub fn serialize<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    /// Deserialize a `Value` using Serde's data model.
    ///
    /// # Errors
    ///
    /// Returns any deserialization error from the underlying deserializer.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }
}
