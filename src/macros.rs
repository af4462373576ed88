//! Bencode construction macro.
//!
//! [`bencode!`] builds [`crate::Value`] trees with a JSON-like literal syntax.
//!
//! - The macro is **fallible** and returns `Result<Value, BencodeError>`.
//! - Dictionary literals are sorted into canonical key order; a repeated key is `DuplicateKey`.
//! - `true`/`false` become the integers `1`/`0`. There is no null.
//! - Negative literals inside lists and dictionaries need parentheses: `[(-1), 2]`.
//!
//! Dictionary key forms:
//! - `{ a: 1 }` uses the key `b"a"` (identifier stringized)
//! - `{ "a": 1 }` or `{ b"a": 1 }` uses the literal key
//! - `{ (k): 1 }` uses the expression `k` as the key (`&str`, `String`, `&[u8]`, `Vec<u8>`)
//!
//! ```
//! # use strict_bencode::bencode;
//! # fn demo() -> Result<(), strict_bencode::BencodeError> {
//! let user_key = "dynamic";
//! let v = bencode!({
//!     name: "spam",
//!     (user_key): [1, (-2), b"\x00\xff"],
//! })?;
//! assert_eq!(v.encode()?, b"d7:dynamicli1ei-2e2:\x00\xffe4:name4:spame");
//! # Ok(()) }
//! ```

/// Construct a [`crate::Value`] using a JSON-like literal syntax.
///
/// This macro returns `Result<crate::Value, crate::BencodeError>`.
///
/// Supported forms:
/// - `bencode!(true)` / `bencode!(false)`
/// - `bencode!("text")` / `bencode!(b"bytes")`
/// - `bencode!([ ... ])`
/// - `bencode!({ key: value, "key": value, (expr_key): value, ... })`
/// - `bencode!(expr)` where `expr` implements the internal conversion trait
///   (primitive integers, `String`, `&str`, `Vec<u8>`, `&[u8]`, `Integer`, `BigInt`,
///   `Dictionary`, `Value`).
#[cfg(feature = "alloc")]
#[cfg_attr(docsrs, doc(cfg(feature = "alloc")))]
#[macro_export]
macro_rules! bencode {
    (true) => {
        ::core::result::Result::<$crate::Value, $crate::BencodeError>::Ok($crate::Value::int(1))
    };
    (false) => {
        ::core::result::Result::<$crate::Value, $crate::BencodeError>::Ok($crate::Value::int(0))
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        (|| -> ::core::result::Result<$crate::Value, $crate::BencodeError> {
            let mut items = $crate::__bencode_macro::Vec::new();
            $crate::__bencode_macro::reserve(
                &mut items,
                0usize $(+ { let _ = stringify!($elem); 1usize })*,
            )?;

            $(
                items.push($crate::bencode!($elem)?);
            )*

            ::core::result::Result::Ok($crate::Value::List(items))
        })()
    }};

    ({ $($key:tt : $value:tt),* $(,)? }) => {{
        (|| -> ::core::result::Result<$crate::Value, $crate::BencodeError> {
            let mut entries = $crate::__bencode_macro::Vec::new();
            $crate::__bencode_macro::reserve(
                &mut entries,
                0usize $(+ { let _ = stringify!($key); let _ = stringify!($value); 1usize })*,
            )?;

            $(
                let k = $crate::__bencode_key!($key)?;
                let v = $crate::bencode!($value)?;
                entries.push((k, v));
            )*

            let dict = $crate::Dictionary::try_from_entries(entries)?;
            ::core::result::Result::Ok($crate::Value::Dictionary(dict))
        })()
    }};

    ($other:expr) => {{
        $crate::__bencode_macro::IntoBencodeValue::into_bencode_value($other)
    }};
}

/// Internal helper for dictionary keys.
#[doc(hidden)]
#[cfg(feature = "alloc")]
#[macro_export]
macro_rules! __bencode_key {
    ($key:ident) => {{
        $crate::__bencode_macro::bytes_from_slice(::core::stringify!($key).as_bytes())
    }};
    (($key:expr)) => {{
        $crate::__bencode_macro::IntoBencodeKey::into_bencode_key($key)
    }};
    ($key:literal) => {{
        $crate::__bencode_macro::IntoBencodeKey::into_bencode_key($key)
    }};
}

/// Hidden support module used by `bencode!` expansions.
#[doc(hidden)]
#[allow(missing_docs)]
pub mod __bencode_macro {
    use alloc::string::String;

    pub use alloc::vec::Vec;

    use crate::alloc_util::{try_reserve_exact, try_vec_from_slice};
    use crate::{BencodeError, BigInt, Dictionary, ErrorCode, Integer, Value};

    pub fn reserve<T>(v: &mut Vec<T>, additional: usize) -> Result<(), BencodeError> {
        try_reserve_exact(v, additional, 0)
    }

    pub fn bytes_from_slice(b: &[u8]) -> Result<Vec<u8>, BencodeError> {
        try_vec_from_slice(b, 0)
    }

    pub trait IntoBencodeKey {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError>;
    }

    impl IntoBencodeKey for Vec<u8> {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError> {
            Ok(self)
        }
    }

    impl IntoBencodeKey for String {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError> {
            Ok(self.into_bytes())
        }
    }

    impl IntoBencodeKey for &String {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError> {
            bytes_from_slice(self.as_bytes())
        }
    }

    impl IntoBencodeKey for &str {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError> {
            bytes_from_slice(self.as_bytes())
        }
    }

    impl IntoBencodeKey for &[u8] {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError> {
            bytes_from_slice(self)
        }
    }

    impl<const N: usize> IntoBencodeKey for &[u8; N] {
        fn into_bencode_key(self) -> Result<Vec<u8>, BencodeError> {
            bytes_from_slice(self)
        }
    }

    pub trait IntoBencodeValue {
        fn into_bencode_value(self) -> Result<Value, BencodeError>;
    }

    impl IntoBencodeValue for Value {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(self)
        }
    }

    impl IntoBencodeValue for &Value {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(self.clone())
        }
    }

    impl IntoBencodeValue for Dictionary {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::Dictionary(self.normalized()))
        }
    }

    impl IntoBencodeValue for Integer {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::Integer(self))
        }
    }

    impl IntoBencodeValue for BigInt {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::Integer(Integer::from_bigint(self)))
        }
    }

    impl IntoBencodeValue for bool {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::int(i64::from(self)))
        }
    }

    impl<T: IntoBencodeValue> IntoBencodeValue for Option<T> {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            self.map_or(
                Err(BencodeError::new(ErrorCode::Unsupported, 0)),
                IntoBencodeValue::into_bencode_value,
            )
        }
    }

    impl IntoBencodeValue for String {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::ByteString(self.into_bytes()))
        }
    }

    impl IntoBencodeValue for &String {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::ByteString(bytes_from_slice(self.as_bytes())?))
        }
    }

    impl IntoBencodeValue for &str {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::ByteString(bytes_from_slice(self.as_bytes())?))
        }
    }

    impl IntoBencodeValue for Vec<u8> {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::ByteString(self))
        }
    }

    impl IntoBencodeValue for &[u8] {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::ByteString(bytes_from_slice(self)?))
        }
    }

    impl<const N: usize> IntoBencodeValue for &[u8; N] {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::ByteString(bytes_from_slice(self)?))
        }
    }

    impl IntoBencodeValue for Vec<Value> {
        fn into_bencode_value(self) -> Result<Value, BencodeError> {
            Ok(Value::List(self))
        }
    }

    macro_rules! impl_into_integer {
        ($($t:ty),* $(,)?) => {$(
            impl IntoBencodeValue for $t {
                fn into_bencode_value(self) -> Result<Value, BencodeError> {
                    Ok(Value::Integer(Integer::from(self)))
                }
            }
        )*};
    }

    impl_into_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
}
