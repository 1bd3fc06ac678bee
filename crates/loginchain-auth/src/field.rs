//! Typed access to loosely-typed JSON claim fields.
//!
//! Client-supplied JSON is read through [`Field`], which keeps the three
//! outcomes apart: the key is absent (the caller keeps its default), the key
//! holds a value of the expected shape, or the key holds something else (a
//! hard [`LoginError::FieldType`]).

use serde_json::{Map, Value};

use crate::error::LoginError;

/// Outcome of looking up one key in a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Present(T),
    WrongShape { expected: &'static str },
}

impl<T> Field<T> {
    /// Look up `key` in `object` and convert it to `T`.
    pub fn read(object: &Map<String, Value>, key: &str) -> Self
    where
        T: FromField,
    {
        match object.get(key) {
            None => Self::Absent,
            Some(value) => match T::from_value(value) {
                Some(v) => Self::Present(v),
                None => Self::WrongShape {
                    expected: T::EXPECTED,
                },
            },
        }
    }

    /// Collapse into an optional value, failing on a wrong shape.
    pub fn into_result(self, key: &str) -> Result<Option<T>, LoginError> {
        match self {
            Self::Absent => Ok(None),
            Self::Present(v) => Ok(Some(v)),
            Self::WrongShape { expected } => Err(LoginError::FieldType {
                field: key.to_string(),
                expected,
            }),
        }
    }
}

/// Conversion from a JSON value of one specific shape.
pub trait FromField: Sized {
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromField for String {
    const EXPECTED: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromField for i64 {
    const EXPECTED: &'static str = "64-bit integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromField for i32 {
    const EXPECTED: &'static str = "32-bit integer";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|v| i32::try_from(v).ok())
    }
}

impl FromField for Map<String, Value> {
    const EXPECTED: &'static str = "object";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

/// Read an optional field, failing only when it is present with the wrong shape.
pub fn optional<T: FromField>(
    object: &Map<String, Value>,
    key: &str,
) -> Result<Option<T>, LoginError> {
    Field::<T>::read(object, key).into_result(key)
}

/// Read a field that falls back to its type's zero value when absent.
pub fn or_default<T: FromField + Default>(
    object: &Map<String, Value>,
    key: &str,
) -> Result<T, LoginError> {
    Ok(optional(object, key)?.unwrap_or_default())
}
