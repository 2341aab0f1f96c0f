//! Dynamic scalar values carried between DTOs, models and SQL statements.

use chrono::{DateTime, Utc};
use std::fmt;
use tessera_core::{TesseraError, TesseraResult};
use uuid::Uuid;

/// Declared type of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Uuid,
    Timestamp,
    Json,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// A single column or field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Value {
    /// Returns the kind of a non-null value.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Int(_) => Some(ValueKind::Int),
            Self::Float(_) => Some(ValueKind::Float),
            Self::Text(_) => Some(ValueKind::Text),
            Self::Uuid(_) => Some(ValueKind::Uuid),
            Self::Timestamp(_) => Some(ValueKind::Timestamp),
            Self::Json(_) => Some(ValueKind::Json),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value may be stored in a field of `kind`.
    ///
    /// `Null` conforms to every kind.
    #[must_use]
    pub fn conforms_to(&self, kind: ValueKind) -> bool {
        self.kind().map_or(true, |k| k == kind)
    }

    fn describe(&self) -> String {
        self.kind().map_or_else(|| "null".to_string(), |k| k.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::Uuid(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Conversion from a [`Value`] back into a Rust field type.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> TesseraResult<Self>;
}

fn mismatch(expected: &str, found: &Value) -> TesseraError {
    TesseraError::mapping(format!("expected {}, found {}", expected, found.describe()))
}

impl FromValue for Value {
    fn from_value(value: Value) -> TesseraResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Int(v) => Ok(v),
            other => Err(mismatch("int", &other)),
        }
    }
}

macro_rules! narrow_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> TesseraResult<Self> {
                    let wide = i64::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        TesseraError::mapping(format!(
                            "integer {} out of range for {}",
                            wide,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

narrow_int!(i32, i16, u32);

impl FromValue for f64 {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Float(v) => Ok(v),
            other => Err(mismatch("float", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Uuid(v) => Ok(v),
            other => Err(mismatch("uuid", &other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Json(v) => Ok(v),
            other => Err(mismatch("json", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> TesseraResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_conformance() {
        assert_eq!(Value::from(3_i32).kind(), Some(ValueKind::Int));
        assert_eq!(Value::Null.kind(), None);
        assert!(Value::Null.conforms_to(ValueKind::Timestamp));
        assert!(Value::from("x").conforms_to(ValueKind::Text));
        assert!(!Value::from(1.5).conforms_to(ValueKind::Int));
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("abc")), Value::Text("abc".to_string()));
    }

    #[test]
    fn test_narrowing_is_checked() {
        assert_eq!(i32::from_value(Value::Int(42)).unwrap(), 42);
        let err = i16::from_value(Value::Int(i64::from(i16::MAX) + 1)).unwrap_err();
        assert_eq!(err.error_code(), "MAPPING_ERROR");
        assert!(u32::from_value(Value::Int(-1)).is_err());
    }

    #[test]
    fn test_optional_from_null() {
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<bool>::from_value(Value::Bool(true)).unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_kind_mismatch_names_both_kinds() {
        let err = String::from_value(Value::Int(7)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("expected text"));
        assert!(message.contains("found int"));
    }

    #[test]
    fn test_null_into_required_field_fails() {
        assert!(Uuid::from_value(Value::Null).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::from(12_i64).to_string(), "12");
        assert_eq!(Value::from("key-1").to_string(), "key-1");
    }
}
