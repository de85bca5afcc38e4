mod cell;
pub use cell::{Cell, Relation};

mod kind;
pub use kind::Kind;

use crate::{Error, Record, Result};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

/// One value of the fixed kind set.
///
/// Nested records are reference counted so that copying a record clones its
/// cells without cloning the nested graph. Mutating a nested record through
/// a path goes through [`Arc::make_mut`].
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Blob(Vec<u8>),
    /// Enum constant, stored upper-cased.
    Enum(String),
    Model(Arc<Record>),
    List(Vec<Value>),
}

impl Value {
    /// The kind this value carries, or `None` for null.
    pub fn kind(&self) -> Option<Kind> {
        Some(match self {
            Value::Null => return None,
            Value::String(_) => Kind::String,
            Value::Int(_) => Kind::Int,
            Value::Long(_) => Kind::Long,
            Value::Double(_) => Kind::Double,
            Value::Boolean(_) => Kind::Boolean,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Blob(_) => Kind::Blob,
            Value::Enum(_) => Kind::Enum,
            Value::Model(_) => Kind::Model,
            Value::List(_) => Kind::List,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value counts as "not populated": null, zero, an empty
    /// string, blob or list.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(v) | Value::Enum(v) => v.is_empty(),
            Value::Int(v) => *v == 0,
            Value::Long(v) => *v == 0,
            Value::Double(v) => *v == 0.0,
            Value::Boolean(v) => !*v,
            Value::Blob(v) => v.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Timestamp(_) | Value::Model(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Enum(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            Value::Long(v) => Some(v),
            Value::Int(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Value::Int(v) => Some(v),
            Value::Long(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Model(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    /// Converts the value to fit `kind`, widening or parsing where the
    /// conversion is lossless.
    pub fn coerce(self, kind: Kind, field: &str) -> Result<Value> {
        let actual = self.kind();
        let value = match (kind, self) {
            (_, Value::Null) => Value::Null,
            (Kind::Flex, _) => return Err(Error::abstract_field_access(field)),
            (Kind::String, Value::String(v)) => Value::String(v),
            (Kind::String, Value::Enum(v)) => Value::String(v),
            (Kind::Int, Value::Int(v)) => Value::Int(v),
            (Kind::Int, Value::Long(v)) if i32::try_from(v).is_ok() => Value::Int(v as i32),
            (Kind::Long, Value::Long(v)) => Value::Long(v),
            (Kind::Long, Value::Int(v)) => Value::Long(v as i64),
            (Kind::Double, Value::Double(v)) => Value::Double(v),
            (Kind::Double, Value::Int(v)) => Value::Double(v as f64),
            (Kind::Double, Value::Long(v)) => Value::Double(v as f64),
            (Kind::Boolean, Value::Boolean(v)) => Value::Boolean(v),
            (Kind::Timestamp, Value::Timestamp(v)) => Value::Timestamp(v),
            (Kind::Timestamp, Value::Long(v)) => match DateTime::from_timestamp_millis(v) {
                Some(ts) => Value::Timestamp(ts),
                None => return Err(Error::value_type_mismatch(field, kind, actual)),
            },
            (Kind::Timestamp, Value::String(v)) => match DateTime::parse_from_rfc3339(&v) {
                Ok(ts) => Value::Timestamp(ts.with_timezone(&Utc)),
                Err(_) => return Err(Error::value_type_mismatch(field, kind, actual)),
            },
            (Kind::Blob, Value::Blob(v)) => Value::Blob(v),
            (Kind::Enum, Value::Enum(v)) | (Kind::Enum, Value::String(v)) => {
                Value::Enum(v.to_uppercase())
            }
            (Kind::Model, Value::Model(v)) => Value::Model(v),
            (Kind::List, Value::List(v)) => Value::List(v),
            _ => return Err(Error::value_type_mismatch(field, kind, actual)),
        };
        Ok(value)
    }

    /// Writes a canonical text form of the value, used for digests.
    pub(crate) fn write_canonical(&self, dst: &mut String) {
        use std::fmt::Write;

        match self {
            Value::Null => {}
            Value::String(v) | Value::Enum(v) => dst.push_str(v),
            Value::Int(v) => {
                let _ = write!(dst, "{v}");
            }
            Value::Long(v) => {
                let _ = write!(dst, "{v}");
            }
            Value::Double(v) => {
                let _ = write!(dst, "{v}");
            }
            Value::Boolean(v) => {
                let _ = write!(dst, "{v}");
            }
            Value::Timestamp(v) => dst.push_str(&v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Blob(v) => dst.push_str(&BASE64.encode(v)),
            Value::Model(v) => dst.push_str(&v.hash()),
            Value::List(items) => {
                dst.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        dst.push(',');
                    }
                    item.write_canonical(dst);
                }
                dst.push(']');
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Model(Arc::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_long() {
        assert_eq!(Value::Int(7).coerce(Kind::Long, "n").unwrap(), Value::Long(7));
    }

    #[test]
    fn long_narrows_to_int_only_when_it_fits() {
        assert_eq!(Value::Long(7).coerce(Kind::Int, "n").unwrap(), Value::Int(7));
        let err = Value::Long(i64::MAX).coerce(Kind::Int, "n").unwrap_err();
        assert!(err.is_value_type_mismatch());
    }

    #[test]
    fn strings_become_upper_cased_enums() {
        let value = Value::from("active").coerce(Kind::Enum, "status").unwrap();
        assert_eq!(value, Value::Enum("ACTIVE".to_string()));
    }

    #[test]
    fn flex_kind_refuses_values() {
        let err = Value::Long(1).coerce(Kind::Flex, "value").unwrap_err();
        assert!(err.is_abstract_field_access());
    }

    #[test]
    fn empty_values() {
        assert!(Value::Null.is_empty());
        assert!(Value::Long(0).is_empty());
        assert!(Value::from("").is_empty());
        assert!(!Value::Long(3).is_empty());
        assert!(!Value::from("x").is_empty());
    }
}
