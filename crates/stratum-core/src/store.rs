//! Contracts every backend implements.

use crate::{schema::names, Query, QueryResult, Record, Result, Value};

/// How a single record is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(i64),
    ObjectId(String),
    Urn(String),
}

impl RecordKey {
    /// The field holding this kind of key.
    pub fn field(&self) -> &'static str {
        match self {
            RecordKey::Id(_) => names::ID,
            RecordKey::ObjectId(_) => names::OBJECT_ID,
            RecordKey::Urn(_) => names::URN,
        }
    }

    pub fn value(&self) -> Value {
        match self {
            RecordKey::Id(id) => Value::Long(*id),
            RecordKey::ObjectId(id) | RecordKey::Urn(id) => Value::String(id.clone()),
        }
    }

    /// The key a record can be addressed by: its `id` when positive,
    /// otherwise its `objectId`.
    pub fn of(record: &Record) -> Option<RecordKey> {
        if let Some(id) = record.value(names::ID).and_then(Value::as_long) {
            if id > 0 {
                return Some(RecordKey::Id(id));
            }
        }
        record
            .value(names::OBJECT_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(|id| RecordKey::ObjectId(id.to_string()))
    }
}

impl From<i64> for RecordKey {
    fn from(id: i64) -> Self {
        RecordKey::Id(id)
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "id={id}"),
            RecordKey::ObjectId(id) => write!(f, "objectId={id}"),
            RecordKey::Urn(urn) => write!(f, "urn={urn}"),
        }
    }
}

pub trait Reader: Send + Sync {
    /// Reads one record. Fails with a record-not-found error when absent.
    fn read(&self, model: &str, key: &RecordKey) -> Result<Record>;
}

pub trait Writer: Send + Sync {
    /// Creates the record when it carries no identity value, otherwise
    /// updates it. Identity assigned on create is written back into
    /// `record`.
    fn write(&self, record: &mut Record) -> Result<bool>;

    fn delete(&self, record: &Record) -> Result<bool>;
}

pub trait Search: Send + Sync {
    fn find(&self, query: &Query) -> Result<QueryResult>;

    fn count(&self, query: &Query) -> Result<u64>;
}
