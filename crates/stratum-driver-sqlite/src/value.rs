use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use stratum_core::{codec::scalar, driver::Param, Error, Kind, Result, Value as CoreValue};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl From<Param> for Value {
    fn from(param: Param) -> Self {
        Self(param.value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a core value of `kind`.
    ///
    /// Timestamps are stored as RFC 3339 text. `List` columns carry JSON
    /// text and are returned untouched for the caller to decode.
    pub fn from_sql(row: &Row, index: usize, kind: Kind) -> Result<Self> {
        let value: SqlValue = row.get(index).map_err(Error::driver_operation_failed)?;

        let core_value = match value {
            SqlValue::Null => CoreValue::Null,
            SqlValue::Integer(value) => match kind {
                Kind::Boolean => CoreValue::Boolean(value != 0),
                Kind::Int => CoreValue::Int(
                    i32::try_from(value).map_err(Error::driver_operation_failed)?,
                ),
                Kind::Double => CoreValue::Double(value as f64),
                Kind::Timestamp => DateTime::from_timestamp_millis(value)
                    .map(CoreValue::Timestamp)
                    .unwrap_or(CoreValue::Long(value)),
                Kind::String | Kind::Enum | Kind::List => CoreValue::String(value.to_string()),
                _ => CoreValue::Long(value),
            },
            SqlValue::Real(value) => CoreValue::Double(value),
            SqlValue::Text(value) => match kind {
                Kind::Timestamp => match DateTime::parse_from_rfc3339(&value) {
                    Ok(ts) => CoreValue::Timestamp(ts.with_timezone(&Utc)),
                    Err(err) => {
                        tracing::warn!(column = index, error = %err, "unparseable timestamp text");
                        CoreValue::String(value)
                    }
                },
                _ => CoreValue::String(value),
            },
            SqlValue::Blob(value) => CoreValue::Blob(value),
        };

        Ok(Value(core_value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match &self.0 {
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            CoreValue::Boolean(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            CoreValue::Boolean(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            CoreValue::Int(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            CoreValue::Long(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            CoreValue::Double(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) | CoreValue::Enum(v) => {
                Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())))
            }
            CoreValue::Timestamp(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.to_rfc3339_opts(SecondsFormat::Millis, true),
            ))),
            CoreValue::Blob(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            CoreValue::List(_) => {
                let json = scalar::to_json(&self.0);
                Ok(ToSqlOutput::Owned(SqlValue::Text(json.to_string())))
            }
            CoreValue::Model(record) => Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                Error::invalid_statement(format!(
                    "a `{}` record cannot be bound as a parameter",
                    record.model()
                )),
            ))),
        }
    }
}
