use chrono::{DateTime, NaiveDateTime, Utc};
use postgres::{
    types::{private::BytesMut, to_sql_checked, IsNull, Kind as PgKind, ToSql, Type},
    Row,
};
use stratum_core::{Error, Kind, Result, Value as CoreValue};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>>
    where
        Self: Sized,
    {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Boolean(value) => value.to_sql(ty, out),
            CoreValue::Int(value) => match *ty {
                Type::INT8 => (*value as i64).to_sql(ty, out),
                Type::FLOAT8 => (*value as f64).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::Long(value) => match *ty {
                Type::INT4 => i32::try_from(*value)?.to_sql(ty, out),
                Type::FLOAT8 => (*value as f64).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::Double(value) => value.to_sql(ty, out),
            CoreValue::String(value) | CoreValue::Enum(value) => value.to_sql(ty, out),
            CoreValue::Timestamp(value) => value.to_sql(ty, out),
            CoreValue::Blob(value) => value.to_sql(ty, out),
            CoreValue::List(items) => items
                .iter()
                .cloned()
                .map(Value)
                .collect::<Vec<_>>()
                .to_sql(ty, out),
            CoreValue::Model(record) => Err(Box::new(Error::invalid_statement(format!(
                "a `{}` record cannot be bound as a parameter",
                record.model()
            )))),
        }
    }

    fn accepts(ty: &Type) -> bool {
        match ty.kind() {
            PgKind::Array(member) => Self::accepts(member),
            _ => matches!(
                *ty,
                Type::BOOL
                    | Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::TEXT
                    | Type::VARCHAR
                    | Type::TIMESTAMPTZ
                    | Type::BYTEA
            ),
        }
    }

    to_sql_checked!();
}

/// Converts a PostgreSQL value within a row to a core value.
pub fn from_row(row: &Row, index: usize, expected: Kind) -> Result<CoreValue> {
    let column = &row.columns()[index];
    let ty = column.type_();

    // NOTE: the inner representation of the PostgreSQL type enum is not
    // accessible, so each type is matched by hand.
    let value = if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR {
        get::<String>(row, index)?.map(CoreValue::String)
    } else if *ty == Type::BOOL {
        get::<bool>(row, index)?.map(CoreValue::Boolean)
    } else if *ty == Type::INT2 {
        get::<i16>(row, index)?.map(|v| CoreValue::Int(v as i32))
    } else if *ty == Type::INT4 {
        get::<i32>(row, index)?.map(|v| match expected {
            Kind::Long | Kind::Model => CoreValue::Long(v as i64),
            _ => CoreValue::Int(v),
        })
    } else if *ty == Type::INT8 {
        match get::<i64>(row, index)? {
            Some(v) if expected == Kind::Int => Some(CoreValue::Int(
                i32::try_from(v).map_err(Error::driver_operation_failed)?,
            )),
            other => other.map(CoreValue::Long),
        }
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, index)?.map(|v| CoreValue::Double(v as f64))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, index)?.map(CoreValue::Double)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, index)?.map(CoreValue::Timestamp)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, index)?.map(|v| CoreValue::Timestamp(v.and_utc()))
    } else if *ty == Type::BYTEA {
        get::<Vec<u8>>(row, index)?.map(CoreValue::Blob)
    } else {
        return Err(Error::serialization(format!(
            "column `{}` has unsupported PostgreSQL type {ty}",
            column.name()
        )));
    };

    Ok(value.unwrap_or(CoreValue::Null))
}

fn get<'a, T>(row: &'a Row, index: usize) -> Result<Option<T>>
where
    T: postgres::types::FromSql<'a>,
{
    row.try_get::<usize, Option<T>>(index)
        .map_err(Error::driver_operation_failed)
}
