use super::SqlDialect;
use crate::{
    fmt::{Formatter, ToSql},
    naming, Binder,
};

use serde_json::Value as Json;
use stratum_core::{
    codec::scalar,
    driver::{Dialect, Param},
    Kind, Value,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn placeholder(&self, dst: &mut String, index: usize) {
        use std::fmt::Write;
        let _ = write!(dst, "?{index}");
    }

    /// SQLite has no array parameters; the items travel as a JSON array and
    /// are unpacked with `json_each`.
    fn in_list(&self, binder: &mut Binder, column: &str, _kind: Kind, items: Vec<Value>, negate: bool) -> String {
        let json = Json::Array(items.iter().map(scalar::to_json).collect());
        let placeholder = binder.push(Param::new(Kind::String, Value::String(json.to_string())));

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self);
        let op = if negate { " NOT IN" } else { " IN" };
        fmt!(f, column op " (SELECT value FROM json_each(" placeholder "))");
        sql
    }

    fn membership(&self, binder: &mut Binder, column: &str, element: &Json, negate: bool) -> String {
        let value = match element {
            Json::Bool(v) => Value::Long(*v as i64),
            other => scalar::infer(other).unwrap_or_default(),
        };
        let kind = value.kind().unwrap_or(Kind::String);
        let placeholder = binder.push(Param::new(kind, value));

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self);
        if negate {
            fmt!(f, "NOT ");
        }
        fmt!(f, "EXISTS (SELECT 1 FROM json_each(" column ") WHERE value = " placeholder ")");
        sql
    }

    fn aggregate(&self, pairs: &[(String, String)], from: &str, filter: &str) -> String {
        let object = pairs
            .iter()
            .map(|(key, expr)| format!("{}, {expr}", naming::literal(key)))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "(SELECT COALESCE(json_group_array(json_object({object})), '[]') FROM {from} WHERE {filter})"
        )
    }

    fn embed_json(&self, expr: &str) -> String {
        format!("json({expr})")
    }

    fn column_type(&self, kind: Kind) -> &'static str {
        match kind {
            Kind::Int | Kind::Long | Kind::Model => "INTEGER",
            Kind::Double => "REAL",
            Kind::Boolean => "BOOLEAN",
            Kind::Blob => "BLOB",
            Kind::String | Kind::Enum | Kind::List | Kind::Flex | Kind::Timestamp => "TEXT",
        }
    }

    fn sequence_column(&self) -> &'static str {
        "INTEGER PRIMARY KEY AUTOINCREMENT"
    }

    /// Booleans come back from `json_object` as 0 or 1.
    fn decode_json(&self, kind: Kind, element: Option<Kind>, json: &Json) -> Option<Value> {
        match (kind, json) {
            (Kind::Boolean, Json::Number(n)) => Some(Value::Boolean(n.as_i64()? != 0)),
            (Kind::List, Json::String(text)) => {
                let parsed: Json = serde_json::from_str(text).ok()?;
                scalar::from_json(kind, element, &parsed)
            }
            _ => scalar::from_json(kind, element, json),
        }
    }
}
