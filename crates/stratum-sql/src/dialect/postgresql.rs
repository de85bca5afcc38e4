use super::SqlDialect;
use crate::{
    fmt::{Formatter, ToSql},
    naming, Binder,
};

use serde_json::Value as Json;
use stratum_core::{
    driver::{Dialect, Param},
    Kind, Value,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgresql;

impl SqlDialect for Postgresql {
    fn dialect(&self) -> Dialect {
        Dialect::Postgresql
    }

    fn placeholder(&self, dst: &mut String, index: usize) {
        use std::fmt::Write;
        let _ = write!(dst, "${index}");
    }

    fn in_list(&self, binder: &mut Binder, column: &str, kind: Kind, items: Vec<Value>, negate: bool) -> String {
        let placeholder = binder.push(Param::new(kind, Value::List(items)));

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self);
        if negate {
            fmt!(f, "NOT (" column " = ANY(" placeholder "))");
        } else {
            fmt!(f, column " = ANY(" placeholder ")");
        }
        sql
    }

    fn membership(&self, binder: &mut Binder, column: &str, element: &Json, negate: bool) -> String {
        // json_array_elements_text yields text, so the element binds as text.
        let text = match element {
            Json::String(text) => text.clone(),
            other => other.to_string(),
        };
        let placeholder = binder.push(Param::new(Kind::String, Value::String(text)));

        let mut sql = String::new();
        let f = &mut Formatter::new(&mut sql, self);
        if negate {
            fmt!(f, "NOT ");
        }
        fmt!(f, "EXISTS (SELECT 1 FROM json_array_elements_text(" column "::json) AS e(v) WHERE e.v = " placeholder ")");
        sql
    }

    fn aggregate(&self, pairs: &[(String, String)], from: &str, filter: &str) -> String {
        let object = pairs
            .iter()
            .map(|(key, expr)| format!("{}, {expr}", naming::literal(key)))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "(SELECT COALESCE(JSON_AGG(JSON_BUILD_OBJECT({object})), '[]'::json)::text FROM {from} WHERE {filter})"
        )
    }

    fn embed_json(&self, expr: &str) -> String {
        format!("({expr})::json")
    }

    fn column_type(&self, kind: Kind) -> &'static str {
        match kind {
            Kind::Int => "INTEGER",
            Kind::Long | Kind::Model => "BIGINT",
            Kind::Double => "DOUBLE PRECISION",
            Kind::Boolean => "BOOLEAN",
            Kind::Timestamp => "TIMESTAMPTZ",
            Kind::Blob => "BYTEA",
            Kind::String | Kind::Enum | Kind::List | Kind::Flex => "TEXT",
        }
    }

    fn sequence_column(&self) -> &'static str {
        "BIGSERIAL PRIMARY KEY"
    }
}
