//! Per-dialect SQL fragments and the decoders that read them back.

mod postgresql;
pub use postgresql::Postgresql;

mod sqlite;
pub use sqlite::Sqlite;

use crate::Binder;

use serde_json::Value as Json;
use stratum_core::{codec::scalar, driver::Dialect, Kind, Value};

/// Everything the compiler and row materializer need to know about a
/// dialect.
pub trait SqlDialect: core::fmt::Debug + Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Writes the marker for the 1-based parameter `index`.
    fn placeholder(&self, dst: &mut String, index: usize);

    /// `column [NOT] IN <items>`, binding the items as one parameter whose
    /// elements are of `kind`.
    fn in_list(&self, binder: &mut Binder, column: &str, kind: Kind, items: Vec<Value>, negate: bool) -> String;

    /// Whether the JSON list stored in `column` contains `element`.
    fn membership(&self, binder: &mut Binder, column: &str, element: &Json, negate: bool) -> String;

    /// Correlated sub-select aggregating one JSON object per child row into
    /// JSON text. `pairs` are `(key, expression)` entries of each object.
    fn aggregate(&self, pairs: &[(String, String)], from: &str, filter: &str) -> String;

    /// Embeds the JSON text produced by `expr` as JSON inside an object.
    fn embed_json(&self, expr: &str) -> String;

    /// Column type used by `CREATE TABLE`.
    fn column_type(&self, kind: Kind) -> &'static str;

    /// Column definition suffix of a sequence-generated identity.
    fn sequence_column(&self) -> &'static str;

    /// Decodes one value of an aggregated JSON object.
    fn decode_json(&self, kind: Kind, element: Option<Kind>, json: &Json) -> Option<Value> {
        match (kind, json) {
            (Kind::List, Json::String(text)) => {
                let parsed: Json = serde_json::from_str(text).ok()?;
                scalar::from_json(kind, element, &parsed)
            }
            _ => scalar::from_json(kind, element, json),
        }
    }
}

/// The strategy for `dialect`.
pub fn strategy(dialect: Dialect) -> &'static dyn SqlDialect {
    match dialect {
        Dialect::Postgresql => &Postgresql,
        Dialect::Sqlite => &Sqlite,
    }
}
