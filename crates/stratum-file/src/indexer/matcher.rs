//! Evaluates query predicates against index entries.

use crate::{entry::to_index_json, IndexEntry};

use serde_json::Value as Json;
use std::cmp::Ordering;
use stratum_core::{
    codec::scalar,
    schema::{FieldSchema, ModelSchema},
    Comparator, Kind, QueryField, Reader, Record, RecordKey, Value,
};

pub(super) struct Matcher<'a> {
    schema: &'a ModelSchema,
    reader: Option<&'a dyn Reader>,
}

/// The full record behind an entry, read at most once per entry.
#[derive(Default)]
struct Loaded(Option<Option<Record>>);

impl<'a> Matcher<'a> {
    pub(super) fn new(schema: &'a ModelSchema, reader: Option<&'a dyn Reader>) -> Matcher<'a> {
        Matcher { schema, reader }
    }

    pub(super) fn matches(&self, entry: &IndexEntry, comparator: Comparator, fields: &[QueryField]) -> bool {
        self.group(entry, comparator, fields, &mut Loaded::default())
    }

    fn group(&self, entry: &IndexEntry, comparator: Comparator, fields: &[QueryField], loaded: &mut Loaded) -> bool {
        match comparator {
            Comparator::GroupOr => fields.iter().any(|field| self.field(entry, field, loaded)),
            Comparator::GroupAnd => fields.iter().all(|field| self.field(entry, field, loaded)),
            comparator => {
                tracing::warn!(?comparator, "not a group comparator");
                false
            }
        }
    }

    fn field(&self, entry: &IndexEntry, predicate: &QueryField, loaded: &mut Loaded) -> bool {
        if predicate.is_group() {
            return self.group(entry, predicate.comparator, &predicate.fields, loaded);
        }

        let Some(field) = self.schema.field(&predicate.name) else {
            tracing::warn!(model = %self.schema.name, field = %predicate.name, "unknown query field");
            return false;
        };
        let expected = expected(field, &predicate.value);

        if field.identity || field.index {
            return compare(predicate.comparator, entry.value(&field.name), &expected);
        }

        let Some(record) = self.load(entry, loaded) else {
            return false;
        };
        match record.get(&field.name) {
            Ok(value) => {
                let actual = to_index_json(&value);
                compare(predicate.comparator, Some(&actual).filter(|json| !json.is_null()), &expected)
            }
            Err(err) => {
                tracing::warn!(field = %field.name, error = %err, "cannot compare field");
                false
            }
        }
    }

    fn load<'l>(&self, entry: &IndexEntry, loaded: &'l mut Loaded) -> Option<&'l Record> {
        if loaded.0.is_none() {
            loaded.0 = Some(self.read(entry));
        }
        loaded.0.as_ref().and_then(Option::as_ref)
    }

    fn read(&self, entry: &IndexEntry) -> Option<Record> {
        let Some(reader) = self.reader else {
            tracing::warn!(model = %entry.model, "query names an unindexed field and no reader is available");
            return None;
        };

        let key = match (entry.id(), entry.object_id()) {
            (id, _) if id > 0 => RecordKey::Id(id),
            (_, Some(object_id)) => RecordKey::ObjectId(object_id.to_string()),
            _ => return None,
        };

        tracing::debug!(model = %entry.model, %key, "reading record to match an unindexed field");
        match reader.read(&entry.model, &key) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(model = %entry.model, %key, error = %err, "failed to read record for matching");
                None
            }
        }
    }
}

/// The index form of a query value, coerced to the field's kind where
/// possible. List values of scalar fields stay lists for `IN`.
pub(crate) fn expected(field: &FieldSchema, value: &Value) -> Json {
    let kind = match (field.kind, value) {
        (Kind::List, Value::List(_)) => None,
        (Kind::List, _) => field.base_type.as_deref().and_then(Kind::parse),
        (_, Value::List(items)) => {
            return Json::Array(items.iter().map(|item| expected(field, item)).collect())
        }
        (Kind::Model, _) => Some(Kind::Long),
        (kind, _) => Some(kind),
    };

    match (kind, value) {
        (_, Value::Model(_)) => to_index_json(value),
        (Some(kind), value) if kind.is_scalar() => match value.clone().coerce(kind, &field.name) {
            Ok(coerced) => scalar::to_json(&coerced),
            Err(_) => scalar::to_json(value),
        },
        (_, value) => scalar::to_json(value),
    }
}

pub(crate) fn equals(actual: Option<&Json>, expected: &Json) -> bool {
    match actual {
        None => expected.is_null(),
        Some(actual) => json_eq(actual, expected),
    }
}

fn json_eq(a: &Json, b: &Json) -> bool {
    match (a, b) {
        (Json::Number(a), Json::Number(b)) => a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    }
}

fn ordering(actual: Option<&Json>, expected: &Json) -> Option<Ordering> {
    match (actual?, expected) {
        (Json::Number(a), Json::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Json::String(a), Json::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Total order for sorting entries by one field. Missing values sort first.
pub(crate) fn order(a: Option<&Json>, b: Option<&Json>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => ordering(Some(a), b).unwrap_or(Ordering::Equal),
    }
}

fn compare(comparator: Comparator, actual: Option<&Json>, expected: &Json) -> bool {
    match comparator {
        Comparator::Equals => equals(actual, expected),
        Comparator::NotEquals => !equals(actual, expected),
        Comparator::Like => match (actual.and_then(Json::as_str), expected.as_str()) {
            (Some(actual), Some(pattern)) => actual.contains(&pattern.replace('%', "")),
            _ => false,
        },
        Comparator::GreaterThan => ordering(actual, expected) == Some(Ordering::Greater),
        Comparator::GreaterThanOrEquals => {
            matches!(ordering(actual, expected), Some(Ordering::Greater | Ordering::Equal))
        }
        Comparator::LessThan => ordering(actual, expected) == Some(Ordering::Less),
        Comparator::LessThanOrEquals => {
            matches!(ordering(actual, expected), Some(Ordering::Less | Ordering::Equal))
        }
        Comparator::In | Comparator::NotIn => {
            let found = match expected {
                Json::Array(items) => items.iter().any(|item| equals(actual, item)),
                item => equals(actual, item),
            };
            found == (comparator == Comparator::In)
        }
        Comparator::Any | Comparator::NotAny => {
            let found = match actual {
                Some(Json::Array(items)) => items.iter().any(|item| json_eq(item, expected)),
                _ => false,
            };
            found == (comparator == Comparator::Any)
        }
        Comparator::GroupAnd | Comparator::GroupOr => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_by_value() {
        assert!(compare(Comparator::Equals, Some(&json!(3)), &json!(3.0)));
        assert!(compare(Comparator::GreaterThan, Some(&json!(4)), &json!(3)));
        assert!(!compare(Comparator::LessThan, None, &json!(3)));
    }

    #[test]
    fn like_is_a_substring_test() {
        assert!(compare(Comparator::Like, Some(&json!("shopping list")), &json!("%ping%")));
        assert!(!compare(Comparator::Like, Some(&json!("shopping list")), &json!("todo")));
    }

    #[test]
    fn membership_in_both_directions() {
        assert!(compare(Comparator::In, Some(&json!("b")), &json!(["a", "b"])));
        assert!(compare(Comparator::NotIn, None, &json!(["a"])));
        assert!(compare(Comparator::Any, Some(&json!(["x", "y"])), &json!("y")));
        assert!(compare(Comparator::NotAny, Some(&json!(["x"])), &json!("y")));
    }

    #[test]
    fn enums_match_in_wire_case() {
        let field = FieldSchema::new("status", Kind::Enum);
        assert_eq!(expected(&field, &Value::from("ACTIVE")), json!("active"));
    }
}
