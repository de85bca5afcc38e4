use super::Record;
use crate::{schema::FieldSchema, Cell, Error, Result, Value};

use std::sync::Arc;

/// Outcome of resolving a dotted path against a record.
pub(super) enum Resolved<'a> {
    /// The record holds the cell.
    Cell(&'a Cell),

    /// The owning record declares the field but does not hold it.
    Declared(&'a FieldSchema),

    /// An intermediate record on the path is absent.
    Missing,
}

pub(super) fn resolve<'a>(record: &'a Record, path: &str) -> Result<Resolved<'a>> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(record, &segments, path)
}

fn resolve_segments<'a>(record: &'a Record, segments: &[&str], path: &str) -> Result<Resolved<'a>> {
    let [head, rest @ ..] = segments else {
        return Err(Error::field_not_found(record.model(), path));
    };

    let Some(cell) = record.cells.get(*head) else {
        return match record.schema.field(head) {
            Some(field) if rest.is_empty() => Ok(Resolved::Declared(field)),
            Some(_) => Ok(Resolved::Missing),
            None => Err(Error::field_not_found(record.model(), *head)),
        };
    };

    if rest.is_empty() {
        return Ok(Resolved::Cell(cell));
    }

    match cell.value()? {
        Value::Model(nested) => resolve_segments(nested, rest, path),
        Value::Null => Ok(Resolved::Missing),
        _ => Err(Error::field_not_found(record.model(), path)),
    }
}

/// Walks to the record that owns the last segment of `path`, returning it
/// with that segment. Nested records are unshared on the way down.
pub(super) fn owner_mut<'a, 'p>(record: &'a mut Record, path: &'p str) -> Result<(&'a mut Record, &'p str)> {
    match path.split_once('.') {
        None => Ok((record, path)),
        Some((head, rest)) => {
            if record.prototype {
                return Err(Error::prototype_read_only(record.model()));
            }
            let model = record.model().to_string();
            match record.cells.get_mut(head).map(Cell::raw_mut) {
                Some(Value::Model(nested)) => owner_mut(Arc::make_mut(nested), rest),
                _ => Err(Error::field_not_found(model, path)),
            }
        }
    }
}
