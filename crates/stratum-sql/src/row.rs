//! Turns result rows back into records.

use crate::{Column, Shape, SqlDialect, StatementMeta, SubSelect};

use serde_json::Value as Json;
use std::sync::Arc;
use stratum_core::{Error, Kind, Record, RecordFactory, RecordKey, Result, Value};

pub struct Materializer<'a> {
    factory: &'a RecordFactory,
    dialect: &'a dyn SqlDialect,
}

impl<'a> Materializer<'a> {
    pub fn new(factory: &'a RecordFactory, dialect: &'a dyn SqlDialect) -> Materializer<'a> {
        Materializer { factory, dialect }
    }

    /// Builds a record of the statement's model holding the selected fields.
    ///
    /// Referenced columns unpack into child lists. Foreign columns become
    /// records carrying only their id; reading the full record is left to
    /// the caller.
    pub fn record(&self, meta: &StatementMeta, row: Vec<Value>) -> Result<Record> {
        if row.len() != meta.columns.len() {
            return Err(Error::invalid_statement(format!(
                "row has {} columns, `{}` selected {}",
                row.len(),
                meta.model,
                meta.columns.len()
            )));
        }

        let mut record = self.instance(&meta.model, &meta.columns)?;
        for (column, value) in meta.columns.iter().zip(row) {
            let value = self.column_value(column, value)?;
            record.set(&column.field, value)?;
        }
        Ok(record)
    }

    fn instance(&self, model: &str, columns: &[Column]) -> Result<Record> {
        let names: Vec<&str> = columns.iter().map(|column| column.field.as_str()).collect();
        self.factory.new_instance(model, Some(names.as_slice()))
    }

    fn column_value(&self, column: &Column, value: Value) -> Result<Value> {
        match &column.shape {
            Shape::Scalar => Ok(value),
            Shape::Foreign { model } => self.foreign(model, value.as_long()),
            Shape::JsonList { element } => match value {
                Value::Null => Ok(Value::List(vec![])),
                Value::String(text) => {
                    let json: Json = serde_json::from_str(&text)?;
                    self.decode(column, *element, &json)
                }
                value => Ok(value),
            },
            Shape::Referenced(sub) => match value {
                Value::Null => Ok(Value::List(vec![])),
                Value::String(text) => {
                    let json: Json = serde_json::from_str(&text)?;
                    self.children(sub, &json)
                }
                value => Err(Error::serialization(format!(
                    "referenced column `{}` returned {:?}",
                    column.field,
                    value.kind()
                ))),
            },
        }
    }

    fn foreign(&self, model: &str, id: Option<i64>) -> Result<Value> {
        match id {
            Some(id) if id > 0 => Ok(Value::Model(Arc::new(
                self.factory.shell(model, &RecordKey::Id(id))?,
            ))),
            _ => Ok(Value::Null),
        }
    }

    fn children(&self, sub: &SubSelect, json: &Json) -> Result<Value> {
        let Json::Array(items) = json else {
            return Err(Error::serialization(format!(
                "expected a JSON array of `{}` records",
                sub.model
            )));
        };

        items
            .iter()
            .map(|item| self.child(sub, item).map(Value::from))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    fn child(&self, sub: &SubSelect, json: &Json) -> Result<Record> {
        let Json::Object(object) = json else {
            return Err(Error::serialization(format!(
                "expected a JSON object for `{}`",
                sub.model
            )));
        };

        let mut record = self.instance(&sub.model, &sub.columns)?;
        for column in &sub.columns {
            let json = object.get(&column.field).unwrap_or(&Json::Null);
            let value = match &column.shape {
                Shape::Scalar => self.decode(column, None, json)?,
                Shape::JsonList { element } => self.decode(column, *element, json)?,
                Shape::Foreign { model } => self.foreign(model, json.as_i64())?,
                Shape::Referenced(nested) => match json {
                    Json::Null => Value::List(vec![]),
                    Json::String(text) => {
                        let parsed: Json = serde_json::from_str(text)?;
                        self.children(nested, &parsed)?
                    }
                    json => self.children(nested, json)?,
                },
            };
            record.set(&column.field, value)?;
        }
        Ok(record)
    }

    fn decode(&self, column: &Column, element: Option<Kind>, json: &Json) -> Result<Value> {
        self.dialect
            .decode_json(column.kind, element, json)
            .ok_or_else(|| {
                Error::serialization(format!(
                    "`{}` holds {json}, which is not a {}",
                    column.field, column.kind
                ))
            })
    }
}
