use super::{scalar, Codec, FOREIGN_KEY_SUFFIX, MODEL_KEY};
use crate::{
    schema::{names, FieldSchema},
    store::RecordKey,
    Error, Kind, Record, Result, Value,
};

use serde_json::{Map, Value as Json};
use std::sync::Arc;

impl Codec<'_> {
    /// Decodes one object. `hint` names the model when the object does not.
    pub(super) fn decode_record(&self, hint: Option<&str>, json: &Json) -> Result<Record> {
        let Json::Object(map) = json else {
            return Err(Error::serialization("expected a JSON object for a record"));
        };

        let model = match map.get(MODEL_KEY).and_then(Json::as_str) {
            Some(model) => model,
            None => hint.ok_or_else(|| {
                Error::serialization(format!("record is missing the `{MODEL_KEY}` key"))
            })?,
        };

        let mut record = self.factory.new_instance(model, None)?;
        self.decode_fields(&mut record, map)?;
        Ok(record)
    }

    fn decode_fields(&self, record: &mut Record, map: &Map<String, Json>) -> Result<()> {
        let schema = record.schema().clone();

        for (key, json) in map {
            if key == MODEL_KEY {
                continue;
            }

            if let Some(name) = key.strip_suffix(FOREIGN_KEY_SUFFIX) {
                if let Some(field) = schema.field(name).filter(|field| field.foreign) {
                    let value = match json {
                        Json::Array(keys) if field.is_model_list() => Value::List(
                            keys.iter()
                                .filter_map(|key| self.resolve(field, key))
                                .map(Value::from)
                                .collect(),
                        ),
                        _ => self.resolve(field, json).map(Value::from).unwrap_or_default(),
                    };
                    record.set(name, value)?;
                    continue;
                }
            }

            let Some(field) = schema.field(key) else {
                tracing::debug!(model = %record.model(), key = %key, "skipping unknown key");
                continue;
            };

            match field.kind {
                Kind::Flex => match scalar::infer(json) {
                    Some(value) => record.set_flex(key, value)?,
                    None => {
                        tracing::debug!(field = %key, "flex field holds an object, skipping");
                    }
                },
                Kind::Model => {
                    let value = match json {
                        Json::Null => Value::Null,
                        Json::Object(_) => {
                            Value::from(self.decode_record(field.base_model.as_deref(), json)?)
                        }
                        _ if field.foreign => self.resolve(field, json).map(Value::from).unwrap_or_default(),
                        _ => {
                            return Err(Error::value_type_mismatch(
                                key,
                                Kind::Model,
                                scalar::infer(json).and_then(|value| value.kind()),
                            ))
                        }
                    };
                    record.set(key, value)?;
                }
                Kind::List if field.base_model.is_some() => {
                    let Json::Array(items) = json else {
                        return Err(Error::value_type_mismatch(key, Kind::List, None));
                    };
                    let mut list = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Json::Object(_) => list.push(Value::from(
                                self.decode_record(field.base_model.as_deref(), item)?,
                            )),
                            _ => {
                                if let Some(target) = self.resolve(field, item) {
                                    list.push(Value::from(target));
                                }
                            }
                        }
                    }
                    record.set(key, Value::List(list))?;
                }
                kind => {
                    let element = field
                        .base_type
                        .as_deref()
                        .and_then(Kind::parse)
                        .filter(|kind| kind.is_scalar());
                    let Some(value) = scalar::from_json(kind, element, json) else {
                        return Err(Error::value_type_mismatch(
                            key,
                            kind,
                            scalar::infer(json).and_then(|value| value.kind()),
                        ));
                    };
                    record.set(key, value)?;
                }
            }
        }

        Ok(())
    }

    /// Turns a scalar key into the record it names. Failures are logged and
    /// resolve to `None`.
    fn resolve(&self, field: &FieldSchema, json: &Json) -> Option<Record> {
        if json.is_null() {
            return None;
        }

        let Some(model) = field.base_model.as_deref() else {
            tracing::warn!(field = %field.name, "foreign field declares no target model");
            return None;
        };

        let key = match (field.foreign_field.as_deref(), json) {
            (None | Some(names::ID), Json::Number(n)) => n.as_i64().map(RecordKey::Id),
            (None | Some(names::OBJECT_ID), Json::String(v)) => Some(RecordKey::ObjectId(v.clone())),
            (Some(names::URN), Json::String(v)) => Some(RecordKey::Urn(v.clone())),
            _ => None,
        };

        let result = match (&key, self.lookup) {
            (Some(key), Some(reader)) => reader.read(model, key),
            (Some(key), None) => self.factory.shell(model, key),
            (None, _) => self.shell_by_field(model, field, json),
        };

        match result {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(
                    field = %field.name,
                    model = model,
                    error = %err,
                    "failed to resolve foreign key, leaving it empty"
                );
                None
            }
        }
    }

    /// A record holding only the non-identity key property `foreign_field`.
    fn shell_by_field(&self, model: &str, field: &FieldSchema, json: &Json) -> Result<Record> {
        let Some(name) = field.foreign_field.as_deref() else {
            return Err(Error::serialization(format!(
                "cannot use `{json}` as a key for `{model}`"
            )));
        };
        let mut shell = self.factory.new_instance(model, Some(&[name]))?;
        let value = scalar::infer(json).unwrap_or_default();
        shell.set(name, value)?;
        Ok(shell)
    }
}
