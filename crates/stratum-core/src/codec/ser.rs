use super::{scalar, Codec, FOREIGN_KEY_SUFFIX, MODEL_KEY, UNKNOWN_ENUM};
use crate::{schema::FieldSchema, Error, Record, Result, Value};

use serde_json::{Map, Value as Json};

impl Codec<'_> {
    pub(super) fn encode_record(&self, record: &Record) -> Result<Map<String, Json>> {
        let prototype = self.factory.prototype(record.model())?;

        let mut out = Map::new();
        out.insert(MODEL_KEY.to_string(), Json::String(record.model().to_string()));

        for field in &record.schema().fields {
            if field.referenced || (self.options.skip_transient && !field.is_persisted()) {
                continue;
            }

            let Some(cell) = record.cell(&field.name) else {
                continue;
            };
            if cell.is_flex() {
                continue;
            }

            let value = cell.raw();
            if value.is_null() || prototype.value(&field.name) == Some(value) {
                continue;
            }
            if matches!(value, Value::Enum(v) if v == UNKNOWN_ENUM) {
                continue;
            }

            match value {
                Value::Model(nested) => {
                    if let Some(key) = self.foreign_key(field, nested) {
                        out.insert(format!("{}{FOREIGN_KEY_SUFFIX}", field.name), key);
                    } else {
                        let nested = self.encode_nested(record, nested)?;
                        out.insert(field.name.clone(), Json::Object(nested));
                    }
                }
                Value::List(items) if field.foreign && self.options.foreign_keys && field.base_model.is_some() => {
                    let keys = items
                        .iter()
                        .map(|item| self.foreign_list_key(field, item))
                        .collect::<Result<Vec<_>>>()?;
                    out.insert(format!("{}{FOREIGN_KEY_SUFFIX}", field.name), Json::Array(keys));
                }
                Value::List(items) if field.base_model.is_some() => {
                    let items = items
                        .iter()
                        .map(|item| match item {
                            Value::Model(nested) => self.encode_nested(record, nested).map(Json::Object),
                            item => Ok(scalar::to_json(item)),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    out.insert(field.name.clone(), Json::Array(items));
                }
                value => {
                    out.insert(field.name.clone(), scalar::to_json(value));
                }
            }
        }

        Ok(out)
    }

    /// The scalar key a foreign field stores for `target`, or `None` when the
    /// field embeds it instead. A target without an identity is embedded.
    fn foreign_key(&self, field: &FieldSchema, target: &Record) -> Option<Json> {
        if !field.foreign || !self.options.foreign_keys {
            return None;
        }

        let Some((_, identity)) = target.identity() else {
            tracing::debug!(field = %field.name, model = %target.model(), "foreign target has no identity, embedding it");
            return None;
        };

        let key = match &field.foreign_field {
            Some(name) => target.value(name).filter(|value| !value.is_empty()),
            None => Some(identity),
        };

        key.map(scalar::to_json)
    }

    /// One element of a foreign list. Every element must be keyed, since a
    /// `_FK` array cannot mix keys with embedded records.
    fn foreign_list_key(&self, field: &FieldSchema, item: &Value) -> Result<Json> {
        let Value::Model(target) = item else {
            return Ok(scalar::to_json(item));
        };

        self.foreign_key(field, target).ok_or_else(|| {
            Error::serialization(format!(
                "foreign list `{}` holds a `{}` with no key to write",
                field.name,
                target.model()
            ))
        })
    }

    fn encode_nested(&self, owner: &Record, nested: &Record) -> Result<Map<String, Json>> {
        let related = nested.inherits(owner.model()) || owner.inherits(nested.model());
        if self.options.condense_self && related {
            self.condense(nested)
        } else {
            self.encode_record(nested)
        }
    }
}

impl Codec<'_> {
    /// The populated, non-relational scalar fields of `record`. Values equal
    /// to the model's default count as unpopulated.
    fn condense(&self, record: &Record) -> Result<Map<String, Json>> {
        let prototype = self.factory.prototype(record.model())?;

        let mut out = Map::new();
        out.insert(MODEL_KEY.to_string(), Json::String(record.model().to_string()));

        for cell in record.cells() {
            if cell.is_flex() {
                continue;
            }
            if let Some(field) = record.schema().field(cell.name()) {
                if field.foreign || field.referenced || field.is_model_list() {
                    continue;
                }
            }

            let value = cell.raw();
            if value.is_empty() || matches!(value, Value::Model(_)) {
                continue;
            }
            if prototype.value(cell.name()) == Some(value) {
                continue;
            }
            if matches!(value, Value::Enum(v) if v == UNKNOWN_ENUM) {
                continue;
            }
            out.insert(cell.name().to_string(), scalar::to_json(value));
        }

        Ok(out)
    }
}
