use super::{FromRecord, Record};
use crate::{
    schema::{ModelSchema, SchemaRegistry},
    store::RecordKey,
    Cell, Error, Result,
};

use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// Builds record instances from cached prototypes.
///
/// The factory owns the prototype cache and shares the schema registry it
/// was created with. Independent factories do not share state, so separate
/// tenants or test fixtures can run side by side.
#[derive(Debug)]
pub struct RecordFactory {
    registry: Arc<SchemaRegistry>,
    prototypes: RwLock<HashMap<String, Arc<Record>>>,
}

impl RecordFactory {
    pub fn new(registry: Arc<SchemaRegistry>) -> RecordFactory {
        RecordFactory {
            registry,
            prototypes: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn schema(&self, model: &str) -> Result<Arc<ModelSchema>> {
        self.registry.require(model)
    }

    /// The read-only template for `model`, built on first use.
    pub fn prototype(&self, model: &str) -> Result<Arc<Record>> {
        if let Some(prototype) = self.read_prototypes().get(model).cloned() {
            return Ok(prototype);
        }

        let schema = self.schema(model)?;
        let cells = schema.fields.iter().map(Cell::declared).collect();
        let prototype = Arc::new(Record::from_parts(schema, true, cells));

        Ok(self
            .write_prototypes()
            .entry(model.to_string())
            .or_insert(prototype)
            .clone())
    }

    /// A fresh mutable instance of `model`, optionally projected to `fields`.
    pub fn new_instance(&self, model: &str, fields: Option<&[&str]>) -> Result<Record> {
        let prototype = self.prototype(model)?;

        let cells = match fields {
            Some(fields) if !fields.is_empty() => fields
                .iter()
                .map(|name| {
                    prototype
                        .cell(name)
                        .cloned()
                        .ok_or_else(|| Error::field_not_found(model, *name))
                })
                .collect::<Result<Vec<_>>>()?,
            _ => prototype.cells().cloned().collect(),
        };

        Ok(Record::from_parts(prototype.schema().clone(), false, cells))
    }

    /// A fresh cell for one field of `model`.
    pub fn new_field(&self, model: &str, field: &str) -> Result<Cell> {
        self.prototype(model)?
            .cell(field)
            .cloned()
            .ok_or_else(|| Error::field_not_found(model, field))
    }

    /// A record of `model` holding only the identity named by `key`.
    ///
    /// Used where a relationship is known by key alone; callers needing the
    /// full record issue a read.
    pub fn shell(&self, model: &str, key: &RecordKey) -> Result<Record> {
        let field = key.field();
        let mut record = self.new_instance(model, Some(&[field]))?;
        record.set(field, key.value())?;
        Ok(record)
    }

    pub fn copy(&self, record: &Record, fields: Option<&[&str]>) -> Result<Record> {
        record.copy_record(fields)
    }

    pub fn view<T: FromRecord>(&self, record: &Record) -> Result<T> {
        record.view()
    }

    /// Forgets the prototype and the schema of `model`.
    pub fn invalidate(&self, model: &str) {
        self.write_prototypes().remove(model);
        self.registry.invalidate(model);
    }

    /// Forgets every prototype and schema. Meant for controlled maintenance;
    /// concurrent readers may observe either generation.
    pub fn invalidate_all(&self) {
        self.write_prototypes().clear();
        self.registry.invalidate_all();
    }

    // Each write is a single insert, remove or clear, so a poisoned cache
    // still holds whole entries.
    fn read_prototypes(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Record>>> {
        self.prototypes.read().unwrap_or_else(|poisoned| {
            tracing::warn!("prototype cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_prototypes(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Record>>> {
        self.prototypes.write().unwrap_or_else(|poisoned| {
            tracing::warn!("prototype cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BundledSchemas;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    fn factory() -> RecordFactory {
        let bundled = BundledSchemas::new().with(
            "person",
            r#"{ "name": "person", "fields": [ { "name": "id", "type": "long", "identity": true } ] }"#,
        );
        RecordFactory::new(Arc::new(SchemaRegistry::new(bundled)))
    }

    #[test]
    fn poisoned_cache_keeps_serving_prototypes() {
        let factory = factory();
        let first = factory.prototype("person").unwrap();

        let poisoned = catch_unwind(AssertUnwindSafe(|| {
            let _guard = factory.prototypes.write().unwrap();
            panic!("writer died holding the cache");
        }));
        assert!(poisoned.is_err());
        assert!(factory.prototypes.is_poisoned());

        assert!(Arc::ptr_eq(&factory.prototype("person").unwrap(), &first));

        factory.invalidate("person");
        let rebuilt = factory.prototype("person").unwrap();
        assert!(!Arc::ptr_eq(&rebuilt, &first));
    }
}
