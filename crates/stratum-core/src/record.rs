mod factory;
pub use factory::RecordFactory;

mod path;
use path::Resolved;

use crate::{schema::ModelSchema, Cell, Error, Result, Value};

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::{borrow::Cow, sync::Arc};

/// A named, schema-bound set of value cells.
///
/// A record is either a prototype, the cached read-only template of a
/// model, or a mutable instance produced from that template. Every mutator
/// fails on a prototype.
#[derive(Clone)]
pub struct Record {
    schema: Arc<ModelSchema>,
    prototype: bool,
    cells: IndexMap<String, Cell>,
}

/// Static typed view over a record.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}

impl Record {
    pub(crate) fn from_parts(schema: Arc<ModelSchema>, prototype: bool, cells: Vec<Cell>) -> Record {
        let cells = cells
            .into_iter()
            .map(|cell| (cell.name().to_string(), cell))
            .collect();
        Record {
            schema,
            prototype,
            cells,
        }
    }

    pub fn model(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn is_prototype(&self) -> bool {
        self.prototype
    }

    /// Whether the record's model is `model` or extends it.
    pub fn inherits(&self, model: &str) -> bool {
        self.schema.inherits_from(model)
    }

    /// Whether the record currently holds a cell named `name`.
    pub fn has_field(&self, name: &str) -> bool {
        self.cells.contains_key(name)
    }

    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The value of a top-level cell the record holds, without schema
    /// fallback. Placeholder cells yield `None`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.cells
            .get(name)
            .filter(|cell| !cell.is_flex())
            .map(Cell::raw)
    }

    /// Reads a field by name or dotted path.
    ///
    /// A declared field the record does not hold yields its schema default. A
    /// path whose intermediate record is absent yields null.
    pub fn get(&self, path: &str) -> Result<Cow<'_, Value>> {
        match path::resolve(self, path)? {
            Resolved::Cell(cell) => cell.value().map(Cow::Borrowed),
            Resolved::Declared(field) => {
                let cell = Cell::declared(field);
                if cell.is_flex() {
                    return Err(Error::abstract_field_access(&field.name));
                }
                Ok(Cow::Owned(cell.raw().clone()))
            }
            Resolved::Missing => Ok(Cow::Owned(Value::Null)),
        }
    }

    pub fn get_long(&self, path: &str) -> Result<Option<i64>> {
        Ok(self.get(path)?.as_long())
    }

    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        Ok(self.get(path)?.as_str().map(str::to_string))
    }

    pub fn get_bool(&self, path: &str) -> Result<Option<bool>> {
        Ok(self.get(path)?.as_bool())
    }

    /// Writes a field by name or dotted path, creating the cell from the
    /// schema when the record does not hold it yet.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        if self.prototype {
            return Err(Error::prototype_read_only(self.model()));
        }
        let (owner, name) = path::owner_mut(self, path)?;
        owner.set_local(name, value.into())
    }

    fn set_local(&mut self, name: &str, value: Value) -> Result<()> {
        if self.prototype {
            return Err(Error::prototype_read_only(self.model()));
        }
        self.vivify(name)?.set(value)
    }

    /// Replaces the cell with a concrete one whose kind is inferred from
    /// `value`. There is no way back to the placeholder kind.
    pub fn set_flex(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.prototype {
            return Err(Error::prototype_read_only(self.model()));
        }
        let Some(field) = self.schema.field(name) else {
            return Err(Error::field_not_found(self.model(), name));
        };
        let relation = Cell::declared(field).relation().clone();
        let cell = Cell::flex(name, value.into())?.with_relation(relation);
        self.cells.insert(name.to_string(), cell);
        Ok(())
    }

    /// Mutable access to a cell, creating it from the schema if needed.
    pub fn cell_mut(&mut self, name: &str) -> Result<&mut Cell> {
        if self.prototype {
            return Err(Error::prototype_read_only(self.model()));
        }
        self.vivify(name)
    }

    fn vivify(&mut self, name: &str) -> Result<&mut Cell> {
        if !self.cells.contains_key(name) {
            let Some(field) = self.schema.field(name) else {
                return Err(Error::field_not_found(self.model(), name));
            };
            self.cells.insert(name.to_string(), Cell::declared(field));
        }
        let model = self.model().to_string();
        self.cells
            .get_mut(name)
            .ok_or_else(|| Error::field_not_found(model, name))
    }

    /// Drops a cell from the record.
    pub fn remove(&mut self, name: &str) -> Result<Option<Cell>> {
        if self.prototype {
            return Err(Error::prototype_read_only(self.model()));
        }
        Ok(self.cells.shift_remove(name))
    }

    /// The first identity field, in schema order, holding a non-empty value.
    pub fn identity(&self) -> Option<(&str, &Value)> {
        self.schema.identity_fields().find_map(|field| {
            let value = self.value(&field.name)?;
            (!value.is_empty()).then_some((field.name.as_str(), value))
        })
    }

    /// Shallow, schema-validated copy.
    ///
    /// Cells are cloned; nested records are shared rather than deep copied
    /// unless a requested name reaches into them (`owner.name`), in which
    /// case the nested record is copied with just those fields.
    pub fn copy_record(&self, fields: Option<&[&str]>) -> Result<Record> {
        let names: Vec<&str> = match fields {
            Some(fields) => fields.to_vec(),
            None => self.field_names().collect(),
        };

        let mut nested: IndexMap<&str, Vec<&str>> = IndexMap::new();
        let mut out = Record {
            schema: self.schema.clone(),
            prototype: false,
            cells: IndexMap::new(),
        };

        for name in names {
            if let Some((head, rest)) = name.split_once('.') {
                nested.entry(head).or_default().push(rest);
                continue;
            }

            let cell = match self.cells.get(name) {
                Some(cell) => cell.clone(),
                None => match self.schema.field(name) {
                    Some(field) => Cell::declared(field),
                    None => return Err(Error::field_not_found(self.model(), name)),
                },
            };
            out.cells.insert(name.to_string(), cell);
        }

        for (head, rest) in nested {
            let Some(cell) = self.cells.get(head) else {
                if self.schema.has_field(head) {
                    continue;
                }
                return Err(Error::field_not_found(self.model(), head));
            };

            let mut copy = cell.clone();
            if let Value::Model(record) = cell.raw() {
                let partial = record.copy_record(Some(&rest))?;
                *copy.raw_mut() = Value::Model(Arc::new(partial));
            }
            out.cells.insert(head.to_string(), copy);
        }

        Ok(out)
    }

    /// Stable hex digest over the persisted field values, for deduplication.
    pub fn hash(&self) -> String {
        let mut canonical = String::new();
        canonical.push_str(self.model());

        for cell in self.cells.values() {
            if cell.is_flex() {
                continue;
            }
            if let Some(field) = self.schema.field(cell.name()) {
                if !field.is_persisted() {
                    continue;
                }
            }
            canonical.push('\u{1f}');
            canonical.push_str(cell.name());
            canonical.push('=');
            cell.raw().write_canonical(&mut canonical);
        }

        let digest = Sha256::digest(canonical.as_bytes());
        format!("{digest:x}")
    }

    /// Converts the record into a static typed view.
    pub fn view<T: FromRecord>(&self) -> Result<T> {
        T::from_record(self)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Record) -> bool {
        self.model() == other.model() && self.prototype == other.prototype && self.cells == other.cells
    }
}

impl core::fmt::Debug for Record {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut dbg = f.debug_struct("Record");
        dbg.field("model", &self.model());
        if self.prototype {
            dbg.field("prototype", &true);
        }
        for cell in self.cells.values() {
            dbg.field(cell.name(), cell.raw());
        }
        dbg.finish()
    }
}
