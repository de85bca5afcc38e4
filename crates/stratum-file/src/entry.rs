use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use stratum_core::{codec::scalar, schema::names, FromRecord, Record, Result, Value};

/// Identity and indexed-field projection of one stored record.
///
/// An entry never carries the record body. Parent, child and group links
/// are rebuilt from `parentId` and `groupId` whenever the index is linked
/// and are not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(rename = "type")]
    pub model: String,

    #[serde(default)]
    pub values: IndexMap<String, Json>,

    #[serde(skip)]
    pub(crate) parent: Option<i64>,

    #[serde(skip)]
    pub(crate) children: Vec<i64>,

    #[serde(skip)]
    pub(crate) contains: Vec<i64>,
}

impl IndexEntry {
    pub fn new(model: impl Into<String>) -> IndexEntry {
        IndexEntry {
            model: model.into(),
            values: IndexMap::new(),
            parent: None,
            children: vec![],
            contains: vec![],
        }
    }

    pub fn value(&self, name: &str) -> Option<&Json> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    pub fn long(&self, name: &str) -> i64 {
        self.value(name).and_then(Json::as_i64).unwrap_or(0)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.value(name)
            .and_then(Json::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn id(&self) -> i64 {
        self.long(names::ID)
    }

    pub fn object_id(&self) -> Option<&str> {
        self.string(names::OBJECT_ID)
    }

    pub fn name(&self) -> Option<&str> {
        self.string(names::NAME)
    }

    pub fn parent_id(&self) -> i64 {
        self.long(names::PARENT_ID)
    }

    pub fn group_id(&self) -> i64 {
        self.long(names::GROUP_ID)
    }

    pub fn organization_id(&self) -> i64 {
        self.long(names::ORGANIZATION_ID)
    }

    /// Id of the parent entry, once linked.
    pub fn parent(&self) -> Option<i64> {
        self.parent
    }

    /// Ids of entries whose `parentId` is this entry.
    pub fn children(&self) -> &[i64] {
        &self.children
    }

    /// Ids of entries whose `groupId` is this entry.
    pub fn contains(&self) -> &[i64] {
        &self.contains
    }

    /// Replaces the projected values with those `record` holds.
    pub fn apply(&mut self, record: &Record) {
        self.values.clear();
        self.model = record.model().to_string();

        for field in record.schema().indexed_fields() {
            match record.value(&field.name) {
                Some(value) if !value.is_null() => {
                    self.values.insert(field.name.clone(), to_index_json(value));
                }
                _ => {
                    tracing::debug!(model = %self.model, field = %field.name, "record does not hold indexed field");
                }
            }
        }
    }

    pub(crate) fn unlink(&mut self) {
        self.parent = None;
        self.children.clear();
        self.contains.clear();
    }
}

impl FromRecord for IndexEntry {
    fn from_record(record: &Record) -> Result<IndexEntry> {
        let mut entry = IndexEntry::new(record.model());
        entry.apply(record);
        Ok(entry)
    }
}

/// The index form of a field value. Foreign records index by their id.
pub(crate) fn to_index_json(value: &Value) -> Json {
    match value {
        Value::Model(target) => target
            .value(names::ID)
            .map(scalar::to_json)
            .unwrap_or(Json::Null),
        value => scalar::to_json(value),
    }
}
