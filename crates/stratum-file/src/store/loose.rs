use crate::{IndexEntry, RecordStore};

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use stratum_core::{Error, Result};

/// One file per record under a base directory.
///
/// Records live at
/// `<model>/<organizationId>/<groupId>.<parentId>/<name-or-id>[ <type>].json`
/// and each model's index at `<model>/am7.index.<model>.json`. Record paths
/// are lower-cased.
#[derive(Debug, Clone)]
pub struct LooseStore {
    base: PathBuf,
}

impl LooseStore {
    pub fn new(base: impl Into<PathBuf>) -> LooseStore {
        LooseStore { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }
}

impl RecordStore for LooseStore {
    fn record_name(&self, entry: &IndexEntry) -> String {
        let leaf = match (entry.name(), entry.id(), entry.object_id()) {
            (Some(name), _, _) => sanitize(name),
            (None, id, _) if id > 0 => id.to_string(),
            (None, _, Some(object_id)) => sanitize(object_id),
            (None, _, None) => "unnamed".to_string(),
        };
        let leaf = match entry.string("type") {
            Some(kind) => format!("{leaf} {}", sanitize(kind)),
            None => leaf,
        };

        format!(
            "{}/{}/{}.{}/{leaf}.json",
            sanitize(&entry.model),
            entry.organization_id(),
            entry.group_id(),
            entry.parent_id(),
        )
        .to_lowercase()
    }

    fn index_name(&self, model: &str) -> String {
        format!("{}/{}", sanitize(model), crate::index_name(model))
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.resolve(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::store_io(err)),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<()> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::store_io)?;
        }
        std::fs::write(&path, contents).map_err(Error::store_io)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        match std::fs::remove_file(self.resolve(name)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Error::store_io(err)),
        }
    }
}

/// Keeps a name within one path segment.
fn sanitize(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(values: serde_json::Value) -> IndexEntry {
        let mut entry = IndexEntry::new("data.note");
        if let serde_json::Value::Object(values) = values {
            entry.values.extend(values);
        }
        entry
    }

    #[test]
    fn named_records_use_their_name() {
        let store = LooseStore::new("/unused");
        let entry = entry(json!({ "id": 4, "name": "Shopping/List", "groupId": 2, "organizationId": 1 }));
        assert_eq!(store.record_name(&entry), "data.note/1/2.0/shopping_list.json");
    }

    #[test]
    fn unnamed_records_fall_back_to_id() {
        let store = LooseStore::new("/unused");
        let entry = entry(json!({ "id": 4, "parentId": 3, "type": "Draft" }));
        assert_eq!(store.record_name(&entry), "data.note/0/0.3/4 draft.json");
    }

    #[test]
    fn index_lives_beside_the_model() {
        let store = LooseStore::new("/unused");
        assert_eq!(store.index_name("data.note"), "data.note/am7.index.data.note.json");
    }
}
