//! Per-model index maintenance.

mod matcher;

use crate::{Index, IndexEntry, RecordStore};

use std::sync::{Arc, Mutex, MutexGuard};
use stratum_core::{
    schema::{FieldSchema, ModelSchema},
    Error, Order, Query, Reader, Record, Result, Value,
};

/// Maintains the index of one model.
///
/// The index is loaded from the store on first use and every structural
/// change happens in memory under the indexer's lock. [`flush`] writes the
/// index back only when its change counter is non-zero.
///
/// [`flush`]: FileIndexer::flush
#[derive(Debug)]
pub struct FileIndexer {
    schema: Arc<ModelSchema>,
    store: Arc<dyn RecordStore>,
    index: Mutex<Option<Index>>,
    writes: Mutex<()>,
}

impl FileIndexer {
    pub fn new(schema: Arc<ModelSchema>, store: Arc<dyn RecordStore>) -> FileIndexer {
        FileIndexer {
            schema,
            store,
            index: Mutex::new(None),
            writes: Mutex::new(()),
        }
    }

    pub fn model(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// Runs `f` against the loaded index.
    pub fn with_index<T>(&self, f: impl FnOnce(&mut Index) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(self.load()?);
        }
        match guard.as_mut() {
            Some(index) => f(index),
            None => Err(stratum_core::err!("index for `{}` failed to load", self.model())),
        }
    }

    /// Serializes record mutations of this model. A writer holds it across
    /// the whole read-modify-write of a record body; index access still
    /// takes the index lock on its own.
    pub fn write_guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.writes
            .lock()
            .map_err(|_| stratum_core::err!("write lock poisoned for `{}`", self.model()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Index>>> {
        self.index
            .lock()
            .map_err(|_| stratum_core::err!("index lock poisoned for `{}`", self.model()))
    }

    fn load(&self) -> Result<Index> {
        let name = self.store.index_name(self.model());
        match self.store.read(&name)? {
            Some(contents) if !contents.is_empty() => {
                let index = Index::from_json(&contents)?;
                tracing::debug!(model = self.model(), entries = index.len(), "loaded index");
                Ok(index)
            }
            _ => {
                tracing::debug!(model = self.model(), "starting empty index");
                Ok(Index::default())
            }
        }
    }

    /// Fails unless `record` belongs to this model and holds an identity.
    pub fn check_indexable(&self, record: &Record) -> Result<()> {
        if record.model() != self.model() {
            return Err(Error::not_indexable(
                record.model(),
                format!("the `{}` indexer cannot index it", self.model()),
            ));
        }
        if record.identity().is_none() {
            return Err(Error::not_indexable(record.model(), "no id or objectId"));
        }
        Ok(())
    }

    /// The entry matching the first identity `record` holds.
    pub fn find_entry(&self, record: &Record) -> Result<Option<IndexEntry>> {
        self.check_indexable(record)?;
        self.with_index(|index| Ok(self.locate(index, record).map(|i| index.entries[i].clone())))
    }

    /// The entry whose indexed `field` equals `value`.
    pub fn find_by(&self, field: &str, value: &Value) -> Result<Option<IndexEntry>> {
        let schema = self.indexed(field)?;
        let expected = matcher::expected(schema, value);
        self.with_index(|index| {
            Ok(index
                .entries
                .iter()
                .find(|entry| matcher::equals(entry.value(field), &expected))
                .cloned())
        })
    }

    /// Entries matching the predicates of `query`. Predicates on fields the
    /// index does not hold read the full record through `reader`.
    pub fn find_entries(&self, query: &Query, reader: Option<&dyn Reader>) -> Result<Vec<IndexEntry>> {
        let entries = self.with_index(|index| Ok(index.entries.clone()))?;
        let matcher = matcher::Matcher::new(&self.schema, reader);

        Ok(entries
            .into_iter()
            .filter(|entry| matcher.matches(entry, query.comparator(), query.fields()))
            .collect())
    }

    /// Sorts `entries` by an indexed field. Returns false, leaving the
    /// entries untouched, when `field` is not indexed.
    pub fn sort(&self, entries: &mut [IndexEntry], field: &str, order: Order) -> bool {
        if self.indexed(field).is_err() {
            tracing::debug!(model = self.model(), field, "sort field is not indexed; keeping index order");
            return false;
        }

        entries.sort_by(|a, b| matcher::order(a.value(field), b.value(field)));
        if order == Order::Descending {
            entries.reverse();
        }
        true
    }

    pub fn add_entry(&self, record: &Record) -> Result<IndexEntry> {
        self.check_indexable(record)?;
        self.with_index(|index| {
            if self.locate(index, record).is_some() {
                return Err(Error::index_entry_already_exists(record.model()));
            }

            let entry: IndexEntry = record.view()?;
            self.check_unclaimed(index, &entry, None)?;
            index.entries.push(entry.clone());
            index.increment_change_count();
            index.link();
            Ok(entry)
        })
    }

    pub fn update_entry(&self, record: &Record) -> Result<IndexEntry> {
        self.check_indexable(record)?;
        self.with_index(|index| {
            let Some(i) = self.locate(index, record) else {
                return Err(Error::index_entry_not_found(record.model()));
            };

            let mut entry = index.entries[i].clone();
            entry.apply(record);
            self.check_unclaimed(index, &entry, Some(i))?;

            index.entries[i] = entry.clone();
            index.increment_change_count();
            index.link();
            Ok(entry)
        })
    }

    /// Removes the entry of `record`, returning it.
    pub fn remove_entry(&self, record: &Record) -> Result<IndexEntry> {
        self.check_indexable(record)?;
        self.with_index(|index| {
            let Some(i) = self.locate(index, record) else {
                return Err(Error::index_entry_not_found(record.model()));
            };

            let entry = index.entries.remove(i);
            index.increment_change_count();
            index.link();
            Ok(entry)
        })
    }

    /// Allocates the next identity from the index.
    pub fn next_id(&self) -> Result<i64> {
        self.with_index(|index| Ok(index.next_id()))
    }

    pub fn change_count(&self) -> Result<u64> {
        self.with_index(|index| Ok(index.change_count()))
    }

    pub fn entries(&self) -> Result<Vec<IndexEntry>> {
        self.with_index(|index| Ok(index.entries.clone()))
    }

    /// Entries whose `parentId` is `id`.
    pub fn children(&self, id: i64) -> Result<Vec<IndexEntry>> {
        self.linked(id, |entry| entry.children())
    }

    /// Entries whose `groupId` is `id`.
    pub fn contents(&self, id: i64) -> Result<Vec<IndexEntry>> {
        self.linked(id, |entry| entry.contains())
    }

    fn linked(&self, id: i64, links: impl Fn(&IndexEntry) -> &[i64]) -> Result<Vec<IndexEntry>> {
        self.with_index(|index| {
            let Some(entry) = index.by_id(id) else {
                return Ok(vec![]);
            };
            Ok(links(entry)
                .iter()
                .filter_map(|id| index.by_id(*id).cloned())
                .collect())
        })
    }

    /// Writes the index if it changed since the last flush. Returns whether
    /// anything was written.
    pub fn flush(&self) -> Result<bool> {
        let mut guard = self.lock()?;
        let Some(index) = guard.as_mut() else {
            return Ok(false);
        };

        if index.change_count() == 0 {
            tracing::trace!(model = self.model(), "index unchanged; skipping flush");
            return Ok(false);
        }

        let contents = index.to_json()?;
        self.store
            .write(&self.store.index_name(self.model()), &contents)?;
        index.reset_change_count();
        tracing::debug!(model = self.model(), entries = index.len(), "flushed index");
        Ok(true)
    }

    /// Drops the cached index; the next access reloads it from the store.
    /// Unflushed changes are lost.
    pub fn unload(&self) {
        if let Ok(mut guard) = self.index.lock() {
            if guard.as_ref().is_some_and(|index| index.change_count() > 0) {
                tracing::warn!(model = self.model(), "unloading an index with unflushed changes");
            }
            *guard = None;
        }
    }

    fn indexed(&self, field: &str) -> Result<&FieldSchema> {
        self.schema
            .indexed_fields()
            .find(|candidate| candidate.name == field)
            .ok_or_else(|| Error::not_indexable(self.model(), format!("`{field}` is not indexed")))
    }

    /// Fails when an entry other than `own` already stores its record under
    /// the name `entry` would take.
    fn check_unclaimed(&self, index: &Index, entry: &IndexEntry, own: Option<usize>) -> Result<()> {
        let name = self.store.record_name(entry);
        let taken = index
            .entries
            .iter()
            .enumerate()
            .any(|(i, other)| Some(i) != own && self.store.record_name(other) == name);

        if taken {
            tracing::debug!(model = self.model(), %name, "record name already taken");
            return Err(Error::index_entry_already_exists(self.model()));
        }
        Ok(())
    }

    /// Position of the entry matching the first identity field `record`
    /// holds with a non-empty value.
    fn locate(&self, index: &Index, record: &Record) -> Option<usize> {
        self.schema.identity_fields().find_map(|field| {
            let value = record.value(&field.name).filter(|value| !value.is_empty())?;
            let expected = matcher::expected(field, value);
            index
                .entries
                .iter()
                .position(|entry| matcher::equals(entry.value(&field.name), &expected))
        })
    }
}
