use crate::{ArchiveStore, FileIndexer, IndexEntry, IndexManager, LooseStore, RecordStore};

use std::sync::Arc;
use stratum_core::{
    codec::{Codec, CodecOptions},
    config::FileConfig,
    Error, Kind, Query, QueryResult, Reader, Record, RecordFactory, RecordKey, Result, Search,
    Value, Writer,
};

/// Record storage on the file system, addressed through per-model indexes.
///
/// Every mutation updates the model's index in memory, writes the record
/// body, then flushes the index. Flushing is gated on the index change
/// counter, so reads never write.
#[derive(Debug)]
pub struct FileDb {
    factory: Arc<RecordFactory>,
    manager: IndexManager,
    options: CodecOptions,
}

/// Resolves foreign keys for a record being decoded without resolving the
/// foreign keys of the records it pulls in.
struct Shallow<'a>(&'a FileDb);

impl FileDb {
    pub fn new(factory: Arc<RecordFactory>, store: Arc<dyn RecordStore>) -> FileDb {
        let manager = IndexManager::new(factory.registry().clone(), store);
        FileDb {
            factory,
            manager,
            options: CodecOptions {
                skip_transient: true,
                ..CodecOptions::default()
            },
        }
    }

    /// Opens the store `config` describes: loose files under the base path,
    /// or one archive at `<base>/<archiveName>`.
    pub fn open(config: &FileConfig, factory: Arc<RecordFactory>) -> Result<FileDb> {
        std::fs::create_dir_all(&config.base_path).map_err(Error::store_io)?;

        let store: Arc<dyn RecordStore> = if config.archive {
            Arc::new(ArchiveStore::new(config.base_path.join(&config.archive_name)))
        } else {
            Arc::new(LooseStore::new(&config.base_path))
        };

        tracing::debug!(base = %config.base_path.display(), archive = config.archive, "opened file store");
        Ok(FileDb::new(factory, store))
    }

    pub fn with_codec_options(mut self, options: CodecOptions) -> FileDb {
        self.options = options;
        self
    }

    pub fn factory(&self) -> &Arc<RecordFactory> {
        &self.factory
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        self.manager.store()
    }

    pub fn indexer(&self, model: &str) -> Result<Arc<FileIndexer>> {
        self.manager.get(model)
    }

    /// Flushes every dirty index.
    pub fn flush(&self) -> Result<usize> {
        self.manager.flush()
    }

    /// Drops the cached index of `model`; the next access reloads it.
    pub fn unload(&self, model: &str) {
        self.manager.unload(model);
    }

    pub fn unload_all(&self) {
        self.manager.unload_all();
    }

    fn codec(&self) -> Codec<'_> {
        Codec::new(&self.factory).with_options(self.options)
    }

    fn entry(&self, model: &str, key: &RecordKey) -> Result<IndexEntry> {
        self.manager
            .get(model)?
            .find_by(key.field(), &key.value())?
            .ok_or_else(|| Error::record_not_found(format!("{model} {key}")))
    }

    /// Reads and decodes the record `entry` describes. With `resolve`, foreign
    /// keys expand one level deep through the index.
    fn load(&self, entry: &IndexEntry, resolve: bool) -> Result<Record> {
        let name = self.store().record_name(entry);
        let Some(contents) = self.store().read(&name)? else {
            return Err(Error::record_not_found(format!("{} at {name}", entry.model)));
        };
        let contents = std::str::from_utf8(&contents)
            .map_err(|err| Error::serialization(format!("{name}: {err}")))?;

        let shallow = Shallow(self);
        let codec = match resolve {
            true => self.codec().with_lookup(&shallow),
            false => self.codec(),
        };
        codec
            .import_record(&entry.model, contents)
            .map_err(|err| err.context(Error::serialization(format!("decoding {name}"))))
    }

    fn save(&self, entry: &IndexEntry, record: &Record) -> Result<String> {
        let name = self.store().record_name(entry);
        let contents = self.codec().to_string(record)?;
        self.store().write(&name, contents.as_bytes())?;
        tracing::trace!(model = record.model(), %name, "wrote record");
        Ok(name)
    }

    fn create(&self, indexer: &FileIndexer, record: &mut Record) -> Result<bool> {
        let schema = record.schema().clone();

        if let Some(field) = schema.sequence_field() {
            let id = indexer.next_id()?;
            record.set(&field.name, Value::Long(id))?;
        }
        if let Some(field) = schema.generated_field() {
            if record.value(&field.name).map_or(true, Value::is_empty) {
                record.set(&field.name, uuid::Uuid::new_v4().to_string())?;
            }
        }

        let entry = indexer.add_entry(record)?;
        if let Err(err) = self.save(&entry, record) {
            if let Err(undo) = indexer.remove_entry(record) {
                tracing::warn!(model = record.model(), error = %undo, "failed to drop index entry of unwritten record");
            }
            return Err(err);
        }

        indexer.flush()?;
        tracing::debug!(model = record.model(), id = entry.id(), "created record");
        Ok(true)
    }

    fn update(&self, indexer: &FileIndexer, record: &Record) -> Result<bool> {
        let Some(entry) = indexer.find_entry(record)? else {
            return Err(Error::index_entry_not_found(record.model()));
        };
        let previous = self.store().record_name(&entry);

        let mut stored = self.load(&entry, false)?;
        let original = stored.clone();
        merge(&mut stored, record)?;

        let entry = indexer.update_entry(&stored)?;
        let name = match self.save(&entry, &stored) {
            Ok(name) => name,
            Err(err) => {
                if let Err(undo) = indexer.update_entry(&original) {
                    tracing::warn!(model = record.model(), error = %undo, "failed to restore index entry of unwritten record");
                }
                return Err(err);
            }
        };
        if name != previous {
            tracing::debug!(model = record.model(), from = %previous, to = %name, "record moved");
            self.store().remove(&previous)?;
        }

        indexer.flush()?;
        Ok(true)
    }
}

/// Copies the mutable cells of `changes` onto `stored`.
fn merge(stored: &mut Record, changes: &Record) -> Result<()> {
    let schema = changes.schema().clone();

    for cell in changes.cells() {
        let Some(field) = schema.field(cell.name()) else {
            continue;
        };
        if field.identity || field.read_only || field.is_virtual || field.ephemeral || cell.is_flex() {
            continue;
        }

        let value = cell.value()?.clone();
        match field.kind {
            Kind::Flex => stored.set_flex(&field.name, value)?,
            _ => stored.set(&field.name, value)?,
        }
    }
    Ok(())
}

impl Reader for FileDb {
    fn read(&self, model: &str, key: &RecordKey) -> Result<Record> {
        let entry = self.entry(model, key)?;
        self.load(&entry, true)
    }
}

impl Reader for Shallow<'_> {
    fn read(&self, model: &str, key: &RecordKey) -> Result<Record> {
        let entry = self.0.entry(model, key)?;
        self.0.load(&entry, false)
    }
}

impl Writer for FileDb {
    fn write(&self, record: &mut Record) -> Result<bool> {
        let indexer = self.manager.get(record.model())?;
        let _writing = indexer.write_guard()?;
        match record.identity() {
            None => self.create(&indexer, record),
            Some(_) => self.update(&indexer, record),
        }
    }

    fn delete(&self, record: &Record) -> Result<bool> {
        if RecordKey::of(record).is_none() {
            return Err(Error::not_indexable(record.model(), "no id or objectId"));
        }

        let indexer = self.manager.get(record.model())?;
        let _writing = indexer.write_guard()?;
        let Some(entry) = indexer.find_entry(record)? else {
            tracing::debug!(model = record.model(), "nothing to delete");
            return Ok(false);
        };

        let removed = self.store().remove(&self.store().record_name(&entry))?;
        if !removed {
            tracing::warn!(model = record.model(), id = entry.id(), "indexed record had no stored body");
        }

        indexer.remove_entry(record)?;
        indexer.flush()?;
        Ok(true)
    }
}

impl Search for FileDb {
    fn find(&self, query: &Query) -> Result<QueryResult> {
        let indexer = self.manager.get(query.model())?;
        let mut entries = indexer.find_entries(query, Some(self))?;

        if let Some(field) = query.sort_field() {
            indexer.sort(&mut entries, field, query.order());
        }

        let total = entries.len() as u64;
        let page: Box<dyn Iterator<Item = IndexEntry>> = match query.is_paginated() {
            true => Box::new(
                entries
                    .into_iter()
                    .skip(query.start() as usize)
                    .take(query.count() as usize),
            ),
            false => Box::new(entries.into_iter()),
        };

        let requested: Vec<&str> = query.requested().iter().map(String::as_str).collect();
        let mut records = vec![];
        for entry in page {
            let record = self.load(&entry, true)?;
            records.push(match requested.is_empty() {
                true => record,
                false => record.copy_record(Some(&requested))?,
            });
        }

        tracing::debug!(model = query.model(), total, returned = records.len(), "file search");
        Ok(QueryResult {
            model: query.model().to_string(),
            records,
            total_count: Some(total),
        })
    }

    fn count(&self, query: &Query) -> Result<u64> {
        let indexer = self.manager.get(query.model())?;
        Ok(indexer.find_entries(query, Some(self))?.len() as u64)
    }
}
