#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use stratum_core::{
    schema::{BundledSchemas, SchemaRegistry},
    Error, Record, RecordFactory, Result,
};
use stratum_file::{FileDb, IndexEntry, LooseStore, RecordStore};

const NOTE: &str = r#"{
    "name": "note",
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "objectId", "type": "string", "identity": true },
        { "name": "name", "type": "string", "index": true },
        { "name": "groupId", "type": "long", "index": true },
        { "name": "parentId", "type": "long", "index": true },
        { "name": "organizationId", "type": "long", "index": true },
        { "name": "body", "type": "string" },
        { "name": "priority", "type": "int" },
        { "name": "status", "type": "enum", "baseType": "status" },
        { "name": "owner", "type": "model", "baseModel": "person", "foreign": true },
        { "name": "preview", "type": "string", "virtual": true }
    ]
}"#;

const PERSON: &str = r#"{
    "name": "person",
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "objectId", "type": "string", "identity": true },
        { "name": "name", "type": "string", "index": true }
    ]
}"#;

pub fn factory() -> Arc<RecordFactory> {
    let registry = SchemaRegistry::new(BundledSchemas::new().with("note", NOTE).with("person", PERSON));
    Arc::new(RecordFactory::new(Arc::new(registry)))
}

pub fn note(db: &FileDb, name: &str, priority: i32) -> Record {
    let mut note = db.factory().new_instance("note", None).unwrap();
    note.set("name", name).unwrap();
    note.set("priority", priority).unwrap();
    note.set("body", format!("body of {name}")).unwrap();
    note
}

/// Counts the traffic a store sees, split between index documents and
/// record bodies.
#[derive(Debug)]
pub struct CountingStore {
    inner: LooseStore,
    pub reads: AtomicUsize,
    pub index_writes: AtomicUsize,
    pub record_writes: AtomicUsize,
    pub removes: AtomicUsize,
}

impl CountingStore {
    pub fn new(base: &std::path::Path) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            inner: LooseStore::new(base),
            reads: AtomicUsize::new(0),
            index_writes: AtomicUsize::new(0),
            record_writes: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        })
    }

    pub fn io(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
            + self.index_writes.load(Ordering::SeqCst)
            + self.record_writes.load(Ordering::SeqCst)
            + self.removes.load(Ordering::SeqCst)
    }

    pub fn index_writes(&self) -> usize {
        self.index_writes.load(Ordering::SeqCst)
    }
}

impl RecordStore for CountingStore {
    fn record_name(&self, entry: &IndexEntry) -> String {
        self.inner.record_name(entry)
    }

    fn index_name(&self, model: &str) -> String {
        self.inner.index_name(model)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(name)
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<()> {
        let counter = match name.contains(stratum_file::INDEX_NAME_BASE) {
            true => &self.index_writes,
            false => &self.record_writes,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.inner.write(name, contents)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(name)
    }
}

/// A loose store whose record bodies can be made unwritable. Index
/// documents always go through.
#[derive(Debug)]
pub struct FailingStore {
    inner: LooseStore,
    failing: AtomicBool,
}

impl FailingStore {
    pub fn new(base: &std::path::Path) -> Arc<FailingStore> {
        Arc::new(FailingStore {
            inner: LooseStore::new(base),
            failing: AtomicBool::new(false),
        })
    }

    pub fn fail_bodies(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) && !name.contains(stratum_file::INDEX_NAME_BASE) {
            return Err(Error::store_io(std::io::Error::other(format!("{name}: device unavailable"))));
        }
        Ok(())
    }
}

impl RecordStore for FailingStore {
    fn record_name(&self, entry: &IndexEntry) -> String {
        self.inner.record_name(entry)
    }

    fn index_name(&self, model: &str) -> String {
        self.inner.index_name(model)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.inner.read(name)
    }

    fn write(&self, name: &str, contents: &[u8]) -> Result<()> {
        self.check(name)?;
        self.inner.write(name, contents)
    }

    fn remove(&self, name: &str) -> Result<bool> {
        self.check(name)?;
        self.inner.remove(name)
    }
}
