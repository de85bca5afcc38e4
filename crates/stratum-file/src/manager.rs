use crate::{FileIndexer, RecordStore};

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use stratum_core::{Result, SchemaRegistry};

/// Hands out one [`FileIndexer`] per model for a storage root.
#[derive(Debug)]
pub struct IndexManager {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn RecordStore>,
    indexers: RwLock<HashMap<String, Arc<FileIndexer>>>,
}

impl IndexManager {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<dyn RecordStore>) -> IndexManager {
        IndexManager {
            registry,
            store,
            indexers: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// The indexer of `model`, created on first use.
    pub fn get(&self, model: &str) -> Result<Arc<FileIndexer>> {
        if let Some(indexer) = self
            .indexers
            .read()
            .ok()
            .and_then(|indexers| indexers.get(model).cloned())
        {
            return Ok(indexer);
        }

        let schema = self.registry.require(model)?;
        let indexer = Arc::new(FileIndexer::new(schema, self.store.clone()));

        let mut indexers = self
            .indexers
            .write()
            .map_err(|_| stratum_core::err!("indexer map poisoned"))?;
        Ok(indexers.entry(model.to_string()).or_insert(indexer).clone())
    }

    /// Flushes every loaded index. Returns how many were written.
    pub fn flush(&self) -> Result<usize> {
        let indexers: Vec<_> = match self.indexers.read() {
            Ok(indexers) => indexers.values().cloned().collect(),
            Err(_) => stratum_core::bail!("indexer map poisoned"),
        };

        let mut written = 0;
        for indexer in indexers {
            if indexer.flush()? {
                written += 1;
            }
        }
        Ok(written)
    }

    pub fn unload(&self, model: &str) {
        if let Ok(mut indexers) = self.indexers.write() {
            if let Some(indexer) = indexers.remove(model) {
                indexer.unload();
            }
        }
    }

    pub fn unload_all(&self) {
        if let Ok(mut indexers) = self.indexers.write() {
            for (_, indexer) in indexers.drain() {
                indexer.unload();
            }
        }
    }
}
