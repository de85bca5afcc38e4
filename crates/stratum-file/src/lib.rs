//! File backend: records stored as loose JSON files or as entries of one
//! zip archive, located through a per-model index instead of a query
//! planner.

mod db;
pub use db::FileDb;

mod entry;
pub use entry::IndexEntry;

mod index;
pub use index::Index;

pub mod indexer;
pub use indexer::FileIndexer;

mod manager;
pub use manager::IndexManager;

pub mod store;
pub use store::{ArchiveStore, LooseStore, RecordStore};

/// Prefix of every index document name.
pub const INDEX_NAME_BASE: &str = "am7.index";

/// Name of the index document for `model`.
pub fn index_name(model: &str) -> String {
    format!("{INDEX_NAME_BASE}.{model}.json")
}
