//! Where record bodies and index documents are kept.

mod archive;
pub use archive::ArchiveStore;

mod loose;
pub use loose::LooseStore;

use crate::IndexEntry;

use stratum_core::Result;

/// Named byte storage for records and index documents.
///
/// Implementations decide how an entry maps to a storage name; the indexer
/// and [`FileDb`](crate::FileDb) only ever address content by that name.
pub trait RecordStore: core::fmt::Debug + Send + Sync {
    /// Storage name of the record `entry` describes.
    fn record_name(&self, entry: &IndexEntry) -> String;

    /// Storage name of the index document for `model`.
    fn index_name(&self, model: &str) -> String;

    /// Reads named content. `None` when nothing is stored under `name`.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Creates or replaces named content.
    fn write(&self, name: &str, contents: &[u8]) -> Result<()>;

    /// Removes named content, reporting whether anything was removed.
    fn remove(&self, name: &str) -> Result<bool>;
}
