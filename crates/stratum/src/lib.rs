//! Schema-driven record persistence over relational databases and plain
//! files.
//!
//! [`Db`] stores records in PostgreSQL or SQLite through compiled SQL;
//! [`FileDb`] stores them as JSON files or zip entries located through
//! per-model indexes. Both implement the same [`Reader`], [`Writer`] and
//! [`Search`] contracts.

pub mod db;
pub use db::Db;

pub use stratum_core::{
    codec::{Codec, CodecOptions},
    config::{self, Config},
    driver::{self, Connection, Driver},
    schema::{self, BundledSchemas, DirectorySource, SchemaRegistry, SchemaSource},
    Cell, Comparator, Error, FieldSchema, FromRecord, Kind, ModelSchema, Order, Query, QueryField,
    QueryResult, Reader, Record, RecordFactory, RecordKey, Result, Search, Value, Writer,
};

pub use stratum_file::{FileDb, FileIndexer, IndexEntry};
