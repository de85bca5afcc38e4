pub mod codec;

pub mod config;
pub use config::Config;

pub mod driver;
pub use driver::{Connection, Driver};

mod error;
pub use error::Error;

pub mod query;
pub use query::{Comparator, Order, Query, QueryField, QueryResult};

pub mod record;
pub use record::{FromRecord, Record, RecordFactory};

pub mod schema;
pub use schema::{FieldSchema, ModelSchema, SchemaRegistry};

pub mod store;
pub use store::{Reader, RecordKey, Search, Writer};

pub mod value;
pub use value::{Cell, Kind, Value};

/// A Result type alias that uses Stratum's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
