mod field;
pub use field::FieldSchema;

mod model;
pub use model::ModelSchema;

pub mod names;

mod registry;
pub use registry::{BundledSchemas, DirectorySource, SchemaRegistry, SchemaSource};
