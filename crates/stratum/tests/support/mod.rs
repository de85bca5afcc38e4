#![allow(dead_code)]

use std::sync::{Arc, Once};
use stratum::{BundledSchemas, Db, RecordFactory, SchemaRegistry};
use stratum_driver_sqlite::Sqlite;

const WIDGET: &str = r#"{
    "name": "widget",
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "objectId", "type": "string", "identity": true },
        { "name": "name", "type": "string", "index": true },
        { "name": "status", "type": "enum", "baseType": "status" },
        { "name": "count", "type": "int" },
        { "name": "owner", "type": "model", "baseModel": "person", "foreign": true },
        { "name": "labels", "type": "list", "baseType": "string" },
        { "name": "tags", "type": "list", "baseModel": "tag", "referenced": true }
    ]
}"#;

const TAG: &str = r#"{
    "name": "tag",
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "objectId", "type": "string", "identity": true },
        { "name": "name", "type": "string" },
        { "name": "active", "type": "boolean" },
        { "name": "referenceId", "type": "long" },
        { "name": "referenceType", "type": "string" }
    ]
}"#;

const PERSON: &str = r#"{
    "name": "person",
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "objectId", "type": "string", "identity": true },
        { "name": "name", "type": "string" }
    ]
}"#;

pub fn factory() -> Arc<RecordFactory> {
    let schemas = BundledSchemas::new()
        .with("widget", WIDGET)
        .with("tag", TAG)
        .with("person", PERSON);
    Arc::new(RecordFactory::new(Arc::new(SchemaRegistry::new(schemas))))
}

/// Installs a test subscriber once; `RUST_LOG` selects what is printed.
pub fn trace() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// An in-memory SQLite database with every test table created.
pub fn db() -> Db {
    trace();
    let db = Db::builder()
        .factory(factory())
        .build(Sqlite::in_memory())
        .unwrap();
    for model in ["widget", "tag", "person"] {
        db.create_table(model).unwrap();
    }
    db
}
