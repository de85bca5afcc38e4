#![allow(dead_code)]

use stratum_core::{
    schema::{BundledSchemas, SchemaRegistry},
    RecordFactory,
};
use stratum_sql::{
    dialect::{Postgresql, Sqlite},
    Compiler,
};

pub const PREFIX: &str = "a7";

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
        { "name": "tags", "type": "list", "baseModel": "tag", "referenced": true },
        { "name": "photo", "type": "blob" },
        { "name": "scratch", "type": "string", "virtual": true }
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
        { "name": "name", "type": "string" }
    ]
}"#;

const SHAPE: &str = r#"{
    "name": "shape",
    "abstract": true,
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true }
    ]
}"#;

const JOURNAL: &str = r#"{
    "name": "journal",
    "abstract": true,
    "sortField": "posted",
    "sortOrder": "descending",
    "fields": [
        { "name": "posted", "type": "timestamp" }
    ]
}"#;

const ENTRY: &str = r#"{
    "name": "entry",
    "inherits": ["journal"],
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "title", "type": "string" }
    ]
}"#;

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new(
        BundledSchemas::new()
            .with("widget", WIDGET)
            .with("tag", TAG)
            .with("person", PERSON)
            .with("shape", SHAPE)
            .with("journal", JOURNAL)
            .with("entry", ENTRY),
    )
}

pub fn sqlite(registry: &SchemaRegistry) -> Compiler<'_> {
    Compiler::new(registry, &Sqlite, PREFIX)
}

pub fn postgresql(registry: &SchemaRegistry) -> Compiler<'_> {
    Compiler::new(registry, &Postgresql, PREFIX)
}

pub fn factory() -> RecordFactory {
    RecordFactory::new(std::sync::Arc::new(registry()))
}
