#![allow(dead_code)]

use std::sync::Arc;
use stratum_core::{
    schema::{BundledSchemas, SchemaRegistry},
    RecordFactory,
};

pub const NAME_ID: &str = r#"{
    "name": "common.nameId",
    "abstract": true,
    "fields": [
        { "name": "id", "type": "long", "identity": true, "sequence": true },
        { "name": "objectId", "type": "string", "identity": true },
        { "name": "name", "type": "string", "index": true }
    ]
}"#;

pub const PERSON: &str = r#"{
    "name": "person",
    "inherits": ["common.nameId"],
    "fields": [
        { "name": "email", "type": "string" }
    ]
}"#;

pub const TAG: &str = r#"{
    "name": "tag",
    "inherits": ["common.nameId"],
    "fields": [
        { "name": "referenceId", "type": "long" },
        { "name": "referenceType", "type": "string" }
    ]
}"#;

pub const WIDGET: &str = r#"{
    "name": "widget",
    "inherits": ["common.nameId"],
    "likeInherits": ["common.describable"],
    "fields": [
        { "name": "description", "type": "string", "default": "none" },
        { "name": "status", "type": "enum", "baseType": "status", "default": "unknown" },
        { "name": "count", "type": "int", "default": 5 },
        { "name": "owner", "type": "model", "baseModel": "person", "foreign": true },
        { "name": "parent", "type": "model", "baseModel": "$self", "foreign": true },
        { "name": "reviewer", "type": "model", "baseModel": "person", "foreign": true, "foreignField": "name" },
        { "name": "tags", "type": "list", "baseModel": "tag", "referenced": true },
        { "name": "members", "type": "list", "baseModel": "person", "foreign": true },
        { "name": "labels", "type": "list", "baseType": "string" },
        { "name": "extra", "type": "flex" },
        { "name": "created", "type": "timestamp" },
        { "name": "data", "type": "blob" },
        { "name": "scratch", "type": "string", "ephemeral": true }
    ]
}"#;

pub fn bundled() -> BundledSchemas {
    BundledSchemas::new()
        .with("common.nameId", NAME_ID)
        .with("person", PERSON)
        .with("tag", TAG)
        .with("widget", WIDGET)
}

pub fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::new(bundled()))
}

pub fn factory() -> RecordFactory {
    RecordFactory::new(registry())
}
