mod support;

use pretty_assertions::assert_eq;
use std_util::prelude::*;
use stratum_core::{driver::Param, Kind, Value};
use stratum_sql::{binder::bind_record, StatementKind};

#[test]
fn insert_binds_every_held_column_and_returns_the_sequence() {
    let registry = support::registry();
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));
    assert_ok!(widget.set("name", "sprocket"));
    assert_ok!(widget.set("status", "active"));
    assert_ok!(widget.set("labels", vec![Value::from("a")]));

    let meta = assert_ok!(support::sqlite(&registry).insert(&widget));
    assert_eq!(meta.kind, StatementKind::Insert);
    assert_eq!(
        meta.sql,
        "INSERT INTO a7_widget (objectId, name, status, count, owner, labels, photo) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id"
    );
    assert_eq!(meta.returning.as_deref(), Some("id"));
    assert_eq!(meta.ret(), Some(vec![Kind::Long]));

    let params = assert_ok!(bind_record(&meta, &widget));
    assert_eq!(
        params,
        [
            Param::new(Kind::String, Value::Null),
            Param::new(Kind::String, Value::from("sprocket")),
            Param::new(Kind::String, Value::from("ACTIVE")),
            Param::new(Kind::Int, Value::Int(0)),
            Param::new(Kind::Long, Value::Null),
            Param::new(Kind::String, Value::from(r#"["a"]"#)),
            Param::new(Kind::Blob, Value::Null),
        ]
    );
}

#[test]
fn insert_uses_dialect_placeholders() {
    let registry = support::registry();
    let factory = support::factory();
    let tag = assert_ok!(factory.new_instance("tag", Some(&["name", "referenceId"])));

    let meta = assert_ok!(support::postgresql(&registry).insert(&tag));
    assert_eq!(
        meta.sql,
        "INSERT INTO a7_tag (name, referenceId) VALUES ($1, $2) RETURNING id"
    );
}

#[test]
fn insert_without_columns_uses_defaults() {
    let registry = support::registry();
    let factory = support::factory();
    let person = assert_ok!(factory.new_instance("person", Some(&["id"])));

    let meta = assert_ok!(support::sqlite(&registry).insert(&person));
    assert_eq!(meta.sql, "INSERT INTO a7_person DEFAULT VALUES RETURNING id");
    assert!(meta.fields.is_empty());
}

#[test]
fn foreign_records_bind_their_id() {
    let registry = support::registry();
    let factory = support::factory();

    let mut owner = assert_ok!(factory.new_instance("person", None));
    let mut widget = assert_ok!(factory.new_instance("widget", Some(&["id", "owner"])));
    assert_ok!(widget.set("id", 5i64));
    assert_ok!(widget.set("owner", owner.clone()));

    let meta = assert_some!(assert_ok!(support::sqlite(&registry).update(&widget)));
    let err = assert_err!(bind_record(&meta, &widget));
    assert!(err.is_identity_missing());

    assert_ok!(owner.set("id", 9i64));
    assert_ok!(widget.set("owner", owner));
    let params = assert_ok!(bind_record(&meta, &widget));
    assert_eq!(params[0], Param::new(Kind::Long, Value::Long(9)));
}

#[test]
fn update_sets_mutable_columns_keyed_by_identity() {
    let registry = support::registry();
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));
    assert_ok!(widget.set("id", 5i64));
    assert_ok!(widget.set("objectId", "w-5"));

    let meta = assert_some!(assert_ok!(support::sqlite(&registry).update(&widget)));
    assert_eq!(
        meta.sql,
        "UPDATE a7_widget SET name = ?1, status = ?2, count = ?3, owner = ?4, labels = ?5, photo = ?6 \
         WHERE id = ?7"
    );
    assert_eq!(meta.fields.last().map(String::as_str), Some("id"));
    assert_eq!(meta.ret(), None);
}

#[test]
fn update_of_a_projection_sets_only_held_fields() {
    let registry = support::registry();
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", Some(&["objectId", "name"])));
    assert_ok!(widget.set("objectId", "w-5"));
    assert_ok!(widget.set("name", "renamed"));

    let meta = assert_some!(assert_ok!(support::postgresql(&registry).update(&widget)));
    assert_eq!(meta.sql, "UPDATE a7_widget SET name = $1 WHERE objectId = $2");
    assert_eq!(meta.fields, ["name", "objectId"]);

    let identity_only = assert_ok!(factory.copy(&widget, Some(&["objectId"])));
    assert_none!(assert_ok!(support::sqlite(&registry).update(&identity_only)));
}

#[test]
fn update_and_delete_need_an_identity() {
    let registry = support::registry();
    let factory = support::factory();
    let widget = assert_ok!(factory.new_instance("widget", None));
    let compiler = support::sqlite(&registry);

    assert!(assert_err!(compiler.update(&widget)).is_identity_missing());
    assert!(assert_err!(compiler.delete(&widget)).is_identity_missing());
}

#[test]
fn delete_keys_on_the_first_populated_identity() {
    let registry = support::registry();
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));
    assert_ok!(widget.set("objectId", "w-5"));

    let compiler = support::sqlite(&registry);
    let meta = assert_ok!(compiler.delete(&widget));
    assert_eq!(meta.sql, "DELETE FROM a7_widget WHERE objectId = ?1");

    assert_ok!(widget.set("id", 5i64));
    let meta = assert_ok!(compiler.delete(&widget));
    assert_eq!(meta.sql, "DELETE FROM a7_widget WHERE id = ?1");
    assert_eq!(assert_ok!(bind_record(&meta, &widget)), [Param::new(Kind::Long, Value::Long(5))]);
}

#[test]
fn abstract_models_have_no_table() {
    let registry = support::registry();
    let factory = support::factory();
    let shape = assert_ok!(factory.new_instance("shape", None));

    assert!(assert_err!(support::sqlite(&registry).insert(&shape)).is_invalid_statement());
}
