mod support;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std_util::prelude::*;
use stratum_core::{FromRecord, Kind, Record, RecordKey, Result, Value};

#[test]
fn new_instance_matches_flattened_schema() {
    let factory = support::factory();
    let widget = assert_ok!(factory.new_instance("widget", None));
    let schema = assert_ok!(factory.schema("widget"));

    let expected: Vec<&str> = schema.fields.iter().map(|field| field.name.as_str()).collect();
    assert_eq!(widget.field_names().collect::<Vec<_>>(), expected);

    assert_eq!(*assert_ok!(widget.get("description")), Value::from("none"));
    assert_eq!(*assert_ok!(widget.get("count")), Value::Int(5));
    assert_eq!(*assert_ok!(widget.get("status")), Value::Enum("UNKNOWN".into()));
    assert_eq!(*assert_ok!(widget.get("id")), Value::Long(0));
    assert_eq!(*assert_ok!(widget.get("labels")), Value::List(vec![]));
    assert!(assert_ok!(widget.get("owner")).is_null());
}

#[test]
fn projection_keeps_requested_fields() {
    let factory = support::factory();
    let widget = assert_ok!(factory.new_instance("widget", Some(&["id", "name"])));

    assert_len!(widget, 2);
    assert!(!widget.has_field("description"));
    assert_eq!(*assert_ok!(widget.get("description")), Value::from("none"));

    let err = assert_err!(factory.new_instance("widget", Some(&["id", "colour"])));
    assert!(err.is_field_not_found());
}

#[test]
fn unknown_model_is_reported() {
    let factory = support::factory();
    let err = assert_err!(factory.new_instance("gadget", None));
    assert!(err.is_schema_not_found());
}

#[test]
fn prototypes_reject_every_mutation() {
    let factory = support::factory();
    let prototype = assert_ok!(factory.prototype("widget"));
    assert!(prototype.is_prototype());

    let mut prototype = (*prototype).clone();
    assert!(assert_err!(prototype.set("name", "x")).is_prototype_read_only());
    assert!(assert_err!(prototype.set_flex("extra", 1i64)).is_prototype_read_only());
    assert!(assert_err!(prototype.remove("name")).is_prototype_read_only());
    assert!(assert_err!(prototype.cell_mut("name")).is_prototype_read_only());
}

#[test]
fn placeholder_field_fails_on_get_and_set() {
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));

    assert!(assert_err!(widget.get("extra")).is_abstract_field_access());
    assert!(assert_err!(widget.set("extra", 1i64)).is_abstract_field_access());
    assert_none!(widget.value("extra"));

    let projected = assert_ok!(factory.new_instance("widget", Some(&["id"])));
    assert!(assert_err!(projected.get("extra")).is_abstract_field_access());
}

#[test]
fn flex_set_concretizes_the_cell() {
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));

    assert_ok!(widget.set_flex("extra", 42i64));
    assert_eq!(assert_some!(widget.cell("extra")).kind(), Kind::Long);
    assert_eq!(assert_ok!(widget.get_long("extra")), Some(42));

    assert_ok!(widget.set("extra", 7i64));
    assert!(assert_err!(widget.set("extra", "text")).is_value_type_mismatch());

    assert!(assert_err!(widget.set_flex("extra", Value::Null)).is_value_type_mismatch());
}

#[test]
fn set_coerces_to_the_declared_kind() {
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));

    assert_ok!(widget.set("count", 9i64));
    assert_eq!(*assert_ok!(widget.get("count")), Value::Int(9));

    assert_ok!(widget.set("status", "active"));
    assert_eq!(*assert_ok!(widget.get("status")), Value::Enum("ACTIVE".into()));

    assert_ok!(widget.set("created", 0i64));
    assert!(assert_ok!(widget.get("created")).as_timestamp().is_some());

    let err = assert_err!(widget.set("count", "many"));
    assert!(err.is_value_type_mismatch());

    let tag = assert_ok!(factory.new_instance("tag", None));
    let err = assert_err!(widget.set("owner", tag));
    assert!(err.is_value_type_mismatch());
}

#[test]
fn set_on_undeclared_field_fails() {
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", Some(&["id"])));

    assert_ok!(widget.set("name", "vivified"));
    assert!(widget.has_field("name"));

    assert!(assert_err!(widget.set("colour", "red")).is_field_not_found());
}

#[test]
fn identity_prefers_declared_order() {
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));
    assert_none!(widget.identity());

    assert_ok!(widget.set("objectId", "b1"));
    assert_eq!(widget.identity(), Some(("objectId", &Value::from("b1"))));

    assert_ok!(widget.set("id", 12i64));
    assert_eq!(widget.identity(), Some(("id", &Value::Long(12))));
    assert_eq!(RecordKey::of(&widget), Some(RecordKey::Id(12)));
}

#[test]
fn shell_holds_only_the_key() {
    let factory = support::factory();
    let shell = assert_ok!(factory.shell("person", &RecordKey::ObjectId("p-1".into())));

    assert_len!(shell, 1);
    assert_eq!(assert_ok!(shell.get_string("objectId")), Some("p-1".to_string()));
}

#[test]
fn new_field_carries_the_default() {
    let factory = support::factory();
    let cell = assert_ok!(factory.new_field("widget", "count"));

    assert_eq!(cell.kind(), Kind::Int);
    assert_eq!(*assert_ok!(cell.value()), Value::Int(5));
    assert!(assert_err!(factory.new_field("widget", "colour")).is_field_not_found());
}

#[test]
fn hash_tracks_persisted_values_only() {
    let factory = support::factory();
    let mut a = assert_ok!(factory.new_instance("widget", None));
    let mut b = assert_ok!(factory.new_instance("widget", None));
    assert_eq!(a.hash(), b.hash());

    assert_ok!(a.set("scratch", "temporary"));
    assert_eq!(a.hash(), b.hash());

    assert_ok!(b.set("name", "different"));
    assert_ne!(a.hash(), b.hash());
    assert_eq!(a.hash().len(), 64);
}

#[test]
fn invalidate_rebuilds_the_prototype() {
    let factory = support::factory();
    let first = assert_ok!(factory.prototype("widget"));
    assert!(Arc::ptr_eq(&first, &assert_ok!(factory.prototype("widget"))));

    factory.invalidate("widget");
    let second = assert_ok!(factory.prototype("widget"));
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(*first, *second);
}

#[derive(Debug, PartialEq)]
struct WidgetView {
    name: String,
    count: i32,
}

impl FromRecord for WidgetView {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(WidgetView {
            name: record.get_string("name")?.unwrap_or_default(),
            count: record.get("count")?.as_int().unwrap_or_default(),
        })
    }
}

#[test]
fn records_convert_to_typed_views() {
    let factory = support::factory();
    let mut widget = assert_ok!(factory.new_instance("widget", None));
    assert_ok!(widget.set("name", "sprocket"));

    let view: WidgetView = assert_ok!(factory.view(&widget));
    assert_eq!(
        view,
        WidgetView {
            name: "sprocket".into(),
            count: 5
        }
    );
}
