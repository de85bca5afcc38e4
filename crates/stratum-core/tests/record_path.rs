mod support;

use pretty_assertions::assert_eq;
use std_util::prelude::*;
use stratum_core::{Record, RecordFactory, Value};

fn widget_with_owner(factory: &RecordFactory) -> Record {
    let mut owner = assert_ok!(factory.new_instance("person", None));
    assert_ok!(owner.set("name", "ann"));
    assert_ok!(owner.set("email", "ann@example.com"));

    let mut widget = assert_ok!(factory.new_instance("widget", None));
    assert_ok!(widget.set("name", "sprocket"));
    assert_ok!(widget.set("owner", owner));
    widget
}

#[test]
fn dotted_get_crosses_into_nested_records() {
    let factory = support::factory();
    let widget = widget_with_owner(&factory);

    assert_eq!(assert_ok!(widget.get_string("owner.name")), Some("ann".to_string()));
    assert_eq!(assert_ok!(widget.get_long("owner.id")), Some(0));
}

#[test]
fn missing_intermediate_resolves_to_null() {
    let factory = support::factory();
    let widget = widget_with_owner(&factory);

    assert!(assert_ok!(widget.get("parent.name")).is_null());
    assert!(assert_ok!(widget.get("parent.owner.name")).is_null());
}

#[test]
fn undeclared_segments_fail() {
    let factory = support::factory();
    let widget = widget_with_owner(&factory);

    assert!(assert_err!(widget.get("maker.name")).is_field_not_found());
    assert!(assert_err!(widget.get("owner.phone")).is_field_not_found());
    assert!(assert_err!(widget.get("name.first")).is_field_not_found());
}

#[test]
fn dotted_set_writes_the_nested_record() {
    let factory = support::factory();
    let mut widget = widget_with_owner(&factory);

    assert_ok!(widget.set("owner.email", "ann@example.org"));
    assert_eq!(
        assert_ok!(widget.get_string("owner.email")),
        Some("ann@example.org".to_string())
    );

    assert!(assert_err!(widget.set("parent.name", "root")).is_field_not_found());
}

#[test]
fn copy_shares_nested_records_until_written() {
    let factory = support::factory();
    let widget = widget_with_owner(&factory);

    let mut copy = assert_ok!(factory.copy(&widget, None));
    assert_eq!(copy, widget);

    assert_ok!(copy.set("owner.name", "bob"));
    assert_eq!(assert_ok!(copy.get_string("owner.name")), Some("bob".to_string()));
    assert_eq!(assert_ok!(widget.get_string("owner.name")), Some("ann".to_string()));
}

#[test]
fn copy_with_nested_paths_projects_the_nested_record() {
    let factory = support::factory();
    let widget = widget_with_owner(&factory);

    let copy = assert_ok!(widget.copy_record(Some(&["name", "owner.email"])));
    assert_eq!(copy.field_names().collect::<Vec<_>>(), ["name", "owner"]);

    let owner = assert_some!(copy.value("owner").and_then(Value::as_record));
    assert_eq!(owner.field_names().collect::<Vec<_>>(), ["email"]);
    assert!(assert_ok!(copy.get("owner.name")).is_null());

    assert!(assert_err!(widget.copy_record(Some(&["colour"]))).is_field_not_found());
}
