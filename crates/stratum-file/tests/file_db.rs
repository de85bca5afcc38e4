mod support;

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std_util::prelude::*;
use stratum_core::{Comparator, Order, Query, Reader, RecordKey, Search, Value, Writer};
use stratum_file::{FileDb, LooseStore};

fn open(dir: &tempfile::TempDir) -> FileDb {
    FileDb::new(support::factory(), Arc::new(LooseStore::new(dir.path())))
}

#[test]
fn create_assigns_identity_and_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut note = support::note(&db, "Shopping", 3);
    assert!(assert_ok!(db.write(&mut note)));

    assert_eq!(assert_ok!(note.get_long("id")), Some(1));
    let object_id = assert_some!(assert_ok!(note.get_string("objectId")));
    assert!(!object_id.is_empty());
    assert!(dir.path().join("note/0/0.0/shopping.json").is_file());
    assert!(dir.path().join("note/am7.index.note.json").is_file());

    let by_id = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(by_id.get_string("body")), Some("body of Shopping".to_string()));
    assert_eq!(assert_ok!(by_id.get("priority")).as_int(), Some(3));

    let by_object_id = assert_ok!(db.read("note", &RecordKey::ObjectId(object_id)));
    assert_eq!(assert_ok!(by_object_id.get_long("id")), Some(1));
}

#[test]
fn second_write_updates_instead_of_creating() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut note = support::note(&db, "todo", 1);
    assert_ok!(db.write(&mut note));
    assert_ok!(note.set("body", "rewritten"));
    assert_ok!(db.write(&mut note));

    let indexer = assert_ok!(db.indexer("note"));
    assert_len!(assert_ok!(indexer.entries()), 1);
    assert_eq!(assert_ok!(note.get_long("id")), Some(1));

    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("body")), Some("rewritten".to_string()));

    let mut other = support::note(&db, "other", 2);
    assert_ok!(db.write(&mut other));
    assert_eq!(assert_ok!(other.get_long("id")), Some(2));
}

#[test]
fn update_skips_transient_fields_and_keeps_unsent_ones() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut note = support::note(&db, "todo", 4);
    assert_ok!(db.write(&mut note));

    let mut patch = assert_ok!(db.factory().new_instance("note", Some(&["id", "priority", "preview"])));
    assert_ok!(patch.set("id", 1i64));
    assert_ok!(patch.set("priority", 9));
    assert_ok!(patch.set("preview", "not stored"));
    assert_ok!(db.write(&mut patch));

    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get("priority")).as_int(), Some(9));
    assert_eq!(assert_ok!(stored.get_string("body")), Some("body of todo".to_string()));
    assert_eq!(assert_ok!(stored.get_string("preview")), None);
}

#[test]
fn renaming_moves_the_loose_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut note = support::note(&db, "Draft", 1);
    assert_ok!(db.write(&mut note));
    assert_ok!(note.set("name", "Final"));
    assert_ok!(db.write(&mut note));

    assert!(!dir.path().join("note/0/0.0/draft.json").exists());
    assert!(dir.path().join("note/0/0.0/final.json").is_file());

    let indexer = assert_ok!(db.indexer("note"));
    let entry = assert_some!(assert_ok!(indexer.find_by("name", &Value::from("Final"))));
    assert_eq!(entry.id(), 1);
}

#[test]
fn updating_an_unknown_record_is_an_index_error() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut ghost = support::note(&db, "ghost", 1);
    assert_ok!(ghost.set("id", 40i64));
    let err = assert_err!(db.write(&mut ghost));
    assert!(err.is_index_entry_not_found());
}

#[test]
fn delete_removes_body_and_entry() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut note = support::note(&db, "gone", 1);
    assert_ok!(db.write(&mut note));
    assert!(assert_ok!(db.delete(&note)));

    assert!(!dir.path().join("note/0/0.0/gone.json").exists());
    let err = assert_err!(db.read("note", &RecordKey::Id(1)));
    assert!(err.is_record_not_found());

    assert!(!assert_ok!(db.delete(&note)));
}

#[test]
fn delete_without_identity_fails_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let store = support::CountingStore::new(dir.path());
    let db = FileDb::new(support::factory(), store.clone());

    let note = assert_ok!(db.factory().new_instance("note", None));
    let err = assert_err!(db.delete(&note));
    assert!(err.is_not_indexable());
    assert_eq!(store.io(), 0);
}

#[test]
fn find_compares_unindexed_fields_through_records() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    for (name, priority) in [("alpha", 1), ("beta", 2), ("gamma", 3)] {
        assert_ok!(db.write(&mut support::note(&db, name, priority)));
    }

    let query = Query::new("note").field("priority", Comparator::GreaterThanOrEquals, 2);
    let result = assert_ok!(db.find(&query));
    assert_eq!(result.total_count, Some(2));
    let names: Vec<_> = result
        .records
        .iter()
        .map(|record| assert_ok!(record.get_string("name")).unwrap_or_default())
        .collect();
    assert_eq!(names, ["beta", "gamma"]);

    let query = Query::new("note")
        .field("name", Comparator::Like, "%a%")
        .field("priority", Comparator::LessThan, 3);
    assert_eq!(assert_ok!(db.count(&query)), 2);
}

#[test]
fn find_groups_with_or() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    for (name, priority) in [("alpha", 1), ("beta", 2), ("gamma", 3)] {
        assert_ok!(db.write(&mut support::note(&db, name, priority)));
    }

    let query = Query::new("note")
        .equals("name", "alpha")
        .equals("name", "gamma")
        .combine(Comparator::GroupOr);
    assert_eq!(assert_ok!(db.count(&query)), 2);

    let query = Query::new("note").field("name", Comparator::In, vec![Value::from("beta"), Value::from("zeta")]);
    assert_eq!(assert_ok!(db.count(&query)), 1);
}

#[test]
fn find_sorts_pages_and_projects() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    for (name, priority) in [("gamma", 3), ("alpha", 1), ("beta", 2)] {
        assert_ok!(db.write(&mut support::note(&db, name, priority)));
    }

    let query = Query::new("note")
        .sort("name", Order::Descending)
        .page(1, 1)
        .request(["id", "name"]);
    let result = assert_ok!(db.find(&query));

    assert_eq!(result.total_count, Some(3));
    assert_len!(result.records, 1);
    let record = &result.records[0];
    assert_eq!(record.field_names().collect::<Vec<_>>(), ["id", "name"]);
    assert_eq!(assert_ok!(record.get_string("name")), Some("beta".to_string()));
}

#[test]
fn foreign_records_resolve_on_read() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut person = assert_ok!(db.factory().new_instance("person", None));
    assert_ok!(person.set("name", "Ada"));
    assert_ok!(db.write(&mut person));

    let mut note = support::note(&db, "owned", 1);
    assert_ok!(note.set("owner", person));
    assert_ok!(db.write(&mut note));

    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("owner.name")), Some("Ada".to_string()));
}

#[test]
fn children_follow_parent_ids() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut parent = support::note(&db, "parent", 1);
    assert_ok!(db.write(&mut parent));
    for name in ["first", "second"] {
        let mut child = support::note(&db, name, 1);
        assert_ok!(child.set("parentId", 1i64));
        assert_ok!(db.write(&mut child));
    }

    let indexer = assert_ok!(db.indexer("note"));
    let children = assert_ok!(indexer.children(1));
    assert_eq!(children.iter().map(|entry| entry.id()).collect::<Vec<_>>(), [2, 3]);
    assert!(dir.path().join("note/0/0.1/first.json").is_file());
}

#[test]
fn unloaded_index_reloads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    assert_ok!(db.write(&mut support::note(&db, "kept", 1)));

    db.unload_all();
    let reopened = open(&dir);
    let stored = assert_ok!(reopened.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("name")), Some("kept".to_string()));

    let mut next = support::note(&reopened, "next", 1);
    assert_ok!(reopened.write(&mut next));
    assert_eq!(assert_ok!(next.get_long("id")), Some(2));
}

#[test]
fn names_that_share_a_file_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    let mut first = support::note(&db, "a/b", 1);
    assert_ok!(db.write(&mut first));

    let mut twin = support::note(&db, "a_b", 2);
    let err = assert_err!(db.write(&mut twin));
    assert!(err.is_index_entry_already_exists());

    let indexer = assert_ok!(db.indexer("note"));
    assert_len!(assert_ok!(indexer.entries()), 1);
    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("body")), Some("body of a/b".to_string()));

    let mut other = support::note(&db, "other", 3);
    assert_ok!(db.write(&mut other));
    assert_ok!(other.set("name", "a\\b"));
    let err = assert_err!(db.write(&mut other));
    assert!(err.is_index_entry_already_exists());

    let kept = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(kept.get("priority")).as_int(), Some(1));
    let id = assert_some!(assert_ok!(other.get("id")).as_long());
    let unmoved = assert_ok!(db.read("note", &RecordKey::Id(id)));
    assert_eq!(assert_ok!(unmoved.get_string("name")), Some("other".to_string()));
}

#[test]
fn names_differing_only_in_case_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    assert_ok!(db.write(&mut support::note(&db, "Same", 1)));
    let err = assert_err!(db.write(&mut support::note(&db, "same", 2)));
    assert!(err.is_index_entry_already_exists());

    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("body")), Some("body of Same".to_string()));
    assert_eq!(assert_ok!(stored.get("id")).as_long(), Some(1));
}

#[test]
fn same_name_in_another_group_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);

    assert_ok!(db.write(&mut support::note(&db, "list", 1)));
    let mut elsewhere = support::note(&db, "list", 2);
    assert_ok!(elsewhere.set("groupId", 7i64));
    assert_ok!(db.write(&mut elsewhere));

    assert!(dir.path().join("note/0/0.0/list.json").is_file());
    assert!(dir.path().join("note/0/7.0/list.json").is_file());
}

#[test]
fn failed_body_removal_keeps_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = support::FailingStore::new(dir.path());
    let db = FileDb::new(support::factory(), store.clone());

    let mut note = support::note(&db, "pinned", 1);
    assert_ok!(db.write(&mut note));

    store.fail_bodies(true);
    let err = assert_err!(db.delete(&note));
    assert!(err.is_store_io());

    let indexer = assert_ok!(db.indexer("note"));
    assert_len!(assert_ok!(indexer.entries()), 1);
    assert_ok!(db.read("note", &RecordKey::Id(1)));

    store.fail_bodies(false);
    assert!(assert_ok!(db.delete(&note)));
    assert_len!(assert_ok!(indexer.entries()), 0);
}

#[test]
fn failed_update_restores_the_entry() {
    let dir = tempfile::tempdir().unwrap();
    let store = support::FailingStore::new(dir.path());
    let db = FileDb::new(support::factory(), store.clone());

    let mut note = support::note(&db, "draft", 1);
    assert_ok!(db.write(&mut note));

    store.fail_bodies(true);
    assert_ok!(note.set("name", "final"));
    let err = assert_err!(db.write(&mut note));
    assert!(err.is_store_io());
    store.fail_bodies(false);

    let indexer = assert_ok!(db.indexer("note"));
    assert_some!(assert_ok!(indexer.find_by("name", &Value::from("draft"))));
    assert_none!(assert_ok!(indexer.find_by("name", &Value::from("final"))));

    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("name")), Some("draft".to_string()));
}

#[test]
fn concurrent_updates_of_one_record_keep_both_changes() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir);
    assert_ok!(db.write(&mut support::note(&db, "shared", 0)));

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..20 {
                let mut change = db.factory().new_instance("note", Some(&["id", "body"])).unwrap();
                change.set("id", 1i64).unwrap();
                change.set("body", format!("body {i}")).unwrap();
                db.write(&mut change).unwrap();
            }
        });
        scope.spawn(|| {
            for i in 0..20i32 {
                let mut change = db.factory().new_instance("note", Some(&["id", "priority"])).unwrap();
                change.set("id", 1i64).unwrap();
                change.set("priority", i).unwrap();
                db.write(&mut change).unwrap();
            }
        });
    });

    let stored = assert_ok!(db.read("note", &RecordKey::Id(1)));
    assert_eq!(assert_ok!(stored.get_string("body")), Some("body 19".to_string()));
    assert_eq!(assert_ok!(stored.get("priority")).as_int(), Some(19));
}
