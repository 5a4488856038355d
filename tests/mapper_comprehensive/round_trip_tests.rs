//! Tier 1: whole-record save/load round trips.

use std::collections::BTreeMap;

use stratamap::{ConditionOp, MissingFieldPolicy};

use crate::test_utils::*;

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_every_shape() {
    let store = memory_store();
    let mut writer = session(&store, sample_a());
    writer.save().unwrap();

    let mut reader = session(&store, A::default());
    reader.load().unwrap();
    assert_eq!(reader.root(), &sample_a());
}

#[test]
fn test_round_trip_field_values() {
    let store = memory_store();
    session(&store, sample_a()).save().unwrap();

    let mut reader = session(&store, A::default());
    reader.load().unwrap();
    let b = reader.root();

    assert_eq!(b.field1, "value1");
    assert_eq!(b.field2, 0);
    assert_eq!(b.field3, 123);
    assert!(!b.field4);
    assert_eq!(b.field5.sub_field2.sub_sub_field1, "value1");
    assert_eq!(b.field6, vec!["value1", "value2"]);
    assert_eq!(b.field7[0].sub_field2.sub_sub_field1, "value1-B0");
    assert_eq!(b.field7[1].sub_field2.sub_sub_field1, "value1-B1");
    assert_eq!(b.field8["test 1"].sub_field2.sub_sub_field1, "value1-B0");
    assert_eq!(b.field8["test 2"].sub_field2.sub_sub_field1, "value1-B1");
    assert_eq!(b.field9, vec![1, 2]);
    assert_eq!(b.field10, vec![1i64, 2]);
    assert_eq!(b.field11, vec![true, false]);
    assert_eq!(b.field12["key 1"], "value1");
    assert_eq!(b.field12["key 2"], "value2");
    assert_eq!(b.field13["k 1"], 1);
    assert_eq!(b.field13["k 2"], 2);
}

#[test]
fn test_scenario_small_record() {
    let store = memory_store();
    let mut field8 = BTreeMap::new();
    field8.insert(
        "x".to_string(),
        B {
            sub_field1: "y".into(),
            ..B::default()
        },
    );
    let source = A {
        field1: "hello".into(),
        field6: vec!["a".into(), "b".into()],
        field8,
        ..A::default()
    };
    session(&store, source).save().unwrap();

    let mut target = session(&store, A::default());
    target.load().unwrap();
    assert_eq!(target.root().field1, "hello");
    assert_eq!(target.root().field6, vec!["a", "b"]);
    assert_eq!(target.root().field8["x"].sub_field1, "y");
}

#[test]
fn test_saved_row_layout() {
    let store = memory_store();
    session(&store, sample_a()).save().unwrap();

    // scalars: field1-4, field5 (2), field7 (2 x 2), field8 (2 x 2)
    // folded: field6, field9-13
    assert_eq!(store.len(TABLE), 4 + 2 + 4 + 4 + 6);

    let table = session(&store, A::default()).table().clone();
    let rows = table.get_rows(ConditionOp::Equals, "/field6").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].data.as_map().get("1").map(String::as_str), Some("value2"));

    let entries = table
        .get_entries(ConditionOp::Equals, "/field7/1/subfield2/subfield1")
        .unwrap();
    assert_eq!(entries[0].value, "value1-B1");
}

#[test]
fn test_save_twice_is_idempotent() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();
    let rows = store.len(TABLE);
    mapper.save().unwrap();
    assert_eq!(store.len(TABLE), rows);
}

#[test]
fn test_resave_overwrites_values() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    mapper.root_mut().field3 = -9;
    mapper.root_mut().field6 = vec!["only".into()];
    mapper.save().unwrap();

    let mut reader = session(&store, A::default());
    reader.load().unwrap();
    assert_eq!(reader.root().field3, -9);
    assert_eq!(reader.root().field6, vec!["only"]);
}

// ============================================================================
// Load invariants
// ============================================================================

#[test]
fn test_load_issues_exactly_one_select() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    store.reset_stats();
    mapper.load().unwrap();
    let stats = store.stats();
    assert_eq!(stats.selects, 1);
    assert_eq!(stats.inserts + stats.updates + stats.deletes, 0);
}

#[test]
fn test_load_overwrites_local_changes() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    mapper.root_mut().field1 = "local".into();
    mapper.root_mut().field7.clear();
    mapper.load().unwrap();
    assert_eq!(mapper.root(), &sample_a());
}

#[test]
fn test_empty_collections_round_trip() {
    let store = memory_store();
    let mut source = sample_a();
    source.field6.clear();
    source.field7.clear();
    source.field8.clear();
    source.field12.clear();
    session(&store, source.clone()).save().unwrap();

    let mut reader = session(&store, sample_a());
    reader.load().unwrap();
    assert_eq!(reader.root(), &source);
}

#[test]
fn test_missing_field_policy_default_keeps_values() {
    let store = memory_store();
    let mut writer = session(&store, sample_a());
    let handle = writer.resolve::<String>("/field1").unwrap();
    writer.save_field(&handle).unwrap();

    let mut seeded = A::default();
    seeded.field3 = 77;
    let mut reader = session(&store, seeded).with_policy(MissingFieldPolicy::Default);
    reader.load().unwrap();
    assert_eq!(reader.root().field1, "value1");
    assert_eq!(reader.root().field3, 77);
}

#[test]
fn test_uuid_tag_reads_row_id() {
    let store = memory_store();
    let mut writer = session(&store, Shelf { books: books(2) });
    writer.save().unwrap();

    let mut reader = session(&store, Shelf::default());
    reader.load().unwrap();
    let shelf = reader.root();
    assert_eq!(shelf.books.len(), 2);
    assert_eq!(shelf.books[1].info.name, "name-1");

    let entries = reader
        .table()
        .get_entries(ConditionOp::Equals, "/books/1/_uuid")
        .unwrap();
    assert_eq!(shelf.books[1].uuid, entries[0].id.to_string());
    assert_ne!(shelf.books[0].uuid, shelf.books[1].uuid);
}
