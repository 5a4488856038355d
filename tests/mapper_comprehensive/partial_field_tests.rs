//! Tier 1: partial saves and loads addressed by field handles.

use stratamap::{ConditionOp, Error};

use crate::test_utils::*;

#[test]
fn test_save_field_then_load_whole() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    mapper.root_mut().field1 = "value1 changed2".into();
    let handle = mapper.resolve::<String>("/field1").unwrap();
    mapper.save_field(&handle).unwrap();

    let mut reader = session(&store, A::default());
    reader.load().unwrap();
    assert_eq!(reader.root().field1, "value1 changed2");

    mapper.root_mut().field1 = "value1 changed3".into();
    mapper.save_field(&handle).unwrap();
    reader.load().unwrap();
    assert_eq!(reader.root().field1, "value1 changed3");
}

#[test]
fn test_save_field_touches_only_subtree() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    // diverge two fields locally, persist only one of them
    mapper.root_mut().field5.sub_field2.sub_sub_field1 = "changed".into();
    mapper.root_mut().field1 = "not saved".into();
    let root = mapper.root_handle();
    let field5 = mapper.field::<B, _>(&root, "field5").unwrap();

    store.reset_stats();
    mapper.save_field(&field5).unwrap();
    // one upsert per scalar in the subtree
    assert_eq!(store.stats().updates, 2);
    assert_eq!(store.stats().inserts, 0);

    let mut reader = session(&store, A::default());
    reader.load().unwrap();
    assert_eq!(reader.root().field5.sub_field2.sub_sub_field1, "changed");
    assert_eq!(reader.root().field1, "value1");
}

#[test]
fn test_load_field_restores_nested_record() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    mapper.root_mut().field5.sub_field2.sub_sub_field1 = "changed value2".into();
    let handle = mapper.resolve::<B>("/field5").unwrap();
    mapper.load_field(&handle).unwrap();
    assert_eq!(mapper.root().field5.sub_field2.sub_sub_field1, "value1");
}

#[test]
fn test_load_field_inside_list_element() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    mapper.root_mut().field7[1].sub_field2.sub_sub_field1 = "changed value2".into();
    mapper.root_mut().field7[0].sub_field1 = "untouched".into();

    let handle = mapper.resolve::<C>("/field7/1/subfield2").unwrap();
    store.reset_stats();
    mapper.load_field(&handle).unwrap();
    assert_eq!(store.stats().selects, 1);

    assert_eq!(mapper.root().field7[1].sub_field2.sub_sub_field1, "value1-B1");
    assert_eq!(mapper.root().field7[0].sub_field1, "untouched");
}

#[test]
fn test_load_field_scalar() {
    let store = memory_store();
    let mut mapper = session(&store, sample_a());
    mapper.save().unwrap();

    mapper.root_mut().field3 = 0;
    let handle = mapper.resolve::<i64>("/field3").unwrap();
    mapper.load_field(&handle).unwrap();
    assert_eq!(mapper.root().field3, 123);
}

#[test]
fn test_handles_compose_through_collections() {
    let store = memory_store();
    let mapper = session(&store, sample_a());

    let root = mapper.root_handle();
    let field8 = mapper
        .field::<std::collections::BTreeMap<String, B>, _>(&root, "field8")
        .unwrap();
    let entry = mapper.child::<B, _>(&field8, "test 2").unwrap();
    let leaf = mapper.field::<String, _>(&entry, "subfield1").unwrap();
    assert_eq!(leaf.path(), "/field8/test 2/subfield1");

    let list = mapper.field::<Vec<B>, _>(&root, "field7").unwrap();
    let second = mapper.child::<B, _>(&list, "1").unwrap();
    assert_eq!(second.path(), "/field7/1");
}

#[test]
fn test_unbound_paths_are_unmapped() {
    let store = memory_store();
    let mapper = session(&store, sample_a());

    assert!(matches!(
        mapper.resolve::<String>("/field99"),
        Err(Error::UnmappedField(_))
    ));
    // folded collections are addressable only as a whole
    assert!(mapper.resolve::<String>("/field6/0").is_err());
    // wrong type at a bound path
    assert!(mapper.resolve::<i32>("/field3").is_err());
    // tags that normalize to nothing
    let root = mapper.root_handle();
    assert!(mapper.field::<String, _>(&root, "/").is_err());
}

#[test]
fn test_load_value_into_detached_record() {
    let store = memory_store();
    let mut shelf = session(&store, Shelf { books: books(3) });
    shelf.save().unwrap();

    let mut info = Info::default();
    let handle = shelf.load_value(&mut info, "/books/2/info").unwrap();
    assert_eq!(info.name, "name-2");
    assert_eq!(info.siblings, 2);
    assert!(!info.spouse);

    info.phone = "000".into();
    shelf.save_value(&handle, &info).unwrap();

    let mut reader = session(&store, Shelf::default());
    reader.load().unwrap();
    assert_eq!(reader.root().books[2].info.phone, "000");
    assert_eq!(reader.root().books[1].info.phone, "555-0001");
}

#[test]
fn test_partial_save_then_partial_load_many_records() {
    let store = memory_store();
    let mut mapper = session(&store, Shelf { books: books(20) });
    for i in 0..20 {
        let handle = mapper.resolve::<Info>(&format!("/books/{}/info", i)).unwrap();
        mapper.save_field(&handle).unwrap();
    }
    assert!(mapper
        .table()
        .get_rows(ConditionOp::Includes, "/books/0/_uuid")
        .unwrap()
        .is_empty());

    for book in &mut mapper.root_mut().books {
        book.info = Info::default();
    }
    for i in 0..20 {
        let handle = mapper.resolve::<Info>(&format!("/books/{}/info", i)).unwrap();
        mapper.load_field(&handle).unwrap();
    }
    assert_eq!(mapper.root().books[7].info.name, "name-7");
    assert_eq!(mapper.root().books[19].info.birthday, 1_700_000_000_019);
}
