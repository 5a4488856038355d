//! Tier 3: independent sessions sharing one table.
//!
//! Each session has a single writer; sessions on disjoint subtrees may run
//! concurrently because every store call is atomic.

use std::sync::{Arc, Barrier};
use std::thread;

use stratamap::{ConditionOp, KvTable, Mapper, MissingFieldPolicy};

use crate::test_utils::*;

#[test]
fn test_disjoint_sessions_concurrent_saves() {
    let store = memory_store();
    let threads = 4;
    let per_thread = 25;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let mut mapper = Mapper::bind(KvTable::new(store, TABLE), Shelf::default())
                    .with_policy(MissingFieldPolicy::Default);
                let mut shelf = Shelf::default();
                let handle = mapper
                    .load_value(&mut shelf, &format!("/shelves/{}", t))
                    .unwrap();
                assert!(shelf.books.is_empty());

                shelf.books = books(per_thread);
                for book in &mut shelf.books {
                    book.info.siblings = t as i32;
                }
                barrier.wait();
                mapper.save_value(&handle, &shelf).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let table = KvTable::new(store.clone(), TABLE);
    for t in 0..threads {
        let entries = table
            .get_entries(ConditionOp::Includes, &format!("/shelves/{}", t))
            .unwrap();
        // _uuid plus five info fields per book
        assert_eq!(entries.len(), per_thread * 6);

        let mut reader = Mapper::bind(KvTable::new(store.clone(), TABLE), Shelf::default());
        let mut shelf = Shelf::default();
        reader
            .load_value(&mut shelf, &format!("/shelves/{}", t))
            .unwrap();
        assert_eq!(shelf.books.len(), per_thread);
        assert!(shelf.books.iter().all(|b| b.info.siblings == t as i32));
    }
}

#[test]
#[ignore]
fn stress_concurrent_record_sessions() {
    let store = memory_store();
    let threads = 8;
    let rounds = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                let table = KvTable::new(store, format!("Zone_{}", t + 10));
                let mut mapper = Mapper::bind(table, sample_a());
                for round in 0..rounds {
                    mapper.root_mut().field2 = round;
                    mapper.save().unwrap();
                    mapper.load().unwrap();
                    assert_eq!(mapper.root().field2, round);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
