//! StrataMap - nested typed records on a flat key-value table
//!
//! StrataMap persists structs, lists and maps as rows of a single table whose
//! rows are `{path, data}`. Every scalar or folded scalar collection lives at
//! its own logical path, so any subtree of a record can be saved or loaded on
//! its own.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use stratamap::{impl_record, KvTable, Mapper, MemoryStore};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Book {
//!     title: String,
//!     pages: i32,
//! }
//!
//! impl_record!(Book { title => "title", pages => "pages" });
//!
//! # fn main() -> stratamap::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let mut mapper = Mapper::bind(
//!     KvTable::new(store.clone(), "Zone_1"),
//!     Book { title: "Dune".into(), pages: 412 },
//! );
//! mapper.save()?;
//!
//! let mut copy = Mapper::bind(KvTable::new(store, "Zone_1"), Book::default());
//! copy.load()?;
//! assert_eq!(copy.root().title, "Dune");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: path codec, row model, conditions and the `Store` trait
//! - `strata-storage`: in-memory `Store` implementation
//! - `strata-mapper`: record walker, directory tree, field index, sessions

pub use strata_core::{
    decode_bare, decode_elements, Condition, ConditionOp, EncodedPath, Entry, Error, Result, Row,
    RowData, RowId, ScalarKind, Shape, Store, SCALAR_KEY,
};
pub use strata_mapper::{
    impl_record, DirectoryTree, FieldHandle, FieldIdentity, FieldIndex, KvTable, Mapped, Mapper,
    MapperConfig, MissingFieldPolicy, Node, NodeId, Upsert,
};
pub use strata_storage::{MemoryStore, StoreStats};

/// Path helpers: separators, tag normalization, splitting
pub use strata_core::path;
