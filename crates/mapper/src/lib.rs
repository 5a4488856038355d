//! Record mapping for StrataMap
//!
//! This crate moves nested typed records in and out of a flat table:
//! - Mapped: trait for persistable values, with `impl_record!` for structs
//! - Encoder / Decoder: depth-first walker over a record
//! - DirectoryTree: arena tree rebuilt from one prefix select
//! - FieldIndex / FieldHandle: typed addresses for partial saves and loads
//! - KvTable: path-keyed entry API over one table
//! - Mapper: session binding a root record to a table
//! - MapperConfig: TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod field_index;
pub mod mapped;
mod record;
pub mod session;
pub mod table;
pub mod tree;
pub mod walker;

pub use config::{MapperConfig, MissingFieldPolicy, CONFIG_FILE_NAME};
pub use field_index::{FieldHandle, FieldIdentity, FieldIndex};
pub use mapped::{tag_matches, Mapped};
pub use session::Mapper;
pub use table::{KvTable, Upsert};
pub use tree::{DirectoryTree, Node, NodeId};
pub use walker::{Decoder, Encoder};

pub use strata_core::{Error, Result, ScalarKind, Shape};
