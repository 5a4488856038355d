//! Storage layer for StrataMap
//!
//! This crate implements an in-process table store behind the `Store`
//! contract:
//! - MemoryStore: BTreeMap-based rows with RwLock, lazily created tables
//! - PathIndex: unique constraint on the encoded path column
//! - ElementIndex: path element → rows, for `includes` conditions
//! - StoreStats: per-operation round-trip counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod memory;

pub use index::{ElementIndex, PathIndex};
pub use memory::{MemoryStore, StoreStats};
