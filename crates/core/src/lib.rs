//! Core types and traits for StrataMap
//!
//! This crate defines the foundational types used throughout the system:
//! - Error: Error type hierarchy
//! - Path helpers: separators, tag normalization, splitting
//! - EncodedPath: Order-preserving path codec
//! - Row, RowId, RowData, Entry: Flat table rows
//! - Condition: `==` / `includes` / `excludes` on the path column
//! - Shape, ScalarKind: Closed set of value shapes
//! - Store: The table collaborator contract

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod condition;
pub mod error;
pub mod path;
pub mod row;
pub mod shape;
pub mod traits;

pub use codec::{decode_bare, decode_elements, EncodedPath};
pub use condition::{Condition, ConditionOp};
pub use error::{Error, Result};
pub use row::{Entry, Row, RowData, RowId, SCALAR_KEY};
pub use shape::{ScalarKind, Shape};
pub use traits::Store;
