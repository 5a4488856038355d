//! Store contract
//!
//! The flat table lives in an external store. This trait is the minimum
//! surface the mapper consumes; transport, transactions and durability are
//! the implementation's concern.

use crate::codec::EncodedPath;
use crate::condition::Condition;
use crate::error::Result;
use crate::row::{Row, RowData, RowId};

/// Flat key-value table collaborator
///
/// The path column is unique per table: inserting a row whose encoded path
/// already exists fails with `Error::DuplicatePath`.
///
/// Thread safety: implementations must be `Send + Sync` so several mapping
/// sessions can share one store.
pub trait Store: Send + Sync {
    /// Insert a row, returning the id the store assigned
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePath` when the path exists, `Transaction` for any
    /// other store failure.
    fn insert(&self, table: &str, path: EncodedPath, data: RowData) -> Result<RowId>;

    /// Replace the data column of every matching row
    ///
    /// Returns the number of rows matched.
    fn update_where(&self, table: &str, condition: &Condition, data: RowData) -> Result<usize>;

    /// Delete every matching row
    ///
    /// Returns the number of rows deleted.
    fn delete_where(&self, table: &str, condition: &Condition) -> Result<usize>;

    /// Select every matching row
    ///
    /// Rows come back in no particular order.
    fn select_where(&self, table: &str, condition: &Condition) -> Result<Vec<Row>>;
}
