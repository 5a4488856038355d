//! KvTable: path-keyed entry API over one store table
//!
//! ## Design
//!
//! KvTable is a stateless facade over a [`Store`]. It holds no in-memory
//! state beyond an `Arc<dyn Store>` reference and the table name, so clones
//! are cheap and all state lives in the store.
//!
//! ## API
//!
//! - `insert_entry(path, value)` - Insert; fails if the path exists
//! - `set_entry(path, value)` - Update-then-insert upsert
//! - `delete_entries(op, path)` - Delete rows matching a path condition
//! - `get_entries(op, path)` - Read rows matching a path condition
//! - `get_tree(op, path)` - Read matching rows as a [`DirectoryTree`]
//!
//! Each call is exactly one store round trip, except upserts that miss,
//! which take two.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use strata_core::path;
use strata_core::{
    Condition, ConditionOp, EncodedPath, Entry, Error, Result, Row, RowData, RowId, Store,
};

use crate::config::MapperConfig;
use crate::tree::DirectoryTree;

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The existing row was overwritten
    Updated,
    /// No row existed; one was inserted
    Inserted(RowId),
}

/// Entry API over a single table
///
/// # Example
///
/// ```ignore
/// let table = KvTable::new(store, "Zone_1");
/// table.set_entry("Test1/Tenants/Foo", "bar")?;
/// let entries = table.get_entries(ConditionOp::Includes, "Test1")?;
/// ```
#[derive(Clone)]
pub struct KvTable {
    store: Arc<dyn Store>,
    table: String,
}

impl KvTable {
    /// Create a facade over `table`
    pub fn new(store: Arc<dyn Store>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Create a facade over the configured shard table
    pub fn from_config(store: Arc<dyn Store>, config: &MapperConfig) -> Self {
        Self::new(store, config.shard_table())
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    // ========== Writes ==========

    /// Insert a scalar row
    ///
    /// # Errors
    ///
    /// `Path` for an empty path, `DuplicatePath` if a row already holds it.
    pub fn insert_entry(&self, path: &str, value: impl Into<String>) -> Result<RowId> {
        self.insert_data(path, RowData::scalar(value))
    }

    /// Insert a row holding a whole mapping
    pub fn insert_entry_map(&self, path: &str, map: BTreeMap<String, String>) -> Result<RowId> {
        self.insert_data(path, RowData::from_map(map))
    }

    /// Upsert a scalar row
    ///
    /// Tries an update by exact path first and inserts only if nothing
    /// matched. Repeating the call with the same value is idempotent.
    ///
    /// # Errors
    ///
    /// `MultiMatch` if the update hit more than one row.
    pub fn set_entry(&self, path: &str, value: impl Into<String>) -> Result<Upsert> {
        self.set_data(path, RowData::scalar(value))
    }

    /// Upsert a row holding a whole mapping
    pub fn set_entry_map(&self, path: &str, map: BTreeMap<String, String>) -> Result<Upsert> {
        self.set_data(path, RowData::from_map(map))
    }

    /// Delete rows matching `op` against `path`
    ///
    /// Returns the number of rows removed. Deleting nothing is not an error.
    pub fn delete_entries(&self, op: ConditionOp, path: &str) -> Result<usize> {
        let condition = Condition::new(op, path);
        let count = self.store.delete_where(&self.table, &condition)?;
        debug!(table = %self.table, %condition, count, "entries deleted");
        Ok(count)
    }

    // ========== Reads ==========

    /// Rows matching `op` against `path`, in store order
    pub fn get_rows(&self, op: ConditionOp, path: &str) -> Result<Vec<Row>> {
        let condition = Condition::new(op, path);
        let rows = self.store.select_where(&self.table, &condition)?;
        debug!(table = %self.table, %condition, count = rows.len(), "rows selected");
        Ok(rows)
    }

    /// Entries matching `op` against `path`
    ///
    /// Folded rows are returned with an empty value.
    pub fn get_entries(&self, op: ConditionOp, path: &str) -> Result<Vec<Entry>> {
        self.get_rows(op, path)?
            .iter()
            .map(Row::to_entry)
            .collect()
    }

    /// Rows matching `op` against `path`, arranged as a directory tree
    pub fn get_tree(&self, op: ConditionOp, path: &str) -> Result<DirectoryTree> {
        DirectoryTree::from_rows(self.get_rows(op, path)?)
    }

    fn insert_data(&self, path: &str, data: RowData) -> Result<RowId> {
        let encoded = EncodedPath::encode_key(path)?;
        let id = self.store.insert(&self.table, encoded, data)?;
        debug!(table = %self.table, path, %id, "entry inserted");
        Ok(id)
    }

    fn set_data(&self, path: &str, data: RowData) -> Result<Upsert> {
        path::validate_path(path)?;
        let condition = Condition::equals(path);
        match self.store.update_where(&self.table, &condition, data.clone())? {
            0 => {
                let id = self.insert_data(path, data)?;
                Ok(Upsert::Inserted(id))
            }
            1 => {
                debug!(table = %self.table, path, "entry updated");
                Ok(Upsert::Updated)
            }
            count => {
                warn!(table = %self.table, path, count, "update matched more than one row");
                Err(Error::MultiMatch {
                    path: path.to_string(),
                    count,
                })
            }
        }
    }
}

impl std::fmt::Debug for KvTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvTable").field("table", &self.table).finish()
    }
}
