//! MemoryStore: in-process implementation of the table collaborator
//!
//! This module implements the Store trait using:
//! - `BTreeMap<RowId, Row>` per table for row storage
//! - `parking_lot::RwLock` for thread-safe access
//! - `PathIndex` for the unique constraint on the path column
//! - `ElementIndex` so `includes` conditions touch only candidate rows
//! - `AtomicU64` counters for per-operation statistics
//!
//! # Design Notes
//!
//! - **Lazy tables**: a table exists from its first insert; reading an
//!   unknown table yields no rows
//! - **Unordered results**: selects return rows in row-id order, which is
//!   random with respect to paths, matching a store whose set columns carry
//!   no order
//! - **Atomic operations**: each call holds the write lock for its whole
//!   duration, so an update or delete over many rows is all-or-nothing

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use strata_core::{
    Condition, ConditionOp, EncodedPath, Error, Result, Row, RowData, RowId, Store,
};

use crate::index::{ElementIndex, PathIndex};

/// One table: rows plus their indices
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<RowId, Row>,
    paths: PathIndex,
    elements: ElementIndex,
}

impl Table {
    fn insert(&mut self, path: EncodedPath, data: RowData) -> Result<RowId> {
        let id = RowId::new();
        if !self.paths.insert(path.clone(), id) {
            return Err(Error::DuplicatePath(path.to_string()));
        }
        self.elements.insert(&path, id);
        self.rows.insert(id, Row::new(id, path, data));
        Ok(id)
    }

    fn matching(&self, condition: &Condition) -> Vec<RowId> {
        match condition.op {
            ConditionOp::Equals => self.paths.get(&condition.path).into_iter().collect(),
            ConditionOp::Includes => {
                let mut ids: Vec<RowId> =
                    self.elements.including(&condition.path).into_iter().collect();
                ids.sort();
                ids
            }
            ConditionOp::Excludes => self
                .rows
                .values()
                .filter(|row| condition.matches(&row.path))
                .map(|row| row.id)
                .collect(),
        }
    }

    fn remove(&mut self, id: RowId) -> Option<Row> {
        let row = self.rows.remove(&id)?;
        self.paths.remove(&row.path);
        self.elements.remove(&row.path, id);
        Some(row)
    }
}

/// Per-operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Insert calls
    pub inserts: u64,
    /// Update calls
    pub updates: u64,
    /// Delete calls
    pub deletes: u64,
    /// Select calls
    pub selects: u64,
}

impl StoreStats {
    /// Total round trips
    pub fn total(&self) -> u64 {
        self.inserts + self.updates + self.deletes + self.selects
    }
}

/// In-memory table store
///
/// Thread-safe through `parking_lot::RwLock` and `AtomicU64`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<FxHashMap<String, Table>>,
    inserts: AtomicU64,
    updates: AtomicU64,
    deletes: AtomicU64,
    selects: AtomicU64,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows in a table
    pub fn len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, |t| t.rows.len())
    }

    /// True when a table holds no rows
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Snapshot of the operation counters
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            selects: self.selects.load(Ordering::Relaxed),
        }
    }

    /// Reset the operation counters
    pub fn reset_stats(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.updates.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.selects.store(0, Ordering::Relaxed);
    }
}

impl Store for MemoryStore {
    fn insert(&self, table: &str, path: EncodedPath, data: RowData) -> Result<RowId> {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.write();
        let id = tables.entry(table.to_string()).or_default().insert(path, data)?;
        trace!(table, %id, "row inserted");
        Ok(id)
    }

    fn update_where(&self, table: &str, condition: &Condition, data: RowData) -> Result<usize> {
        self.updates.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.write();
        let Some(t) = tables.get_mut(table) else {
            return Ok(0);
        };
        let ids = t.matching(condition);
        for id in &ids {
            if let Some(row) = t.rows.get_mut(id) {
                row.data = data.clone();
            }
        }
        trace!(table, %condition, count = ids.len(), "rows updated");
        Ok(ids.len())
    }

    fn delete_where(&self, table: &str, condition: &Condition) -> Result<usize> {
        self.deletes.fetch_add(1, Ordering::Relaxed);
        let mut tables = self.tables.write();
        let Some(t) = tables.get_mut(table) else {
            return Ok(0);
        };
        let removed = t
            .matching(condition)
            .into_iter()
            .filter_map(|id| t.remove(id))
            .count();
        trace!(table, %condition, count = removed, "rows deleted");
        Ok(removed)
    }

    fn select_where(&self, table: &str, condition: &Condition) -> Result<Vec<Row>> {
        self.selects.fetch_add(1, Ordering::Relaxed);
        let tables = self.tables.read();
        let Some(t) = tables.get(table) else {
            return Ok(Vec::new());
        };
        Ok(t.matching(condition)
            .into_iter()
            .filter_map(|id| t.rows.get(&id).cloned())
            .collect())
    }
}
