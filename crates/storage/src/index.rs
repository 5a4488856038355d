//! Secondary indices for path conditions
//!
//! This module provides the indices a table keeps next to its rows so that
//! conditions do not scan the whole table:
//! - PathIndex: Maps EncodedPath → RowId, the unique constraint on the path column
//! - ElementIndex: Maps path element → Set<RowId> for `includes` queries

use rustc_hash::{FxHashMap, FxHashSet};
use strata_core::{EncodedPath, RowId};

/// Unique index: EncodedPath → RowId
///
/// Enforces one row per logical path and answers `==` conditions in O(1).
#[derive(Debug, Default)]
pub struct PathIndex {
    index: FxHashMap<EncodedPath, RowId>,
}

impl PathIndex {
    /// Create a new empty PathIndex
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
        }
    }

    /// Claim a path for a row
    ///
    /// Returns false, leaving the index unchanged, if the path is taken.
    pub fn insert(&mut self, path: EncodedPath, id: RowId) -> bool {
        if self.index.contains_key(&path) {
            return false;
        }
        self.index.insert(path, id);
        true
    }

    /// Release a path
    pub fn remove(&mut self, path: &EncodedPath) {
        self.index.remove(path);
    }

    /// Row holding a path
    pub fn get(&self, path: &EncodedPath) -> Option<RowId> {
        self.index.get(path).copied()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of indexed paths
    pub fn len(&self) -> usize {
        self.index.len()
    }
}

/// Secondary index: path element → RowIds
///
/// An `includes` condition matches the rows present in the posting set of
/// every argument element, so intersecting posting sets answers it without
/// touching unrelated rows.
#[derive(Debug, Default)]
pub struct ElementIndex {
    index: FxHashMap<String, FxHashSet<RowId>>,
}

impl ElementIndex {
    /// Create a new empty ElementIndex
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
        }
    }

    /// Add every element of a row's path
    pub fn insert(&mut self, path: &EncodedPath, id: RowId) {
        for element in path.elements() {
            self.index.entry(element.to_string()).or_default().insert(id);
        }
    }

    /// Remove every element of a row's path
    ///
    /// Empty posting sets are dropped to avoid accumulating them.
    pub fn remove(&mut self, path: &EncodedPath, id: RowId) {
        for element in path.elements() {
            if let Some(ids) = self.index.get_mut(element) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.index.remove(element);
                }
            }
        }
    }

    /// Rows whose path contains every element of `path`
    pub fn including(&self, path: &EncodedPath) -> FxHashSet<RowId> {
        let mut postings = Vec::with_capacity(path.len());
        for element in path.elements() {
            match self.index.get(element) {
                Some(ids) => postings.push(ids),
                None => return FxHashSet::default(),
            }
        }
        // intersect starting from the smallest posting set
        postings.sort_by_key(|ids| ids.len());
        let mut iter = postings.into_iter();
        let Some(first) = iter.next() else {
            return FxHashSet::default();
        };
        let rest: Vec<_> = iter.collect();
        first
            .iter()
            .filter(|id| rest.iter().all(|ids| ids.contains(*id)))
            .copied()
            .collect()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
