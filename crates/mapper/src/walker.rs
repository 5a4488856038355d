//! RecordWalker: encoder and decoder state threaded through `Mapped`
//!
//! Both directions walk a value depth-first. Every visited path is recorded
//! in the [`FieldIndex`] so that a later partial save or load can address it.
//!
//! - [`Encoder`] turns values into upserts on a [`KvTable`]
//! - [`Decoder`] reads values back out of a [`DirectoryTree`] built from a
//!   single prefix select

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use strata_core::path::{self, RESERVED_ID_TAG};
use strata_core::{ConditionOp, Error, Result, ScalarKind, Shape};

use crate::config::MissingFieldPolicy;
use crate::field_index::FieldIndex;
use crate::mapped::Mapped;
use crate::table::KvTable;
use crate::tree::{DirectoryTree, NodeId};

/// Write side of the walker
pub struct Encoder<'a> {
    table: &'a KvTable,
    index: &'a mut FieldIndex,
    rows: usize,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(table: &'a KvTable, index: &'a mut FieldIndex) -> Self {
        Self {
            table,
            index,
            rows: 0,
        }
    }

    /// Encode a record field tagged `tag` under `prefix`
    ///
    /// Fields whose tag normalizes to nothing are not mapped.
    pub fn field<T: Mapped>(&mut self, prefix: &str, tag: &str, value: &T) -> Result<()> {
        let tag = path::normalize_tag(tag);
        if tag.is_empty() {
            return Ok(());
        }
        self.visit(value, &path::join(prefix, &tag))
    }

    /// Encode `value` at `path` and record it
    pub fn visit<T: Mapped>(&mut self, value: &T, path: &str) -> Result<()> {
        trace!(path, shape = %T::SHAPE, "encode");
        value.encode(self, path)?;
        self.index.record::<T>(path);
        Ok(())
    }

    /// Upsert a scalar row
    pub fn scalar(&mut self, path: &str, text: String) -> Result<()> {
        self.table.set_entry(path, text)?;
        self.rows += 1;
        Ok(())
    }

    /// Upsert a folded collection row, empty collections included
    pub fn folded(&mut self, path: &str, entries: BTreeMap<String, String>) -> Result<()> {
        self.table.set_entry_map(path, entries)?;
        self.rows += 1;
        Ok(())
    }

    /// Delete stored members of the collection at `path` that are not in
    /// `live`
    ///
    /// `live` holds the full paths of the members about to be written. One
    /// select, then one prefix delete per stale member.
    pub fn prune(&mut self, path: &str, live: &BTreeSet<String>) -> Result<usize> {
        let tree = self.table.get_tree(ConditionOp::Includes, path)?;
        let node = if path.is_empty() {
            Some(tree.root())
        } else {
            tree.find(path)
        };
        let Some(node) = node else {
            return Ok(0);
        };

        let mut removed = 0;
        for (_, child) in tree.children(node) {
            let key = tree.node(child).key();
            if !live.contains(key) {
                removed += self.table.delete_entries(ConditionOp::Includes, key)?;
            }
        }
        if removed > 0 {
            debug!(path, removed, "stale collection rows deleted");
        }
        Ok(removed)
    }

    /// Rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows
    }
}

/// Read side of the walker
pub struct Decoder<'a> {
    tree: &'a DirectoryTree,
    index: &'a mut FieldIndex,
    policy: MissingFieldPolicy,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(
        tree: &'a DirectoryTree,
        index: &'a mut FieldIndex,
        policy: MissingFieldPolicy,
    ) -> Self {
        Self {
            tree,
            index,
            policy,
        }
    }

    /// Tree being decoded
    pub fn tree(&self) -> &DirectoryTree {
        self.tree
    }

    /// Decode a record field tagged `tag` under `prefix`
    ///
    /// `parent` is the record's directory node. The field's node is the
    /// direct child whose key equals the field path.
    pub fn field<T: Mapped>(
        &mut self,
        parent: Option<NodeId>,
        prefix: &str,
        tag: &str,
        value: &mut T,
    ) -> Result<()> {
        let tag = path::normalize_tag(tag);
        if tag.is_empty() {
            return Ok(());
        }
        let path = path::join(prefix, &tag);
        let node = parent.and_then(|parent| self.tree.child_by_key(parent, &path));
        self.visit(value, node, &path)
    }

    /// Decode `value` from `node` and record it at `path`
    pub fn visit<T: Mapped>(&mut self, value: &mut T, node: Option<NodeId>, path: &str) -> Result<()> {
        trace!(path, shape = %T::SHAPE, found = node.is_some(), "decode");
        value.decode(self, node, path)?;
        self.index.record::<T>(path);
        Ok(())
    }

    /// Check that a record's node, if present, is a directory
    pub fn directory(&self, node: Option<NodeId>, path: &str) -> Result<Option<NodeId>> {
        match node {
            Some(id) if !self.tree.node(id).is_dir() => {
                Err(Error::conflict(path, "expected a directory, found a row"))
            }
            other => Ok(other),
        }
    }

    /// Directory children of a record collection as `(node key, id)`
    ///
    /// An absent node is an empty collection: collections of records write
    /// no row of their own.
    pub fn children(&self, node: Option<NodeId>, path: &str) -> Result<Vec<(String, NodeId)>> {
        let Some(id) = self.directory(node, path)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .tree
            .children(id)
            .map(|(_, child)| (self.tree.node(child).key().to_string(), child))
            .collect())
    }

    /// Parse a scalar from its leaf
    ///
    /// Returns None, leaving the target untouched, when the node is absent
    /// and the policy allows it. A string field tagged `_uuid` reads the row
    /// id instead of the stored value.
    pub fn scalar<T: Mapped>(&mut self, node: Option<NodeId>, path: &str) -> Result<Option<T>> {
        let Some(id) = node else {
            return self.missing(path).map(|()| None);
        };
        let node = self.tree.node(id);
        let Some(row) = node.row() else {
            return Err(Error::conflict(path, "expected a row, found a directory"));
        };

        if T::SHAPE == Shape::Scalar(ScalarKind::String)
            && path::last_segment(path) == RESERVED_ID_TAG
        {
            return T::from_scalar(&row.id.to_string(), path).map(Some);
        }

        match row.data.value() {
            Some(raw) => T::from_scalar(raw, path).map(Some),
            None => Err(Error::conflict(path, "row holds no scalar value")),
        }
    }

    /// Folded mapping of a scalar collection's leaf
    pub fn folded(
        &mut self,
        node: Option<NodeId>,
        path: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        let Some(id) = node else {
            return self.missing(path).map(|()| None);
        };
        match self.tree.node(id).map() {
            Some(map) => Ok(Some(map.clone())),
            None => Err(Error::conflict(path, "expected a row, found a directory")),
        }
    }

    fn missing(&self, path: &str) -> Result<()> {
        match self.policy {
            MissingFieldPolicy::Fail => Err(Error::MissingField(path.to_string())),
            MissingFieldPolicy::Default => {
                debug!(path, "field absent, keeping current value");
                Ok(())
            }
        }
    }
}
