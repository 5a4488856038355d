//! Mapper: a bound root record plus the table it is persisted in
//!
//! ## Lifecycle
//!
//! 1. [`Mapper::bind`] takes ownership of the root record and pre-populates
//!    the [`FieldIndex`] with every path reachable from it
//! 2. [`Mapper::save`] / [`Mapper::load`] move the whole record
//! 3. [`Mapper::save_field`] / [`Mapper::load_field`] move one subtree,
//!    addressed by a [`FieldHandle`]
//!
//! A load issues exactly one prefix select and decodes from the resulting
//! [`DirectoryTree`]. A save issues one upsert per scalar or folded
//! collection.
//!
//! ## Concurrency
//!
//! Every operation takes `&mut self`, so a session has a single writer.
//! Distinct sessions over the same table may interleave; each individual
//! store call is atomic but a multi-row save is not.

use std::sync::Arc;

use tracing::{debug, info};

use strata_core::path;
use strata_core::{ConditionOp, Error, Result, Store};

use crate::config::{MapperConfig, MissingFieldPolicy};
use crate::field_index::{FieldHandle, FieldIndex};
use crate::mapped::Mapped;
use crate::table::KvTable;
use crate::walker::{Decoder, Encoder};

/// Mapping session for a root record of type `R`
#[derive(Debug)]
pub struct Mapper<R: Mapped> {
    table: KvTable,
    index: FieldIndex,
    root: R,
    policy: MissingFieldPolicy,
}

impl<R: Mapped> Mapper<R> {
    /// Bind `root` to `table`
    ///
    /// Every field reachable from `root` is addressable right away, before
    /// any save or load.
    pub fn bind(table: KvTable, root: R) -> Self {
        let mut index = FieldIndex::new();
        index.bind(&root, "");
        info!(table = %table.table(), fields = index.len(), "record bound");
        Self {
            table,
            index,
            root,
            policy: MissingFieldPolicy::default(),
        }
    }

    /// Bind `root` to the shard table named by `config`
    ///
    /// # Errors
    ///
    /// `Config` if the missing-field policy is unknown.
    pub fn with_config(store: Arc<dyn Store>, config: &MapperConfig, root: R) -> Result<Self> {
        let policy = config.missing_field_policy()?;
        Ok(Self::bind(KvTable::from_config(store, config), root).with_policy(policy))
    }

    /// Set the missing-field policy used by loads
    pub fn with_policy(mut self, policy: MissingFieldPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Missing-field policy in effect
    pub fn policy(&self) -> MissingFieldPolicy {
        self.policy
    }

    /// Table the record is persisted in
    ///
    /// Use it for ad-hoc entry operations alongside the record.
    pub fn table(&self) -> &KvTable {
        &self.table
    }

    /// Registry of addressable fields
    pub fn field_index(&self) -> &FieldIndex {
        &self.index
    }

    /// Bound record
    pub fn root(&self) -> &R {
        &self.root
    }

    /// Bound record, mutably
    ///
    /// Call [`rebind`](Self::rebind) after growing a collection of records
    /// if the new elements must be addressable before the next save or load.
    pub fn root_mut(&mut self) -> &mut R {
        &mut self.root
    }

    /// Release the bound record
    pub fn into_inner(self) -> R {
        self.root
    }

    /// Re-populate the field index from the current record
    pub fn rebind(&mut self) {
        self.index.clear();
        self.index.bind(&self.root, "");
    }

    /// Handle to the root record
    pub fn root_handle(&self) -> FieldHandle<R> {
        FieldHandle::new("")
    }

    /// Handle to the field bound at `path`
    ///
    /// # Errors
    ///
    /// `UnmappedField` if nothing of type `T` is bound there.
    pub fn resolve<T: Mapped>(&self, path: &str) -> Result<FieldHandle<T>> {
        self.index.resolve::<T>(path)
    }

    /// Handle to the record field tagged `tag` under `parent`
    pub fn field<T: Mapped, P>(&self, parent: &FieldHandle<P>, tag: &str) -> Result<FieldHandle<T>> {
        let tag = path::normalize_tag(tag);
        if tag.is_empty() {
            return Err(Error::UnmappedField(format!("{}/", parent.path())));
        }
        self.resolve(&path::join(parent.path(), &tag))
    }

    /// Handle to the collection element `segment` (list index or map key)
    /// under `parent`
    pub fn child<T: Mapped, P>(&self, parent: &FieldHandle<P>, segment: &str) -> Result<FieldHandle<T>> {
        self.resolve(&path::join(parent.path(), segment))
    }

    // ========== Save ==========

    /// Persist the whole record
    pub fn save(&mut self) -> Result<()> {
        let mut enc = Encoder::new(&self.table, &mut self.index);
        enc.visit(&self.root, "")?;
        info!(table = %self.table.table(), rows = enc.rows_written(), "record saved");
        Ok(())
    }

    /// Persist the subtree at `handle`
    ///
    /// Only rows at or under the field's path are written.
    ///
    /// # Errors
    ///
    /// `UnmappedField` if the handle does not resolve to a `T` in the
    /// bound record.
    pub fn save_field<T: Mapped>(&mut self, handle: &FieldHandle<T>) -> Result<()> {
        self.index.resolve::<T>(handle.path())?;
        let segments = path::segments(handle.path());
        let value = self
            .root
            .locate(&segments)
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or_else(|| Error::UnmappedField(handle.path().to_string()))?;

        let mut enc = Encoder::new(&self.table, &mut self.index);
        enc.visit(value, handle.path())?;
        debug!(path = handle.path(), rows = enc.rows_written(), "field saved");
        Ok(())
    }

    /// Persist `value` at the path of `handle`
    ///
    /// The value does not have to live in the bound record, but the handle's
    /// path must be bound to a `T`.
    pub fn save_value<T: Mapped>(&mut self, handle: &FieldHandle<T>, value: &T) -> Result<()> {
        self.index.resolve::<T>(handle.path())?;
        let mut enc = Encoder::new(&self.table, &mut self.index);
        enc.visit(value, handle.path())?;
        debug!(path = handle.path(), rows = enc.rows_written(), "value saved");
        Ok(())
    }

    // ========== Load ==========

    /// Overwrite the whole record from the store
    pub fn load(&mut self) -> Result<()> {
        fill(&self.table, &mut self.index, self.policy, &mut self.root, "")?;
        info!(table = %self.table.table(), "record loaded");
        Ok(())
    }

    /// Overwrite the subtree at `handle` from the store
    ///
    /// Fields outside the subtree are left untouched.
    pub fn load_field<T: Mapped>(&mut self, handle: &FieldHandle<T>) -> Result<()> {
        self.index.resolve::<T>(handle.path())?;
        let segments = path::segments(handle.path());
        let target = self
            .root
            .locate_mut(&segments)
            .and_then(|value| value.downcast_mut::<T>())
            .ok_or_else(|| Error::UnmappedField(handle.path().to_string()))?;

        fill(&self.table, &mut self.index, self.policy, target, handle.path())?;
        debug!(path = handle.path(), "field loaded");
        Ok(())
    }

    /// Bind `value` at `prefix`, then load it from the store
    ///
    /// Returns a handle that later partial saves and loads can use.
    ///
    /// # Errors
    ///
    /// `Path` if `prefix` is neither empty nor absolute.
    pub fn load_value<T: Mapped>(&mut self, value: &mut T, prefix: &str) -> Result<FieldHandle<T>> {
        path::validate_prefix(prefix)?;
        self.index.bind(value, prefix);
        fill(&self.table, &mut self.index, self.policy, value, prefix)?;
        debug!(path = prefix, "value loaded");
        Ok(FieldHandle::new(prefix))
    }
}

/// Decode `target` from one prefix select at `prefix`
fn fill<T: Mapped>(
    table: &KvTable,
    index: &mut FieldIndex,
    policy: MissingFieldPolicy,
    target: &mut T,
    prefix: &str,
) -> Result<()> {
    let tree = table.get_tree(ConditionOp::Includes, prefix)?;
    let node = if prefix.is_empty() {
        Some(tree.root())
    } else {
        tree.find(prefix)
    };
    Decoder::new(&tree, index, policy).visit(target, node, prefix)
}
