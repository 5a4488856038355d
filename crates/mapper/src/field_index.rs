//! FieldIndex: path → field identity registry
//!
//! Partial saves and loads address a field by the path it was bound at. The
//! index remembers, for every path visited by a bind, save or load, which
//! Rust type lives there and what shape it has. A [`FieldHandle`] is the
//! typed token callers get back; resolving one checks that the recorded
//! identity matches the requested type before any data moves.

use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use strata_core::path;
use strata_core::{Error, Result, Shape};

use crate::mapped::Mapped;

/// Identity of the field bound at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIdentity {
    type_id: TypeId,
    type_name: &'static str,
    shape: Shape,
}

impl FieldIdentity {
    /// Identity of `T`
    pub fn of<T: Mapped>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            shape: T::SHAPE,
        }
    }

    /// Rust type name, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Shape of the field
    pub fn shape(&self) -> Shape {
        self.shape
    }
}

/// Typed address of a bound field
///
/// Obtained from [`Mapper::bind`](crate::Mapper::bind),
/// [`Mapper::resolve`](crate::Mapper::resolve) and friends. The path is the
/// canonical path the field was bound at; the root record is `""`.
pub struct FieldHandle<T> {
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FieldHandle<T> {
    pub(crate) fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Canonical path of the field
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<T> Clone for FieldHandle<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> PartialEq for FieldHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<T> Eq for FieldHandle<T> {}

impl<T> fmt::Debug for FieldHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHandle")
            .field("path", &self.path)
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// Registry of bound fields keyed by canonical path
#[derive(Debug, Default, Clone)]
pub struct FieldIndex {
    entries: FxHashMap<String, FieldIdentity>,
}

impl FieldIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a `T` lives at `path`
    ///
    /// Re-recording a path replaces its identity.
    pub fn record<T: Mapped>(&mut self, path: &str) {
        self.entries
            .insert(path.to_string(), FieldIdentity::of::<T>());
    }

    /// Bind `value` and everything reachable from it, rooted at `path`
    pub fn bind<T: Mapped>(&mut self, value: &T, path: &str) {
        value.bind_children(self, path);
        self.record::<T>(path);
    }

    /// Bind a record field under `prefix`; fields whose tag normalizes to
    /// nothing are not mapped
    pub fn bind_field<T: Mapped>(&mut self, prefix: &str, tag: &str, value: &T) {
        let tag = path::normalize_tag(tag);
        if tag.is_empty() {
            return;
        }
        self.bind(value, &path::join(prefix, &tag));
    }

    /// Identity recorded at `path`
    pub fn get(&self, path: &str) -> Option<&FieldIdentity> {
        self.entries.get(path)
    }

    /// Whether anything is recorded at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Resolve `path` to a handle for a `T`
    ///
    /// # Errors
    ///
    /// `UnmappedField` if nothing is recorded at `path` or the recorded
    /// identity is not `T`.
    pub fn resolve<T: Mapped>(&self, path: &str) -> Result<FieldHandle<T>> {
        match self.entries.get(path) {
            Some(identity) if *identity == FieldIdentity::of::<T>() => Ok(FieldHandle::new(path)),
            Some(identity) => Err(Error::UnmappedField(format!(
                "{} (bound as {}, requested {})",
                path,
                identity.type_name(),
                type_name::<T>()
            ))),
            None => Err(Error::UnmappedField(path.to_string())),
        }
    }

    /// Number of recorded paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every recorded path
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Recorded paths, in no particular order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
