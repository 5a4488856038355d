//! The `Mapped` trait and its implementations
//!
//! A type is persistable when it implements [`Mapped`]. The trait is
//! implemented here for the supported scalars (`String`, `i32`, `i64`,
//! `bool`), for `Vec<T>`, and for string-keyed `BTreeMap`/`HashMap`.
//! Records implement it through [`impl_record!`](crate::impl_record).
//!
//! ## Storage layout
//!
//! | Shape                      | Rows                                          |
//! |----------------------------|-----------------------------------------------|
//! | scalar                     | one row `{"v": text}` at the field path       |
//! | list/map of scalars        | one folded row `{index or key: text}`         |
//! | list/map of records        | one subtree per element under `path/i` or `path/key` |
//! | record                     | one subtree per tagged field                  |
//!
//! Collections of collections are rejected with `UnsupportedShape`.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::BuildHasher;

use strata_core::path::{self, SEPARATOR};
use strata_core::{Error, Result, ScalarKind, Shape};

use crate::field_index::FieldIndex;
use crate::tree::NodeId;
use crate::walker::{Decoder, Encoder};

/// A value the mapper can persist
///
/// Implementations dispatch on [`Shape`]; they never inspect the store
/// directly but go through the [`Encoder`] and [`Decoder`] handed to them.
pub trait Mapped: Default + 'static {
    /// Shape of this type
    const SHAPE: Shape;

    /// Write this value at `path`
    fn encode(&self, enc: &mut Encoder<'_>, path: &str) -> Result<()>;

    /// Overwrite this value from the node at `path`
    ///
    /// `node` is None when the loaded snapshot holds nothing at `path`.
    fn decode(&mut self, dec: &mut Decoder<'_>, node: Option<NodeId>, path: &str) -> Result<()>;

    /// Bind the values reachable below this one
    fn bind_children(&self, _index: &mut FieldIndex, _path: &str) {}

    /// Borrow the value at `segments` below this one
    fn locate(&self, segments: &[&str]) -> Option<&dyn Any> {
        if segments.is_empty() {
            Some(self)
        } else {
            None
        }
    }

    /// Mutably borrow the value at `segments` below this one
    fn locate_mut(&mut self, segments: &[&str]) -> Option<&mut dyn Any> {
        if segments.is_empty() {
            Some(self)
        } else {
            None
        }
    }

    /// Textual form of a scalar; None for every other shape
    fn to_scalar(&self) -> Option<String> {
        None
    }

    /// Parse a scalar from its stored token
    fn from_scalar(_raw: &str, path: &str) -> Result<Self> {
        Err(Error::unsupported(path, format!("{} is not a scalar", Self::SHAPE)))
    }
}

/// True when `segment` is the normalized form of `tag`
#[doc(hidden)]
pub fn tag_matches(tag: &str, segment: &str) -> bool {
    let tag = path::normalize_tag(tag);
    !tag.is_empty() && tag == segment
}

// ============================================================================
// Scalars
// ============================================================================

fn invalid(path: &str, kind: ScalarKind, raw: &str) -> Error {
    Error::InvalidScalar {
        path: path.to_string(),
        kind,
        raw: raw.to_string(),
    }
}

macro_rules! impl_scalar {
    ($ty:ty, $kind:expr, |$raw:ident, $path:ident| $parse:expr) => {
        impl Mapped for $ty {
            const SHAPE: Shape = Shape::Scalar($kind);

            fn encode(&self, enc: &mut Encoder<'_>, path: &str) -> Result<()> {
                enc.scalar(path, self.to_string())
            }

            fn decode(
                &mut self,
                dec: &mut Decoder<'_>,
                node: Option<NodeId>,
                path: &str,
            ) -> Result<()> {
                if let Some(value) = dec.scalar::<Self>(node, path)? {
                    *self = value;
                }
                Ok(())
            }

            fn to_scalar(&self) -> Option<String> {
                Some(self.to_string())
            }

            fn from_scalar($raw: &str, $path: &str) -> Result<Self> {
                $parse
            }
        }
    };
}

impl_scalar!(String, ScalarKind::String, |raw, _path| Ok(raw.to_string()));

impl_scalar!(i32, ScalarKind::Int, |raw, path| raw
    .parse()
    .map_err(|_| invalid(path, ScalarKind::Int, raw)));

impl_scalar!(i64, ScalarKind::Int64, |raw, path| raw
    .parse()
    .map_err(|_| invalid(path, ScalarKind::Int64, raw)));

impl_scalar!(bool, ScalarKind::Bool, |raw, path| match raw {
    "true" => Ok(true),
    "false" => Ok(false),
    _ => Err(invalid(path, ScalarKind::Bool, raw)),
});

// ============================================================================
// Lists
// ============================================================================

fn nested_collection(path: &str, outer: Shape, inner: Shape) -> Error {
    Error::unsupported(path, format!("{} of {}", outer, inner))
}

/// Position encoded in a list element's name
fn list_position(name: &str, len: usize, path: &str) -> Result<usize> {
    match name.parse::<usize>() {
        Ok(i) if i < len => Ok(i),
        _ => Err(Error::path(format!(
            "list element '{}' under '{}' is not an index below {}",
            name, path, len
        ))),
    }
}

impl<T: Mapped> Mapped for Vec<T> {
    const SHAPE: Shape = Shape::List;

    fn encode(&self, enc: &mut Encoder<'_>, path: &str) -> Result<()> {
        match T::SHAPE {
            Shape::Scalar(_) => {
                let mut folded = BTreeMap::new();
                for (i, item) in self.iter().enumerate() {
                    let text = item
                        .to_scalar()
                        .ok_or_else(|| nested_collection(path, Self::SHAPE, T::SHAPE))?;
                    folded.insert(i.to_string(), text);
                }
                enc.folded(path, folded)
            }
            Shape::Record => {
                let paths: Vec<String> = (0..self.len())
                    .map(|i| path::join(path, &i.to_string()))
                    .collect();
                let live: BTreeSet<String> = paths.iter().cloned().collect();
                enc.prune(path, &live)?;
                for (item, item_path) in self.iter().zip(&paths) {
                    enc.visit(item, item_path)?;
                }
                Ok(())
            }
            inner => Err(nested_collection(path, Self::SHAPE, inner)),
        }
    }

    fn decode(&mut self, dec: &mut Decoder<'_>, node: Option<NodeId>, path: &str) -> Result<()> {
        match T::SHAPE {
            Shape::Scalar(_) => {
                let Some(folded) = dec.folded(node, path)? else {
                    return Ok(());
                };
                let mut items: Vec<T> = (0..folded.len()).map(|_| T::default()).collect();
                for (name, raw) in &folded {
                    let i = list_position(name, items.len(), path)?;
                    items[i] = T::from_scalar(raw, &path::join(path, name))?;
                }
                *self = items;
                Ok(())
            }
            Shape::Record => {
                let children = dec.children(node, path)?;
                let mut items: Vec<T> = (0..children.len()).map(|_| T::default()).collect();
                for (key, child) in children {
                    // position comes from the stored path, not from row order
                    let name = path::last_segment(&key);
                    let i = list_position(name, items.len(), path)?;
                    dec.visit(&mut items[i], Some(child), &path::join(path, name))?;
                }
                *self = items;
                Ok(())
            }
            inner => Err(nested_collection(path, Self::SHAPE, inner)),
        }
    }

    fn bind_children(&self, index: &mut FieldIndex, path: &str) {
        if T::SHAPE == Shape::Record {
            for (i, item) in self.iter().enumerate() {
                index.bind(item, &path::join(path, &i.to_string()));
            }
        }
    }

    fn locate(&self, segments: &[&str]) -> Option<&dyn Any> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => self.get(head.parse::<usize>().ok()?)?.locate(rest),
        }
    }

    fn locate_mut(&mut self, segments: &[&str]) -> Option<&mut dyn Any> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => self.get_mut(head.parse::<usize>().ok()?)?.locate_mut(rest),
        }
    }
}

// ============================================================================
// Maps
// ============================================================================

fn check_key(path: &str, key: &str) -> Result<()> {
    if key.contains(SEPARATOR) {
        return Err(Error::path(format!(
            "map key '{}' under '{}' contains '{}'",
            key, path, SEPARATOR
        )));
    }
    Ok(())
}

fn encode_map<'m, T, I>(enc: &mut Encoder<'_>, path: &str, entries: I) -> Result<()>
where
    T: Mapped,
    I: Iterator<Item = (&'m String, &'m T)>,
{
    match T::SHAPE {
        Shape::Scalar(_) => {
            let mut folded = BTreeMap::new();
            for (key, value) in entries {
                let text = value
                    .to_scalar()
                    .ok_or_else(|| nested_collection(path, Shape::Map, T::SHAPE))?;
                folded.insert(key.clone(), text);
            }
            enc.folded(path, folded)
        }
        Shape::Record => {
            let mut members = Vec::new();
            for (key, value) in entries {
                check_key(path, key)?;
                members.push((path::join(path, key), value));
            }
            let live: BTreeSet<String> = members.iter().map(|(p, _)| p.clone()).collect();
            enc.prune(path, &live)?;
            for (member_path, value) in members {
                enc.visit(value, &member_path)?;
            }
            Ok(())
        }
        inner => Err(nested_collection(path, Shape::Map, inner)),
    }
}

/// Decode map entries; None leaves the target untouched
fn decode_map<T: Mapped>(
    dec: &mut Decoder<'_>,
    node: Option<NodeId>,
    path: &str,
) -> Result<Option<Vec<(String, T)>>> {
    match T::SHAPE {
        Shape::Scalar(_) => {
            let Some(folded) = dec.folded(node, path)? else {
                return Ok(None);
            };
            let entries = folded
                .into_iter()
                .map(|(key, raw)| {
                    let value = T::from_scalar(&raw, &path::join(path, &key))?;
                    Ok((key, value))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(entries))
        }
        Shape::Record => {
            let mut entries = Vec::new();
            for (node_key, child) in dec.children(node, path)? {
                let key = path::last_segment(&node_key).to_string();
                let mut value = T::default();
                dec.visit(&mut value, Some(child), &path::join(path, &key))?;
                entries.push((key, value));
            }
            Ok(Some(entries))
        }
        inner => Err(nested_collection(path, Shape::Map, inner)),
    }
}

macro_rules! impl_map {
    ([$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> Mapped for $ty {
            const SHAPE: Shape = Shape::Map;

            fn encode(&self, enc: &mut Encoder<'_>, path: &str) -> Result<()> {
                encode_map(enc, path, self.iter())
            }

            fn decode(
                &mut self,
                dec: &mut Decoder<'_>,
                node: Option<NodeId>,
                path: &str,
            ) -> Result<()> {
                if let Some(entries) = decode_map::<T>(dec, node, path)? {
                    *self = entries.into_iter().collect();
                }
                Ok(())
            }

            fn bind_children(&self, index: &mut FieldIndex, path: &str) {
                if T::SHAPE == Shape::Record {
                    for (key, value) in self.iter() {
                        index.bind(value, &path::join(path, key));
                    }
                }
            }

            fn locate(&self, segments: &[&str]) -> Option<&dyn Any> {
                match segments.split_first() {
                    None => Some(self),
                    Some((head, rest)) => self.get(*head)?.locate(rest),
                }
            }

            fn locate_mut(&mut self, segments: &[&str]) -> Option<&mut dyn Any> {
                match segments.split_first() {
                    None => Some(self),
                    Some((head, rest)) => self.get_mut(*head)?.locate_mut(rest),
                }
            }
        }
    };
}

impl_map!([T: Mapped] BTreeMap<String, T>);
impl_map!([T: Mapped, S: BuildHasher + Default + 'static] HashMap<String, T, S>);
