//! Row model for the flat table
//!
//! This module defines the foundational row types:
//! - RowId: Identifier the store assigns to a row
//! - RowData: The string→string mapping held in a row's data column
//! - Row: `{id, path, data}` as returned by a select
//! - Entry: A decoded `{path, value, id}` view of a scalar row

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::codec::EncodedPath;
use crate::error::Result;

/// Key of the single entry in a scalar row
pub const SCALAR_KEY: &str = "v";

/// Identifier of a stored row
///
/// A RowId is a wrapper around a UUID v4 assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(Uuid);

impl RowId {
    /// Create a new random RowId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a RowId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a RowId from its string form
    ///
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Data column of a row
///
/// Either a scalar wrapped as `{"v": value}` or a folded collection holding
/// a whole scalar map or list in one row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowData(BTreeMap<String, String>);

impl RowData {
    /// Wrap a single scalar as `{"v": value}`
    pub fn scalar(value: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(SCALAR_KEY.to_string(), value.into());
        RowData(map)
    }

    /// Wrap a folded mapping
    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        RowData(map)
    }

    /// The scalar value, if this row holds one
    pub fn value(&self) -> Option<&str> {
        self.0.get(SCALAR_KEY).map(String::as_str)
    }

    /// The full mapping
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Consume into the full mapping
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowData {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        RowData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A flat store record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Store-assigned identifier
    pub id: RowId,
    /// Encoded logical path
    pub path: EncodedPath,
    /// Data column
    pub data: RowData,
}

impl Row {
    /// Create a row
    pub fn new(id: RowId, path: EncodedPath, data: RowData) -> Self {
        Self { id, path, data }
    }

    /// Decoded logical path
    pub fn key(&self) -> Result<String> {
        self.path.decode()
    }

    /// Convert to an entry view
    pub fn to_entry(&self) -> Result<Entry> {
        Ok(Entry {
            path: self.key()?,
            value: self.data.value().unwrap_or_default().to_string(),
            id: self.id,
        })
    }
}

/// Decoded view of a row: logical path, scalar value and row id
///
/// Rows holding a folded collection have an empty `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Logical path
    pub path: String,
    /// Scalar value
    pub value: String,
    /// Row id
    pub id: RowId,
}
