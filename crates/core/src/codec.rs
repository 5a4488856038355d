//! Order-preserving path codec
//!
//! The backing store keeps a row's path in a set column. Set columns do not
//! preserve insertion order and can only be filtered by element equality or
//! subset tests, so every segment is stored together with its position:
//!
//! ```text
//! "/tenants/foo/chassis/1"  ->  {"0;", "1;tenants", "2;foo", "3;chassis", "4;1"}
//! ```
//!
//! With positions embedded:
//! - `==` on the encoded set matches exactly one logical path
//! - `includes` with the encoded prefix matches every path at or under it
//! - decoding recovers the segment order from the positions, whatever order
//!   the store hands the elements back in
//!
//! ## Wire form
//!
//! A one-element path serializes as a bare string, any other path as
//! `["set", [elements...]]`, the same atom/set notation OVSDB uses. Both forms
//! deserialize.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::path::{validate_path, SEPARATOR, SET_SEPARATOR};

/// Store-resident representation of a logical path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EncodedPath {
    elements: BTreeSet<String>,
}

impl EncodedPath {
    /// Encode a logical path
    ///
    /// The empty prefix encodes as the single element `"0;"`, which is what
    /// `includes`/`excludes` conditions on the root need. Use
    /// [`EncodedPath::encode_key`] for paths that name a row.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::codec::EncodedPath;
    ///
    /// let encoded = EncodedPath::encode("/field5/subfield1");
    /// assert!(encoded.contains("1;field5"));
    /// assert_eq!(encoded.decode().unwrap(), "/field5/subfield1");
    /// ```
    pub fn encode(path: &str) -> Self {
        let elements = path
            .split(SEPARATOR)
            .enumerate()
            .map(|(pos, segment)| format!("{}{}{}", pos, SET_SEPARATOR, segment))
            .collect();
        EncodedPath { elements }
    }

    /// Encode a path that names a row; the path must not be empty
    pub fn encode_key(path: &str) -> Result<Self> {
        validate_path(path)?;
        Ok(Self::encode(path))
    }

    /// Rebuild an encoded path from raw set elements in any order
    pub fn from_elements<I, S>(elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EncodedPath {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate the raw elements (lexicographic, not positional, order)
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    /// Check whether a raw element is present
    pub fn contains(&self, element: &str) -> bool {
        self.elements.contains(element)
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the set holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True when every element of `other` is in `self`
    pub fn includes(&self, other: &EncodedPath) -> bool {
        other.elements.is_subset(&self.elements)
    }

    /// True when no element of `other` is in `self`
    pub fn excludes(&self, other: &EncodedPath) -> bool {
        self.elements.is_disjoint(&other.elements)
    }

    /// Decode back to the logical path
    pub fn decode(&self) -> Result<String> {
        decode_elements(self.elements())
    }
}

/// Decode a single bare element, the degenerate one-segment form
pub fn decode_bare(element: &str) -> Result<String> {
    decode_elements(std::iter::once(element))
}

/// Decode raw set elements presented in any order
///
/// Positions must be exactly `0..n`: an element without a separator, with a
/// non-numeric or repeated position, or leaving a gap fails with a path
/// error.
pub fn decode_elements<'a, I>(elements: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let parsed = elements
        .into_iter()
        .map(split_element)
        .collect::<Result<Vec<_>>>()?;

    if parsed.is_empty() {
        return Err(Error::path("encoded path has no elements"));
    }

    let mut ordered: Vec<Option<&str>> = vec![None; parsed.len()];
    for (pos, segment) in parsed {
        let slot = ordered.get_mut(pos).ok_or_else(|| {
            Error::path(format!("segment position {} out of range", pos))
        })?;
        if slot.replace(segment).is_some() {
            return Err(Error::path(format!("duplicate segment position {}", pos)));
        }
    }

    let mut path = String::new();
    for (pos, segment) in ordered.into_iter().enumerate() {
        // every slot is filled: n distinct positions all below n
        let segment = segment.ok_or_else(|| Error::path(format!("missing segment {}", pos)))?;
        if pos > 0 {
            path.push(SEPARATOR);
        }
        path.push_str(segment);
    }
    Ok(path)
}

fn split_element(element: &str) -> Result<(usize, &str)> {
    let (pos, segment) = element.split_once(SET_SEPARATOR).ok_or_else(|| {
        Error::path(format!("element '{}' has no position prefix", element))
    })?;
    let pos = pos
        .parse::<usize>()
        .map_err(|_| Error::path(format!("element '{}' has an invalid position", element)))?;
    Ok((pos, segment))
}

impl fmt::Display for EncodedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode() {
            Ok(path) => f.write_str(&path),
            Err(_) => write!(f, "{:?}", self.elements),
        }
    }
}

const SET_TAG: &str = "set";

impl Serialize for EncodedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.elements.len() == 1 {
            if let Some(only) = self.elements.iter().next() {
                return serializer.serialize_str(only);
            }
        }
        (SET_TAG, &self.elements).serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePath {
    Bare(String),
    Set(String, Vec<String>),
}

impl<'de> Deserialize<'de> for EncodedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match WirePath::deserialize(deserializer)? {
            WirePath::Bare(element) => Ok(EncodedPath::from_elements([element])),
            WirePath::Set(tag, elements) if tag == SET_TAG => {
                Ok(EncodedPath::from_elements(elements))
            }
            WirePath::Set(tag, _) => Err(D::Error::custom(format!(
                "expected \"{}\" tag, found \"{}\"",
                SET_TAG, tag
            ))),
        }
    }
}
