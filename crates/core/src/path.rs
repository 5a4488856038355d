//! Logical paths and tag normalization
//!
//! A path is a `/`-delimited sequence of segments addressing a field or a
//! collection entry inside a bound record. Paths produced by the record
//! walker are absolute: the root record lives at the empty prefix and its
//! fields at `/tag`.
//!
//! ## Rules
//!
//! - Row paths must not be empty
//! - Tags never contain the separator: [`normalize_tag`] trims leading and
//!   trailing `/` and replaces embedded `/` with `-`
//! - Prefixes passed to loads are either empty (the root) or absolute

use crate::error::{Error, Result};

/// Path segment separator
pub const SEPARATOR: char = '/';

/// Separator between a segment's position and its name in an encoded path
pub const SET_SEPARATOR: char = ';';

/// Logical key of the directory tree root
pub const ROOT: &str = "/";

/// Reserved tag whose field reads the row id instead of the stored value
pub const RESERVED_ID_TAG: &str = "_uuid";

/// Validate a path used as a row key
///
/// # Examples
///
/// ```
/// use strata_core::path::validate_path;
///
/// assert!(validate_path("/field1").is_ok());
/// assert!(validate_path("Test1/Tenants").is_ok());
/// assert!(validate_path("").is_err());
/// ```
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::path("path cannot be empty"));
    }
    Ok(())
}

/// Validate a load prefix: the empty root prefix or an absolute path
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() || prefix.starts_with(SEPARATOR) {
        Ok(())
    } else {
        Err(Error::path(format!(
            "prefix '{}' must be empty or start with '{}'",
            prefix, SEPARATOR
        )))
    }
}

/// Normalize a field tag so it forms exactly one path segment
///
/// # Examples
///
/// ```
/// use strata_core::path::normalize_tag;
///
/// assert_eq!(normalize_tag("//field//"), "field");
/// assert_eq!(normalize_tag("a/b/c"), "a-b-c");
/// assert_eq!(normalize_tag("/"), "");
/// ```
pub fn normalize_tag(tag: &str) -> String {
    tag.trim_matches(SEPARATOR).replace(SEPARATOR, "-")
}

/// Append a segment to a prefix
pub fn join(prefix: &str, segment: &str) -> String {
    let mut path = String::with_capacity(prefix.len() + segment.len() + 1);
    path.push_str(prefix);
    path.push(SEPARATOR);
    path.push_str(segment);
    path
}

/// Split a path immediately after its final separator
///
/// The directory part keeps its trailing separator and the name part holds
/// no separator. A path without a separator has an empty directory part.
pub fn split(path: &str) -> (&str, &str) {
    match path.rfind(SEPARATOR) {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path),
    }
}

/// Final segment of a path
pub fn last_segment(path: &str) -> &str {
    split(path).1
}

/// Segments of a path below the root
///
/// The leading empty segment of an absolute path is dropped, so `""` and
/// `"/"` both yield no segments.
pub fn segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix(SEPARATOR).unwrap_or(path);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(SEPARATOR).collect()
}
