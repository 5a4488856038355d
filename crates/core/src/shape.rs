//! Shape descriptors for mapped values
//!
//! Every value the mapper can persist belongs to one of a closed set of
//! shapes. The walker dispatches on these instead of inspecting values at
//! runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar kinds that can be stored in a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// UTF-8 string, stored verbatim
    String,
    /// 32-bit signed integer, stored in decimal
    Int,
    /// 64-bit signed integer, stored in decimal
    Int64,
    /// Boolean, stored as the literal `true` or `false`
    Bool,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "int",
            ScalarKind::Int64 => "int64",
            ScalarKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Shape of a mapped value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Struct-like value with tagged fields
    Record,
    /// Ordered collection (`Vec`)
    List,
    /// Unordered string-keyed collection
    Map,
    /// Single scalar
    Scalar(ScalarKind),
}

impl Shape {
    /// True for scalar shapes
    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Scalar(_))
    }

    /// True for list and map shapes
    pub fn is_collection(&self) -> bool {
        matches!(self, Shape::List | Shape::Map)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record => f.write_str("record"),
            Shape::List => f.write_str("list"),
            Shape::Map => f.write_str("map"),
            Shape::Scalar(kind) => write!(f, "scalar({})", kind),
        }
    }
}
