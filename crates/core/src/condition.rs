//! Path conditions for update, delete and select
//!
//! Conditions always apply to the path column. The operators follow OVSDB
//! set semantics:
//!
//! | Operator | Matches rows whose path set... |
//! |----------|-------------------------------|
//! | `==` | equals the argument |
//! | `includes` | contains every argument element |
//! | `excludes` | contains no argument element |
//!
//! Because every element carries its position, `includes` on an encoded
//! prefix selects the sub-tree at or under that prefix.

use std::fmt;
use std::str::FromStr;

use crate::codec::EncodedPath;
use crate::error::Error;

/// Condition operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOp {
    /// Exact path
    Equals,
    /// Path at or under the argument
    Includes,
    /// Path sharing no segment with the argument
    Excludes,
}

impl ConditionOp {
    /// Wire spelling of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOp::Equals => "==",
            ConditionOp::Includes => "includes",
            ConditionOp::Excludes => "excludes",
        }
    }
}

impl FromStr for ConditionOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(ConditionOp::Equals),
            "includes" => Ok(ConditionOp::Includes),
            "excludes" => Ok(ConditionOp::Excludes),
            other => Err(Error::InvalidCondition(other.to_string())),
        }
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A condition on the path column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Operator
    pub op: ConditionOp,
    /// Encoded argument
    pub path: EncodedPath,
}

impl Condition {
    /// Build a condition from a logical path
    pub fn new(op: ConditionOp, path: &str) -> Self {
        Self {
            op,
            path: EncodedPath::encode(path),
        }
    }

    /// Exact match on a logical path
    pub fn equals(path: &str) -> Self {
        Self::new(ConditionOp::Equals, path)
    }

    /// Prefix match on a logical path
    pub fn includes(path: &str) -> Self {
        Self::new(ConditionOp::Includes, path)
    }

    /// Non-prefix match on a logical path
    pub fn excludes(path: &str) -> Self {
        Self::new(ConditionOp::Excludes, path)
    }

    /// Evaluate against a row's encoded path
    pub fn matches(&self, row_path: &EncodedPath) -> bool {
        match self.op {
            ConditionOp::Equals => row_path == &self.path,
            ConditionOp::Includes => row_path.includes(&self.path),
            ConditionOp::Excludes => row_path.excludes(&self.path),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path {} {}", self.op, self.path)
    }
}
