//! DirectoryTree: query-scoped index over a batch of rows
//!
//! A prefix read returns the rows at or under a path in no particular order.
//! The tree rebuilds the hierarchy those rows describe so the decoder can ask
//! "what is at or under this path":
//!
//! ```text
//! rows: /field1  /field5/subfield1  /field5/subfield2/subfield1
//!
//! /                      (directory)
//! ├── field1             (leaf, row /field1)
//! └── field5             (directory)
//!     ├── subfield1      (leaf)
//!     └── subfield2      (directory)
//!         └── subfield1  (leaf)
//! ```
//!
//! # Design
//!
//! - Nodes live in an arena (`Vec<Node>`) and refer to each other by
//!   [`NodeId`]; a node stores its parent's id instead of a back pointer
//! - A node is a directory iff it has a children table; a leaf wraps exactly
//!   one row and has no children
//! - Trees are built per read and never persisted or shared

use std::collections::BTreeMap;

use tracing::warn;

use strata_core::path::{self, ROOT, SEPARATOR};
use strata_core::{Error, Result, Row, RowId};

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Directory(BTreeMap<String, NodeId>),
    Leaf(Row),
}

/// A directory or leaf node
#[derive(Debug, Clone)]
pub struct Node {
    path: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl Node {
    /// Logical key: a directory's joined path, or a leaf's decoded row path
    pub fn key(&self) -> &str {
        &self.path
    }

    /// Parent directory (None for the root)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// True when the node has a children table
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    /// True when the node wraps a row
    pub fn has_row(&self) -> bool {
        !self.is_dir()
    }

    /// The wrapped row
    pub fn row(&self) -> Option<&Row> {
        match &self.kind {
            NodeKind::Leaf(row) => Some(row),
            NodeKind::Directory(_) => None,
        }
    }

    /// Id of the wrapped row
    pub fn row_id(&self) -> Option<RowId> {
        self.row().map(|row| row.id)
    }

    /// Scalar value (`"v"` entry) of the wrapped row
    pub fn value(&self) -> Option<&str> {
        self.row().and_then(|row| row.data.value())
    }

    /// Full data mapping of the wrapped row
    pub fn map(&self) -> Option<&BTreeMap<String, String>> {
        self.row().map(|row| row.data.as_map())
    }

    /// Number of children (0 for leaves)
    pub fn child_count(&self) -> usize {
        match &self.kind {
            NodeKind::Directory(children) => children.len(),
            NodeKind::Leaf(_) => 0,
        }
    }
}

/// Arena-backed directory tree
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    nodes: Vec<Node>,
}

impl DirectoryTree {
    /// Create a tree holding only the root directory `/`
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                path: ROOT.to_string(),
                parent: None,
                kind: NodeKind::Directory(BTreeMap::new()),
            }],
        }
    }

    /// Build a tree from rows in any order
    ///
    /// # Errors
    ///
    /// `Path` if a row's path cannot be decoded, `Conflict` if a path is
    /// used both as a directory and as a leaf or appears twice.
    pub fn from_rows<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut tree = Self::new();
        for row in rows {
            tree.insert_row(row)?;
        }
        Ok(tree)
    }

    /// Root directory
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree. Use [`get`](Self::get)
    /// for ids of unknown origin.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Node by id, if it belongs to this tree
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Direct child by segment name
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match &self.get(id)?.kind {
            NodeKind::Directory(children) => children.get(name).copied(),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Direct child whose logical key equals `key`
    pub fn child_by_key(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.children(id)
            .map(|(_, child)| child)
            .find(|child| self.node(*child).key() == key)
    }

    /// Direct children as `(segment name, id)`, in name order
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        let children = match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Directory(children)) => Some(children),
            _ => None,
        };
        children
            .into_iter()
            .flat_map(|map| map.iter().map(|(name, child)| (name.as_str(), *child)))
    }

    /// Depth-first search for the node whose logical key equals `key`
    ///
    /// Returns None when no node matches; absence is not an error.
    pub fn find(&self, key: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if self.node(id).key() == key {
                return Some(id);
            }
            stack.extend(self.children(id).map(|(_, child)| child));
        }
        None
    }

    /// Attach one row, creating intermediate directories on demand
    pub fn insert_row(&mut self, row: Row) -> Result<NodeId> {
        let key = row.key()?;
        let (dir, name) = path::split(&key);
        let dir = dir.strip_suffix(SEPARATOR).unwrap_or(dir);

        let mut current = self.root();
        for component in path::segments(dir) {
            current = self.ensure_dir(current, component)?;
        }
        let name = name.to_string();

        if let Some(existing) = self.child(current, &name) {
            let reason = if self.node(existing).is_dir() {
                "path is both a directory and a leaf"
            } else {
                "path holds more than one row"
            };
            warn!(path = %key, reason, "tree conflict");
            return Err(Error::conflict(key, reason));
        }

        let id = self.push(Node {
            path: key,
            parent: Some(current),
            kind: NodeKind::Leaf(row),
        });
        self.link(current, &name, id);
        Ok(id)
    }

    /// Return the directory `name` under `parent`, creating it if missing
    fn ensure_dir(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        if let Some(existing) = self.child(parent, name) {
            let node = self.node(existing);
            if node.is_dir() {
                return Ok(existing);
            }
            warn!(path = %node.key(), "tree conflict: leaf used as directory");
            return Err(Error::conflict(node.key(), "not a directory"));
        }

        let parent_path = self.node(parent).key();
        let path = if parent_path == ROOT {
            format!("{}{}", ROOT, name)
        } else {
            path::join(parent_path, name)
        };
        let id = self.push(Node {
            path,
            parent: Some(parent),
            kind: NodeKind::Directory(BTreeMap::new()),
        });
        self.link(parent, name, id);
        Ok(id)
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, parent: NodeId, name: &str, child: NodeId) {
        if let NodeKind::Directory(children) = &mut self.nodes[parent.0].kind {
            children.insert(name.to_string(), child);
        }
    }
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}
