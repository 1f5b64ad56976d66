/*!
 * Core types and data structures for dumptree
 */

use std::fmt;

/// Index of a node inside a [`Tree`](crate::tree::Tree) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of a filesystem entry as reported by the walker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory containing other entries
    Directory,
    /// Any non-directory entry
    File,
}

/// Shape of a node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Directory with its children in first-seen order
    Directory { children: Vec<NodeId> },
    /// Leaf file
    File,
}

/// One entry in the in-memory tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Last path component
    pub name: String,
    /// Slash-separated path from the scan root, empty for the root itself
    pub relative_path: String,
    /// Directory or file
    pub kind: NodeKind,
    /// Owning directory, `None` only for the root
    pub parent: Option<NodeId>,
}

impl Node {
    /// Whether this node is a directory
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Child ids, empty for files
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory { children } => children,
            NodeKind::File => &[],
        }
    }

    /// Walker-level kind of this node
    pub fn entry_kind(&self) -> EntryKind {
        if self.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// Tri-state checkbox value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unchecked,
    Checked,
    /// Some but not all descendants are checked
    Partial,
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self {
            Selection::Unchecked => "[ ]",
            Selection::Checked => "[x]",
            Selection::Partial => "[-]",
        };
        f.write_str(mark)
    }
}
