/*!
 * In-memory tree built from a directory walk
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::error::{DumpTreeError, Result};
use crate::settings::ContentSettings;
use crate::types::{EntryKind, Node, NodeId, NodeKind};
use crate::walker::{self, WalkEntry};

/// Arena of nodes rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct Tree {
    root_path: PathBuf,
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl Tree {
    /// An empty tree holding only the root directory
    pub fn new(root_path: &Path) -> Self {
        let name = root_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_path.to_string_lossy().into_owned());

        let root = Node {
            name,
            relative_path: String::new(),
            kind: NodeKind::Directory {
                children: Vec::new(),
            },
            parent: None,
        };

        let mut index = HashMap::new();
        index.insert(String::new(), NodeId(0));

        Self {
            root_path: root_path.to_path_buf(),
            nodes: vec![root],
            index,
        }
    }

    /// Build a tree from walker output, in emission order
    pub fn build<I>(root_path: &Path, entries: I) -> Self
    where
        I: IntoIterator<Item = WalkEntry>,
    {
        let mut tree = Self::new(root_path);
        for entry in entries {
            tree.insert(&entry.relative_path, entry.kind);
        }
        tree
    }

    /// Walk `root` with the ignore list from `settings` and build its tree
    ///
    /// Entries that fail to read are logged and skipped. When `cancel` is
    /// raised between two entries the build stops with `Cancelled`.
    pub fn from_walk(
        root: &Path,
        settings: &ContentSettings,
        cancel: Option<&AtomicBool>,
    ) -> Result<Self> {
        Self::from_walk_with(root, settings, cancel, |_, _| {})
    }

    /// Like [`Tree::from_walk`], calling `on_entry` with the running count
    /// after each inserted entry
    pub fn from_walk_with<F>(
        root: &Path,
        settings: &ContentSettings,
        cancel: Option<&AtomicBool>,
        mut on_entry: F,
    ) -> Result<Self>
    where
        F: FnMut(u64, &WalkEntry),
    {
        let root = fs::canonicalize(root).map_err(|e| DumpTreeError::from_io(e, root))?;
        let mut tree = Self::new(&root);
        let mut processed = 0;

        for entry in walker::walk(&root, &settings.ignored_folder_names)? {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!("Build of {} cancelled after {} entries", root.display(), processed);
                return Err(DumpTreeError::Cancelled);
            }
            match entry {
                Ok(entry) => {
                    tree.insert(&entry.relative_path, entry.kind);
                    processed += 1;
                    on_entry(processed, &entry);
                }
                Err(e) => warn!("Skipping entry: {}", e),
            }
        }

        debug!("Built tree of {} nodes for {}", tree.len(), root.display());
        Ok(tree)
    }

    /// Insert a node, creating any missing parent directories first
    ///
    /// Returns the id of the node at `relative_path`; inserting an existing
    /// path returns the existing id unchanged.
    pub fn insert(&mut self, relative_path: &str, kind: EntryKind) -> NodeId {
        if let Some(&id) = self.index.get(relative_path) {
            return id;
        }

        let mut parent = self.root_id();
        let mut path = String::new();
        let segments: Vec<&str> = relative_path.split('/').filter(|s| !s.is_empty()).collect();

        for (i, segment) in segments.iter().enumerate() {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(segment);

            let is_leaf = i + 1 == segments.len();
            parent = match self.index.get(&path) {
                Some(&id) => id,
                None => {
                    let kind = if is_leaf { kind } else { EntryKind::Directory };
                    self.push_child(parent, segment, &path, kind)
                }
            };
        }

        parent
    }

    fn push_child(&mut self, parent: NodeId, name: &str, path: &str, kind: EntryKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let kind = match kind {
            EntryKind::Directory => NodeKind::Directory {
                children: Vec::new(),
            },
            EntryKind::File => NodeKind::File,
        };

        self.nodes.push(Node {
            name: name.to_string(),
            relative_path: path.to_string(),
            kind,
            parent: Some(parent),
        });
        self.index.insert(path.to_string(), id);

        match &mut self.nodes[parent.0].kind {
            NodeKind::Directory { children } => children.push(id),
            // A file cannot gain children; promote it so the path stays reachable
            file @ NodeKind::File => {
                *file = NodeKind::Directory { children: vec![id] };
            }
        }

        id
    }

    /// Id of the root directory
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// The root directory node
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Absolute path of the root on disk
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Node by id
    ///
    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Node at `relative_path`
    pub fn lookup(&self, relative_path: &str) -> Result<&Node> {
        self.id_of(relative_path).map(|id| self.node(id))
    }

    /// Id of the node at `relative_path`
    pub fn id_of(&self, relative_path: &str) -> Result<NodeId> {
        let key = relative_path.trim_matches('/');
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| DumpTreeError::NotFound(relative_path.to_string()))
    }

    /// Child ids of `id`
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Ancestors of `id` from its parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).parent,
        }
    }

    /// Ids in pre-order, children in insertion order
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root_id())
    }

    /// Ids of `start` and all its descendants, in pre-order
    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Location of a node on disk
    pub fn absolute_path(&self, id: NodeId) -> PathBuf {
        let node = self.node(id);
        if node.relative_path.is_empty() {
            return self.root_path.clone();
        }
        node.relative_path
            .split('/')
            .fold(self.root_path.clone(), |path, part| path.join(part))
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root has no children
    pub fn is_empty(&self) -> bool {
        self.root().children().is_empty()
    }

    /// Count of (directories, files), root excluded
    pub fn counts(&self) -> (usize, usize) {
        let dirs = self.nodes.iter().skip(1).filter(|n| n.is_dir()).count();
        (dirs, self.nodes.len() - 1 - dirs)
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.node(id).parent;
        Some(id)
    }
}
