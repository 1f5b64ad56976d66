/*!
 * ASCII tree rendering
 */

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::policy::{read_content, ContentPolicy};
use crate::tree::Tree;
use crate::types::{Node, NodeId};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Heading that separates the tree from inlined file contents
pub const CONTENTS_HEADING: &str = "# File Contents";

/// A tree, or the part of it being rendered
#[derive(Debug)]
enum RenderNode<'a> {
    Directory {
        node: &'a Node,
        children: Vec<RenderNode<'a>>,
    },
    File {
        id: NodeId,
        node: &'a Node,
    },
}

impl RenderNode<'_> {
    fn name(&self) -> &str {
        match self {
            RenderNode::Directory { node, .. } | RenderNode::File { node, .. } => &node.name,
        }
    }
}

/// A rendered export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Tree text, followed by the contents section when there is one
    pub text: String,
    /// Relative paths of the files whose content was inlined, in order
    pub inlined: Vec<String>,
    /// Directories drawn below the root line
    pub directories: usize,
    /// Files drawn
    pub files: usize,
}

/// Render `tree` as text
///
/// With `selected` set only those paths and their ancestors are drawn. With a
/// policy that accepts some of the drawn files, their contents follow the
/// tree under a `# File Contents` heading.
pub fn render(tree: &Tree, selected: Option<&[String]>, policy: Option<&ContentPolicy>) -> String {
    render_artifact(tree, selected, policy).text
}

/// [`render`], also reporting which files were inlined
pub fn render_artifact(
    tree: &Tree,
    selected: Option<&[String]>,
    policy: Option<&ContentPolicy>,
) -> Artifact {
    let keep = selected.map(|paths| keep_set(tree, paths));
    let projected = project(tree, tree.root_id(), keep.as_ref());

    let mut out = format!("{}/\n", tree.root().name);
    let mut files = Vec::new();
    let mut directories = 0;
    if let RenderNode::Directory { children, .. } = &projected {
        write_children(children, "", &mut out, &mut files, &mut directories);
    }

    let blocks = match policy {
        Some(policy) if policy.settings().include_contents => content_blocks(tree, &files, policy),
        _ => Vec::new(),
    };
    if blocks.is_empty() {
        return Artifact {
            text: out,
            inlined: Vec::new(),
            directories,
            files: files.len(),
        };
    }

    let (inlined, blocks): (Vec<String>, Vec<String>) = blocks.into_iter().unzip();
    Artifact {
        text: format!("{}\n\n{}\n\n{}", out, CONTENTS_HEADING, blocks.join("\n")),
        inlined,
        directories,
        files: files.len(),
    }
}

/// Selected nodes plus every ancestor of each
fn keep_set(tree: &Tree, paths: &[String]) -> HashSet<NodeId> {
    let mut keep = HashSet::new();
    for path in paths {
        let Ok(id) = tree.id_of(path) else {
            debug!("Selected path {} is not in the tree", path);
            continue;
        };
        if !keep.insert(id) {
            continue;
        }
        for ancestor in tree.ancestors(id) {
            if !keep.insert(ancestor) {
                break;
            }
        }
    }
    keep
}

fn project<'a>(tree: &'a Tree, id: NodeId, keep: Option<&HashSet<NodeId>>) -> RenderNode<'a> {
    let node = tree.node(id);
    if !node.is_dir() {
        return RenderNode::File { id, node };
    }

    let children = node
        .children()
        .iter()
        .filter(|child| keep.map_or(true, |keep| keep.contains(*child)))
        .map(|&child| project(tree, child, keep))
        .collect();
    RenderNode::Directory { node, children }
}

fn write_children(
    children: &[RenderNode<'_>],
    indent: &str,
    out: &mut String,
    files: &mut Vec<NodeId>,
    directories: &mut usize,
) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();
        out.push_str(indent);
        out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        out.push_str(child.name());
        out.push('\n');

        match child {
            RenderNode::Directory { children, .. } => {
                *directories += 1;
                let indent = format!("{}{}", indent, if is_last { SPACE } else { PIPE });
                write_children(children, &indent, out, files, directories);
            }
            RenderNode::File { id, .. } => files.push(*id),
        }
    }
}

/// Path and `# path\ncontent\n` block of each accepted file, in render order
fn content_blocks(tree: &Tree, files: &[NodeId], policy: &ContentPolicy) -> Vec<(String, String)> {
    files
        .par_iter()
        .filter(|&&id| policy.should_inline(tree, id))
        .filter_map(|&id| {
            let content = read_content(&tree.absolute_path(id));
            if content.trim().is_empty() {
                return None;
            }
            let path = &tree.node(id).relative_path;
            Some((path.clone(), format!("# {}\n{}\n", path, content)))
        })
        .collect()
}
