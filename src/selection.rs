/*!
 * Tri-state checkbox state for a tree
 *
 * The state lives apart from the [`Tree`] so propagation can be driven and
 * tested without any UI. A toggle sets the files of the toggled subtree,
 * derives its directories bottom-up, then walks up its ancestors until one
 * stays the same.
 */

use crate::error::{DumpTreeError, Result};
use crate::tree::Tree;
use crate::types::{NodeId, Selection};

/// Selection of every node in one tree, indexed by node id
///
/// A state belongs to the tree it was created for. A rebuilt tree needs a
/// fresh state; the free functions below refuse a state of another size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    states: Vec<Selection>,
}

impl SelectionState {
    /// All nodes unchecked
    pub fn new(tree: &Tree) -> Self {
        Self {
            states: vec![Selection::Unchecked; tree.len()],
        }
    }

    /// Selection of one node
    ///
    /// Panics if `id` is out of range for the tree this state was made for.
    pub fn get(&self, id: NodeId) -> Selection {
        self.states[id.index()]
    }

    /// Whether this state was sized for `tree`
    pub fn fits(&self, tree: &Tree) -> bool {
        self.states.len() == tree.len()
    }

    /// Fail with `StaleSelection` unless this state was sized for `tree`
    pub fn ensure_fits(&self, tree: &Tree) -> Result<()> {
        if self.fits(tree) {
            Ok(())
        } else {
            Err(DumpTreeError::StaleSelection {
                expected: tree.len(),
                found: self.states.len(),
            })
        }
    }

    /// Whether nothing at all is checked
    pub fn is_empty(&self) -> bool {
        self.states.iter().all(|s| *s == Selection::Unchecked)
    }

    fn put(&mut self, id: NodeId, selection: Selection) {
        self.states[id.index()] = selection;
    }
}

/// Flip the node at `relative_path` and propagate; returns its new selection
///
/// A partial node counts as unchecked, so toggling it checks the whole
/// subtree. A directory with no children cannot be checked and stays
/// unchecked.
pub fn toggle(tree: &Tree, state: &mut SelectionState, relative_path: &str) -> Result<Selection> {
    state.ensure_fits(tree)?;
    let id = tree.id_of(relative_path)?;
    let checked = state.get(id) != Selection::Checked;
    Ok(apply(tree, state, id, checked))
}

/// Check or uncheck the node at `relative_path` and propagate
pub fn set(tree: &Tree, state: &mut SelectionState, relative_path: &str, checked: bool) -> Result<Selection> {
    state.ensure_fits(tree)?;
    let id = tree.id_of(relative_path)?;
    Ok(apply(tree, state, id, checked))
}

/// Check every file and every directory with children
pub fn check_all(tree: &Tree, state: &mut SelectionState) -> Result<()> {
    state.ensure_fits(tree)?;
    apply(tree, state, tree.root_id(), true);
    Ok(())
}

/// Uncheck every node
pub fn clear(tree: &Tree, state: &mut SelectionState) -> Result<()> {
    state.ensure_fits(tree)?;
    apply(tree, state, tree.root_id(), false);
    Ok(())
}

fn apply(tree: &Tree, state: &mut SelectionState, id: NodeId, checked: bool) -> Selection {
    let target = if checked {
        Selection::Checked
    } else {
        Selection::Unchecked
    };

    let subtree = tree.preorder_from(id);
    for &node in &subtree {
        if !tree.node(node).is_dir() {
            state.put(node, target);
        }
    }
    // Children come after their parent in pre-order, so reversed order
    // derives every directory after all of its children
    for &node in subtree.iter().rev() {
        if tree.node(node).is_dir() {
            let derived = derive(tree, state, node);
            state.put(node, derived);
        }
    }

    for ancestor in tree.ancestors(id) {
        let derived = derive(tree, state, ancestor);
        if state.get(ancestor) == derived {
            break;
        }
        state.put(ancestor, derived);
    }

    state.get(id)
}

/// Selection a directory takes from its children; unchecked when it has none
fn derive(tree: &Tree, state: &SelectionState, id: NodeId) -> Selection {
    let children = tree.children(id);
    if children.is_empty() {
        return Selection::Unchecked;
    }

    let checked = children
        .iter()
        .filter(|&&c| state.get(c) == Selection::Checked)
        .count();
    if checked == children.len() {
        return Selection::Checked;
    }

    let unchecked = children
        .iter()
        .filter(|&&c| state.get(c) == Selection::Unchecked)
        .count();
    if unchecked == children.len() {
        Selection::Unchecked
    } else {
        Selection::Partial
    }
}

/// Paths of every checked node in pre-order
///
/// Partial directories are left out while their checked descendants are
/// listed on their own. The root has no path and is never listed. A state
/// sized for another tree yields nothing.
pub fn checked_paths(tree: &Tree, state: &SelectionState) -> Vec<String> {
    if !state.fits(tree) {
        return Vec::new();
    }
    tree.preorder()
        .into_iter()
        .filter(|&id| id != tree.root_id() && state.get(id) == Selection::Checked)
        .map(|id| tree.node(id).relative_path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use crate::walker::WalkEntry;
    use proptest::prelude::*;
    use std::path::Path;

    const PATHS: &[(&str, EntryKind)] = &[
        ("a.txt", EntryKind::File),
        ("empty", EntryKind::Directory),
        ("sub", EntryKind::Directory),
        ("sub/b.txt", EntryKind::File),
        ("sub/deep", EntryKind::Directory),
        ("sub/deep/c.txt", EntryKind::File),
        ("sub/deep/d.txt", EntryKind::File),
    ];

    fn sample() -> Tree {
        Tree::build(
            Path::new("/proj"),
            PATHS.iter().map(|(p, k)| WalkEntry {
                relative_path: p.to_string(),
                kind: *k,
                depth: p.split('/').count(),
            }),
        )
    }

    fn sel(tree: &Tree, state: &SelectionState, path: &str) -> Selection {
        state.get(tree.id_of(path).unwrap())
    }

    fn assert_directories_derived(tree: &Tree, state: &SelectionState) {
        for id in tree.preorder() {
            if tree.node(id).is_dir() {
                assert_eq!(
                    state.get(id),
                    derive(tree, state, id),
                    "directory {:?}",
                    tree.node(id).relative_path
                );
            }
        }
    }

    #[test]
    fn test_toggle_leaf_makes_parents_partial() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);

        assert_eq!(toggle(&tree, &mut state, "sub/deep/c.txt").unwrap(), Selection::Checked);
        assert_eq!(sel(&tree, &state, "sub/deep"), Selection::Partial);
        assert_eq!(sel(&tree, &state, "sub"), Selection::Partial);
        assert_eq!(sel(&tree, &state, ""), Selection::Partial);

        toggle(&tree, &mut state, "sub/deep/d.txt").unwrap();
        assert_eq!(sel(&tree, &state, "sub/deep"), Selection::Checked);
        assert_eq!(sel(&tree, &state, "sub"), Selection::Partial);
    }

    #[test]
    fn test_toggle_directory_sets_descendants() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);

        toggle(&tree, &mut state, "sub").unwrap();
        for path in ["sub", "sub/b.txt", "sub/deep", "sub/deep/c.txt", "sub/deep/d.txt"] {
            assert_eq!(sel(&tree, &state, path), Selection::Checked, "{}", path);
        }
        assert_eq!(sel(&tree, &state, "a.txt"), Selection::Unchecked);
        assert_eq!(sel(&tree, &state, ""), Selection::Partial);
    }

    #[test]
    fn test_partial_toggles_to_checked() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);

        toggle(&tree, &mut state, "sub/b.txt").unwrap();
        assert_eq!(sel(&tree, &state, "sub"), Selection::Partial);

        assert_eq!(toggle(&tree, &mut state, "sub").unwrap(), Selection::Checked);
        assert_eq!(sel(&tree, &state, "sub/deep/c.txt"), Selection::Checked);
    }

    #[test]
    fn test_empty_directory_cannot_be_checked() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);

        assert_eq!(toggle(&tree, &mut state, "empty").unwrap(), Selection::Unchecked);
        assert_eq!(sel(&tree, &state, "empty"), Selection::Unchecked);
        assert_eq!(sel(&tree, &state, ""), Selection::Unchecked);
        assert!(checked_paths(&tree, &state).is_empty());

        check_all(&tree, &mut state).unwrap();
        assert_eq!(sel(&tree, &state, "empty"), Selection::Unchecked);
        assert_eq!(sel(&tree, &state, "sub"), Selection::Checked);
        assert_eq!(sel(&tree, &state, ""), Selection::Partial);
        assert_directories_derived(&tree, &state);
    }

    #[test]
    fn test_lone_empty_directory_keeps_parent_unchecked() {
        let tree = Tree::build(
            Path::new("/proj"),
            vec![WalkEntry {
                relative_path: "empty".to_string(),
                kind: EntryKind::Directory,
                depth: 1,
            }],
        );
        let mut state = SelectionState::new(&tree);

        toggle(&tree, &mut state, "empty").unwrap();
        assert_eq!(sel(&tree, &state, "empty"), Selection::Unchecked);
        assert_eq!(sel(&tree, &state, ""), Selection::Unchecked);
        assert!(checked_paths(&tree, &state).is_empty());
        assert_directories_derived(&tree, &state);
    }

    #[test]
    fn test_state_from_other_tree_is_refused() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);
        let smaller = Tree::new(Path::new("/proj"));

        assert!(!state.fits(&smaller));
        assert!(matches!(
            toggle(&smaller, &mut state, ""),
            Err(DumpTreeError::StaleSelection { expected: 1, found: 8 })
        ));
        assert!(set(&smaller, &mut state, "", true).is_err());
        assert!(check_all(&smaller, &mut state).is_err());
        assert!(checked_paths(&smaller, &state).is_empty());
        assert_eq!(state, SelectionState::new(&tree));
    }

    #[test]
    fn test_checked_paths_skip_partial() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);
        assert!(checked_paths(&tree, &state).is_empty());
        assert!(state.is_empty());

        toggle(&tree, &mut state, "a.txt").unwrap();
        toggle(&tree, &mut state, "sub/deep").unwrap();

        assert_eq!(
            checked_paths(&tree, &state),
            vec!["a.txt", "sub/deep", "sub/deep/c.txt", "sub/deep/d.txt"]
        );
    }

    #[test]
    fn test_set_and_clear() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);

        set(&tree, &mut state, "sub/b.txt", true).unwrap();
        set(&tree, &mut state, "sub/b.txt", true).unwrap();
        assert_eq!(sel(&tree, &state, "sub/b.txt"), Selection::Checked);

        clear(&tree, &mut state).unwrap();
        assert_eq!(state, SelectionState::new(&tree));
    }

    #[test]
    fn test_unknown_path() {
        let tree = sample();
        let mut state = SelectionState::new(&tree);
        assert!(toggle(&tree, &mut state, "missing").is_err());
    }

    proptest! {
        #[test]
        fn prop_directories_follow_children(toggles in prop::collection::vec(0..PATHS.len() + 1, 0..24)) {
            let tree = sample();
            let mut state = SelectionState::new(&tree);
            for i in toggles {
                let path = PATHS.get(i).map(|(p, _)| *p).unwrap_or("");
                toggle(&tree, &mut state, path).unwrap();
            }
            assert_directories_derived(&tree, &state);
        }

        #[test]
        fn prop_double_toggle_restores_uniform_subtree(
            i in 0..PATHS.len(),
            start_checked in any::<bool>(),
        ) {
            let tree = sample();
            let mut state = SelectionState::new(&tree);
            if start_checked {
                check_all(&tree, &mut state).unwrap();
            }
            let before = state.clone();

            toggle(&tree, &mut state, PATHS[i].0).unwrap();
            toggle(&tree, &mut state, PATHS[i].0).unwrap();
            prop_assert_eq!(state, before);
        }
    }
}
