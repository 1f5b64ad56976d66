/*!
 * End-to-end tests for dumptree functionality
 */

use std::fs::{self, File};
use std::io::{self, Write};

use tempfile::tempdir;

use crate::export::{generate, generate_full};
use crate::policy::ContentPolicy;
use crate::render::render;
use crate::selection::{checked_paths, toggle, SelectionState};
use crate::settings::ContentSettings;
use crate::tree::Tree;
use crate::types::Selection;

// Helper function to create a test project below a directory named "proj"
fn setup_test_directory() -> io::Result<(tempfile::TempDir, std::path::PathBuf)> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path().join("proj");

    fs::create_dir_all(root.join("sub"))?;
    fs::create_dir_all(root.join("node_modules").join("left-pad"))?;

    let mut a = File::create(root.join("a.txt"))?;
    write!(a, "hello")?;

    let mut b = File::create(root.join("sub").join("b.txt"))?;
    writeln!(b, "nested file")?;

    let mut pkg = File::create(root.join("node_modules").join("pkg.json"))?;
    writeln!(pkg, "{{}}")?;

    let mut image = File::create(root.join("image.png"))?;
    image.write_all(&[0x89, b'P', b'N', b'G', 0, 0, 0, 0])?;

    Ok((temp_dir, root))
}

fn ignoring_node_modules() -> ContentSettings {
    let mut settings = ContentSettings::default();
    settings.ignored_folder_names.insert("node_modules".to_string());
    settings
}

#[test]
fn test_full_tree_without_ignores() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    let tree = Tree::from_walk(&root, &ContentSettings::default(), None)?;

    let expected = "\
proj/
├── a.txt
├── image.png
├── node_modules
│   ├── left-pad
│   └── pkg.json
└── sub
    └── b.txt
";
    assert_eq!(render(&tree, None, None), expected);
    Ok(())
}

#[test]
fn test_ignored_folder_is_absent() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    let tree = Tree::from_walk(&root, &ignoring_node_modules(), None)?;

    let text = render(&tree, None, None);
    assert!(!text.contains("node_modules"));
    assert!(!text.contains("pkg.json"));
    assert!(tree.lookup("node_modules").is_err());
    Ok(())
}

#[test]
fn test_checked_subset_render() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    let tree = Tree::from_walk(&root, &ignoring_node_modules(), None)?;
    let mut state = SelectionState::new(&tree);

    toggle(&tree, &mut state, "a.txt")?;
    toggle(&tree, &mut state, "sub/b.txt")?;
    assert_eq!(state.get(tree.id_of("sub")?), Selection::Checked);
    assert_eq!(state.get(tree.root_id()), Selection::Partial);

    let policy = ContentPolicy::new(ContentSettings::default());
    let artifact = generate(&tree, &state, &policy)?;
    assert_eq!(artifact.text, "proj/\n├── a.txt\n└── sub\n    └── b.txt\n");
    Ok(())
}

#[test]
fn test_partial_directory_still_drawn() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    fs::write(root.join("sub").join("c.txt"), "other")?;
    let tree = Tree::from_walk(&root, &ignoring_node_modules(), None)?;
    let mut state = SelectionState::new(&tree);

    toggle(&tree, &mut state, "sub/c.txt")?;
    assert_eq!(state.get(tree.id_of("sub")?), Selection::Partial);
    assert_eq!(checked_paths(&tree, &state), vec!["sub/c.txt"]);

    let policy = ContentPolicy::new(ContentSettings::default());
    let artifact = generate(&tree, &state, &policy)?;
    assert_eq!(artifact.text, "proj/\n└── sub\n    └── c.txt\n");
    Ok(())
}

#[test]
fn test_contents_are_appended() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    let mut settings = ignoring_node_modules();
    settings.include_contents = true;

    let tree = Tree::from_walk(&root, &settings, None)?;
    let mut state = SelectionState::new(&tree);
    toggle(&tree, &mut state, "a.txt")?;
    toggle(&tree, &mut state, "image.png")?;

    let artifact = generate(&tree, &state, &ContentPolicy::new(settings))?;
    assert!(artifact
        .text
        .ends_with("\n\n# File Contents\n\n# a.txt\nhello\n"));
    assert_eq!(artifact.inlined, vec!["a.txt"]);
    Ok(())
}

#[test]
fn test_full_export_with_contents() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    let mut settings = ignoring_node_modules();
    settings.include_contents = true;

    let tree = Tree::from_walk(&root, &settings, None)?;
    let artifact = generate_full(&tree, &ContentPolicy::new(settings));

    let expected = "\
proj/
├── a.txt
├── image.png
└── sub
    └── b.txt


# File Contents

# a.txt
hello

# sub/b.txt
nested file

";
    assert_eq!(artifact.text, expected);
    Ok(())
}

#[test]
fn test_rebuild_resets_selection() -> io::Result<()> {
    let (_temp, root) = setup_test_directory()?;
    let settings = ignoring_node_modules();

    let tree = Tree::from_walk(&root, &settings, None)?;
    let mut state = SelectionState::new(&tree);
    toggle(&tree, &mut state, "sub")?;

    fs::write(root.join("sub").join("new.txt"), "new")?;
    let rebuilt = Tree::from_walk(&root, &settings, None)?;
    let fresh = SelectionState::new(&rebuilt);

    assert!(rebuilt.lookup("sub/new.txt").is_ok());
    assert!(fresh.is_empty());
    Ok(())
}
