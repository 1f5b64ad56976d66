/*!
 * Directory walking
 *
 * Produces a lazy, single-pass, depth-first stream of entries below a root,
 * skipping ignored folders entirely.
 */

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path};
use std::sync::atomic::{AtomicBool, Ordering};

use glob_match::glob_match;
use walkdir::{DirEntry, WalkDir};

use crate::error::{DumpTreeError, Result};
use crate::types::EntryKind;

/// Deepest level the walker descends to
pub const MAX_DEPTH: usize = 256;

/// One entry produced by [`walk`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Slash-separated path relative to the walk root
    pub relative_path: String,
    /// Directory or file
    pub kind: EntryKind,
    /// 1 for direct children of the root
    pub depth: usize,
}

type EntryIter = Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + Send>;

/// Lazy iterator over the entries below a root
pub struct Walk {
    root: std::path::PathBuf,
    inner: EntryIter,
}

impl Iterator for Walk {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(classify(e))),
        };

        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Some(Ok(WalkEntry {
            relative_path: relative_path(&self.root, entry.path()),
            kind,
            depth: entry.depth(),
        }))
    }
}

/// Start walking `root`, never descending into folders named in `ignored`
///
/// Fails only when the root itself is missing, not a directory, or
/// unreadable. Errors on individual entries are yielded as `Err` items and
/// the walk carries on past them.
pub fn walk(root: &Path, ignored: &BTreeSet<String>) -> Result<Walk> {
    let metadata = fs::metadata(root).map_err(|e| DumpTreeError::from_io(e, root))?;
    if !metadata.is_dir() {
        return Err(DumpTreeError::from_io(
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            root,
        ));
    }
    fs::read_dir(root).map_err(|e| DumpTreeError::from_io(e, root))?;

    let ignored = ignored.clone();
    let inner = WalkDir::new(root)
        .min_depth(1)
        .max_depth(MAX_DEPTH)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            !(entry.file_type().is_dir() && is_ignored(&entry.file_name().to_string_lossy(), &ignored))
        });

    Ok(Walk {
        root: root.to_path_buf(),
        inner: Box::new(inner),
    })
}

/// Count the entries a walk of `root` will produce
///
/// Stops with `Cancelled` as soon as `cancel` is raised.
pub fn count_entries(
    root: &Path,
    ignored: &BTreeSet<String>,
    cancel: Option<&AtomicBool>,
) -> Result<u64> {
    let mut count = 0;
    for entry in walk(root, ignored)? {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(DumpTreeError::Cancelled);
        }
        if entry.is_ok() {
            count += 1;
        }
    }
    Ok(count)
}

/// Whether a folder name matches one of the ignore names or glob patterns
pub fn is_ignored(name: &str, ignored: &BTreeSet<String>) -> bool {
    ignored
        .iter()
        .any(|pattern| pattern == name || glob_match(pattern, name))
}

/// Slash-normalized path of `path` relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn classify(err: walkdir::Error) -> DumpTreeError {
    if err.loop_ancestor().is_some() {
        return DumpTreeError::Walk(err);
    }
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    match err.io_error().map(io::Error::kind) {
        Some(io::ErrorKind::NotFound) => DumpTreeError::NotFound(path.display().to_string()),
        Some(io::ErrorKind::PermissionDenied) => {
            DumpTreeError::PermissionDenied(path.display().to_string())
        }
        _ => DumpTreeError::Walk(err),
    }
}
