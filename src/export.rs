/*!
 * Export of a rendered tree to its sinks
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{DumpTreeError, Result};
use crate::policy::ContentPolicy;
use crate::render::{render_artifact, Artifact};
use crate::selection::{checked_paths, SelectionState};
use crate::tree::Tree;

/// Render only the checked part of `tree`
///
/// Fails with `EmptySelection` when nothing is checked and with
/// `StaleSelection` when `state` was made for another tree.
pub fn generate(tree: &Tree, state: &SelectionState, policy: &ContentPolicy) -> Result<Artifact> {
    state.ensure_fits(tree)?;
    let selected = checked_paths(tree, state);
    if selected.is_empty() {
        return Err(DumpTreeError::EmptySelection);
    }
    info!("Rendering {} checked entries", selected.len());
    Ok(render_artifact(tree, Some(selected.as_slice()), Some(policy)))
}

/// Render the whole of `tree`
pub fn generate_full(tree: &Tree, policy: &ContentPolicy) -> Artifact {
    render_artifact(tree, None, Some(policy))
}

/// Write an artifact as UTF-8 text; the parent directory must exist
pub fn save(text: &str, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| DumpTreeError::from_io(e, path))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    info!("Wrote {} bytes to {}", text.len(), path.display());
    Ok(())
}

/// Size figures of an artifact, for reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Directories drawn in the artifact, root excluded
    pub directories: usize,
    /// Files drawn in the artifact
    pub files: usize,
    /// Files whose content was inlined
    pub inlined_files: usize,
    /// Lines in the whole artifact
    pub total_lines: usize,
    /// Characters in the whole artifact
    pub total_chars: usize,
}

impl ExportStats {
    /// Measure an artifact; a filtered one only counts what it drew
    pub fn new(artifact: &Artifact) -> Self {
        Self {
            directories: artifact.directories,
            files: artifact.files,
            inlined_files: artifact.inlined.len(),
            total_lines: artifact.text.lines().count(),
            total_chars: artifact.text.chars().count(),
        }
    }
}
