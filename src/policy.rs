/*!
 * Content inlining policy
 *
 * Decides which files get their content appended to an export and reads
 * that content without ever failing the render.
 */

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::settings::{normalize_extension, ContentSettings};
use crate::tree::Tree;
use crate::types::NodeId;
use crate::utils::format_file_size;

/// Bytes sampled when sniffing whether a file is text
const SNIFF_LEN: usize = 8192;

/// Settings-backed predicate over file nodes
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    settings: ContentSettings,
}

impl ContentPolicy {
    /// Create a policy from a snapshot of the settings
    pub fn new(settings: ContentSettings) -> Self {
        Self { settings }
    }

    /// Settings this policy was built from
    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    /// Whether the content of node `id` should be inlined
    ///
    /// Any stat or read failure answers `false`.
    pub fn should_inline(&self, tree: &Tree, id: NodeId) -> bool {
        let node = tree.node(id);
        if !self.settings.include_contents || node.is_dir() {
            return false;
        }

        let allowed = Path::new(&node.name)
            .extension()
            .and_then(|ext| normalize_extension(&ext.to_string_lossy()))
            .is_some_and(|ext| self.settings.allowed_extensions.contains(&ext));
        if !allowed {
            return false;
        }

        let path = tree.absolute_path(id);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() && meta.len() <= self.settings.max_file_size_bytes() => {}
            Ok(meta) => {
                debug!(
                    "Not inlining {} ({})",
                    node.relative_path,
                    format_file_size(meta.len())
                );
                return false;
            }
            Err(e) => {
                debug!("Not inlining {}: {}", node.relative_path, e);
                return false;
            }
        }

        is_text_file(&path)
    }
}

/// Best-effort text sniff over the head of a file
///
/// The sample must be valid UTF-8 (a multi-byte sequence cut by the sample
/// boundary is tolerated) and under 10% control bytes.
pub fn is_text_file(path: &Path) -> bool {
    let mut buffer = vec![0; SNIFF_LEN];
    let read = match File::open(path).and_then(|mut file| file.read(&mut buffer)) {
        Ok(read) => read,
        Err(_) => return false,
    };
    buffer.truncate(read);
    if buffer.is_empty() {
        return true;
    }

    if let Err(e) = std::str::from_utf8(&buffer) {
        // error_len() is None only for a sequence truncated at the end
        if e.error_len().is_some() {
            return false;
        }
    }

    let binary_count = buffer
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    (binary_count as f32 / buffer.len() as f32) < 0.1
}

/// Read a whole file as UTF-8
///
/// Failures come back as a bracketed placeholder instead of an error so the
/// export keeps going.
pub fn read_content(path: &Path) -> String {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => return format!("[Error reading file: {}]", e),
    };
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => format!("[Error decoding file: {}]", e.utf8_error()),
    }
}
