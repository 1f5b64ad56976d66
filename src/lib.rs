/*!
 * dumptree - Render a directory as an ASCII tree
 *
 * This library walks a directory into an in-memory tree, keeps a tri-state
 * checkbox selection over it, and renders the whole tree or the checked part
 * as text, optionally followed by the contents of eligible files.
 */

pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod policy;
pub mod render;
pub mod report;
pub mod selection;
pub mod settings;
pub mod tree;
pub mod types;
pub mod utils;
pub mod walker;
pub mod worker;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use config::Config;
pub use error::{DumpTreeError, Result};
pub use export::{generate, generate_full, save, ExportStats};
pub use policy::ContentPolicy;
pub use render::{render, render_artifact, Artifact};
pub use selection::{checked_paths, toggle, SelectionState};
pub use settings::ContentSettings;
pub use tree::Tree;
pub use types::{EntryKind, Node, NodeId, NodeKind, Selection};
pub use walker::{walk, WalkEntry};
pub use worker::{BuildController, BuildEvent, BuildHandle, BuildProgress};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
