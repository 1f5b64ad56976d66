//! Global error handling for dumptree
//!
//! This module provides a centralized error type shared by the walker, the
//! tree model, the renderer and the export sinks.

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for dumptree operations
#[derive(Error, Debug)]
pub enum DumpTreeError {
    /// Root directory missing, or a path absent from the tree
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entry could not be read because of its permissions
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// File content is not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Settings rejected at the settings boundary
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Generate was requested with nothing checked
    #[error("Nothing is selected")]
    EmptySelection,

    /// A selection state was used with a tree it was not made for
    #[error("Selection state covers {found} nodes but the tree has {expected}")]
    StaleSelection { expected: usize, found: usize },

    /// A background build was cancelled before it finished
    #[error("Build cancelled")]
    Cancelled,

    /// Clipboard sink errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Directory traversal errors
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Specialized Result type for dumptree operations
pub type Result<T> = std::result::Result<T, DumpTreeError>;

impl DumpTreeError {
    /// Classify an io error raised while touching `path`
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.display().to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.display().to_string()),
            _ => Self::Io(err),
        }
    }
}

// Allow converting DumpTreeError to io::Error for callers that speak io::Result
impl From<DumpTreeError> for io::Error {
    fn from(err: DumpTreeError) -> Self {
        match err {
            DumpTreeError::Io(e) => e,
            other @ DumpTreeError::NotFound(_) => {
                io::Error::new(io::ErrorKind::NotFound, other.to_string())
            }
            other @ DumpTreeError::PermissionDenied(_) => {
                io::Error::new(io::ErrorKind::PermissionDenied, other.to_string())
            }
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

/// Creates a DumpTreeError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::DumpTreeError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
