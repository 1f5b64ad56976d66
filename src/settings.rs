/*!
 * Content and ignore settings, persisted as a flat JSON document
 */

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ensure;
use crate::error::Result;

/// Extensions whose content is inlined when nothing else is configured
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    ".txt", ".py", ".js", ".html", ".css", ".md", ".json", ".xml", ".yaml", ".yml",
];

/// Default size limit for inlined files, in kilobytes
pub const DEFAULT_MAX_FILE_SIZE_KB: u64 = 100;

/// Settings consumed by the walker and the content policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Folder names (or glob patterns) never descended into
    pub ignored_folder_names: BTreeSet<String>,
    /// Append file contents after the tree
    pub include_contents: bool,
    /// Largest file whose content is inlined, in kilobytes
    pub max_file_size_kb: u64,
    /// Extensions eligible for inlining, lowercase with a leading dot
    pub allowed_extensions: BTreeSet<String>,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            ignored_folder_names: BTreeSet::new(),
            include_contents: false,
            max_file_size_kb: DEFAULT_MAX_FILE_SIZE_KB,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ContentSettings {
    /// Size limit in bytes
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }

    /// Reject settings the core cannot work with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_file_size_kb > 0,
            InvalidConfiguration,
            "max_file_size_kb must be greater than zero"
        );
        ensure!(
            self.ignored_folder_names.iter().all(|n| !n.trim().is_empty()),
            InvalidConfiguration,
            "ignored folder names must not be blank"
        );
        Ok(())
    }

    /// Add extensions, normalizing `PY` / `py` / `.py` to `.py`
    pub fn allow_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            if let Some(ext) = normalize_extension(ext.as_ref()) {
                self.allowed_extensions.insert(ext);
            }
        }
    }

    /// Whether `ext` (with or without the dot, any case) is allowed
    pub fn is_extension_allowed(&self, ext: &str) -> bool {
        normalize_extension(ext).is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }

    /// Load settings from `path`, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut settings: Self = serde_json::from_str(&raw)?;
        settings.allowed_extensions = settings
            .allowed_extensions
            .iter()
            .filter_map(|ext| normalize_extension(ext))
            .collect();
        settings.validate()?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Persist settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `<config dir>/dumptree/settings.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        let path = dirs::config_dir().map(|dir| dir.join("dumptree").join("settings.json"));
        if path.is_none() {
            warn!("No configuration directory on this platform");
        }
        path
    }
}

/// Lowercase an extension and give it a leading dot; `None` for blanks
pub fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = ContentSettings::default();
        assert!(!settings.include_contents);
        assert!(settings.ignored_folder_names.is_empty());
        assert_eq!(settings.max_file_size_bytes(), 100 * 1024);
        assert_eq!(settings.allowed_extensions.len(), 10);
        assert!(settings.is_extension_allowed(".yml"));
        assert!(!settings.is_extension_allowed(".png"));
    }

    #[test]
    fn test_extension_normalization() {
        let mut settings = ContentSettings::default();
        settings.allow_extensions(["RS", ".Toml", "  ", "."]);
        assert!(settings.allowed_extensions.contains(".rs"));
        assert!(settings.allowed_extensions.contains(".toml"));
        assert!(settings.is_extension_allowed("TOML"));
        assert_eq!(settings.allowed_extensions.len(), 12);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let settings = ContentSettings {
            max_file_size_kb: 0,
            ..ContentSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = ContentSettings::load_or_default(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, ContentSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = ContentSettings::default();
        settings.include_contents = true;
        settings.max_file_size_kb = 7;
        settings.ignored_folder_names.insert("node_modules".to_string());
        settings.save(&path).unwrap();

        let loaded = ContentSettings::load_or_default(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"include_contents": true, "allowed_extensions": ["RS"]}"#).unwrap();

        let loaded = ContentSettings::load_or_default(&path).unwrap();
        assert!(loaded.include_contents);
        assert_eq!(loaded.max_file_size_kb, DEFAULT_MAX_FILE_SIZE_KB);
        assert_eq!(loaded.allowed_extensions.len(), 1);
        assert!(loaded.allowed_extensions.contains(".rs"));
    }

    #[test]
    fn test_load_rejects_invalid_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"max_file_size_kb": 0}"#).unwrap();
        assert!(ContentSettings::load_or_default(&path).is_err());
    }
}
