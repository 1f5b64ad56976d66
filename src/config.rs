/*!
 * Configuration handling for dumptree
 */

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::settings::ContentSettings;
use crate::{ensure, error};

/// Verbosity of the log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    /// Matching tracing level, `None` to disable logging
    pub fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

/// Command-line arguments for dumptree
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "dumptree",
    version = env!("CARGO_PKG_VERSION"),
    about = "Render a directory as an ASCII tree, optionally with file contents",
    long_about = "Walks a directory and writes an ASCII tree of it, or of the paths picked with --select, optionally followed by the contents of small text files."
)]
pub struct Args {
    /// Directory to render
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output text file
    #[clap(default_value = "structure.txt")]
    pub output_file: String,

    /// Settings file (defaults to the user configuration directory)
    #[clap(long)]
    pub settings: Option<String>,

    /// Comma-separated folder names (or globs) to skip
    #[clap(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Append the contents of eligible files after the tree
    #[clap(long)]
    pub include_contents: bool,

    /// Largest file whose content is appended, in kilobytes
    #[clap(long)]
    pub max_file_size_kb: Option<u64>,

    /// Comma-separated extensions eligible for inlining (replaces the configured list)
    #[clap(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Path to check, relative to the directory; repeat to check several
    #[clap(long = "select", value_name = "PATH")]
    pub select: Vec<String>,

    /// Copy output to the system clipboard
    #[clap(long)]
    pub clip: bool,

    /// Write the effective settings back to the settings file
    #[clap(long)]
    pub save_settings: bool,

    /// Log verbosity
    #[clap(long, value_enum, default_value_t = LogLevel::default())]
    pub log_level: LogLevel,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory to render
    pub target_dir: PathBuf,

    /// Output file path
    pub output_file: PathBuf,

    /// Where settings were loaded from and are saved to
    pub settings_path: Option<PathBuf>,

    /// Effective content and ignore settings
    pub settings: ContentSettings,

    /// Paths to check before rendering; empty renders the whole tree
    pub select: Vec<String>,

    /// Copy output to clipboard
    pub clip: bool,

    /// Persist the effective settings
    pub save_settings: bool,
}

impl Config {
    /// Create configuration from command-line arguments
    ///
    /// Settings come from the settings file (or defaults) with the flags
    /// applied on top.
    pub fn from_args(args: Args) -> Result<Self> {
        let settings_path = args
            .settings
            .map(PathBuf::from)
            .or_else(ContentSettings::default_path);

        let mut settings = match &settings_path {
            Some(path) => ContentSettings::load_or_default(path)?,
            None => ContentSettings::default(),
        };
        Self::apply_overrides(&mut settings, &args.ignore, args.include_contents, args.max_file_size_kb, &args.extensions);

        Ok(Self {
            target_dir: PathBuf::from(args.directory_path),
            output_file: PathBuf::from(args.output_file),
            settings_path,
            settings,
            select: args.select,
            clip: args.clip,
            save_settings: args.save_settings,
        })
    }

    fn apply_overrides(
        settings: &mut ContentSettings,
        ignore: &[String],
        include_contents: bool,
        max_file_size_kb: Option<u64>,
        extensions: &[String],
    ) {
        settings
            .ignored_folder_names
            .extend(ignore.iter().map(|name| name.trim().to_string()).filter(|n| !n.is_empty()));
        if include_contents {
            settings.include_contents = true;
        }
        if let Some(kb) = max_file_size_kb {
            settings.max_file_size_kb = kb;
        }
        if !extensions.is_empty() {
            settings.allowed_extensions.clear();
            settings.allow_extensions(extensions);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if !self.target_dir.is_dir() {
            return Err(error!(NotFound, "Target directory not found: {}", self.target_dir.display()));
        }

        if let Some(parent) = self.output_file.parent() {
            ensure!(
                parent.as_os_str().is_empty() || parent.exists(),
                NotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        if self.save_settings {
            ensure!(
                self.settings_path.is_some(),
                InvalidConfiguration,
                "No settings file to save to; pass --settings"
            );
        }

        Ok(())
    }
}
