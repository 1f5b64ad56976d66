/*!
 * Clipboard sink for rendered trees
 *
 * Pipes the artifact into whichever clipboard command the platform offers.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to run or feed the clipboard command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Clipboard commands, in order of preference within a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    Tmux,
    Wayland,
    Xsel,
    Xclip,
    MacOS,
    Windows,
    Termux,
}

impl Provider {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::MacOS => ("pbcopy", &[]),
            Self::Windows => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }

    fn candidates() -> Vec<Provider> {
        let mut providers = Vec::new();
        if env::var_os("TMUX").is_some() {
            providers.push(Self::Tmux);
        }
        if cfg!(target_os = "macos") {
            providers.push(Self::MacOS);
        } else if cfg!(target_os = "windows") || env::var_os("WSL_DISTRO_NAME").is_some() {
            providers.push(Self::Windows);
        } else if cfg!(target_os = "android") {
            providers.push(Self::Termux);
        } else {
            providers.extend([Self::Wayland, Self::Xsel, Self::Xclip]);
        }
        providers
    }
}

/// Copy `text` to the system clipboard using the first available command
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let provider = Provider::candidates()
        .into_iter()
        .find(|p| command_exists(p.command().0))
        .ok_or(ClipboardError::NoClipboardFound)?;

    let (cmd, args) = provider.command();
    debug!("Copying {} bytes with {}", text.len(), cmd);
    run_with_stdin(cmd, args, text)
}

/// Whether `command` can be found on the `PATH`
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH").is_some_and(|paths| {
        env::split_paths(&paths).any(|dir| Path::new(&dir).join(command).is_file())
    })
}

fn run_with_stdin(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

    child
        .stdin
        .take()
        .ok_or_else(|| ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd)))?
        .write_all(text.as_bytes())?;

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}
