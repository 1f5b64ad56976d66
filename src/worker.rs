//! Background tree building
//!
//! One worker thread per directory selection walks the root and builds its
//! [`Tree`], reporting progress over an unbounded channel. The foreground
//! drains the channel with [`BuildHandle::poll`] on a timer and never blocks.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::{DumpTreeError, Result};
use crate::settings::ContentSettings;
use crate::tree::Tree;
use crate::walker;

/// Entries between two progress events
const PROGRESS_EVERY: u64 = 64;

/// Progress of a running build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProgress {
    /// Entries inserted so far
    pub processed: u64,
    /// Entries the walk is expected to produce
    pub total: u64,
    /// Human-readable status line
    pub status: String,
}

impl BuildProgress {
    /// Completion in percent, 0 when the total is unknown
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.processed.min(self.total) * 100) / self.total) as u8
    }
}

/// Message sent from the worker to the foreground
#[derive(Debug)]
pub enum BuildEvent {
    /// Periodic progress update
    Progress(BuildProgress),
    /// Last event of a build
    Finished(Result<Tree>),
}

/// A build running on its own thread
pub struct BuildHandle {
    root: PathBuf,
    events: Receiver<BuildEvent>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl BuildHandle {
    /// Start building the tree of `root` in the background
    pub fn spawn(root: &Path, settings: ContentSettings) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        let worker = {
            let root = root.to_path_buf();
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || {
                let result = build(&root, &settings, &cancel, &tx);
                // The receiver is gone when the foreground stopped caring
                let _ = tx.send(BuildEvent::Finished(result));
            })
        };

        Self {
            root: root.to_path_buf(),
            events: rx,
            cancel,
            worker: Some(worker),
            finished: false,
        }
    }

    /// Root directory being built
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Drain every pending event without blocking
    pub fn poll(&mut self) -> Vec<BuildEvent> {
        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if matches!(event, BuildEvent::Finished(_)) {
                        self.finished = true;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.finished {
                        self.finished = true;
                        events.push(BuildEvent::Finished(Err(DumpTreeError::Cancelled)));
                    }
                    break;
                }
            }
        }
        events
    }

    /// Ask the worker to stop at the next entry
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether the final event has been received
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Block until the worker thread exits
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Build worker for {} panicked", self.root.display());
            }
        }
    }
}

impl Drop for BuildHandle {
    fn drop(&mut self) {
        // Detach; a dropped handle only needs the worker to stop early
        self.cancel();
    }
}

fn build(
    root: &Path,
    settings: &ContentSettings,
    cancel: &AtomicBool,
    tx: &Sender<BuildEvent>,
) -> Result<Tree> {
    let root = std::fs::canonicalize(root).map_err(|e| DumpTreeError::from_io(e, root))?;
    let total = walker::count_entries(&root, &settings.ignored_folder_names, Some(cancel))?;
    info!("Building tree of {} ({} entries)", root.display(), total);

    let send = |processed: u64, status: String| {
        let _ = tx.send(BuildEvent::Progress(BuildProgress {
            processed,
            total,
            status,
        }));
    };
    send(0, format!("Scanning {}", root.display()));

    let mut processed = 0;
    let tree = Tree::from_walk_with(&root, settings, Some(cancel), |count, entry| {
        processed = count;
        if count % PROGRESS_EVERY == 0 {
            send(count, format!("Processing {}", entry.relative_path));
        }
    })?;

    send(processed, format!("Found {} entries", processed));
    Ok(tree)
}

/// Serializes directory selections by cancel-and-restart
#[derive(Default)]
pub struct BuildController {
    current: Option<BuildHandle>,
}

impl BuildController {
    /// Controller with no build in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a build of `root`, cancelling any build still in flight
    pub fn start(&mut self, root: &Path, settings: ContentSettings) {
        if let Some(previous) = self.current.take() {
            if !previous.is_finished() {
                debug!("Cancelling build of {}", previous.root().display());
                previous.cancel();
            }
        }
        self.current = Some(BuildHandle::spawn(root, settings));
    }

    /// Events of the current build; events of replaced builds are dropped
    pub fn poll(&mut self) -> Vec<BuildEvent> {
        let Some(handle) = self.current.as_mut() else {
            return Vec::new();
        };
        let events = handle.poll();
        if handle.is_finished() {
            self.current = None;
        }
        events
    }

    /// Whether a build is in flight
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }
}
