// src/engine/writer.rs

//! Debounced, idempotent writes of generated files.
//!
//! Every request for a path replaces the pending request for that path and
//! restarts its quiet window. Only the request still current when its window
//! elapses touches the disk, and it skips the write when the file already
//! holds the same bytes.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::errors::{CatalogError, Result};
use crate::fs::FileSystem;
use crate::paths::display_relative;

/// How a write request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was (re)written.
    Wrote,
    /// The file already had this content.
    Unchanged,
    /// A later request for the same path, or a cancellation, replaced this
    /// one. No IO happened.
    Superseded,
}

struct PendingEntry {
    ticket: u64,
    cancel: oneshot::Sender<()>,
}

struct WriterInner {
    fs: Arc<dyn FileSystem>,
    window: Duration,
    log_root: PathBuf,
    next_ticket: AtomicU64,
    pending: Mutex<HashMap<PathBuf, PendingEntry>>,
}

#[derive(Clone)]
pub struct DebouncedWriter {
    inner: Arc<WriterInner>,
}

impl fmt::Debug for DebouncedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedWriter")
            .field("window", &self.inner.window)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl DebouncedWriter {
    /// `log_root` only shortens paths in log lines.
    pub fn new(fs: Arc<dyn FileSystem>, window: Duration, log_root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(WriterInner {
                fs,
                window,
                log_root: log_root.into(),
                next_ticket: AtomicU64::new(1),
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Register a write of `content` to `path`, superseding any pending
    /// write for the same path. Nothing happens until the returned
    /// [`PendingWrite`] is settled.
    pub fn schedule(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> PendingWrite {
        let path = path.into();
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::SeqCst);
        let (cancel, cancel_rx) = oneshot::channel();

        if let Ok(mut pending) = self.inner.pending.lock() {
            if let Some(previous) = pending.insert(path.clone(), PendingEntry { ticket, cancel }) {
                debug!(path = %path.display(), "superseding pending write");
                let _ = previous.cancel.send(());
            }
        }

        PendingWrite {
            inner: Arc::clone(&self.inner),
            path,
            content: content.into(),
            ticket,
            cancel_rx,
        }
    }

    /// Write `content` to `path` once the quiet window passes without a newer
    /// request for the same path.
    pub async fn write_if_changed(
        &self,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
    ) -> Result<WriteOutcome> {
        self.schedule(path, content).settle().await
    }

    /// Cancel every pending write whose path satisfies `predicate`. Returns
    /// how many were cancelled.
    pub fn cancel_matching(&self, predicate: impl Fn(&Path) -> bool) -> usize {
        let Ok(mut pending) = self.inner.pending.lock() else {
            return 0;
        };
        let doomed: Vec<PathBuf> = pending.keys().filter(|p| predicate(p)).cloned().collect();
        for path in &doomed {
            if let Some(entry) = pending.remove(path) {
                let _ = entry.cancel.send(());
            }
        }
        if !doomed.is_empty() {
            debug!(count = doomed.len(), "cancelled pending writes");
        }
        doomed.len()
    }

    /// Cancel every pending write at or below `dir`.
    pub fn cancel_under(&self, dir: &Path) -> usize {
        self.cancel_matching(|path| path.starts_with(dir))
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

/// A registered write waiting for its quiet window.
#[must_use = "a pending write does nothing until settled"]
pub struct PendingWrite {
    inner: Arc<WriterInner>,
    path: PathBuf,
    content: Vec<u8>,
    ticket: u64,
    cancel_rx: oneshot::Receiver<()>,
}

impl fmt::Debug for PendingWrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWrite")
            .field("path", &self.path)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl PendingWrite {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait out the window, then write unless superseded or unchanged.
    pub async fn settle(self) -> Result<WriteOutcome> {
        let PendingWrite {
            inner,
            path,
            content,
            ticket,
            mut cancel_rx,
        } = self;

        tokio::select! {
            _ = tokio::time::sleep(inner.window) => {}
            _ = &mut cancel_rx => {
                // Either an explicit cancel or the entry was dropped.
                return Ok(WriteOutcome::Superseded);
            }
        }

        // The window elapsed, but a newer request may have raced in.
        {
            let Ok(mut pending) = inner.pending.lock() else {
                return Ok(WriteOutcome::Superseded);
            };
            match pending.get(&path) {
                Some(entry) if entry.ticket == ticket => {
                    pending.remove(&path);
                }
                _ => return Ok(WriteOutcome::Superseded),
            }
        }

        let fs = Arc::clone(&inner.fs);
        let target = path.clone();
        let outcome = tokio::task::spawn_blocking(move || write_if_different(&*fs, &target, &content))
            .await
            .map_err(|e| CatalogError::Other(anyhow::anyhow!("write task failed: {e}")))??;

        match outcome {
            WriteOutcome::Wrote => {
                info!("Write: {}", display_relative(&inner.log_root, &path));
            }
            WriteOutcome::Unchanged => {
                debug!(path = %path.display(), "content unchanged; skipping write");
            }
            WriteOutcome::Superseded => {}
        }
        Ok(outcome)
    }
}

fn write_if_different(fs: &dyn FileSystem, path: &Path, content: &[u8]) -> Result<WriteOutcome> {
    if let Ok(existing) = fs.read(path) {
        if existing == content {
            return Ok(WriteOutcome::Unchanged);
        }
    }
    fs.write(path, content)
        .map_err(|e| CatalogError::fs(path, e))?;
    Ok(WriteOutcome::Wrote)
}
