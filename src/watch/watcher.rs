// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::BuildEvent;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::FileEvent;
use crate::watch::filter::CatalogFilter;
use crate::watch::inventory::{Inventory, SharedInventory};

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("live", &self._inner.is_some())
            .finish()
    }
}

/// Report every catalog file under the watch root, then (when `live`) keep
/// translating file-system notifications into `BuildEvent`s.
///
/// - The initial scan emits `Added` for each relevant file followed by
///   `InitialScanComplete`.
/// - Afterwards an existing relevant file becomes `Added` (unknown) or
///   `Changed` (known), a vanished path becomes `Removed` for itself and
///   every known file below it, and a new directory is scanned for files the
///   inventory has not seen.
///
/// The notify watcher is registered before scanning, so nothing created
/// during the scan is missed.
pub fn spawn_watcher(
    filter: CatalogFilter,
    fs: Arc<dyn FileSystem>,
    inventory: SharedInventory,
    runtime_tx: mpsc::Sender<BuildEvent>,
    live: bool,
) -> Result<WatcherHandle> {
    let root = filter.watch_root().to_path_buf();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let watcher = if live {
        // Closure called synchronously by notify whenever an event arrives.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // We can't log via tracing here easily, so fallback to stderr.
                        eprintln!("catalog-gen: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("catalog-gen: file watch error: {err}");
                }
            },
            Config::default(),
        )
        .map_err(anyhow::Error::from)?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(anyhow::Error::from)?;
        info!("file watcher started on {:?}", root);
        Some(watcher)
    } else {
        drop(event_tx);
        None
    };

    tokio::spawn(async move {
        // Disk walks run on the blocking pool; the inventory lock is only
        // taken to record what they found.
        let found = on_blocking_pool(&fs, &filter, root.clone(), find_catalog_files)
            .await
            .unwrap_or_default();
        let initial = match inventory.lock() {
            Ok(mut inv) => record_unseen(&mut inv, &found),
            Err(_) => Vec::new(),
        };
        debug!(count = initial.len(), "initial scan finished");

        for event in initial {
            if runtime_tx.send(BuildEvent::File(event)).await.is_err() {
                return;
            }
        }
        if runtime_tx.send(BuildEvent::InitialScanComplete).await.is_err() {
            return;
        }

        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for path in &event.paths {
                if is_ignored(&filter, path, &event.kind) {
                    continue;
                }
                let Some(observed) = on_blocking_pool(&fs, &filter, path.clone(), observe).await
                else {
                    continue;
                };
                let changes = match inventory.lock() {
                    Ok(mut inv) => apply_observation(&mut inv, path, observed),
                    Err(_) => {
                        warn!("inventory lock poisoned; stopping watcher");
                        return;
                    }
                };
                for change in changes {
                    if runtime_tx.send(BuildEvent::File(change)).await.is_err() {
                        debug!("runtime gone; stopping watcher loop");
                        return;
                    }
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

async fn on_blocking_pool<T, F>(
    fs: &Arc<dyn FileSystem>,
    filter: &CatalogFilter,
    path: PathBuf,
    work: F,
) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn FileSystem, &CatalogFilter, &Path) -> T + Send + 'static,
{
    let fs = Arc::clone(fs);
    let filter = filter.clone();
    match tokio::task::spawn_blocking(move || work(&*fs, &filter, &path)).await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "file system task failed");
            None
        }
    }
}

/// What a notified path turned out to be on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    CatalogFile,
    OtherFile,
    /// A directory and every relevant file below it.
    Dir(Vec<PathBuf>),
    Gone,
}

/// Events that never change the set of catalog files.
pub fn is_ignored(filter: &CatalogFilter, path: &Path, kind: &EventKind) -> bool {
    matches!(kind, EventKind::Access(_) | EventKind::Modify(ModifyKind::Metadata(_)))
        || filter.is_inside_output(path)
}

/// Look at `path` on disk. Touches no shared state.
pub fn observe(fs: &dyn FileSystem, filter: &CatalogFilter, path: &Path) -> Observed {
    if fs.is_file(path) {
        if filter.accepts(path, true) {
            return Observed::CatalogFile;
        }
        return Observed::OtherFile;
    }
    if fs.is_dir(path) {
        return Observed::Dir(find_catalog_files(fs, filter, path));
    }
    Observed::Gone
}

/// Record an observation of `path` and return the resulting events.
pub fn apply_observation(inventory: &mut Inventory, path: &Path, observed: Observed) -> Vec<FileEvent> {
    match observed {
        Observed::CatalogFile => vec![inventory.upsert(path)],
        Observed::OtherFile => Vec::new(),
        Observed::Dir(files) => record_unseen(inventory, &files),
        // The path itself or a directory that held catalog files.
        Observed::Gone => inventory.remove_under(path),
    }
}

/// Turn one notified path into inventory changes.
pub fn classify_change(
    fs: &dyn FileSystem,
    filter: &CatalogFilter,
    inventory: &mut Inventory,
    path: &Path,
    kind: &EventKind,
) -> Vec<FileEvent> {
    if is_ignored(filter, path, kind) {
        return Vec::new();
    }
    apply_observation(inventory, path, observe(fs, filter, path))
}

/// Every relevant file below `dir`, sorted.
pub fn find_catalog_files(fs: &dyn FileSystem, filter: &CatalogFilter, dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        if !filter.should_descend(&current) {
            continue;
        }
        let entries = match fs.read_dir(&current) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = ?current, error = %err, "cannot read directory during scan");
                continue;
            }
        };
        for path in entries {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if filter.accepts(&path, fs.is_file(&path)) {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}

fn record_unseen(inventory: &mut Inventory, files: &[PathBuf]) -> Vec<FileEvent> {
    let mut events = Vec::new();
    for path in files {
        if !inventory.contains(path) {
            events.push(inventory.upsert(path));
        }
    }
    events
}

/// Walk `dir` and record every relevant file the inventory does not know yet.
pub fn scan_dir(
    fs: &dyn FileSystem,
    filter: &CatalogFilter,
    inventory: &mut Inventory,
    dir: &Path,
) -> Vec<FileEvent> {
    record_unseen(inventory, &find_catalog_files(fs, filter, dir))
}
