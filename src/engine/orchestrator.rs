// src/engine/orchestrator.rs

//! Reacts to catalog file events: extracts symbols, writes or removes the
//! generated pages of one file, and keeps the index page in sync with the
//! whole inventory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::engine::generator::{index_page, symbol_page};
use crate::engine::writer::{DebouncedWriter, PendingWrite, WriteOutcome};
use crate::errors::{CatalogError, Result};
use crate::extract::{SymbolExtractor, SymbolReader};
use crate::fs::FileSystem;
use crate::paths::{display_relative, PathMapper, PAGE_FILE_NAME};
use crate::types::{ChangeKind, FileEvent};
use crate::watch::inventory::{Inventory, SharedInventory};

#[derive(Debug)]
pub struct BuildOrchestrator {
    mapper: PathMapper,
    fs: Arc<dyn FileSystem>,
    symbols: SymbolReader,
    writer: DebouncedWriter,
    inventory: SharedInventory,
    project_root: PathBuf,
    index_import: String,
    catalog_path: String,
    /// Highest inventory revision an index regeneration has claimed.
    index_revision: AtomicU64,
    index_gate: Mutex<()>,
}

impl BuildOrchestrator {
    pub fn new(
        settings: &Settings,
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn SymbolExtractor>,
        inventory: SharedInventory,
    ) -> Self {
        let writer = DebouncedWriter::new(fs.clone(), settings.debounce, &settings.project_root);
        Self {
            mapper: settings.mapper(),
            symbols: SymbolReader::new(fs.clone(), extractor),
            fs,
            writer,
            inventory,
            project_root: settings.project_root.clone(),
            index_import: settings.index_import.clone(),
            catalog_path: settings.catalog_path.clone(),
            index_revision: AtomicU64::new(0),
            index_gate: Mutex::new(()),
        }
    }

    pub fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    pub fn writer(&self) -> &DebouncedWriter {
        &self.writer
    }

    pub fn symbols(&self) -> &SymbolReader {
        &self.symbols
    }

    /// Handle one event and log its failure instead of returning it. Used by
    /// the runtime, where an error must never end the session.
    pub async fn handle_logged(&self, event: FileEvent) {
        let path = event.path.clone();
        if let Err(err) = self.handle(event).await {
            match err {
                CatalogError::ExtractionError { .. } | CatalogError::FsError { .. } => {
                    warn!(path = %self.rel(&path), error = %err, "skipping catalog file");
                }
                other => {
                    error!(path = %self.rel(&path), error = %other, "failed to handle catalog file");
                }
            }
        }
    }

    pub async fn handle(&self, event: FileEvent) -> Result<()> {
        debug!(path = %self.rel(&event.path), kind = %event.kind, revision = event.revision, "handling event");
        match event.kind {
            ChangeKind::Added | ChangeKind::Changed => self.on_upsert(event).await,
            ChangeKind::Removed => self.on_remove(event).await,
        }
    }

    async fn on_upsert(&self, event: FileEvent) -> Result<()> {
        let source = event.path;
        let target = self.mapper.target_dir_for(&source)?;
        let symbols = self.symbols.symbols_for_async(source.clone()).await?;

        let (pending, protected) = {
            let inventory = self.lock_inventory()?;
            if inventory.revision_of(&source) != Some(event.revision) {
                debug!(path = %self.rel(&source), "newer event owns this file; stopping");
                return Ok(());
            }
            let protected = self.protected_dirs(&inventory, &source);
            // Pages scheduled by an older event for this file may name symbols
            // that no longer exist.
            self.cancel_pending_under(&target, &protected);

            let pending: Vec<PendingWrite> = symbols
                .iter()
                .map(|symbol| {
                    let dir = target.join(symbol);
                    let content = symbol_page(symbol, &self.mapper.import_path_for(&dir, &source));
                    self.writer.schedule(dir.join(PAGE_FILE_NAME), content)
                })
                .collect();
            (pending, protected)
        };

        // Settle even when pruning fails so no entry lingers in the debounce
        // table.
        let pruned = self.prune_stale(target, symbols, protected).await;
        let settled = settle_all(pending).await;
        pruned?;
        settled?;
        self.regenerate_index().await
    }

    async fn on_remove(&self, event: FileEvent) -> Result<()> {
        let source = event.path;
        let target = self.mapper.target_dir_for(&source)?;

        let protected = {
            let inventory = self.lock_inventory()?;
            if inventory.contains(&source) {
                debug!(path = %self.rel(&source), "file reappeared; keeping its pages");
                return Ok(());
            }
            let protected = self.protected_dirs(&inventory, &source);
            self.cancel_pending_under(&target, &protected);
            protected
        };

        self.symbols.invalidate(&source);
        self.prune_stale(target.clone(), Vec::new(), protected).await?;
        let fs = Arc::clone(&self.fs);
        let output_root = self.mapper.output_root().to_path_buf();
        let dir = target.clone();
        self.blocking(move || remove_empty_dirs(&*fs, &dir, &output_root))
            .await?;
        info!("Delete: {}", self.rel(&target));

        // Recreated while its directories were being removed.
        let revision = self.lock_inventory()?.revision_of(&source);
        if let Some(revision) = revision {
            debug!(path = %self.rel(&source), "file reappeared during removal; rebuilding its pages");
            return self
                .on_upsert(FileEvent::new(source, ChangeKind::Changed, revision))
                .await;
        }
        self.regenerate_index().await
    }

    /// Rebuild the index page from the current inventory.
    pub async fn regenerate_index(&self) -> Result<()> {
        let snapshot = self.lock_inventory()?.snapshot();
        let claimed = self.index_revision.fetch_max(snapshot.revision, Ordering::SeqCst);
        if claimed > snapshot.revision {
            debug!(revision = snapshot.revision, "newer index pass already running");
            return Ok(());
        }

        let links = self.links_for(&snapshot.files).await;
        let content = index_page(&self.index_import, &links, &self.catalog_path);

        let pending = {
            let _gate = self
                .index_gate
                .lock()
                .map_err(|_| CatalogError::Other(anyhow::anyhow!("index gate poisoned")))?;
            if self.index_revision.load(Ordering::SeqCst) > snapshot.revision {
                debug!(revision = snapshot.revision, "index pass overtaken; dropping");
                return Ok(());
            }
            self.writer.schedule(self.mapper.index_file(), content)
        };

        if pending.settle().await? == WriteOutcome::Wrote {
            info!("Update: index page ({} links)", links.len());
        }
        Ok(())
    }

    /// Link paths of every page derivable from `files`, in order. Files that
    /// cannot be read or parsed are skipped with a warning.
    pub async fn links_for(&self, files: &[PathBuf]) -> Vec<String> {
        let mut links = Vec::new();
        for file in files {
            if !self.fs.is_file(file) {
                continue;
            }
            let symbols = match self.symbols.symbols_for_async(file.clone()).await {
                Ok(symbols) => symbols,
                Err(err) => {
                    warn!(path = %self.rel(file), error = %err, "leaving file out of the index");
                    continue;
                }
            };
            for symbol in symbols {
                match self.mapper.link_for(file, &symbol) {
                    Ok(link) => links.push(link),
                    Err(err) => error!(error = %err, "cannot link catalog page"),
                }
            }
        }
        links
    }

    /// Cancel pending writes below `target`, except the index page and
    /// pages of other files whose output directory is nested inside
    /// `target`. An ancestor's own pages never live below `target`.
    fn cancel_pending_under(&self, target: &Path, protected: &[PathBuf]) -> usize {
        let index = self.mapper.index_file();
        let nested: Vec<&PathBuf> = protected
            .iter()
            .filter(|dir| dir.starts_with(target))
            .collect();
        self.writer.cancel_matching(|p| {
            p.starts_with(target) && p != index && !nested.iter().any(|dir| p.starts_with(dir))
        })
    }

    /// Target directories of every live file other than `source`.
    fn protected_dirs(&self, inventory: &Inventory, source: &Path) -> Vec<PathBuf> {
        inventory
            .files()
            .into_iter()
            .filter(|file| file != source)
            .filter_map(|file| self.mapper.target_dir_for(&file).ok())
            .collect()
    }

    async fn prune_stale(
        &self,
        target: PathBuf,
        symbols: Vec<String>,
        protected: Vec<PathBuf>,
    ) -> Result<()> {
        let fs = Arc::clone(&self.fs);
        let removed = self
            .blocking(move || remove_stale_dirs(&*fs, &target, &symbols, &protected))
            .await?;
        for dir in removed {
            info!("Delete: {}", self.rel(&dir));
        }
        Ok(())
    }

    /// Run file system work on the blocking pool.
    async fn blocking<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| CatalogError::Other(anyhow::anyhow!("file system task failed: {e}")))?
    }

    fn lock_inventory(&self) -> Result<MutexGuard<'_, Inventory>> {
        self.inventory
            .lock()
            .map_err(|_| CatalogError::Other(anyhow::anyhow!("inventory lock poisoned")))
    }

    fn rel(&self, path: &Path) -> String {
        display_relative(&self.project_root, path)
    }
}

/// Delete child directories of `target` that are neither a current symbol
/// nor hold another file's pages. Returns the deleted directories.
fn remove_stale_dirs(
    fs: &dyn FileSystem,
    target: &Path,
    symbols: &[String],
    protected: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(target) {
        return Ok(Vec::new());
    }
    let entries = fs.read_dir(target).map_err(|e| CatalogError::fs(target, e))?;

    let mut removed = Vec::new();
    for entry in entries {
        if !fs.is_dir(&entry) {
            continue;
        }
        let is_symbol = entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| symbols.iter().any(|s| s == name));
        if is_symbol || protected.iter().any(|dir| dir.starts_with(&entry)) {
            continue;
        }
        fs.remove_dir_all(&entry)
            .map_err(|e| CatalogError::fs(&entry, e))?;
        removed.push(entry);
    }
    Ok(removed)
}

/// Remove `dir` and then its ancestors below `output_root` for as long as
/// they are empty.
fn remove_empty_dirs(fs: &dyn FileSystem, dir: &Path, output_root: &Path) -> Result<()> {
    let mut current = Some(dir);
    while let Some(path) = current {
        if path == output_root || !path.starts_with(output_root) {
            break;
        }
        let removed = fs
            .remove_dir_if_empty(path)
            .map_err(|e| CatalogError::fs(path, e))?;
        if !removed {
            break;
        }
        current = path.parent();
    }
    Ok(())
}

/// Settle every write concurrently; report the first failure after all of
/// them finished.
async fn settle_all(pending: Vec<PendingWrite>) -> Result<()> {
    let mut set = JoinSet::new();
    for write in pending {
        set.spawn(write.settle());
    }

    let mut first_error = None;
    while let Some(joined) = set.join_next().await {
        let result = joined
            .map_err(|e| CatalogError::Other(anyhow::anyhow!("write task failed: {e}")))
            .and_then(|r| r);
        if let Err(err) = result {
            first_error.get_or_insert(err);
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
