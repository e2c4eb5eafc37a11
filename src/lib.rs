// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod tree;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::config::{load_for_project, Settings};
use crate::engine::{BuildEvent, BuildOrchestrator, Runtime, RuntimeOptions};
use crate::extract::{SymbolExtractor, TypeScriptExtractor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::paths::display_relative;
use crate::tree::construct_tree;
use crate::watch::{scan_dir, spawn_watcher, CatalogFilter, Inventory, WatcherHandle};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and settings resolution
/// - the selected subcommand
/// - (for `build --watch`) the file watcher and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let project_root = match &args.command.roots().project_root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let cfg = load_for_project(args.config.as_deref(), &project_root)?;
    let settings = Settings::resolve(&cfg, &args.command.overrides())?;
    if settings.quiet {
        logging::apply_quiet()?;
    }

    match &args.command {
        Command::Build(build_args) => build(&settings, build_args.watch).await,
        Command::Clean(_) => clean(&settings),
        Command::List(_) => list(&settings).await,
    }
}

/// Clear the output directory and generate every page. With `watch`, keep
/// updating until Ctrl-C.
pub async fn build(settings: &Settings, watch: bool) -> Result<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    fs.remove_dir_all(&settings.output_root)?;

    let session = Session::start(settings, fs, Arc::new(TypeScriptExtractor::new()), watch)?;

    if watch {
        // Ctrl-C → graceful shutdown.
        let tx = session.sender();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(BuildEvent::ShutdownRequested).await;
        });
        info!("Start: catalog-gen watch mode");
    } else {
        info!("Start: catalog-gen build");
    }

    session.run().await?;
    Ok(())
}

/// Delete the output directory.
pub fn clean(settings: &Settings) -> Result<()> {
    RealFileSystem.remove_dir_all(&settings.output_root)?;
    info!(
        "Delete: {}",
        display_relative(&settings.project_root, &settings.output_root)
    );
    Ok(())
}

/// Print the catalog path and the tree of pages a build would generate.
pub async fn list(settings: &Settings) -> Result<()> {
    let links = collect_links(
        settings,
        Arc::new(RealFileSystem),
        Arc::new(TypeScriptExtractor::new()),
    )
    .await?;

    println!("catalog path: {}", settings.catalog_path);
    print!("{}", construct_tree(&links));
    Ok(())
}

/// Link paths of every page derivable from the current source tree, without
/// writing anything.
pub async fn collect_links(
    settings: &Settings,
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn SymbolExtractor>,
) -> Result<Vec<String>> {
    let filter = CatalogFilter::new(&settings.watch_root, &settings.output_root, &settings.exclude)?;
    let mut inventory = Inventory::new();
    scan_dir(&*fs, &filter, &mut inventory, &settings.watch_root);
    let files: Vec<PathBuf> = inventory.files();

    let orchestrator =
        BuildOrchestrator::new(settings, fs, extractor, Arc::new(Mutex::new(inventory)));
    Ok(orchestrator.links_for(&files).await)
}

/// A wired build: watcher, orchestrator and runtime sharing one inventory.
#[derive(Debug)]
pub struct Session {
    events: mpsc::Sender<BuildEvent>,
    runtime: Runtime,
    watcher: WatcherHandle,
}

impl Session {
    /// Must be called from within a tokio runtime.
    pub fn start(
        settings: &Settings,
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn SymbolExtractor>,
        watch: bool,
    ) -> Result<Self> {
        let filter =
            CatalogFilter::new(&settings.watch_root, &settings.output_root, &settings.exclude)?;
        let inventory = Inventory::shared();
        let orchestrator = Arc::new(BuildOrchestrator::new(
            settings,
            fs.clone(),
            extractor,
            inventory.clone(),
        ));

        // Runtime event channel.
        let (rt_tx, rt_rx) = mpsc::channel::<BuildEvent>(256);
        let watcher = spawn_watcher(filter, fs, inventory, rt_tx.clone(), watch)?;

        let options = RuntimeOptions {
            exit_when_idle: !watch,
            ..RuntimeOptions::default()
        };

        Ok(Self {
            events: rt_tx,
            runtime: Runtime::new(orchestrator, rt_rx, options),
            watcher,
        })
    }

    /// Sender for injecting events, e.g. `ShutdownRequested`.
    pub fn sender(&self) -> mpsc::Sender<BuildEvent> {
        self.events.clone()
    }

    /// Run until the initial build is done (one-shot) or shutdown is
    /// requested (watch mode). File watching stops when this returns.
    pub async fn run(self) -> Result<()> {
        let Session {
            events,
            runtime,
            watcher,
        } = self;
        drop(events);
        runtime.run().await?;
        drop(watcher);
        Ok(())
    }
}
