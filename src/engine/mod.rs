// src/engine/mod.rs

//! Incremental build engine for catalog-gen.
//!
//! This module ties together:
//! - page templates ([`generator`])
//! - debounced, idempotent artifact writes ([`writer`])
//! - per-file event handling and index regeneration ([`orchestrator`])
//! - the async event loop that feeds the orchestrator ([`runtime`])

use std::time::Duration;

use crate::types::FileEvent;

/// Runtime options for the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// If true, exit once the initial scan has been fully processed (one-shot
    /// `build`).
    pub exit_when_idle: bool,

    /// How long in-flight tasks may keep running after shutdown was
    /// requested.
    pub shutdown_grace: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            exit_when_idle: false,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    /// A catalog file was added, changed or removed.
    File(FileEvent),
    /// Every file present at startup has been reported.
    InitialScanComplete,
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod generator;
pub mod orchestrator;
pub mod runtime;
pub mod writer;

pub use orchestrator::BuildOrchestrator;
pub use runtime::Runtime;
pub use writer::{DebouncedWriter, PendingWrite, WriteOutcome};
