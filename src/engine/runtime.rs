// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::errors::Result;

use super::orchestrator::BuildOrchestrator;
use super::{BuildEvent, RuntimeOptions};

/// Drives the build orchestrator in response to `BuildEvent`s.
///
/// Every file event runs in its own task, so a slow file never holds up
/// others. Ordering between events for the same file is settled by the
/// orchestrator's revision checks, not here.
pub struct Runtime {
    orchestrator: Arc<BuildOrchestrator>,
    event_rx: mpsc::Receiver<BuildEvent>,
    options: RuntimeOptions,
    tasks: JoinSet<()>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("options", &self.options)
            .field("in_flight", &self.tasks.len())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(
        orchestrator: Arc<BuildOrchestrator>,
        event_rx: mpsc::Receiver<BuildEvent>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            orchestrator,
            event_rx,
            options,
            tasks: JoinSet::new(),
        }
    }

    /// Main event loop.
    pub async fn run(mut self) -> Result<()> {
        info!("catalog-gen runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            match event {
                BuildEvent::File(file_event) => {
                    let orchestrator = Arc::clone(&self.orchestrator);
                    self.tasks
                        .spawn(async move { orchestrator.handle_logged(file_event).await });
                }
                BuildEvent::InitialScanComplete => {
                    if self.options.exit_when_idle {
                        self.drain().await;
                        self.refresh_index().await;
                        info!("initial build complete; stopping runtime");
                        break;
                    }
                    let orchestrator = Arc::clone(&self.orchestrator);
                    self.tasks.spawn(async move {
                        if let Err(err) = orchestrator.regenerate_index().await {
                            warn!(error = %err, "failed to update index page");
                        }
                    });
                }
                BuildEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    break;
                }
            }

            self.reap_finished();
        }

        self.shutdown().await;
        info!("runtime exiting");
        Ok(())
    }

    async fn refresh_index(&self) {
        if let Err(err) = self.orchestrator.regenerate_index().await {
            warn!(error = %err, "failed to update index page");
        }
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(err) = joined {
                if err.is_panic() {
                    error!(error = %err, "event task panicked");
                }
            }
        }
    }

    async fn drain(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                if err.is_panic() {
                    error!(error = %err, "event task panicked");
                }
            }
        }
    }

    /// Wait for in-flight tasks up to the grace period, then abort the rest.
    /// Writes are atomic, so an aborted task never leaves a partial file.
    async fn shutdown(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        debug!(in_flight = self.tasks.len(), "waiting for in-flight tasks");
        let grace = self.options.shutdown_grace;
        if tokio::time::timeout(grace, self.drain()).await.is_err() {
            warn!(
                in_flight = self.tasks.len(),
                "in-flight tasks did not finish within {:?}; aborting", grace
            );
            self.tasks.abort_all();
            self.drain().await;
        }
    }
}
