//! The reconciliation loop.
//!
//! One cycle lists the fleet, refreshes each server's observed status, and
//! acts on wanted/observed mismatches: start the worker when it should be up,
//! request termination when it should be down. After acting it waits a settle
//! interval and re-probes, absorbing the delay between the action and the
//! worker's observable readiness. At most one action is taken per server per
//! cycle; convergence happens across cycles, not within one.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::OrchestratorConfig;
use crate::domain::{Action, Server, ServerId, Status};
use crate::error::Result;
use crate::port::{Backend, ServerRegistry};

use super::probe::ProbeClient;

pub struct Orchestrator<R, B> {
    registry: Arc<R>,
    backend: Arc<B>,
    probe: ProbeClient,
    config: OrchestratorConfig,
}

impl<R: ServerRegistry, B: Backend> Orchestrator<R, B> {
    #[must_use]
    pub fn new(
        registry: Arc<R>,
        backend: Arc<B>,
        probe: ProbeClient,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            probe,
            config,
        }
    }

    /// Run the loop until a fatal configuration error.
    pub async fn run(self) -> Result<()> {
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        self.run_with_shutdown(shutdown_rx).await
    }

    /// Run with an externally controlled shutdown signal.
    pub async fn run_with_shutdown(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("Started object server orchestrator.");

        loop {
            self.run_cycle().await?;

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(self.config.cycle_interval_secs)) => {}
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// One full pass over the fleet.
    ///
    /// Servers are reconciled concurrently up to the configured limit; each
    /// server's own handling stays sequential. A non-fatal failure on one
    /// server never aborts the pass for the others - the server simply stays
    /// down and is retried next cycle. Fatal configuration defects end the
    /// pass after it completes.
    pub async fn run_cycle(&self) -> Result<()> {
        info!("Checking object servers.");

        let servers = self.registry.list_all().await?;
        let results: Vec<(ServerId, Result<()>)> = stream::iter(servers)
            .map(|server| async move {
                let id = server.id.clone();
                (id, self.reconcile(server).await)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (id, result) in results {
            if let Err(e) = result {
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(server = %id, error = %e, "Reconciliation failed; retrying next cycle");
            }
        }

        Ok(())
    }

    async fn reconcile(&self, mut server: Server) -> Result<()> {
        let status = self.probe.probe_health(&mut server).await?;
        self.persist_status(&server.id, status).await;

        let Some(action) = server.pending_action() else {
            debug!(server = %server, status = %status, "No action needed");
            return Ok(());
        };

        match action {
            Action::Start => {
                info!(server = %server, "Starting worker");
                let handle = self.backend.start(&server).await?;
                info!(server = %server, handle = %handle, "Worker launched");
            }
            Action::Stop => {
                info!(server = %server, "Requesting worker termination");
                if self.probe.request_kill(&server).await? {
                    info!(server = %server, "Worker terminated");
                } else {
                    warn!(server = %server, "Kill request not yet effective");
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(self.config.settle_interval_secs)).await;

        let status = self.probe.probe_health(&mut server).await?;
        self.persist_status(&server.id, status).await;
        Ok(())
    }

    /// Best-effort registry write; the in-memory status for this cycle wins
    /// and the next cycle's probe retries naturally.
    async fn persist_status(&self, id: &ServerId, status: Status) {
        if let Err(e) = self.registry.update_status(id, status).await {
            warn!(server = %id, error = %e, "Failed to persist status");
        }
    }
}
