//! Background removal of refresh-token and denylist rows past their expiry

use chrono::Utc;
use session_core::{PurgeReport, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::error::ServiceResult;

/// Periodically purges expired rows from a SessionStore
#[derive(Clone)]
pub struct ExpiredSessionSweeper {
    store: Arc<dyn SessionStore>,
    interval: Duration,
}

impl ExpiredSessionSweeper {
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run a single purge pass
    pub async fn sweep_once(&self) -> ServiceResult<PurgeReport> {
        let report = self.store.purge_expired(Utc::now()).await?;
        if report.total() > 0 {
            tracing::info!(
                refresh_tokens = report.refresh_tokens,
                denylist = report.denylist,
                "Purged expired session rows"
            );
        }
        Ok(report)
    }

    /// Spawn the sweep loop. The first pass runs immediately.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep_once().await {
                            tracing::warn!(error = %e, "Expired session sweep failed");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::debug!("Expired session sweeper stopping");
                        break;
                    }
                }
            }
        });

        SweeperHandle { shutdown_tx, task }
    }
}

/// Handle to a running sweeper
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the loop to stop and wait for it
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Expired session sweeper panicked");
        }
    }
}
