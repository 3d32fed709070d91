//! Periodic health probing.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::health::checker::{HealthChecker, ProbeOutcome};

pub struct HealthMonitor {
    checker: Arc<HealthChecker>,
    interval: Duration,
}

impl HealthMonitor {
    pub fn new(checker: Arc<HealthChecker>, interval: Duration) -> Self {
        Self { checker, interval }
    }

    /// Probe all registered services every interval until shutdown.
    /// The first round runs immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Health monitor starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.round().await,
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn round(&self) {
        let snapshot = self.checker.registry().list();
        if snapshot.is_empty() {
            return;
        }

        let reports = self.checker.check_all(snapshot).await;
        let healthy = reports
            .iter()
            .filter(|r| r.outcome == ProbeOutcome::Healthy)
            .count();
        tracing::debug!(total = reports.len(), healthy, "Health round complete");
    }
}
