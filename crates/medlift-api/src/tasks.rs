//! # Battery Audit Task
//!
//! Periodically snapshots every drone's battery level. The task stops when
//! the shutdown channel flips to `true` or its sender is dropped; a pass that
//! is already running always completes, and one last pass marked as a
//! shutdown log is taken before the task returns.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::context::FleetService;

pub struct BatteryAuditTask {
    fleet: FleetService,
    interval: Duration,
    reset_states: bool,
}

impl BatteryAuditTask {
    #[must_use]
    pub const fn new(fleet: FleetService, interval: Duration, reset_states: bool) -> Self {
        Self {
            fleet,
            interval,
            reset_states,
        }
    }

    /// Run on the current runtime until `shutdown` says stop
    #[must_use]
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            reset_states = self.reset_states,
            "Battery audit task started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.pass(false).await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.pass(true).await;
        tracing::info!("Battery audit task stopped");
    }

    async fn pass(&self, shutdown: bool) {
        match self
            .fleet
            .audit_battery_levels(shutdown, self.reset_states)
            .await
        {
            Ok(logs) => tracing::debug!(logged = logs.len(), shutdown, "Battery levels logged"),
            Err(err) => tracing::error!(error = %err, shutdown, "Battery audit pass failed"),
        }
    }
}
