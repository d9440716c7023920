//! Battery audit log records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::drone::Drone;
use crate::error::{DomainError, DomainResult};

/// Snapshot of a drone's battery level.
///
/// Records are append-only: there are no setters and they can never be
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryAuditLog {
    id: Uuid,
    drone: String,
    logged_battery_level: i32,
    /// Written by the final pass that runs after a shutdown request
    shutdown_log: bool,
    timestamp: DateTime<Utc>,
}

impl BatteryAuditLog {
    #[must_use]
    pub fn new(drone: &Drone, shutdown_log: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            drone: drone.serial_number().to_string(),
            logged_battery_level: drone.battery_level(),
            shutdown_log,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn drone(&self) -> &str {
        &self.drone
    }

    #[must_use]
    pub const fn logged_battery_level(&self) -> i32 {
        self.logged_battery_level
    }

    #[must_use]
    pub const fn is_shutdown_log(&self) -> bool {
        self.shutdown_log
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// # Errors
    ///
    /// Always returns [`DomainError::Conflict`]; audit records are never removed.
    pub fn can_be_deleted(&self) -> DomainResult<()> {
        Err(DomainError::Conflict(format!(
            "Battery audit log {} for drone {} is append-only and cannot be deleted",
            self.id, self.drone
        )))
    }
}
