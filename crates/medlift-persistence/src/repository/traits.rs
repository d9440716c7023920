//! # Repository Traits
//!
//! Abstract gateway interfaces for the domain entities.
//! Implementations can be swapped for different backends (in-memory, SQL, mock, etc.)

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use crate::error::Result;
use medlift_domain::{BatteryAuditLog, Drone, Entity, Medication};

/// Exclusive hold on one row, released on drop
pub type RowGuard = OwnedMutexGuard<()>;

// =============================================================================
// ENTITY REPOSITORY
// =============================================================================

/// CRUD primitives keyed by [`Entity::id`]
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Get entity by ID
    async fn get(&self, id: &str) -> Result<Option<E>>;

    /// Get every stored entity, ordered by ID
    async fn list_all(&self) -> Result<Vec<E>>;

    /// Insert a new entity; an existing ID is a `Duplicate`
    async fn create(&self, entity: &E) -> Result<()>;

    /// Insert every entity or none.
    ///
    /// Fails with `Duplicate` if any ID is already stored or repeats inside
    /// the batch. Returns the number stored and the stored values.
    async fn create_bulk(&self, entities: &[E]) -> Result<(usize, Vec<E>)>;

    /// Replace a stored entity; `false` when the ID is unknown
    async fn update(&self, entity: &E) -> Result<bool>;

    /// Remove by ID; `false` when the ID is unknown
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Wait for exclusive access to the row `id`.
    ///
    /// The row does not have to exist. Writers that read, check and write
    /// back hold the guard across all three steps.
    async fn lock_row(&self, id: &str) -> RowGuard;
}

// =============================================================================
// DRONE REPOSITORY
// =============================================================================

#[async_trait]
pub trait DroneRepository: Repository<Drone> {
    /// Serialize load, state and weight-limit changes for one drone
    async fn lock_drone(&self, serial_number: &str) -> RowGuard {
        self.lock_row(serial_number).await
    }
}

// =============================================================================
// MEDICATION REPOSITORY
// =============================================================================

#[async_trait]
pub trait MedicationRepository: Repository<Medication> {
    /// Medications whose association points at `serial_number`
    async fn load_of(&self, serial_number: &str) -> Result<Vec<Medication>>;

    /// Clear the association of every medication carried by `serial_number`.
    ///
    /// Returns how many medications were released.
    async fn release_load(&self, serial_number: &str) -> Result<usize>;
}

// =============================================================================
// AUDIT LOG REPOSITORY
// =============================================================================

/// Append-only store for battery snapshots
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, log: &BatteryAuditLog) -> Result<()>;

    /// Logs in insertion order, optionally restricted to one drone
    async fn list(&self, drone: Option<&str>) -> Result<Vec<BatteryAuditLog>>;
}

// =============================================================================
// UNIT OF WORK
// =============================================================================

/// Groups the repositories one backend provides
pub trait UnitOfWork: Send + Sync + 'static {
    type DroneRepo: DroneRepository;
    type MedicationRepo: MedicationRepository;
    type AuditLogRepo: AuditLogRepository;

    /// Get drone repository
    fn drones(&self) -> &Self::DroneRepo;

    /// Get medication repository
    fn medications(&self) -> &Self::MedicationRepo;

    /// Get battery audit log repository
    fn audit_logs(&self) -> &Self::AuditLogRepo;
}
