//! In-memory repository implementation.
//!
//! Rows live in ordered maps behind async read-write locks. Every write is
//! whole-row, so callers that read, check and write back take the row guard
//! first (see [`Repository::lock_row`]).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::traits::{
    AuditLogRepository, DroneRepository, MedicationRepository, Repository, RowGuard, UnitOfWork,
};
use crate::error::{PersistenceError, Result};
use medlift_domain::{BatteryAuditLog, Drone, Entity, Medication};

// =============================================================================
// ROW LOCKS
// =============================================================================

/// One async mutex per key, created on first use
#[derive(Debug, Default)]
struct RowLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RowLocks {
    async fn acquire(&self, key: &str) -> RowGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// A keyed collection of one entity type
#[derive(Debug)]
pub struct MemoryTable<E> {
    rows: RwLock<BTreeMap<String, E>>,
    row_locks: RowLocks,
}

impl<E> Default for MemoryTable<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            row_locks: RowLocks::default(),
        }
    }
}

impl<E> MemoryTable<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

fn duplicate<E: Entity>(key: &str) -> PersistenceError {
    PersistenceError::Duplicate {
        entity_type: E::ENTITY_TYPE,
        key: key.to_string(),
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryTable<E> {
    async fn get(&self, id: &str) -> Result<Option<E>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<E>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn create(&self, entity: &E) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(entity.id()) {
            return Err(duplicate::<E>(entity.id()));
        }
        rows.insert(entity.id().to_string(), entity.clone());
        Ok(())
    }

    async fn create_bulk(&self, entities: &[E]) -> Result<(usize, Vec<E>)> {
        let mut rows = self.rows.write().await;

        let mut seen = HashSet::with_capacity(entities.len());
        for entity in entities {
            if rows.contains_key(entity.id()) || !seen.insert(entity.id()) {
                return Err(duplicate::<E>(entity.id()));
            }
        }

        for entity in entities {
            rows.insert(entity.id().to_string(), entity.clone());
        }
        Ok((entities.len(), entities.to_vec()))
    }

    async fn update(&self, entity: &E) -> Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(entity.id()) {
            Some(row) => {
                *row = entity.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }

    async fn lock_row(&self, id: &str) -> RowGuard {
        self.row_locks.acquire(id).await
    }
}

#[async_trait]
impl DroneRepository for MemoryTable<Drone> {}

#[async_trait]
impl MedicationRepository for MemoryTable<Medication> {
    async fn load_of(&self, serial_number: &str) -> Result<Vec<Medication>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|m| m.is_associated_with(serial_number))
            .cloned()
            .collect())
    }

    async fn release_load(&self, serial_number: &str) -> Result<usize> {
        let mut rows = self.rows.write().await;
        let mut released = 0;
        for medication in rows.values_mut() {
            if medication.is_associated_with(serial_number) {
                medication.set_associated_drone(None);
                released += 1;
            }
        }
        Ok(released)
    }
}

// =============================================================================
// AUDIT LOGS
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryAuditLogs {
    logs: RwLock<Vec<BatteryAuditLog>>,
}

#[async_trait]
impl AuditLogRepository for MemoryAuditLogs {
    async fn append(&self, log: &BatteryAuditLog) -> Result<()> {
        self.logs.write().await.push(log.clone());
        Ok(())
    }

    async fn list(&self, drone: Option<&str>) -> Result<Vec<BatteryAuditLog>> {
        Ok(self
            .logs
            .read()
            .await
            .iter()
            .filter(|log| drone.is_none_or(|serial| log.drone() == serial))
            .cloned()
            .collect())
    }
}

// =============================================================================
// STORE
// =============================================================================

/// In-memory backend for every repository
#[derive(Debug, Default)]
pub struct MemoryStore {
    drones: MemoryTable<Drone>,
    medications: MemoryTable<Medication>,
    audit_logs: MemoryAuditLogs,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnitOfWork for MemoryStore {
    type DroneRepo = MemoryTable<Drone>;
    type MedicationRepo = MemoryTable<Medication>;
    type AuditLogRepo = MemoryAuditLogs;

    fn drones(&self) -> &Self::DroneRepo {
        &self.drones
    }

    fn medications(&self) -> &Self::MedicationRepo {
        &self.medications
    }

    fn audit_logs(&self) -> &Self::AuditLogRepo {
        &self.audit_logs
    }
}
