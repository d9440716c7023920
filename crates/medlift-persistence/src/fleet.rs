//! # Fleet Service
//!
//! Orchestrates the gateway and the domain rules for every mutation of the
//! drone fleet. Each operation reads its own copy of the rows it touches,
//! applies the domain checks and writes the result back.
//!
//! Read-check-write sequences are serialized with row guards. Guards are
//! always taken drone first, then medication, so two operations never wait
//! on each other in opposite order.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{PersistenceError, Result};
use crate::repository::{
    AuditLogRepository, DroneRepository, MedicationRepository, Repository, UnitOfWork,
};
use medlift_domain::{
    BatteryAuditLog, Drone, Entity, LoadOutcome, LoadWeight, Medication, load, update_all,
};

/// Normalized medication key; codes are stored upper-cased
fn medication_key(code: &str) -> String {
    code.trim().to_uppercase()
}

fn load_weight(carried: &[Medication]) -> i64 {
    carried.iter().map(|m| i64::from(m.weight())).sum()
}

/// Entry point for fleet operations over one storage backend
#[derive(Debug)]
pub struct Fleet<U: UnitOfWork> {
    store: Arc<U>,
}

impl<U: UnitOfWork> Clone for Fleet<U> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<U: UnitOfWork> Fleet<U> {
    #[must_use]
    pub fn new(store: U) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    // =========================================================================
    // DRONE QUERIES
    // =========================================================================

    /// # Errors
    ///
    /// Gateway failures.
    pub async fn drones(&self) -> Result<Vec<Drone>> {
        self.store.drones().list_all().await
    }

    /// # Errors
    ///
    /// `ResourceNotFound` for an unknown serial number.
    pub async fn drone(&self, serial_number: &str) -> Result<Drone> {
        tracing::debug!(serial_number, "Fetching drone");
        self.store
            .drones()
            .get(serial_number)
            .await?
            .ok_or_else(|| PersistenceError::missing(Drone::ENTITY_TYPE, serial_number))
    }

    /// Drones that are idle with enough battery to take a load
    ///
    /// # Errors
    ///
    /// Gateway failures.
    pub async fn available_drones(&self) -> Result<Vec<Drone>> {
        let mut drones = self.drones().await?;
        drones.retain(Drone::is_available);
        Ok(drones)
    }

    /// # Errors
    ///
    /// `ResourceNotFound` for an unknown serial number.
    pub async fn battery_level(&self, serial_number: &str) -> Result<i32> {
        Ok(self.drone(serial_number).await?.battery_level())
    }

    /// Medications currently carried by the drone
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` for an unknown serial number.
    pub async fn load_of(&self, serial_number: &str) -> Result<Vec<Medication>> {
        let drone = self.drone(serial_number).await?;
        self.store
            .medications()
            .load_of(drone.serial_number())
            .await
    }

    // =========================================================================
    // DRONE MUTATIONS
    // =========================================================================

    /// # Errors
    ///
    /// `Duplicate` when the serial number is taken.
    pub async fn register_drone(&self, drone: Drone) -> Result<Drone> {
        self.store.drones().create(&drone).await?;
        tracing::info!(
            serial_number = drone.serial_number(),
            model = %drone.model(),
            state = %drone.state(),
            "Registered drone"
        );
        Ok(drone)
    }

    /// Register every drone or none.
    ///
    /// # Errors
    ///
    /// `Duplicate` when any serial number is taken or repeated.
    pub async fn register_drones(&self, drones: Vec<Drone>) -> Result<(usize, Vec<Drone>)> {
        let (count, created) = self.store.drones().create_bulk(&drones).await?;
        tracing::info!(count, "Registered drone batch");
        Ok((count, created))
    }

    /// Apply attribute changes to a drone.
    ///
    /// Changes are applied to a copy and written only when all of them pass.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, or the first attribute the domain rejects.
    pub async fn update_drone(
        &self,
        serial_number: &str,
        changes: &Map<String, Value>,
    ) -> Result<Drone> {
        let _guard = self.store.drones().lock_drone(serial_number).await;

        let drone = self.drone(serial_number).await?;
        let carried = self.store.medications().load_of(serial_number).await?;
        let updated = update_all(&drone, changes, &LoadWeight(load_weight(&carried)))
            .inspect_err(|err| {
                tracing::warn!(serial_number, error = %err, "Rejected drone update");
            })?;

        self.write_drone(&updated).await?;
        tracing::info!(
            serial_number,
            state = %updated.state(),
            battery_level = updated.battery_level(),
            "Updated drone"
        );
        Ok(updated)
    }

    /// Delete an idle drone, releasing whatever it still carries.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, or `Conflict` unless the drone is idle.
    pub async fn delete_drone(&self, serial_number: &str) -> Result<Drone> {
        let _guard = self.store.drones().lock_drone(serial_number).await;

        let drone = self.drone(serial_number).await?;
        drone.can_be_deleted().inspect_err(|err| {
            tracing::warn!(serial_number, error = %err, "Refused drone deletion");
        })?;

        let released = self.store.medications().release_load(serial_number).await?;
        self.store.drones().delete(serial_number).await?;
        tracing::info!(serial_number, released, "Deleted drone");
        Ok(drone)
    }

    async fn write_drone(&self, drone: &Drone) -> Result<()> {
        if self.store.drones().update(drone).await? {
            Ok(())
        } else {
            Err(PersistenceError::NotFound {
                entity_type: Drone::ENTITY_TYPE,
                key: drone.serial_number().to_string(),
            })
        }
    }

    // =========================================================================
    // MEDICATION QUERIES
    // =========================================================================

    /// # Errors
    ///
    /// Gateway failures.
    pub async fn medications(&self) -> Result<Vec<Medication>> {
        self.store.medications().list_all().await
    }

    /// # Errors
    ///
    /// `ResourceNotFound` for an unknown code.
    pub async fn medication(&self, code: &str) -> Result<Medication> {
        let code = medication_key(code);
        tracing::debug!(code = %code, "Fetching medication");
        self.store
            .medications()
            .get(&code)
            .await?
            .ok_or_else(|| PersistenceError::missing(Medication::ENTITY_TYPE, code))
    }

    // =========================================================================
    // MEDICATION MUTATIONS
    // =========================================================================

    /// # Errors
    ///
    /// `Duplicate` when the code is taken.
    pub async fn register_medication(&self, medication: Medication) -> Result<Medication> {
        self.store.medications().create(&medication).await?;
        tracing::info!(
            code = medication.code(),
            weight = medication.weight(),
            "Registered medication"
        );
        Ok(medication)
    }

    /// Register every medication or none.
    ///
    /// # Errors
    ///
    /// `Duplicate` when any code is taken or repeated.
    pub async fn register_medications(
        &self,
        medications: Vec<Medication>,
    ) -> Result<(usize, Vec<Medication>)> {
        let (count, created) = self.store.medications().create_bulk(&medications).await?;
        tracing::info!(count, "Registered medication batch");
        Ok((count, created))
    }

    /// Apply attribute changes to a medication.
    ///
    /// A weight change on a loaded medication is checked against the
    /// carrier's capacity while the carrier is locked.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound`, the first attribute the domain rejects, or
    /// `WriteConflict` when the medication was loaded or unloaded meanwhile.
    pub async fn update_medication(
        &self,
        code: &str,
        changes: &Map<String, Value>,
    ) -> Result<Medication> {
        let code = medication_key(code);
        let seen = self.medication(&code).await?;

        let carrier_guard = match seen.associated_drone() {
            Some(serial) => Some(self.store.drones().lock_drone(serial).await),
            None => None,
        };
        let _guard = self.store.medications().lock_row(&code).await;

        let medication = self.medication(&code).await?;
        if medication.associated_drone() != seen.associated_drone() {
            return Err(PersistenceError::WriteConflict(format!(
                "medication {code} changed carrier during the update"
            )));
        }

        let capacity = match medication.associated_drone() {
            Some(serial) => {
                let drone = self.drone(serial).await?;
                let carried = self.store.medications().load_of(serial).await?;
                Some(drone.capacity(&carried))
            }
            None => None,
        };

        let updated = update_all(&medication, changes, &capacity).inspect_err(|err| {
            tracing::warn!(code = %code, error = %err, "Rejected medication update");
        })?;

        self.write_medication(&updated).await?;
        drop(carrier_guard);
        tracing::info!(code = %code, weight = updated.weight(), "Updated medication");
        Ok(updated)
    }

    /// # Errors
    ///
    /// `ResourceNotFound`, or `Conflict` while the medication is loaded.
    pub async fn delete_medication(&self, code: &str) -> Result<Medication> {
        let code = medication_key(code);
        let _guard = self.store.medications().lock_row(&code).await;

        let medication = self.medication(&code).await?;
        medication.can_be_deleted().inspect_err(|err| {
            tracing::warn!(code = %code, error = %err, "Refused medication deletion");
        })?;

        self.store.medications().delete(&code).await?;
        tracing::info!(code = %code, "Deleted medication");
        Ok(medication)
    }

    async fn write_medication(&self, medication: &Medication) -> Result<()> {
        if self.store.medications().update(medication).await? {
            Ok(())
        } else {
            Err(PersistenceError::NotFound {
                entity_type: Medication::ENTITY_TYPE,
                key: medication.code().to_string(),
            })
        }
    }

    // =========================================================================
    // LOAD ASSOCIATION
    // =========================================================================

    /// Load a medication onto a drone.
    ///
    /// Loading a medication the drone already carries succeeds without
    /// changing anything and reports [`LoadOutcome::AlreadyAssociated`].
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` for either side, `Conflict` when the medication is
    /// on another drone, `CapacityExceeded` when it does not fit. The drone's
    /// state and battery level play no part.
    pub async fn load_medication(
        &self,
        serial_number: &str,
        code: &str,
    ) -> Result<(LoadOutcome, Medication)> {
        let code = medication_key(code);
        let _drone_guard = self.store.drones().lock_drone(serial_number).await;
        let _medication_guard = self.store.medications().lock_row(&code).await;

        let drone = self.drone(serial_number).await?;
        let mut medication = self.medication(&code).await?;
        let carried = self.store.medications().load_of(serial_number).await?;

        let outcome = load::load(&drone, &mut medication, &carried).inspect_err(|err| {
            tracing::warn!(serial_number, code = %code, error = %err, "Rejected load");
        })?;

        if outcome == LoadOutcome::Loaded {
            self.write_medication(&medication).await?;
            tracing::info!(
                serial_number,
                code = %code,
                weight = medication.weight(),
                load_weight = load_weight(&carried) + i64::from(medication.weight()),
                "Loaded medication"
            );
        }
        Ok((outcome, medication))
    }

    /// Take a medication off a drone.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` for either side, `UnmetConditions` when the
    /// medication is not loaded, `Conflict` when it is on another drone.
    pub async fn unload_medication(&self, serial_number: &str, code: &str) -> Result<Medication> {
        let code = medication_key(code);
        let _drone_guard = self.store.drones().lock_drone(serial_number).await;
        let _medication_guard = self.store.medications().lock_row(&code).await;

        let drone = self.drone(serial_number).await?;
        let mut medication = self.medication(&code).await?;

        load::unload(&drone, &mut medication).inspect_err(|err| {
            tracing::warn!(serial_number, code = %code, error = %err, "Rejected unload");
        })?;

        self.write_medication(&medication).await?;
        tracing::info!(serial_number, code = %code, "Unloaded medication");
        Ok(medication)
    }

    // =========================================================================
    // BATTERY AUDIT
    // =========================================================================

    /// Snapshot every drone's battery level.
    ///
    /// With `reset_states`, drones stuck loading or loaded on a low battery
    /// are moved back to `IDLE` before the snapshot is taken.
    ///
    /// # Errors
    ///
    /// Gateway failures. Drones deleted during the pass are skipped.
    pub async fn audit_battery_levels(
        &self,
        shutdown: bool,
        reset_states: bool,
    ) -> Result<Vec<BatteryAuditLog>> {
        let serials: Vec<String> = self
            .drones()
            .await?
            .iter()
            .map(|d| d.serial_number().to_string())
            .collect();

        let mut logs = Vec::with_capacity(serials.len());
        for serial_number in &serials {
            let _guard = self.store.drones().lock_drone(serial_number).await;
            let Some(mut drone) = self.store.drones().get(serial_number).await? else {
                continue;
            };

            if reset_states && drone.should_state_be_reset() {
                let previous = drone.state();
                drone.reset_state();
                self.write_drone(&drone).await?;
                tracing::info!(
                    serial_number = %serial_number,
                    previous = %previous,
                    battery_level = drone.battery_level(),
                    "Reset drone state on low battery"
                );
            }

            let log = BatteryAuditLog::new(&drone, shutdown);
            self.store.audit_logs().append(&log).await?;
            logs.push(log);
        }

        tracing::info!(drones = logs.len(), shutdown, "Battery audit pass complete");
        Ok(logs)
    }

    /// # Errors
    ///
    /// Gateway failures.
    pub async fn audit_logs(&self, serial_number: Option<&str>) -> Result<Vec<BatteryAuditLog>> {
        self.store.audit_logs().list(serial_number).await
    }
}
