//! Load association rules.
//!
//! Capacity arithmetic plus the two cross-entity operations that attach a
//! medication to a drone and detach it again. Both work on values the
//! caller fetched; persisting the mutated medication and serializing
//! concurrent calls against the same drone is the caller's job.

use serde::Serialize;

use crate::drone::Drone;
use crate::error::{DomainError, DomainResult};
use crate::medication::Medication;

/// A drone's weight limit together with the weight it already carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capacity {
    drone: String,
    weight_limit: i32,
    load_weight: i64,
}

impl Capacity {
    #[must_use]
    pub fn new(drone: &str, weight_limit: i32, load_weight: i64) -> Self {
        Self {
            drone: drone.to_string(),
            weight_limit,
            load_weight,
        }
    }

    #[must_use]
    pub fn drone(&self) -> &str {
        &self.drone
    }

    #[must_use]
    pub const fn weight_limit(&self) -> i32 {
        self.weight_limit
    }

    #[must_use]
    pub const fn load_weight(&self) -> i64 {
        self.load_weight
    }

    #[must_use]
    pub const fn remaining(&self) -> i64 {
        self.weight_limit as i64 - self.load_weight
    }

    #[must_use]
    pub const fn can_hold(&self, additional_weight: i64) -> bool {
        self.load_weight + additional_weight <= self.weight_limit as i64
    }

    /// `old_weight` must already be part of the load weight.
    #[must_use]
    pub const fn can_hold_weight_difference(&self, old_weight: i64, new_weight: i64) -> bool {
        self.load_weight - old_weight + new_weight <= self.weight_limit as i64
    }

    #[must_use]
    pub fn exceeded_by(&self, requested: i64) -> DomainError {
        DomainError::CapacityExceeded {
            drone: self.drone.clone(),
            load_weight: self.load_weight,
            requested,
            weight_limit: self.weight_limit,
        }
    }
}

/// Result of a successful load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadOutcome {
    Loaded,
    /// The medication was already on this drone; nothing changed
    AlreadyAssociated,
}

/// Attach `medication` to `drone`, whose current load is `load`.
///
/// Neither the drone's state nor its battery level is consulted; only the
/// association and the remaining capacity decide.
///
/// # Errors
///
/// - [`DomainError::Conflict`] when the medication is on another drone
/// - [`DomainError::CapacityExceeded`] when the weight does not fit
pub fn load(
    drone: &Drone,
    medication: &mut Medication,
    load: &[Medication],
) -> DomainResult<LoadOutcome> {
    match medication.associated_drone() {
        Some(serial) if serial == drone.serial_number() => {
            return Ok(LoadOutcome::AlreadyAssociated);
        }
        Some(other) => {
            return Err(DomainError::Conflict(format!(
                "Medication {} is already loaded onto drone {other}",
                medication.code()
            )));
        }
        None => {}
    }

    let capacity = drone.capacity(load);
    let weight = i64::from(medication.weight());
    if !capacity.can_hold(weight) {
        return Err(capacity.exceeded_by(weight));
    }

    medication.set_associated_drone(Some(drone));
    Ok(LoadOutcome::Loaded)
}

/// Detach `medication` from `drone`.
///
/// # Errors
///
/// - [`DomainError::UnmetConditions`] when the medication is not loaded
/// - [`DomainError::Conflict`] when the medication is on another drone
pub fn unload(drone: &Drone, medication: &mut Medication) -> DomainResult<()> {
    match medication.associated_drone() {
        None => {
            return Err(DomainError::UnmetConditions(format!(
                "Medication {} is not loaded onto any drone",
                medication.code()
            )));
        }
        Some(other) if other != drone.serial_number() => {
            return Err(DomainError::Conflict(format!(
                "Medication {} is loaded onto drone {other}, not {}",
                medication.code(),
                drone.serial_number()
            )));
        }
        Some(_) => {}
    }

    medication.set_associated_drone(None);
    Ok(())
}
