//! Drone entity and its operational state machine.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::load::Capacity;
use crate::medication::Medication;
use crate::validation::bounded;

/// Serial numbers are stored in a 100 character column
pub const MAX_SERIAL_LENGTH: usize = 100;

/// Route segment that can never be used as a serial number
pub const RESERVED_SERIAL: &str = "available";

pub const MAX_WEIGHT_LIMIT: i32 = 500;

pub const MAX_BATTERY_LEVEL: i32 = 100;

/// Battery percentage below which a drone may not start loading
pub const MIN_LOADING_BATTERY: i32 = 25;

// =============================================================================
// ENUMS
// =============================================================================

/// Drone weight class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneModel {
    #[default]
    Unknown,
    Lightweight,
    Middleweight,
    Cruiserweight,
    Heavyweight,
}

impl DroneModel {
    pub const ALL: [Self; 5] = [
        Self::Unknown,
        Self::Lightweight,
        Self::Middleweight,
        Self::Cruiserweight,
        Self::Heavyweight,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Lightweight => "LIGHTWEIGHT",
            Self::Middleweight => "MIDDLEWEIGHT",
            Self::Cruiserweight => "CRUISERWEIGHT",
            Self::Heavyweight => "HEAVYWEIGHT",
        }
    }
}

/// Drone operational state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneState {
    #[default]
    Unknown,
    Idle,
    Loading,
    Loaded,
    Delivering,
    Delivered,
    Returning,
}

impl DroneState {
    pub const ALL: [Self; 7] = [
        Self::Unknown,
        Self::Idle,
        Self::Loading,
        Self::Loaded,
        Self::Delivering,
        Self::Delivered,
        Self::Returning,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Idle => "IDLE",
            Self::Loading => "LOADING",
            Self::Loaded => "LOADED",
            Self::Delivering => "DELIVERING",
            Self::Delivered => "DELIVERED",
            Self::Returning => "RETURNING",
        }
    }
}

fn parse_name<T: Copy>(
    input: &str,
    variants: &[T],
    name_of: impl Fn(T) -> &'static str,
) -> DomainResult<T> {
    let wanted = input.trim();
    variants
        .iter()
        .copied()
        .find(|variant| name_of(*variant).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let names: Vec<&str> = variants.iter().map(|v| name_of(*v)).collect();
            DomainError::invalid_input(input, names.join("|"))
        })
}

impl FromStr for DroneModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s, &Self::ALL, Self::as_str)
    }
}

impl FromStr for DroneState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_name(s, &Self::ALL, Self::as_str)
    }
}

impl fmt::Display for DroneModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// Delivery drone.
///
/// Fields are private so that a drone can only come into existence through
/// [`Drone::new`], which validates every field at once. The drone's load is
/// not stored here; it is whatever set of medications currently reference
/// the serial number, and capacity checks take it as a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drone {
    serial_number: String,
    model: DroneModel,
    state: DroneState,
    weight_limit: i32,
    battery_level: i32,
}

impl Drone {
    /// # Errors
    ///
    /// - [`DomainError::InvalidInputFormat`] for a reserved, empty or
    ///   over-long serial number, or a weight limit / battery level out of range
    /// - [`DomainError::UnmetConditions`] when asked to start in `LOADING`
    ///   with less than 25% battery
    pub fn new(
        serial_number: &str,
        model: DroneModel,
        state: DroneState,
        weight_limit: i64,
        battery_level: i64,
    ) -> DomainResult<Self> {
        let serial_number = validate_serial(serial_number)?;
        let weight_limit = bounded("weightLimit", weight_limit, 0..=MAX_WEIGHT_LIMIT)?;
        let battery_level = bounded("batteryLevel", battery_level, 0..=MAX_BATTERY_LEVEL)?;
        check_transition(state, battery_level)?;

        Ok(Self {
            serial_number,
            model,
            state,
            weight_limit,
            battery_level,
        })
    }

    /// Construct from enum names as they arrive in request payloads.
    ///
    /// # Errors
    ///
    /// As [`Drone::new`], plus [`DomainError::InvalidInputFormat`] for an
    /// unrecognised model or state name.
    pub fn from_names(
        serial_number: &str,
        model: &str,
        state: &str,
        weight_limit: i64,
        battery_level: i64,
    ) -> DomainResult<Self> {
        Self::new(
            serial_number,
            model.parse()?,
            state.parse()?,
            weight_limit,
            battery_level,
        )
    }

    #[must_use]
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    #[must_use]
    pub const fn model(&self) -> DroneModel {
        self.model
    }

    #[must_use]
    pub const fn state(&self) -> DroneState {
        self.state
    }

    #[must_use]
    pub const fn weight_limit(&self) -> i32 {
        self.weight_limit
    }

    #[must_use]
    pub const fn battery_level(&self) -> i32 {
        self.battery_level
    }

    // -------------------------------------------------------------------------
    // Setters
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInputFormat`] for an unknown model name.
    pub fn set_model_name(&mut self, model: &str) -> DomainResult<()> {
        self.model = model.parse()?;
        Ok(())
    }

    /// Move to `state`.
    ///
    /// Any state may follow any other; the only refused transition is
    /// entering `LOADING` below the minimum loading battery.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::UnmetConditions`] for the low-battery case.
    pub fn set_state(&mut self, state: DroneState) -> DomainResult<()> {
        check_transition(state, self.battery_level)?;
        self.state = state;
        Ok(())
    }

    /// # Errors
    ///
    /// Unknown state name, or the `LOADING` battery guard.
    pub fn set_state_name(&mut self, state: &str) -> DomainResult<()> {
        self.set_state(state.parse()?)
    }

    /// Force the drone back to `IDLE`, bypassing the transition guard.
    pub const fn reset_state(&mut self) {
        self.state = DroneState::Idle;
    }

    /// Change the weight limit while the drone carries `load_weight`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInputFormat`] outside `0..=500`, or
    /// [`DomainError::UnmetConditions`] when the new limit is below the
    /// weight already loaded.
    pub fn set_weight_limit_for_load(
        &mut self,
        weight_limit: i64,
        load_weight: i64,
    ) -> DomainResult<()> {
        let checked = bounded("weightLimit", weight_limit, 0..=MAX_WEIGHT_LIMIT)?;
        if i64::from(checked) < load_weight {
            return Err(DomainError::UnmetConditions(format!(
                "Weight limit {checked} is below the {load_weight} units currently loaded on drone {}",
                self.serial_number
            )));
        }
        self.weight_limit = checked;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInputFormat`] outside `0..=100`.
    pub fn set_battery_level(&mut self, battery_level: i64) -> DomainResult<()> {
        self.battery_level = bounded("batteryLevel", battery_level, 0..=MAX_BATTERY_LEVEL)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Capacity arithmetic
    // -------------------------------------------------------------------------

    /// Snapshot of this drone's capacity given its current load.
    #[must_use]
    pub fn capacity(&self, load: &[Medication]) -> Capacity {
        Capacity::new(
            &self.serial_number,
            self.weight_limit,
            load.iter().map(|m| i64::from(m.weight())).sum(),
        )
    }

    /// `sum(load) + additional <= weight_limit`
    #[must_use]
    pub fn can_hold(&self, load: &[Medication], additional_weight: i64) -> bool {
        self.capacity(load).can_hold(additional_weight)
    }

    /// `sum(load) - old + new <= weight_limit`, for resizing an item that is
    /// already part of `load`.
    #[must_use]
    pub fn can_hold_weight_difference(
        &self,
        load: &[Medication],
        old_weight: i64,
        new_weight: i64,
    ) -> bool {
        self.capacity(load)
            .can_hold_weight_difference(old_weight, new_weight)
    }

    // -------------------------------------------------------------------------
    // State predicates
    // -------------------------------------------------------------------------

    #[must_use]
    pub const fn can_be_loaded(&self) -> bool {
        matches!(self.state, DroneState::Idle | DroneState::Loading)
            && self.battery_level > MIN_LOADING_BATTERY
    }

    #[must_use]
    pub const fn can_be_unloaded(&self) -> bool {
        matches!(
            self.state,
            DroneState::Idle | DroneState::Loading | DroneState::Loaded | DroneState::Delivered
        )
    }

    /// A drone caught loading, or loaded, on a low battery is sent back to idle.
    #[must_use]
    pub const fn should_state_be_reset(&self) -> bool {
        self.battery_level < MIN_LOADING_BATTERY
            && matches!(self.state, DroneState::Loading | DroneState::Loaded)
    }

    /// Idle with enough battery to start loading
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.state, DroneState::Idle) && self.battery_level >= MIN_LOADING_BATTERY
    }
}

impl Entity for Drone {
    const ENTITY_TYPE: &'static str = "Drone";

    fn id(&self) -> &str {
        &self.serial_number
    }

    fn can_be_deleted(&self) -> DomainResult<()> {
        if self.state == DroneState::Idle {
            Ok(())
        } else {
            Err(DomainError::Conflict(format!(
                "Drone {} cannot be deleted while {}; it must be IDLE",
                self.serial_number, self.state
            )))
        }
    }
}

fn validate_serial(serial_number: &str) -> DomainResult<String> {
    let trimmed = serial_number.trim();
    if trimmed.is_empty()
        || trimmed.chars().count() > MAX_SERIAL_LENGTH
        || trimmed.eq_ignore_ascii_case(RESERVED_SERIAL)
    {
        return Err(DomainError::invalid_input(
            serial_number,
            format!("non-empty serial of at most {MAX_SERIAL_LENGTH} characters other than \"{RESERVED_SERIAL}\""),
        ));
    }
    Ok(trimmed.to_string())
}

fn check_transition(state: DroneState, battery_level: i32) -> DomainResult<()> {
    if state == DroneState::Loading && battery_level < MIN_LOADING_BATTERY {
        return Err(DomainError::UnmetConditions(format!(
            "Drone cannot enter LOADING with battery at {battery_level}% (minimum {MIN_LOADING_BATTERY}%)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drone(state: DroneState, battery: i64) -> Drone {
        Drone::new("D1", DroneModel::Lightweight, state, 100, battery).unwrap()
    }

    fn item(code: &str, weight: i64) -> Medication {
        Medication::new(code, "Aspirin", weight).unwrap()
    }

    #[test]
    fn test_construct_valid_drone() {
        let d = Drone::from_names("D1", "LIGHTWEIGHT", "IDLE", 100, 50).unwrap();
        assert_eq!(d.serial_number(), "D1");
        assert_eq!(d.model(), DroneModel::Lightweight);
        assert_eq!(d.state(), DroneState::Idle);
        assert_eq!(d.weight_limit(), 100);
        assert_eq!(d.battery_level(), 50);
    }

    #[test]
    fn test_construct_rejects_reserved_and_oversized_serials() {
        for serial in ["available", "AVAILABLE", "", "   "] {
            let err = Drone::new(serial, DroneModel::Unknown, DroneState::Idle, 10, 10);
            assert!(matches!(err, Err(DomainError::InvalidInputFormat { .. })), "{serial:?}");
        }

        let long = "X".repeat(MAX_SERIAL_LENGTH + 1);
        assert!(Drone::new(&long, DroneModel::Unknown, DroneState::Idle, 10, 10).is_err());

        let exact = "X".repeat(MAX_SERIAL_LENGTH);
        assert!(Drone::new(&exact, DroneModel::Unknown, DroneState::Idle, 10, 10).is_ok());
    }

    #[test]
    fn test_construct_rejects_unknown_names() {
        let err = Drone::from_names("D1", "INVALID_MODEL_NAME_TEST", "IDLE", 10, 10);
        assert!(matches!(err, Err(DomainError::InvalidInputFormat { .. })));

        let err = Drone::from_names("D1", "LIGHTWEIGHT", "INVALID_STATE_TEST", 10, 10);
        assert!(matches!(err, Err(DomainError::InvalidInputFormat { .. })));
    }

    #[test]
    fn test_enum_names_are_case_insensitive() {
        assert_eq!("heavyweight".parse::<DroneModel>(), Ok(DroneModel::Heavyweight));
        assert_eq!(" returning ".parse::<DroneState>(), Ok(DroneState::Returning));
    }

    #[test]
    fn test_construct_loading_on_low_battery() {
        let err = Drone::new("D1", DroneModel::Heavyweight, DroneState::Loading, 400, 24);
        assert!(matches!(err, Err(DomainError::UnmetConditions(_))));
        assert!(Drone::new("D1", DroneModel::Heavyweight, DroneState::Loading, 400, 25).is_ok());
    }

    #[test]
    fn test_set_state_is_permissive_apart_from_loading_guard() {
        let mut d = drone(DroneState::Idle, 10);
        d.set_state(DroneState::Delivering).unwrap();
        d.set_state(DroneState::Unknown).unwrap();
        assert!(d.set_state(DroneState::Loading).is_err());
        assert_eq!(d.state(), DroneState::Unknown);
    }

    #[test]
    fn test_delete_guard() {
        assert!(drone(DroneState::Idle, 50).can_be_deleted().is_ok());
        for state in DroneState::ALL.into_iter().filter(|s| *s != DroneState::Idle) {
            let err = drone(state, 50).can_be_deleted();
            assert!(matches!(err, Err(DomainError::Conflict(_))), "{state}");
        }
    }

    #[test]
    fn test_can_hold_weight_difference_examples() {
        let d = drone(DroneState::Idle, 50);
        let load = vec![item("M1", 50)];
        assert!(d.can_hold_weight_difference(&load, 50, 60));

        let tight = Drone::new("D2", DroneModel::Lightweight, DroneState::Idle, 55, 50).unwrap();
        assert!(!tight.can_hold_weight_difference(&load, 50, 60));
    }

    #[test]
    fn test_can_hold_boundary() {
        let d = drone(DroneState::Idle, 50);
        let load = vec![item("M1", 40), item("M2", 20)];
        assert!(d.can_hold(&load, 40));
        assert!(!d.can_hold(&load, 41));
        assert!(d.can_hold(&[], 100));
    }

    #[test]
    fn test_load_and_unload_predicates() {
        assert!(drone(DroneState::Idle, 26).can_be_loaded());
        assert!(!drone(DroneState::Idle, 25).can_be_loaded());
        assert!(!drone(DroneState::Loaded, 90).can_be_loaded());

        assert!(drone(DroneState::Delivered, 5).can_be_unloaded());
        assert!(!drone(DroneState::Delivering, 90).can_be_unloaded());
        assert!(!drone(DroneState::Returning, 90).can_be_unloaded());
    }

    #[test]
    fn test_should_state_be_reset() {
        let mut d = drone(DroneState::Loaded, 24);
        assert!(d.should_state_be_reset());
        d.reset_state();
        assert_eq!(d.state(), DroneState::Idle);
        assert!(!d.should_state_be_reset());
        assert!(!drone(DroneState::Delivering, 3).should_state_be_reset());
    }

    #[test]
    fn test_availability() {
        assert!(drone(DroneState::Idle, 25).is_available());
        assert!(!drone(DroneState::Idle, 24).is_available());
        assert!(!drone(DroneState::Loading, 80).is_available());
    }

    #[test]
    fn test_weight_limit_cannot_drop_below_load() {
        let mut d = drone(DroneState::Idle, 50);
        assert!(matches!(
            d.set_weight_limit_for_load(30, 40),
            Err(DomainError::UnmetConditions(_))
        ));
        assert!(matches!(
            d.set_weight_limit_for_load(501, 0),
            Err(DomainError::InvalidInputFormat { .. })
        ));
        d.set_weight_limit_for_load(40, 40).unwrap();
        assert_eq!(d.weight_limit(), 40);
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let d = drone(DroneState::Idle, 50);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["serialNumber"], "D1");
        assert_eq!(json["model"], "LIGHTWEIGHT");
        assert_eq!(json["state"], "IDLE");
        assert_eq!(json["weightLimit"], 100);
        assert_eq!(json["batteryLevel"], 50);
    }
}
