//! Generic attribute updater.
//!
//! Applies `(attribute name, untyped value)` pairs to an entity through the
//! entity's own validated setters. Each entity type registers a table once,
//! mapping attribute names to typed setters; the declared kind of a setter
//! decides how the untyped JSON value is coerced before the call.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::drone::Drone;
use crate::error::{DomainError, DomainResult};
use crate::load::Capacity;
use crate::medication::Medication;

/// Declared value kind of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Integer,
    /// Enum set by name, so unknown names surface as validation errors
    Enumerated,
    Text,
}

/// Typed setter registered for an attribute.
pub enum Setter<E: Updatable> {
    Integer(fn(&mut E, i64, &E::Context) -> DomainResult<()>),
    Enumerated(fn(&mut E, &str, &E::Context) -> DomainResult<()>),
    Text(fn(&mut E, &str, &E::Context) -> DomainResult<()>),
}

impl<E: Updatable> Setter<E> {
    const fn kind(&self) -> AttributeKind {
        match self {
            Self::Integer(_) => AttributeKind::Integer,
            Self::Enumerated(_) => AttributeKind::Enumerated,
            Self::Text(_) => AttributeKind::Text,
        }
    }
}

/// An entity that accepts attribute updates by name.
pub trait Updatable: Sized + 'static {
    /// Extra state setters need, such as the weight already loaded on a drone
    type Context;

    fn attributes() -> &'static AttributeTable<Self>;

    /// Names silently skipped by the updater
    fn ignored_attributes(&self) -> &'static [&'static str];
}

/// Attribute name to setter dispatch table.
///
/// A name registered without a setter is a declared but read-only attribute.
/// Registration order is the order [`update_all`] applies attributes in.
pub struct AttributeTable<E: Updatable> {
    entries: HashMap<&'static str, Option<Setter<E>>>,
    order: Vec<&'static str>,
}

impl<E: Updatable> Default for AttributeTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Updatable> AttributeTable<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn register(mut self, name: &'static str, setter: Option<Setter<E>>) -> Self {
        if self.entries.insert(name, setter).is_none() {
            self.order.push(name);
        }
        self
    }

    #[must_use]
    pub fn integer(self, name: &'static str, set: fn(&mut E, i64, &E::Context) -> DomainResult<()>) -> Self {
        self.register(name, Some(Setter::Integer(set)))
    }

    #[must_use]
    pub fn enumerated(self, name: &'static str, set: fn(&mut E, &str, &E::Context) -> DomainResult<()>) -> Self {
        self.register(name, Some(Setter::Enumerated(set)))
    }

    #[must_use]
    pub fn text(self, name: &'static str, set: fn(&mut E, &str, &E::Context) -> DomainResult<()>) -> Self {
        self.register(name, Some(Setter::Text(set)))
    }

    #[must_use]
    pub fn read_only(self, name: &'static str) -> Self {
        self.register(name, None)
    }

    /// Registered names in application order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Declared kind of `name`, `None` when unknown or read-only
    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<AttributeKind> {
        self.entries.get(name)?.as_ref().map(Setter::kind)
    }

    fn setter(&self, name: &str) -> DomainResult<&Setter<E>> {
        match self.entries.get(name) {
            Some(Some(setter)) => Ok(setter),
            Some(None) => Err(DomainError::UnmetConditions(format!("{name} is read-only"))),
            None => Err(DomainError::UnmetConditions(format!("{name} does not exist"))),
        }
    }
}

/// Apply one attribute to `entity` in place.
///
/// # Errors
///
/// - [`DomainError::UnmetConditions`] for an unknown or read-only attribute,
///   a value of the wrong shape, or a value the setter rejects
/// - [`DomainError::RequestProcessing`] when the setter fails for a reason
///   unrelated to the value
pub fn update<E: Updatable>(
    entity: &mut E,
    attribute: &str,
    value: &Value,
    context: &E::Context,
) -> DomainResult<()> {
    let attribute = attribute.trim();
    if entity.ignored_attributes().contains(&attribute) {
        return Ok(());
    }

    let result = match E::attributes().setter(attribute)? {
        Setter::Integer(set) => set(entity, coerce_integer(attribute, value)?, context),
        Setter::Enumerated(set) | Setter::Text(set) => {
            set(entity, &coerce_text(attribute, value)?, context)
        }
    };

    result.map_err(|err| match err {
        DomainError::RequestProcessing(_) => err,
        rejected => DomainError::UnmetConditions(rejected.to_string()),
    })
}

/// Apply every pair of `changes` to a copy of `entity`.
///
/// Key order in `changes` does not matter. Names the table does not register
/// (ignored or unknown) are handled first, sorted by name, then registered
/// attributes are applied in table order. The copy is returned only when all
/// pairs succeed, so a failure part way through leaves the caller's value
/// untouched.
///
/// # Errors
///
/// The first error raised by [`update`].
pub fn update_all<E: Updatable + Clone>(
    entity: &E,
    changes: &Map<String, Value>,
    context: &E::Context,
) -> DomainResult<E> {
    let table = E::attributes();
    let mut working = entity.clone();

    let mut unregistered: Vec<(&str, &Value)> = changes
        .iter()
        .map(|(attribute, value)| (attribute.trim(), value))
        .filter(|(attribute, _)| !table.contains(attribute))
        .collect();
    unregistered.sort_unstable_by_key(|(attribute, _)| *attribute);
    for (attribute, value) in unregistered {
        update(&mut working, attribute, value, context)?;
    }

    for name in table.names() {
        for (attribute, value) in changes.iter().filter(|(attribute, _)| attribute.trim() == name) {
            update(&mut working, attribute, value, context)?;
        }
    }
    Ok(working)
}

/// Read an integer from a JSON number or a numeric string.
///
/// # Errors
///
/// Returns [`DomainError::UnmetConditions`] when the value has no integer reading.
pub fn coerce_integer(attribute: &str, value: &Value) -> DomainResult<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        DomainError::UnmetConditions(format!("{attribute} expects an integer, got {value}"))
    })
}

/// Read a string from a JSON string, number or boolean.
///
/// # Errors
///
/// Returns [`DomainError::UnmetConditions`] for null, arrays and objects.
pub fn coerce_text(attribute: &str, value: &Value) -> DomainResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(DomainError::UnmetConditions(format!(
            "{attribute} expects a string, got {value}"
        ))),
    }
}

// =============================================================================
// REGISTRATIONS
// =============================================================================

/// Weight currently loaded on the drone being updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadWeight(pub i64);

impl Updatable for Drone {
    type Context = LoadWeight;

    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: std::sync::LazyLock<AttributeTable<Drone>> = std::sync::LazyLock::new(|| {
            AttributeTable::<Drone>::new()
                .read_only("serialNumber")
                .enumerated("model", |d, name, _| d.set_model_name(name))
                .integer("weightLimit", |d, limit, load| {
                    d.set_weight_limit_for_load(limit, load.0)
                })
                // before state, so a batch can charge the drone and start LOADING
                .integer("batteryLevel", |d, level, _| d.set_battery_level(level))
                .enumerated("state", |d, name, _| d.set_state_name(name))
        });
        &TABLE
    }

    fn ignored_attributes(&self) -> &'static [&'static str] {
        &["load"]
    }
}

impl Updatable for Medication {
    /// Capacity of the carrying drone, when the medication is loaded
    type Context = Option<Capacity>;

    fn attributes() -> &'static AttributeTable<Self> {
        static TABLE: std::sync::LazyLock<AttributeTable<Medication>> =
            std::sync::LazyLock::new(|| {
                AttributeTable::<Medication>::new()
                    .read_only("code")
                    .text("name", |m, name, _| m.set_name(name))
                    .integer("weight", |m, weight, carrier| {
                        m.set_weight(weight, carrier.as_ref())
                    })
                    .text("medicationCaseImageUrl", |m, url, _| {
                        m.set_medication_case_image_url(url);
                        Ok(())
                    })
            });
        &TABLE
    }

    fn ignored_attributes(&self) -> &'static [&'static str] {
        &["associatedDrone"]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::drone::{DroneModel, DroneState};

    fn drone() -> Drone {
        Drone::new("D1", DroneModel::Lightweight, DroneState::Loaded, 100, 50).unwrap()
    }

    #[test]
    fn test_declared_kinds() {
        let table = Drone::attributes();
        assert_eq!(table.kind_of("batteryLevel"), Some(AttributeKind::Integer));
        assert_eq!(table.kind_of("state"), Some(AttributeKind::Enumerated));
        assert_eq!(table.kind_of("serialNumber"), None);
        assert_eq!(Medication::attributes().kind_of("name"), Some(AttributeKind::Text));
    }

    #[test]
    fn test_update_state_by_name() {
        let mut d = drone();
        update(&mut d, " state ", &json!("IDLE"), &LoadWeight(0)).unwrap();
        assert_eq!(d.state(), DroneState::Idle);
    }

    #[test]
    fn test_update_integer_from_string_and_number() {
        let mut d = drone();
        update(&mut d, "batteryLevel", &json!("75"), &LoadWeight(0)).unwrap();
        assert_eq!(d.battery_level(), 75);
        update(&mut d, "batteryLevel", &json!(20.0), &LoadWeight(0)).unwrap();
        assert_eq!(d.battery_level(), 20);
    }

    #[test]
    fn test_ignored_attributes_are_no_ops() {
        let mut d = drone();
        let before = d.clone();
        update(&mut d, "load", &json!([1, 2, 3]), &LoadWeight(0)).unwrap();
        assert_eq!(d, before);

        let mut m = Medication::new("M1", "Aspirin", 40).unwrap();
        let before = m.clone();
        update(&mut m, "associatedDrone", &json!("D9"), &None).unwrap();
        assert_eq!(m, before);
    }

    #[test]
    fn test_unknown_and_read_only_attributes() {
        let mut d = drone();
        let err = update(&mut d, "colour", &json!("red"), &LoadWeight(0)).unwrap_err();
        assert_eq!(err, DomainError::UnmetConditions("colour does not exist".into()));

        let err = update(&mut d, "serialNumber", &json!("D2"), &LoadWeight(0)).unwrap_err();
        assert_eq!(err, DomainError::UnmetConditions("serialNumber is read-only".into()));
        assert_eq!(d.serial_number(), "D1");
    }

    #[test]
    fn test_setter_rejections_become_unmet_conditions() {
        let mut d = drone();
        for (attribute, value) in [
            ("batteryLevel", json!(150)),
            ("batteryLevel", json!("high")),
            ("model", json!("JUMBO")),
            ("weightLimit", json!(null)),
        ] {
            let err = update(&mut d, attribute, &value, &LoadWeight(0)).unwrap_err();
            assert!(matches!(err, DomainError::UnmetConditions(_)), "{attribute}={value}");
        }

        d.set_battery_level(10).unwrap();
        let err = update(&mut d, "state", &json!("LOADING"), &LoadWeight(0)).unwrap_err();
        assert!(matches!(err, DomainError::UnmetConditions(_)));
    }

    #[test]
    fn test_weight_limit_update_sees_load() {
        let mut d = drone();
        let err = update(&mut d, "weightLimit", &json!(30), &LoadWeight(40));
        assert!(err.is_err());
        update(&mut d, "weightLimit", &json!(40), &LoadWeight(40)).unwrap();
        assert_eq!(d.weight_limit(), 40);
    }

    #[test]
    fn test_medication_weight_with_carrier() {
        let d = Drone::new("D1", DroneModel::Lightweight, DroneState::Idle, 100, 50).unwrap();
        let mut m = Medication::new("M1", "Aspirin", 50).unwrap();
        m.set_associated_drone(Some(&d));
        let carrier = Some(d.capacity(std::slice::from_ref(&m)));

        update(&mut m, "weight", &json!(60), &carrier).unwrap();
        assert_eq!(m.weight(), 60);

        let err = update(&mut m, "weight", &json!(500), &carrier).unwrap_err();
        assert!(matches!(err, DomainError::UnmetConditions(_)));

        let err = update(&mut m, "weight", &json!(10), &None).unwrap_err();
        assert!(matches!(err, DomainError::RequestProcessing(_)));
    }

    #[test]
    fn test_update_all_is_all_or_nothing() {
        let d = drone();
        let good = json!({ "state": "IDLE", "batteryLevel": 90, "load": [] });
        let updated = update_all(&d, good.as_object().unwrap(), &LoadWeight(0)).unwrap();
        assert_eq!(updated.state(), DroneState::Idle);
        assert_eq!(updated.battery_level(), 90);

        let bad = json!({ "batteryLevel": 90, "weightLimit": 9000 });
        assert!(update_all(&d, bad.as_object().unwrap(), &LoadWeight(0)).is_err());
        assert_eq!(d.battery_level(), 50);
    }

    #[test]
    fn test_update_all_applies_battery_before_state() {
        assert_eq!(
            Drone::attributes().names().collect::<Vec<_>>(),
            ["serialNumber", "model", "weightLimit", "batteryLevel", "state"]
        );

        let mut low = drone();
        low.set_state(DroneState::Idle).unwrap();
        low.set_battery_level(10).unwrap();

        let mut charge_then_load = Map::new();
        charge_then_load.insert(" state".into(), json!("LOADING"));
        charge_then_load.insert("batteryLevel".into(), json!(90));
        let updated = update_all(&low, &charge_then_load, &LoadWeight(0)).unwrap();
        assert_eq!(updated.state(), DroneState::Loading);
        assert_eq!(updated.battery_level(), 90);

        let mut drain_then_load = Map::new();
        drain_then_load.insert("state".into(), json!("LOADING"));
        drain_then_load.insert("batteryLevel".into(), json!(10));
        let err = update_all(&drone(), &drain_then_load, &LoadWeight(0)).unwrap_err();
        assert!(matches!(err, DomainError::UnmetConditions(_)));
    }

    #[test]
    fn test_update_all_rejects_unknown_names_before_applying() {
        let mut changes = Map::new();
        changes.insert("batteryLevel".into(), json!(150));
        changes.insert("colour".into(), json!("red"));
        let err = update_all(&drone(), &changes, &LoadWeight(0)).unwrap_err();
        assert_eq!(err, DomainError::UnmetConditions("colour does not exist".into()));
    }
}
