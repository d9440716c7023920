//! Property tests for the drone invariants and capacity arithmetic.

use medlift_domain::attributes::{LoadWeight, update};
use medlift_domain::{
    DomainError, Drone, DroneModel, DroneState, LoadOutcome, MIN_LOADING_BATTERY, Medication,
    load,
};
use proptest::prelude::*;
use serde_json::json;

fn any_state() -> impl Strategy<Value = DroneState> {
    prop::sample::select(DroneState::ALL.to_vec())
}

fn any_model() -> impl Strategy<Value = DroneModel> {
    prop::sample::select(DroneModel::ALL.to_vec())
}

fn load_of(weights: &[i64]) -> Vec<Medication> {
    weights
        .iter()
        .enumerate()
        .map(|(i, w)| Medication::new(&format!("M{i}"), "Item", *w).unwrap())
        .collect()
}

// ── Construction ranges ─────────────────────────────────────

proptest! {
    #[test]
    fn construction_accepts_every_in_range_value(
        model in any_model(),
        weight_limit in 0i64..=500,
        battery in 0i64..=100,
    ) {
        let drone = Drone::new("D1", model, DroneState::Idle, weight_limit, battery);
        prop_assert!(drone.is_ok());
    }

    #[test]
    fn construction_rejects_out_of_range_weight_limit(
        weight_limit in prop_oneof![i64::MIN..0, 501i64..=i64::MAX],
        battery in 0i64..=100,
    ) {
        let drone = Drone::new("D1", DroneModel::Lightweight, DroneState::Idle, weight_limit, battery);
        prop_assert!(matches!(drone, Err(DomainError::InvalidInputFormat { .. })), "expected InvalidInputFormat, got {:?}", drone);
    }

    #[test]
    fn construction_rejects_out_of_range_battery(
        weight_limit in 0i64..=500,
        battery in prop_oneof![i64::MIN..0, 101i64..=i64::MAX],
    ) {
        let drone = Drone::new("D1", DroneModel::Lightweight, DroneState::Idle, weight_limit, battery);
        prop_assert!(matches!(drone, Err(DomainError::InvalidInputFormat { .. })), "expected InvalidInputFormat, got {:?}", drone);
    }
}

// ── LOADING battery guard ───────────────────────────────────

proptest! {
    /// Entering LOADING fails iff the battery is below the minimum, from any state.
    #[test]
    fn loading_guard_holds_for_every_state(from in any_state(), battery in 0i64..=100) {
        let start = if from == DroneState::Loading && battery < i64::from(MIN_LOADING_BATTERY) {
            DroneState::Idle
        } else {
            from
        };
        let mut drone = Drone::new("D1", DroneModel::Middleweight, start, 200, battery).unwrap();

        let result = drone.set_state(DroneState::Loading);
        if battery < i64::from(MIN_LOADING_BATTERY) {
            prop_assert!(matches!(result, Err(DomainError::UnmetConditions(_))));
            prop_assert_eq!(drone.state(), start);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(drone.state(), DroneState::Loading);
        }
    }

    /// Every transition other than into LOADING is accepted.
    #[test]
    fn other_transitions_are_unrestricted(
        from in any_state(),
        to in any_state(),
        battery in 25i64..=100,
    ) {
        prop_assume!(to != DroneState::Loading);
        let mut drone = Drone::new("D1", DroneModel::Middleweight, from, 200, battery).unwrap();
        drone.set_battery_level(0).unwrap();
        prop_assert!(drone.set_state(to).is_ok());
        prop_assert_eq!(drone.state(), to);
    }
}

// ── Capacity arithmetic ─────────────────────────────────────

proptest! {
    #[test]
    fn can_hold_matches_sum(
        weights in proptest::collection::vec(0i64..=120, 0..8),
        limit in 0i64..=500,
        extra in 0i64..=500,
    ) {
        let drone = Drone::new("D1", DroneModel::Heavyweight, DroneState::Idle, limit, 90).unwrap();
        let load = load_of(&weights);
        let total: i64 = weights.iter().sum();

        prop_assert_eq!(drone.can_hold(&load, extra), total + extra <= limit);
        // boundary equality always fits
        if total <= limit {
            prop_assert!(drone.can_hold(&load, limit - total));
        }
    }

    #[test]
    fn weight_difference_is_can_hold_of_delta(
        weights in proptest::collection::vec(0i64..=100, 1..6),
        limit in 0i64..=500,
        new_weight in 0i64..=300,
    ) {
        let drone = Drone::new("D1", DroneModel::Heavyweight, DroneState::Idle, limit, 90).unwrap();
        let load = load_of(&weights);
        let old = weights[0];

        prop_assert_eq!(
            drone.can_hold_weight_difference(&load, old, new_weight),
            drone.can_hold(&load, new_weight - old)
        );
    }

    /// A load that is accepted never leaves the drone over its limit.
    #[test]
    fn accepted_loads_never_exceed_limit(
        weights in proptest::collection::vec(1i64..=150, 1..10),
        limit in 0i64..=500,
    ) {
        let drone = Drone::new("D1", DroneModel::Heavyweight, DroneState::Idle, limit, 90).unwrap();
        let mut on_board: Vec<Medication> = Vec::new();

        for mut item in load_of(&weights) {
            if load::load(&drone, &mut item, &on_board) == Ok(LoadOutcome::Loaded) {
                on_board.push(item);
            }
        }

        let carried: i64 = on_board.iter().map(|m| i64::from(m.weight())).sum();
        prop_assert!(carried <= limit);
    }
}

// ── Attribute updater ───────────────────────────────────────

proptest! {
    #[test]
    fn ignored_attributes_never_fail(value in any::<i64>(), text in "\\PC*") {
        let mut drone = Drone::new("D1", DroneModel::Lightweight, DroneState::Idle, 100, 50).unwrap();
        let before = drone.clone();
        prop_assert!(update(&mut drone, "load", &json!(value), &LoadWeight(0)).is_ok());
        prop_assert!(update(&mut drone, " load ", &json!(text), &LoadWeight(0)).is_ok());
        prop_assert_eq!(drone, before);

        let mut medication = Medication::new("M1", "Aspirin", 10).unwrap();
        let before = medication.clone();
        prop_assert!(update(&mut medication, "associatedDrone", &json!(value), &None).is_ok());
        prop_assert_eq!(medication, before);
    }
}
