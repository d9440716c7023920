//! # Medlift - Domain Model
//!
//! Drone and medication entities with the invariants that must hold before
//! anything is persisted:
//!
//! - a drone's operational state machine (no `LOADING` below 25% battery)
//! - weight-capacity arithmetic for the medications a drone carries
//! - a generic attribute updater that mutates entities from untyped input
//!   through their validated setters
//!
//! ```text
//!   payload ──► attributes::update ──► Drone / Medication setters
//!                                              │
//!   load / unload ──► load::{load, unload} ────┤
//!                          │                   ▼
//!                          └──────────► Capacity arithmetic
//! ```
//!
//! These types carry no storage concerns; a drone's load is supplied by the
//! caller, typically from a gateway query.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod audit;
pub mod drone;
pub mod entity;
pub mod error;
pub mod load;
pub mod medication;
pub mod validation;

pub use attributes::{AttributeKind, AttributeTable, LoadWeight, Updatable, update, update_all};
pub use audit::BatteryAuditLog;
pub use drone::{Drone, DroneModel, DroneState, MIN_LOADING_BATTERY};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use load::{Capacity, LoadOutcome};
pub use medication::Medication;
