//! # Medlift Persistence Library
//!
//! Gateway layer for the medlift fleet.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Request Surface                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Fleet Service                        │
//! │      (row guards, domain checks, load association)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Repository Traits                       │
//! │ (DroneRepository, MedicationRepository, AuditLogRepository) │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        MemoryStore                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medlift_persistence::{Fleet, MemoryStore};
//!
//! let fleet = Fleet::new(MemoryStore::new());
//! fleet.register_drone(drone).await?;
//! fleet.load_medication("D1", "M1").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod fleet;
pub mod repository;

pub use error::{PersistenceError, Result};
pub use fleet::Fleet;
pub use repository::{
    AuditLogRepository, DroneRepository, MedicationRepository, MemoryStore, Repository,
    RowGuard, UnitOfWork,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
