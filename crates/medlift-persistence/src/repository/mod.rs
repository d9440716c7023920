//! # Repository Module
//!
//! Gateway traits and the in-memory backend.

pub mod memory;
pub mod traits;

pub use memory::{MemoryAuditLogs, MemoryStore, MemoryTable};
pub use traits::{
    AuditLogRepository, DroneRepository, MedicationRepository, Repository, RowGuard, UnitOfWork,
};
