//! Common behaviour of persisted entities.

use crate::error::DomainResult;

/// An entity stored by the persistence gateway under a string key.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable type name used in error messages
    const ENTITY_TYPE: &'static str;

    fn id(&self) -> &str;

    /// Guard evaluated before the entity is removed from storage.
    ///
    /// # Errors
    ///
    /// Returns the reason deletion is refused.
    fn can_be_deleted(&self) -> DomainResult<()>;
}
