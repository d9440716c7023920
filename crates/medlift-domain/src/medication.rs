//! Medication entity.

use serde::Serialize;

use crate::drone::Drone;
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::load::Capacity;
use crate::validation::{Pattern, bounded};

/// A medication item that can be loaded onto a drone.
///
/// The medication owns the association: `associated_drone` holds the serial
/// number of the carrying drone, and a drone's load is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    code: String,
    name: String,
    weight: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    medication_case_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    associated_drone: Option<String>,
}

impl Medication {
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInputFormat`] when the code or name does
    /// not match its pattern, or the weight is negative.
    pub fn new(code: &str, name: &str, weight: i64) -> DomainResult<Self> {
        Ok(Self {
            code: normalize_code(code)?,
            name: validate_name(name)?,
            weight: validate_weight(weight)?,
            medication_case_image_url: None,
            associated_drone: None,
        })
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn weight(&self) -> i32 {
        self.weight
    }

    #[must_use]
    pub fn medication_case_image_url(&self) -> Option<&str> {
        self.medication_case_image_url.as_deref()
    }

    /// Serial number of the carrying drone, if any
    #[must_use]
    pub fn associated_drone(&self) -> Option<&str> {
        self.associated_drone.as_deref()
    }

    #[must_use]
    pub fn is_associated_with(&self, serial_number: &str) -> bool {
        self.associated_drone.as_deref() == Some(serial_number)
    }

    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInputFormat`] unless the name matches `[A-Za-z0-9-_]+`.
    pub fn set_name(&mut self, name: &str) -> DomainResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    /// Change the weight.
    ///
    /// While the medication is loaded, `carrier` must be the capacity of the
    /// associated drone with this medication counted at its current weight.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidInputFormat`] for a negative weight
    /// - [`DomainError::CapacityExceeded`] when the carrier cannot take the difference
    /// - [`DomainError::RequestProcessing`] when the medication is loaded but
    ///   no matching carrier capacity was supplied
    pub fn set_weight(&mut self, weight: i64, carrier: Option<&Capacity>) -> DomainResult<()> {
        let weight = validate_weight(weight)?;

        if let Some(serial) = self.associated_drone.as_deref() {
            let capacity = carrier
                .filter(|c| c.drone() == serial)
                .ok_or_else(|| {
                    DomainError::RequestProcessing(format!(
                        "load of drone {serial} is required to resize medication {}",
                        self.code
                    ))
                })?;

            let old = i64::from(self.weight);
            let new = i64::from(weight);
            if !capacity.can_hold_weight_difference(old, new) {
                return Err(capacity.exceeded_by(new - old));
            }
        }

        self.weight = weight;
        Ok(())
    }

    /// Blank URLs are ignored. Probing that the URL really serves an image
    /// is left to the caller.
    pub fn set_medication_case_image_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.medication_case_image_url = Some(url.to_string());
        }
    }

    /// Plain assignment; capacity is checked by [`crate::load::load`].
    pub fn set_associated_drone(&mut self, drone: Option<&Drone>) {
        self.associated_drone = drone.map(|d| d.serial_number().to_string());
    }
}

impl Entity for Medication {
    const ENTITY_TYPE: &'static str = "Medication";

    fn id(&self) -> &str {
        &self.code
    }

    fn can_be_deleted(&self) -> DomainResult<()> {
        match &self.associated_drone {
            Some(serial) => Err(DomainError::Conflict(format!(
                "Cannot delete medication {} while it is loaded onto drone {serial}",
                self.code
            ))),
            None => Ok(()),
        }
    }
}

fn normalize_code(code: &str) -> DomainResult<String> {
    let code = code.trim().to_uppercase();
    Pattern::Code.check(&code)?;
    Ok(code)
}

fn validate_name(name: &str) -> DomainResult<String> {
    Pattern::Name.check(name)?;
    Ok(name.to_string())
}

fn validate_weight(weight: i64) -> DomainResult<i32> {
    bounded("weight", weight, 0..=i32::MAX)
}
