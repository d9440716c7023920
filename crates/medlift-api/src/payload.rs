//! Request payload decoding and response envelopes.
//!
//! Construction payloads are flat JSON objects. Required fields are checked
//! before anything is built; values are coerced the same way the attribute
//! updater coerces them, so `"weightLimit": "100"` and `"weightLimit": 100`
//! are equivalent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use medlift_domain::attributes::{coerce_integer, coerce_text};
use medlift_domain::{Drone, LoadOutcome, Medication};

pub const DRONE_FIELDS: [&str; 5] = [
    "serialNumber",
    "model",
    "state",
    "weightLimit",
    "batteryLevel",
];

pub const MEDICATION_FIELDS: [&str; 3] = ["code", "name", "weight"];

// =============================================================================
// REQUESTS
// =============================================================================

/// Body of the load and unload routes
#[derive(Debug, Clone, Deserialize)]
pub struct CodePayload {
    pub code: String,
}

/// Unwrap a JSON object.
///
/// # Errors
///
/// [`ApiError::InvalidPayload`] for any other JSON value.
pub fn object(value: Value) -> ApiResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::InvalidPayload(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

fn missing_fields(map: &Map<String, Value>, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|field| map.get(*field).is_none_or(Value::is_null))
        .collect()
}

/// # Errors
///
/// [`ApiError::MissingFields`] naming every absent field.
pub fn require_fields(map: &Map<String, Value>, required: &[&'static str]) -> ApiResult<()> {
    let missing = missing_fields(map, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingFields(missing))
    }
}

fn integer(map: &Map<String, Value>, field: &str) -> ApiResult<i64> {
    Ok(coerce_integer(field, &map[field])?)
}

fn text(map: &Map<String, Value>, field: &str) -> ApiResult<String> {
    Ok(coerce_text(field, &map[field])?)
}

/// Build a drone from a construction payload.
///
/// # Errors
///
/// Missing fields, or whatever the drone constructor rejects.
pub fn drone_from_map(map: &Map<String, Value>) -> ApiResult<Drone> {
    require_fields(map, &DRONE_FIELDS)?;
    Ok(Drone::from_names(
        &text(map, "serialNumber")?,
        &text(map, "model")?,
        &text(map, "state")?,
        integer(map, "weightLimit")?,
        integer(map, "batteryLevel")?,
    )?)
}

/// Build a medication from a construction payload.
///
/// `medicationCaseImageUrl` is optional.
///
/// # Errors
///
/// Missing fields, or whatever the medication constructor rejects.
pub fn medication_from_map(map: &Map<String, Value>) -> ApiResult<Medication> {
    require_fields(map, &MEDICATION_FIELDS)?;
    let mut medication = Medication::new(
        &text(map, "code")?,
        &text(map, "name")?,
        integer(map, "weight")?,
    )?;

    if let Some(url) = map.get("medicationCaseImageUrl").filter(|v| !v.is_null()) {
        medication.set_medication_case_image_url(&coerce_text("medicationCaseImageUrl", url)?);
    }
    Ok(medication)
}

/// Decode `{"bulk": [...]}` into entities, failing on the first bad item.
///
/// # Errors
///
/// - [`ApiError::InvalidPayload`] when `bulk` is not an array
/// - [`ApiError::InvalidBulkItem`] for an item that is not an object or lacks
///   a required field
/// - the constructor's error for an item with an invalid value
pub fn bulk<T>(
    body: Value,
    required: &[&'static str],
    build: impl Fn(&Map<String, Value>) -> ApiResult<T>,
) -> ApiResult<Vec<T>> {
    let mut body = object(body)?;
    let Some(Value::Array(items)) = body.remove("bulk") else {
        return Err(ApiError::InvalidPayload(
            "expected a \"bulk\" array".to_string(),
        ));
    };

    items
        .iter()
        .map(|item| match item {
            Value::Object(map) if missing_fields(map, required).is_empty() => build(map),
            other => Err(ApiError::InvalidBulkItem(other.to_string())),
        })
        .collect()
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Success envelope: `{"data": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub const fn new(data: T) -> Self {
        Self { data }
    }
}

/// Bulk creation result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse<T> {
    pub bulk_size: usize,
    pub data: Vec<T>,
}

/// Load route result
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    pub outcome: LoadOutcome,
    pub medication: Medication,
}
