//! Request validation.
//!
//! Runs to completion before admission control or any cache interaction, so no
//! cache key is ever derived from malformed input.

use serde_json::Value;
use thiserror::Error;

use crate::route::types::{Coordinate, DistanceUnit, RouteRequest};

/// Why a route request was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    MalformedBody,
    #[error("Both origin and destination points are required")]
    MissingEndpoints,
    #[error("{field} must be a [longitude, latitude] pair of numbers")]
    InvalidPair { field: &'static str },
    #[error("{field} is out of range: longitude must be within [-180, 180] and latitude within [-90, 90]")]
    OutOfRange { field: &'static str },
    #[error("units must be a string")]
    InvalidUnits,
    #[error("Unsupported units {0:?}; expected one of nm, km, mi, m")]
    UnknownUnits(String),
}

/// Parse and validate a raw request body.
pub fn validate_body(body: &[u8]) -> Result<RouteRequest, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    validate(&value)
}

/// Validate a decoded request body.
///
/// Checks, in order: body is an object; origin and destination are present;
/// each is an array of exactly two numbers; each pair is within bounds; units,
/// if given, names a known unit.
pub fn validate(body: &Value) -> Result<RouteRequest, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::MalformedBody)?;

    let origin = object.get("origin").filter(|v| !v.is_null());
    let destination = object.get("destination").filter(|v| !v.is_null());
    let (origin, destination) = match (origin, destination) {
        (Some(o), Some(d)) => (o, d),
        _ => return Err(ValidationError::MissingEndpoints),
    };

    let origin = parse_pair("origin", origin)?;
    let destination = parse_pair("destination", destination)?;
    check_bounds("origin", origin)?;
    check_bounds("destination", destination)?;

    let units = match object.get("units") {
        None | Some(Value::Null) => DistanceUnit::default(),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ValidationError::UnknownUnits(s.clone()))?,
        Some(_) => return Err(ValidationError::InvalidUnits),
    };

    Ok(RouteRequest {
        origin,
        destination,
        units,
    })
}

fn parse_pair(field: &'static str, value: &Value) -> Result<Coordinate, ValidationError> {
    let invalid = || ValidationError::InvalidPair { field };
    match value.as_array().map(Vec::as_slice) {
        Some([lon, lat]) => {
            let lon = lon.as_f64().ok_or_else(invalid)?;
            let lat = lat.as_f64().ok_or_else(invalid)?;
            Ok(Coordinate::new(lon, lat))
        }
        _ => Err(invalid()),
    }
}

fn check_bounds(field: &'static str, c: Coordinate) -> Result<(), ValidationError> {
    let ok = c.lon.is_finite()
        && c.lat.is_finite()
        && (-180.0..=180.0).contains(&c.lon)
        && (-90.0..=90.0).contains(&c.lat);
    if ok {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field })
    }
}
