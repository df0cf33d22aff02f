//! Core route request types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A `[longitude, latitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lon, c.lat]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lon, self.lat)
    }
}

/// Distance unit requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "nm")]
    NauticalMiles,
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "mi")]
    Miles,
    #[serde(rename = "m")]
    Meters,
}

impl DistanceUnit {
    /// Canonical token used in responses and cache keys.
    pub const fn token(self) -> &'static str {
        match self {
            DistanceUnit::NauticalMiles => "nm",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Meters => "m",
        }
    }

    /// Length of one unit in meters.
    pub const fn meters(self) -> f64 {
        match self {
            DistanceUnit::NauticalMiles => 1852.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.344,
            DistanceUnit::Meters => 1.0,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Returned when a units string names no known unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUnit(pub String);

impl FromStr for DistanceUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nm" | "nmi" | "nautical" | "nauticalmiles" | "nautical_miles" => Ok(DistanceUnit::NauticalMiles),
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            "m" | "meters" | "metres" => Ok(DistanceUnit::Meters),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

/// A validated route request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub units: DistanceUnit,
}

impl RouteRequest {
    /// Canonical cache fingerprint for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey(format!("{};{};{}", self.origin, self.destination, self.units))
    }
}

/// Cache fingerprint derived from origin, destination and units.
///
/// Floats are written in their shortest round-trip form, so two requests share
/// a key exactly when their tuples are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boston_london(units: DistanceUnit) -> RouteRequest {
        RouteRequest {
            origin: Coordinate::new(-71.06, 42.36),
            destination: Coordinate::new(-0.13, 51.51),
            units,
        }
    }

    #[test]
    fn test_cache_key_is_stable() {
        let a = boston_london(DistanceUnit::NauticalMiles);
        let b = boston_london(DistanceUnit::NauticalMiles);
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key().as_str(), "-71.06,42.36;-0.13,51.51;nm");
    }

    #[test]
    fn test_cache_key_separates_distinct_requests() {
        let nm = boston_london(DistanceUnit::NauticalMiles);
        let km = boston_london(DistanceUnit::Kilometers);
        assert_ne!(nm.cache_key(), km.cache_key());

        let mut reversed = nm;
        std::mem::swap(&mut reversed.origin, &mut reversed.destination);
        assert_ne!(nm.cache_key(), reversed.cache_key());

        let mut nudged = nm;
        nudged.origin.lon = f64::from_bits(nm.origin.lon.to_bits() + 1);
        assert_ne!(nm.cache_key(), nudged.cache_key());
    }

    #[test]
    fn test_unit_aliases() {
        assert_eq!("nm".parse::<DistanceUnit>(), Ok(DistanceUnit::NauticalMiles));
        assert_eq!("Nautical".parse::<DistanceUnit>(), Ok(DistanceUnit::NauticalMiles));
        assert_eq!("kilometres".parse::<DistanceUnit>(), Ok(DistanceUnit::Kilometers));
        assert_eq!("MI".parse::<DistanceUnit>(), Ok(DistanceUnit::Miles));
        assert!("furlongs".parse::<DistanceUnit>().is_err());
    }

    #[test]
    fn test_coordinate_serializes_as_pair() {
        let json = serde_json::to_string(&Coordinate::new(-71.06, 42.36)).unwrap();
        assert_eq!(json, "[-71.06,42.36]");
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Coordinate::new(-71.06, 42.36));
    }
}
