//! GeoJSON response envelope.

use serde::{Deserialize, Serialize};

use crate::engine::RouteResult;
use crate::route::types::{Coordinate, DistanceUnit, RouteRequest};

/// Body of a successful `POST /route` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEnvelope {
    pub success: bool,
    pub route: RouteFeature,
    pub distance: f64,
    pub units: DistanceUnit,
}

/// GeoJSON `Feature` wrapping the route line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFeature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub geometry: LineString,
    pub properties: RouteProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryKind {
    LineString,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub coordinates: Vec<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteProperties {
    pub length: f64,
    pub units: DistanceUnit,
}

/// Assemble the response envelope for a computed route.
///
/// `route.coordinates` already starts at the request origin and ends at the
/// destination; this is a pure mapping with no side effects.
pub fn build(request: &RouteRequest, route: &RouteResult) -> RouteEnvelope {
    debug_assert_eq!(route.coordinates.first(), Some(&request.origin));
    debug_assert_eq!(route.coordinates.last(), Some(&request.destination));

    RouteEnvelope {
        success: true,
        route: RouteFeature {
            kind: FeatureKind::Feature,
            geometry: LineString {
                kind: GeometryKind::LineString,
                coordinates: route.coordinates.clone(),
            },
            properties: RouteProperties {
                length: route.distance,
                units: request.units,
            },
        },
        distance: route.distance,
        units: request.units,
    }
}
