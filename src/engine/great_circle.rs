//! Built-in great-circle network.
//!
//! Treats the whole sphere as navigable and follows the great circle between
//! the two points. Stands in for a real maritime network when no external
//! engine is configured.

use crate::engine::{EngineError, OceanicRoute, RouteEngine};
use crate::route::{Coordinate, DistanceUnit};

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

pub struct GreatCircleEngine {
    /// Intermediate points emitted between the endpoints.
    points: usize,
}

impl GreatCircleEngine {
    pub fn new(points: usize) -> Self {
        Self { points }
    }
}

impl RouteEngine for GreatCircleEngine {
    fn name(&self) -> &'static str {
        "great_circle"
    }

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        units: DistanceUnit,
    ) -> Result<OceanicRoute, EngineError> {
        let a = to_vector(origin);
        let b = to_vector(destination);
        let angle = central_angle(a, b);

        if angle < 1e-12 {
            return Err(EngineError::Rejected(
                "origin and destination are the same point".to_string(),
            ));
        }
        if (std::f64::consts::PI - angle) < 1e-9 {
            return Err(EngineError::Rejected(
                "antipodal points have no unique great-circle route".to_string(),
            ));
        }

        let sin_angle = angle.sin();
        let coordinates = (1..=self.points)
            .map(|i| {
                let f = i as f64 / (self.points + 1) as f64;
                let wa = ((1.0 - f) * angle).sin() / sin_angle;
                let wb = (f * angle).sin() / sin_angle;
                to_coordinate([
                    wa * a[0] + wb * b[0],
                    wa * a[1] + wb * b[1],
                    wa * a[2] + wb * b[2],
                ])
            })
            .collect();

        Ok(OceanicRoute {
            coordinates,
            length: angle * EARTH_RADIUS_M / units.meters(),
        })
    }
}

fn to_vector(c: Coordinate) -> [f64; 3] {
    let (lon, lat) = (c.lon.to_radians(), c.lat.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn to_coordinate(v: [f64; 3]) -> Coordinate {
    let lat = v[2].atan2((v[0] * v[0] + v[1] * v[1]).sqrt());
    let lon = v[1].atan2(v[0]);
    Coordinate::new(lon.to_degrees(), lat.to_degrees())
}

// atan2 form stays accurate for both tiny and near-antipodal angles.
fn central_angle(a: [f64; 3], b: [f64; 3]) -> f64 {
    let cross = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let cross_norm = (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt();
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    cross_norm.atan2(dot)
}
