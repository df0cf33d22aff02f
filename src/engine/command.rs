//! External routing program bridge.
//!
//! The program receives one JSON request on stdin:
//! `{"origin":[lon,lat],"destination":[lon,lat],"units":"nm"}`
//! and must print a GeoJSON Feature on stdout whose `geometry.coordinates` is
//! the oceanic path and `properties.length` the distance. A non-zero exit
//! status is a rejection; stderr becomes the error message.

use std::io::Write;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, OceanicRoute, RouteEngine};
use crate::route::{Coordinate, DistanceUnit};

pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

#[derive(Serialize)]
struct EngineRequest {
    origin: Coordinate,
    destination: Coordinate,
    units: DistanceUnit,
}

#[derive(Deserialize)]
struct FeatureDoc {
    geometry: GeometryDoc,
    properties: PropertiesDoc,
}

#[derive(Deserialize)]
struct GeometryDoc {
    coordinates: Vec<Coordinate>,
}

#[derive(Deserialize)]
struct PropertiesDoc {
    length: f64,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl RouteEngine for CommandEngine {
    fn name(&self) -> &'static str {
        "command"
    }

    fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        units: DistanceUnit,
    ) -> Result<OceanicRoute, EngineError> {
        let request = serde_json::to_vec(&EngineRequest {
            origin,
            destination,
            units,
        })
        .map_err(|e| EngineError::Protocol(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("route engine exited with {}", output.status)
            } else {
                stderr
            };
            return Err(EngineError::Rejected(message));
        }

        let feature: FeatureDoc = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::Protocol(e.to_string()))?;

        Ok(OceanicRoute {
            coordinates: feature.geometry.coordinates,
            length: feature.properties.length,
        })
    }
}
