//! Route request model.
//!
//! # Data Flow
//! ```text
//! POST /route body
//!     → validate.rs (shape, arity, bounds, units)
//!     → RouteRequest (types.rs) → CacheKey
//!     → [admission, cache, engine]
//!     → envelope.rs (GeoJSON response)
//! ```

pub mod envelope;
pub mod types;
pub mod validate;

pub use envelope::{build, RouteEnvelope};
pub use types::{CacheKey, Coordinate, DistanceUnit, RouteRequest};
pub use validate::{validate, validate_body, ValidationError};
