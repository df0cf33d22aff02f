//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one worker)
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, peer address)
//!     → handlers.rs
//!         POST /route: validate → admit → cache → engine → cache → envelope
//!         GET /health: plain "OK"
//!     → response.rs (error status mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{PeerAddr, UuidRequestId, X_REQUEST_ID};
pub use response::ApiError;
pub use server::{AppState, GatewayServer};
