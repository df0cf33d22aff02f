//! Network layer.
//!
//! # Data Flow
//! ```text
//! worker start
//!     → listener.rs (resolve, SO_REUSEPORT bind)
//!     → axum::serve on the bound listener
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
