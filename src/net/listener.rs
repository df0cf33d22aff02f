//! TCP listener setup.
//!
//! # Responsibilities
//! - Resolve the configured host and port
//! - Bind with `SO_REUSEPORT` so every worker process can accept on the same
//!   port, the kernel spreading connections between them

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};

use crate::config::ListenerConfig;

const BACKLOG: u32 = 1024;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to resolve {0}: {1}")]
    Resolve(String, std::io::Error),
    #[error("No address found for {0}")]
    NoAddress(String),
    #[error("Failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),
}

/// Bind a listener for the configured address.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let target = config.bind_address();
    let addr = tokio::net::lookup_host(&target)
        .await
        .map_err(|e| ListenerError::Resolve(target.clone(), e))?
        .next()
        .ok_or_else(|| ListenerError::NoAddress(target.clone()))?;

    bind_addr(addr, config.reuse_port).map_err(|e| ListenerError::Bind(addr, e))
}

fn bind_addr(addr: SocketAddr, reuse_port: bool) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    #[cfg(all(unix, not(target_os = "solaris"), not(target_os = "illumos")))]
    if reuse_port {
        socket.set_reuseport(true)?;
    }
    #[cfg(not(all(unix, not(target_os = "solaris"), not(target_os = "illumos"))))]
    let _ = reuse_port;

    socket.bind(addr)?;
    socket.listen(BACKLOG)
}
