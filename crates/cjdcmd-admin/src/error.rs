//! Admin client error types

use thiserror::Error;

/// Errors talking to the daemon's admin interface
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Daemon error: {0}")]
    Daemon(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Routing error: {0}")]
    Routing(#[from] cjdcmd_routing::RoutingError),
}

/// Result type for admin operations
pub type Result<T> = std::result::Result<T, AdminError>;
