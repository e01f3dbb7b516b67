//! Routing error types

use thiserror::Error;

/// Errors produced while decoding paths, routes and targets
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Invalid path format: {0}")]
    InvalidPathFormat(String),

    #[error("Malformed path: a path must be non-zero")]
    MalformedPath,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("{0} not found in routing table")]
    NotFoundInTable(String),
}

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;
