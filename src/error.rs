//! Error types for LineStore
//!
//! Provides a unified error type for client, server and codec operations.

use thiserror::Error;

/// Result type alias using LineError
pub type Result<T> = std::result::Result<T, LineError>;

/// Unified error type for LineStore operations
#[derive(Debug, Error)]
pub enum LineError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Line not found: {0}")]
    NotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Client is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LineError {
    /// True for errors caused by the transport timing out
    pub fn is_timeout(&self) -> bool {
        match self {
            LineError::Timeout(_) => true,
            LineError::Io(e) => is_timeout_kind(e.kind()),
            _ => false,
        }
    }

    /// True if the line did not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, LineError::NotFound(_))
    }
}

impl From<serde_json::Error> for LineError {
    fn from(e: serde_json::Error) -> Self {
        LineError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for LineError {
    fn from(e: bincode::Error) -> Self {
        LineError::Serialization(e.to_string())
    }
}

/// Socket timeouts surface as WouldBlock on unix and TimedOut on windows
pub(crate) fn is_timeout_kind(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
