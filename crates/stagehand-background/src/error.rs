//! Background coordinator errors.

use thiserror::Error;

use stagehand_protocols::ProtocolError;

/// Failure to obtain the remote configuration document.
#[derive(Debug, Error)]
pub enum ConfigFetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid configuration document: {0}")]
    Parse(String),
}

/// Failure of the local configuration store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a browser-facing port.
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Tab messaging failed: {0}")]
    Messaging(String),

    #[error("Rule registration failed: {0}")]
    Rules(String),

    #[error("Script execution failed: {0}")]
    Script(String),

    #[error("Invalid URL pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
