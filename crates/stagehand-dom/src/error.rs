//! DOM snapshot errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    /// A required element was absent from the snapshot.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A `data-params` style attribute did not hold the expected JSON.
    #[error("Malformed params on {element}: {message}")]
    MalformedParams { element: String, message: String },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),
}
