//! Page integrator errors.

use stagehand_dom::DomError;
use stagehand_protocols::ProtocolError;
use thiserror::Error;

/// Failure talking to the host CRM.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server response: {status}")]
    Status { status: u16 },

    #[error("No success message received: {0}")]
    UnexpectedBody(String),

    #[error("CSRF token not found on page")]
    MissingCsrf,

    #[error("Organization id not found in {0}")]
    MissingOrg(String),
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Crm(#[from] CrmError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Invalid page URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Unknown control: {0}")]
    UnknownControl(String),
}
