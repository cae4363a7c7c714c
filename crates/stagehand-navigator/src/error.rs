//! Auto-navigator errors.

use stagehand_dom::DomError;
use stagehand_protocols::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavigatorError {
    /// The hosting shell could not perform a page operation.
    #[error("Host error: {0}")]
    Host(String),

    /// A deep link could not be built from the given job opening.
    #[error("Invalid link: {0}")]
    Link(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
