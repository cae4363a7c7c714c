//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid stage list: {0}")]
    InvalidStages(String),

    #[error("Background unavailable: {0}")]
    Disconnected(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_stages_error() {
        let err = ProtocolError::InvalidStages("duplicate value 'Hired'".to_string());
        assert!(err.to_string().contains("Invalid stage list"));
        assert!(err.to_string().contains("Hired"));
    }

    #[test]
    fn test_disconnected_error() {
        let err = ProtocolError::Disconnected("port closed".to_string());
        assert!(err.to_string().contains("port closed"));
    }

    #[test]
    fn test_serialization_error_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: ProtocolError = json_err.into();
        assert!(err.to_string().contains("Serialization"));
    }
}
