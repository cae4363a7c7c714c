//! Page-side handle on the background coordinator.

use async_trait::async_trait;

use crate::error::ProtocolError;
use crate::message::{BackgroundRequest, BackgroundResponse};
use crate::types::{Configuration, DropdownOption};

/// Runtime messaging channel from a page context to the background coordinator.
#[async_trait]
pub trait BackgroundPort: Send + Sync {
    /// Send a request and wait for its single response.
    async fn request(&self, request: BackgroundRequest) -> Result<BackgroundResponse, ProtocolError>;

    /// Send a request that has no response.
    async fn post(&self, request: BackgroundRequest) -> Result<(), ProtocolError>;

    /// Fetch the current configuration.
    async fn get_config(&self) -> Result<Configuration, ProtocolError> {
        let response = self.request(BackgroundRequest::GetConfig).await?;
        match response {
            BackgroundResponse {
                success: true,
                config: Some(config),
                ..
            } => Ok(config),
            other => Err(ProtocolError::UnexpectedResponse(
                other.error.unwrap_or_else(|| "get_config returned no config".to_string()),
            )),
        }
    }

    /// Ask whether an organisation may use the extension.
    async fn validate_organization(&self, org_id: &str) -> Result<bool, ProtocolError> {
        let response = self
            .request(BackgroundRequest::ValidateOrganization {
                org_id: org_id.to_string(),
            })
            .await?;
        if !response.success {
            return Err(ProtocolError::UnexpectedResponse(
                response.error.unwrap_or_else(|| "validation failed".to_string()),
            ));
        }
        Ok(response.allowed.unwrap_or(false))
    }

    /// Fetch the configured fallback job list.
    async fn dropdown_values(&self) -> Result<(Vec<DropdownOption>, Option<String>), ProtocolError> {
        let response = self.request(BackgroundRequest::GetDropdownValues).await?;
        if !response.success {
            return Err(ProtocolError::UnexpectedResponse(
                response.error.unwrap_or_else(|| "no dropdown values".to_string()),
            ));
        }
        Ok((response.values.unwrap_or_default(), response.default_selection))
    }
}
