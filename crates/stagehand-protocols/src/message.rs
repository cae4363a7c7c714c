//! Message contract between page contexts and the background coordinator.
//!
//! Every request yields at most one response. `init-select2` is
//! fire-and-forget and yields none.

use serde::{Deserialize, Serialize};

use crate::types::{Configuration, DropdownOption};

/// Request sent by a page context to the background coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum BackgroundRequest {
    #[serde(rename = "get_config")]
    GetConfig,

    #[serde(rename = "clear_config_cache")]
    ClearConfigCache,

    #[serde(rename = "validate_organization")]
    ValidateOrganization {
        #[serde(rename = "orgId")]
        org_id: String,
    },

    #[serde(rename = "get_dropdown_values")]
    GetDropdownValues,

    #[serde(rename = "init-select2")]
    InitSelect2 { selector: String },
}

impl BackgroundRequest {
    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetConfig => "get_config",
            Self::ClearConfigCache => "clear_config_cache",
            Self::ValidateOrganization { .. } => "validate_organization",
            Self::GetDropdownValues => "get_dropdown_values",
            Self::InitSelect2 { .. } => "init-select2",
        }
    }

    /// Whether the coordinator answers this request.
    pub fn expects_response(&self) -> bool {
        !matches!(self, Self::InitSelect2 { .. })
    }
}

/// Response to a [`BackgroundRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Configuration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<DropdownOption>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_selection: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackgroundResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            config: None,
            allowed: None,
            values: None,
            default_selection: None,
            error: None,
        }
    }

    pub fn with_config(config: Configuration) -> Self {
        Self {
            config: Some(config),
            ..Self::ok()
        }
    }

    pub fn with_allowed(allowed: bool) -> Self {
        Self {
            allowed: Some(allowed),
            ..Self::ok()
        }
    }

    pub fn with_dropdown(values: Vec<DropdownOption>, default_selection: Option<String>) -> Self {
        Self {
            values: Some(values),
            default_selection,
            ..Self::ok()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::ok()
        }
    }
}

/// Notification pushed from the background coordinator to a page context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PageMessage {
    #[serde(rename = "request-completed")]
    RequestCompleted { url: String },
}

/// Origin of a runtime message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageSender {
    pub tab_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i64>,
}

impl MessageSender {
    pub fn tab(tab_id: i64) -> Self {
        Self {
            tab_id,
            frame_id: None,
        }
    }

    pub fn frame(tab_id: i64, frame_id: i64) -> Self {
        Self {
            tab_id,
            frame_id: Some(frame_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: BackgroundRequest =
            serde_json::from_str(r#"{"action":"validate_organization","orgId":"org9"}"#).unwrap();
        assert_eq!(
            request,
            BackgroundRequest::ValidateOrganization {
                org_id: "org9".to_string()
            }
        );

        let request: BackgroundRequest =
            serde_json::from_str(r##"{"action":"init-select2","selector":"#qv-job-select"}"##)
                .unwrap();
        assert_eq!(request.action(), "init-select2");
        assert!(!request.expects_response());
    }

    #[test]
    fn test_unit_requests_round_trip() {
        let json = serde_json::to_string(&BackgroundRequest::GetConfig).unwrap();
        assert_eq!(json, r#"{"action":"get_config"}"#);
        assert!(BackgroundRequest::GetDropdownValues.expects_response());
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let json = serde_json::to_value(BackgroundResponse::with_allowed(true)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "allowed": true}));
    }

    #[test]
    fn test_error_response() {
        let response = BackgroundResponse::error("boom");
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_page_message_wire_format() {
        let message = PageMessage::RequestCompleted {
            url: "https://recruit.zoho.com/recruit/org1/ShowDetails.do".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["status"], "request-completed");
        assert!(json["url"].as_str().unwrap().ends_with("ShowDetails.do"));
    }
}
