//! Completed network request events observed by the background context.

use serde::{Deserialize, Serialize};

/// Resource classification of a network request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    #[serde(rename = "xmlhttprequest")]
    XmlHttpRequest,
    Script,
    Stylesheet,
    Image,
    #[serde(other)]
    Other,
}

/// Frame that issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameType {
    OutermostFrame,
    SubFrame,
    FencedFrame,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebRequestEvent {
    pub url: String,
    pub tab_id: i64,
    #[serde(default)]
    pub frame_id: i64,
    pub frame_type: FrameType,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

impl WebRequestEvent {
    pub fn xhr(url: impl Into<String>, tab_id: i64, frame_type: FrameType, frame_id: i64) -> Self {
        Self {
            url: url.into(),
            tab_id,
            frame_id,
            frame_type,
            resource_type: ResourceType::XmlHttpRequest,
        }
    }
}
