//! Relay of completed host CRM requests to the page that issued them.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, trace};

use stagehand_protocols::{MessageSender, PageMessage};

use crate::error::BackgroundError;
use crate::webrequest::{FrameType, ResourceType, WebRequestEvent};

/// Browser match-pattern glob: `*` matches any run of characters, everything
/// else is literal, and the whole URL must match.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    raw: String,
    regex: Regex,
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Result<Self, BackgroundError> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$")).map_err(|e| BackgroundError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Delivery of notifications to page contexts.
#[async_trait]
pub trait TabMessenger: Send + Sync {
    /// Send to every frame of the tab, or only `frame_id` when given.
    async fn send_to_tab(
        &self,
        tab_id: i64,
        frame_id: Option<i64>,
        message: PageMessage,
    ) -> Result<(), BackgroundError>;
}

pub struct RequestRelay {
    patterns: Vec<UrlPattern>,
    messenger: Arc<dyn TabMessenger>,
}

impl RequestRelay {
    pub fn new(patterns: Vec<UrlPattern>, messenger: Arc<dyn TabMessenger>) -> Self {
        Self {
            patterns,
            messenger,
        }
    }

    pub fn from_globs<S: AsRef<str>>(
        globs: &[S],
        messenger: Arc<dyn TabMessenger>,
    ) -> Result<Self, BackgroundError> {
        let patterns = globs
            .iter()
            .map(|g| UrlPattern::new(g.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns, messenger))
    }

    pub fn is_monitored(&self, url: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(url))
    }

    /// Recipient of the notification for `event`, if any.
    pub fn target(&self, event: &WebRequestEvent) -> Option<MessageSender> {
        if event.resource_type != ResourceType::XmlHttpRequest || !self.is_monitored(&event.url) {
            return None;
        }
        match event.frame_type {
            FrameType::OutermostFrame => Some(MessageSender::tab(event.tab_id)),
            FrameType::SubFrame => Some(MessageSender::frame(event.tab_id, event.frame_id)),
            _ => None,
        }
    }

    /// Forward `event` to its page. Returns whether a notification was sent.
    pub async fn relay(&self, event: &WebRequestEvent) -> bool {
        let Some(target) = self.target(event) else {
            trace!(url = %event.url, "Ignoring request");
            return false;
        };

        let message = PageMessage::RequestCompleted {
            url: event.url.clone(),
        };
        match self
            .messenger
            .send_to_tab(target.tab_id, target.frame_id, message)
            .await
        {
            Ok(()) => {
                debug!(tab_id = target.tab_id, frame_id = ?target.frame_id, url = %event.url, "Relayed request-completed");
                true
            }
            Err(e) => {
                // No listener in the tab is routine (page still loading).
                debug!(tab_id = target.tab_id, error = %e, "Request-completed not delivered");
                false
            }
        }
    }
}
