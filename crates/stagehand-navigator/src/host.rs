//! The hosting shell's page operations used by the navigator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stagehand_dom::{Document, ElementLocator};

use crate::error::NavigatorError;

/// Ways of activating an element, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMethod {
    /// The element's own `click()`.
    Native,
    /// Invoking its `onclick` handler property.
    HandlerProperty,
    /// Dispatching a bubbling, cancelable mouse event.
    SyntheticEvent,
}

impl ClickMethod {
    pub const ORDER: [ClickMethod; 3] = [
        ClickMethod::Native,
        ClickMethod::HandlerProperty,
        ClickMethod::SyntheticEvent,
    ];
}

#[async_trait]
pub trait NavigatorHost: Send + Sync {
    async fn snapshot(&self) -> Result<Document, NavigatorError>;

    async fn current_url(&self) -> Result<String, NavigatorError>;

    /// Smooth-scroll the element to the middle of the viewport.
    async fn scroll_into_view(&self, target: &ElementLocator) -> Result<(), NavigatorError>;

    /// Returns `false` when `method` is unavailable on the element.
    async fn click(&self, target: &ElementLocator, method: ClickMethod) -> Result<bool, NavigatorError>;

    /// Replace the current location without adding a history entry.
    async fn restore(&self, url: &str) -> Result<(), NavigatorError>;
}
