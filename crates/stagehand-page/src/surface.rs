//! The hosting shell's view of the live page.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stagehand_dom::{Document, ElementLocator};

use crate::control::StageControl;
use crate::error::PageError;
use crate::widgets::Widget;

/// Insertion point relative to an anchor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Last child of the anchor.
    Append,
    /// Next sibling of the anchor.
    After,
}

/// Restyle of a host status badge after a confirmed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUpdate {
    /// Every stage badge class, removed before `add_class` is applied.
    pub remove_classes: Vec<String>,
    pub add_class: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

/// Live page operations provided by the hosting shell.
#[async_trait]
pub trait PageSurface: Send + Sync {
    /// Capture the current DOM.
    async fn snapshot(&self) -> Result<Document, PageError>;

    async fn insert(&self, anchor: &ElementLocator, placement: Placement, widget: Widget) -> Result<(), PageError>;

    /// Redraw a previously inserted stage control.
    async fn update_control(&self, control: &StageControl) -> Result<(), PageError>;

    async fn restyle_badge(&self, target: &ElementLocator, update: BadgeUpdate) -> Result<(), PageError>;

    /// Toggle the associate button between idle and busy.
    async fn set_associate_busy(&self, candidate_id: &str, busy: bool) -> Result<(), PageError>;

    /// Append a stylesheet to the document head.
    async fn inject_style(&self, css: &str) -> Result<(), PageError>;

    async fn navigate(&self, url: &str) -> Result<(), PageError>;
}
