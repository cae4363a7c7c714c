//! Stage selection control model.

use std::fmt;

use serde::{Deserialize, Serialize};
use stagehand_protocols::{StageDefinition, StageList};

use crate::location::Submodule;
use crate::status::UNKNOWN_STATUS;

/// Text colour applied once the control shows a known stage.
pub const SELECTED_TEXT_COLOR: &str = "white";

/// Tooltip shown over every stage control.
pub const CONTROL_TOOLTIP: &str = "Change status";

/// Where a control was injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "view", content = "submodule", rename_all = "snake_case")]
pub enum ViewKind {
    ListRow,
    Detail(Submodule),
    QuickView,
}

/// Identity of a rendered control: one per view and record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlId {
    pub view: ViewKind,
    pub entity_id: String,
}

impl ControlId {
    pub fn new(view: ViewKind, entity_id: impl Into<String>) -> Self {
        Self {
            view,
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view {
            ViewKind::ListRow => write!(f, "row:{}", self.entity_id),
            ViewKind::Detail(submodule) => write!(f, "detail:{submodule}:{}", self.entity_id),
            ViewKind::QuickView => write!(f, "quick-view:{}", self.entity_id),
        }
    }
}

/// The disabled first option showing the current status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One selectable stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOption {
    pub value: String,
    pub label: String,
    pub background: String,
    pub badge_class: String,
}

impl From<&StageDefinition> for StageOption {
    fn from(stage: &StageDefinition) -> Self {
        Self {
            value: stage.value.clone(),
            label: stage.label.clone(),
            background: stage.background.clone(),
            badge_class: stage.badge_class.clone(),
        }
    }
}

/// A status change the user asked for, not yet confirmed by the host CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeRequest {
    pub control: ControlId,
    pub option: StageOption,
}

impl StatusChangeRequest {
    pub fn entity_id(&self) -> &str {
        &self.control.entity_id
    }

    pub fn status(&self) -> &str {
        &self.option.value
    }
}

/// Rendered stage selection control.
///
/// The selected index always rests on the placeholder. Choosing an option only
/// produces a [`StatusChangeRequest`]; the visible state moves through
/// [`StageControl::apply_success`] once the host CRM confirms the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageControl {
    pub id: ControlId,
    pub placeholder: Placeholder,
    pub options: Vec<StageOption>,
    pub tooltip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_class: Option<String>,
}

impl StageControl {
    /// Build the control for a record whose current status is `current`.
    pub fn render(id: ControlId, stages: &StageList, current: &str) -> Self {
        let text = if current.is_empty() { UNKNOWN_STATUS } else { current };
        let mut control = Self {
            id,
            placeholder: Placeholder {
                text: text.to_string(),
                background: None,
                color: None,
            },
            options: stages.iter().map(StageOption::from).collect(),
            tooltip: CONTROL_TOOLTIP.to_string(),
            badge_class: None,
        };

        if let Some(stage) = stages.find_by_value(current) {
            control.show(&StageOption::from(stage));
        }
        control
    }

    /// Text currently shown by the control.
    pub fn current_label(&self) -> &str {
        &self.placeholder.text
    }

    pub fn background(&self) -> Option<&str> {
        self.placeholder.background.as_deref()
    }

    pub fn option(&self, value: &str) -> Option<&StageOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Request for choosing `value`. The placeholder and unknown values yield `None`.
    pub fn select(&self, value: &str) -> Option<StatusChangeRequest> {
        if value.is_empty() {
            return None;
        }
        self.option(value).map(|option| StatusChangeRequest {
            control: self.id.clone(),
            option: option.clone(),
        })
    }

    /// Reflect a confirmed status change.
    pub fn apply_success(&mut self, option: &StageOption) {
        self.show(option);
    }

    fn show(&mut self, option: &StageOption) {
        self.placeholder.text = option.label.clone();
        self.placeholder.background = Some(option.background.clone());
        self.placeholder.color = Some(SELECTED_TEXT_COLOR.to_string());
        self.badge_class = Some(option.badge_class.clone());
    }
}
