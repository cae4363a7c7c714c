//! Pipeline stage definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::defaults::fallback_stages;
use crate::error::ProtocolError;

/// One pipeline status the host CRM accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Display text.
    pub label: String,
    /// Abbreviation.
    #[serde(default)]
    pub short: String,
    /// Canonical status string sent to the host CRM.
    pub value: String,
    /// Background colour (CSS colour string).
    #[serde(default)]
    pub background: String,
    /// Style class matching the stage theme colour.
    #[serde(rename = "badgeClass", default)]
    pub badge_class: String,
    /// Parent pipeline group, when known.
    #[serde(rename = "stageName", default, skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
}

impl StageDefinition {
    pub fn new(
        label: impl Into<String>,
        short: impl Into<String>,
        value: impl Into<String>,
        background: impl Into<String>,
        badge_class: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            short: short.into(),
            value: value.into(),
            background: background.into(),
            badge_class: badge_class.into(),
            stage_name: None,
        }
    }

    pub fn with_stage_name(mut self, stage_name: impl Into<String>) -> Self {
        self.stage_name = Some(stage_name.into());
        self
    }
}

/// A validated, non-empty sequence of stages with unique values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageList(Vec<StageDefinition>);

impl StageList {
    /// Validate a stage sequence.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, ProtocolError> {
        if stages.is_empty() {
            return Err(ProtocolError::InvalidStages("no stages".to_string()));
        }

        let mut seen = HashSet::new();
        for stage in &stages {
            if stage.label.trim().is_empty() {
                return Err(ProtocolError::InvalidStages(format!(
                    "stage with value '{}' has an empty label",
                    stage.value
                )));
            }
            if stage.value.trim().is_empty() {
                return Err(ProtocolError::InvalidStages(format!(
                    "stage '{}' has an empty value",
                    stage.label
                )));
            }
            if !seen.insert(stage.value.as_str()) {
                return Err(ProtocolError::InvalidStages(format!(
                    "duplicate value '{}'",
                    stage.value
                )));
            }
        }

        Ok(Self(stages))
    }

    /// Validate, falling back to the built-in stages when the input is empty or invalid.
    pub fn or_fallback(stages: Vec<StageDefinition>) -> Self {
        Self::new(stages).unwrap_or_else(|_| Self::fallback())
    }

    /// The built-in twelve-stage pipeline.
    pub fn fallback() -> Self {
        Self(fallback_stages())
    }

    pub fn as_slice(&self) -> &[StageDefinition] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StageDefinition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find_by_value(&self, value: &str) -> Option<&StageDefinition> {
        self.0.iter().find(|s| s.value == value)
    }

    /// Every distinct badge class, in stage order.
    pub fn badge_classes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .map(|s| s.badge_class.as_str())
            .filter(|c| !c.is_empty() && seen.insert(*c))
            .collect()
    }
}

impl<'a> IntoIterator for &'a StageList {
    type Item = &'a StageDefinition;
    type IntoIter = std::slice::Iter<'a, StageDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
