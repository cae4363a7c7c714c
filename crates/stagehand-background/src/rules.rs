//! Declarative network rules installed by the background context.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::BackgroundError;
use crate::webrequest::ResourceType;

/// Id of the frame-header stripping rule.
pub const FRAME_HEADER_RULE_ID: u32 = 1;

/// Response headers that stop the host CRM from rendering inside a frame.
pub const FRAME_BLOCKING_HEADERS: [&str; 2] = ["X-Frame-Options", "x-frame-options"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRule {
    pub id: u32,
    pub priority: u32,
    pub condition: RuleCondition,
    pub action: RuleAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub url_filter: String,
    pub resource_types: Vec<ResourceType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub kind: RuleActionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_headers: Vec<HeaderModification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleActionType {
    ModifyHeaders,
    Block,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderModification {
    pub header: String,
    pub operation: HeaderOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderOperation {
    Remove,
    Set,
    Append,
}

/// Rule removing frame-blocking response headers for documents under `domain`.
pub fn frame_header_rule(domain: &str) -> NetworkRule {
    NetworkRule {
        id: FRAME_HEADER_RULE_ID,
        priority: 1,
        condition: RuleCondition {
            url_filter: format!("||{domain}"),
            resource_types: vec![ResourceType::MainFrame, ResourceType::SubFrame],
        },
        action: RuleAction {
            kind: RuleActionType::ModifyHeaders,
            response_headers: FRAME_BLOCKING_HEADERS
                .iter()
                .map(|header| HeaderModification {
                    header: header.to_string(),
                    operation: HeaderOperation::Remove,
                })
                .collect(),
        },
    }
}

/// The browser's dynamic rule set.
#[async_trait]
pub trait RuleRegistry: Send + Sync {
    async fn dynamic_rule_ids(&self) -> Result<Vec<u32>, BackgroundError>;

    /// Remove `remove_ids`, then add `add_rules`, atomically.
    async fn update_dynamic_rules(
        &self,
        remove_ids: Vec<u32>,
        add_rules: Vec<NetworkRule>,
    ) -> Result<(), BackgroundError>;
}

/// In-memory rule set.
#[derive(Default)]
pub struct MemoryRuleRegistry {
    rules: Mutex<BTreeMap<u32, NetworkRule>>,
}

impl MemoryRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> Vec<NetworkRule> {
        self.rules.lock().values().cloned().collect()
    }
}

#[async_trait]
impl RuleRegistry for MemoryRuleRegistry {
    async fn dynamic_rule_ids(&self) -> Result<Vec<u32>, BackgroundError> {
        Ok(self.rules.lock().keys().copied().collect())
    }

    async fn update_dynamic_rules(
        &self,
        remove_ids: Vec<u32>,
        add_rules: Vec<NetworkRule>,
    ) -> Result<(), BackgroundError> {
        let mut rules = self.rules.lock();
        let mut next = rules.clone();
        for id in remove_ids {
            next.remove(&id);
        }
        for rule in add_rules {
            if next.contains_key(&rule.id) {
                return Err(BackgroundError::Rules(format!(
                    "rule id {} already registered",
                    rule.id
                )));
            }
            next.insert(rule.id, rule);
        }
        *rules = next;
        Ok(())
    }
}
