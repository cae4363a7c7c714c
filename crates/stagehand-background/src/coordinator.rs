//! Background coordinator: answers page requests and owns browser-wide side effects.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use stagehand_protocols::{BackgroundRequest, BackgroundResponse, MessageSender};

use crate::cache::ConfigCache;
use crate::error::BackgroundError;
use crate::relay::RequestRelay;
use crate::rules::{RuleRegistry, frame_header_rule};
use crate::scripting::{PageScript, ScriptExecutor};
use crate::webrequest::WebRequestEvent;

/// Default domain for the frame-header rule.
pub const DEFAULT_FRAME_RULE_DOMAIN: &str = "recruit.zoho.com";

pub struct BackgroundCoordinator {
    cache: Arc<ConfigCache>,
    relay: RequestRelay,
    rules: Arc<dyn RuleRegistry>,
    scripts: Arc<dyn ScriptExecutor>,
    frame_rule_domain: String,
}

impl BackgroundCoordinator {
    pub fn new(
        cache: Arc<ConfigCache>,
        relay: RequestRelay,
        rules: Arc<dyn RuleRegistry>,
        scripts: Arc<dyn ScriptExecutor>,
    ) -> Self {
        Self {
            cache,
            relay,
            rules,
            scripts,
            frame_rule_domain: DEFAULT_FRAME_RULE_DOMAIN.to_string(),
        }
    }

    pub fn with_frame_rule_domain(mut self, domain: impl Into<String>) -> Self {
        self.frame_rule_domain = domain.into();
        self
    }

    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Answer one page request. `None` means the action has no response.
    pub async fn handle(
        &self,
        request: BackgroundRequest,
        sender: Option<MessageSender>,
    ) -> Option<BackgroundResponse> {
        debug!(action = request.action(), ?sender, "Received request");
        match request {
            BackgroundRequest::GetConfig => {
                let config = self.cache.get().await;
                Some(BackgroundResponse::with_config(config))
            }
            BackgroundRequest::ClearConfigCache => match self.cache.clear().await {
                Ok(()) => Some(BackgroundResponse::ok()),
                Err(e) => {
                    error!(error = %e, "Failed to clear configuration cache");
                    Some(BackgroundResponse::error(e.to_string()))
                }
            },
            BackgroundRequest::ValidateOrganization { org_id } => {
                let config = self.cache.get().await;
                let allowed = config.is_organization_allowed(&org_id);
                info!(org_id = %org_id, allowed, "Validated organization");
                Some(BackgroundResponse::with_allowed(allowed))
            }
            BackgroundRequest::GetDropdownValues => {
                let config = self.cache.get().await;
                let dropdown = config.dropdown_values;
                Some(BackgroundResponse::with_dropdown(
                    dropdown.job_openings,
                    dropdown.default_selection,
                ))
            }
            BackgroundRequest::InitSelect2 { selector } => {
                self.init_select2(selector, sender).await;
                None
            }
        }
    }

    async fn init_select2(&self, selector: String, sender: Option<MessageSender>) {
        let Some(sender) = sender else {
            warn!(selector = %selector, "init-select2 without a sender tab");
            return;
        };
        if let Err(e) = self
            .scripts
            .execute(sender.tab_id, PageScript::select2(selector))
            .await
        {
            warn!(tab_id = sender.tab_id, error = %e, "Failed to enhance select control");
        }
    }

    /// Extension installed or updated.
    pub async fn on_installed(&self) {
        info!("Extension installed, reloading configuration");
        self.cache.invalidate_and_reload().await;
        if let Err(e) = self.register_dynamic_rules().await {
            error!(error = %e, "Failed to register dynamic rules");
        }
    }

    /// Browser startup.
    pub async fn on_startup(&self) {
        info!("Extension startup, loading configuration");
        self.cache.warm().await;
    }

    pub async fn on_request_completed(&self, event: &WebRequestEvent) -> bool {
        self.relay.relay(event).await
    }

    /// Replace every dynamic rule with the frame-header rule.
    pub async fn register_dynamic_rules(&self) -> Result<(), BackgroundError> {
        let existing = self.rules.dynamic_rule_ids().await?;
        let rule = frame_header_rule(&self.frame_rule_domain);
        debug!(removed = existing.len(), rule_id = rule.id, "Registering dynamic rules");
        self.rules.update_dynamic_rules(existing, vec![rule]).await
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
