//! Remote configuration document and its cached form.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::stage::{StageDefinition, StageList};

/// Pipeline configuration published at the remote configuration URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Configuration {
    /// Informational version string.
    #[serde(default)]
    pub version: String,

    /// Organisation ids permitted to use the extension.
    #[serde(default)]
    pub allowed_organizations: BTreeSet<String>,

    /// Host CRM origins and page patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoho_config: Option<CrmEndpoints>,

    /// Job list used when the live job list cannot be fetched.
    #[serde(default)]
    pub dropdown_values: DropdownValues,

    /// Ordered pipeline stages. May be empty, in which case consumers fall back.
    #[serde(default)]
    pub pipeline_stages: Vec<StageDefinition>,

    /// Auto-navigation tuning.
    #[serde(default)]
    pub auto_applications: AutoApplicationsConfig,
}

impl Configuration {
    pub fn is_organization_allowed(&self, org_id: &str) -> bool {
        self.allowed_organizations.contains(org_id)
    }

    /// Stage list with the built-in fallback applied.
    pub fn stage_list(&self) -> StageList {
        StageList::or_fallback(self.pipeline_stages.clone())
    }
}

/// Host CRM origins and page patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CrmEndpoints {
    #[serde(default)]
    pub base_urls: Vec<String>,
    #[serde(default)]
    pub url_patterns: Vec<String>,
}

/// One `{value, text}` entry of the fallback job list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub value: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DropdownValues {
    #[serde(default)]
    pub job_openings: Vec<DropdownOption>,
    #[serde(default)]
    pub default_selection: Option<String>,
}

/// Auto-navigation tuning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoApplicationsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Interval between search attempts, in milliseconds.
    #[serde(rename = "retry_interval", default = "default_retry_interval")]
    pub retry_interval_ms: u64,

    /// Total search budget, in milliseconds.
    #[serde(rename = "max_wait_time", default = "default_max_wait")]
    pub max_wait_ms: u64,

    #[serde(default)]
    pub debug: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_retry_interval() -> u64 {
    500
}

fn default_max_wait() -> u64 {
    10_000
}

impl AutoApplicationsConfig {
    /// Retry interval, treating zero as unset.
    pub fn retry_interval(&self) -> Duration {
        match self.retry_interval_ms {
            0 => Duration::from_millis(default_retry_interval()),
            ms => Duration::from_millis(ms),
        }
    }

    /// Search budget, treating zero as unset.
    pub fn max_wait(&self) -> Duration {
        match self.max_wait_ms {
            0 => Duration::from_millis(default_max_wait()),
            ms => Duration::from_millis(ms),
        }
    }
}

impl Default for AutoApplicationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            retry_interval_ms: default_retry_interval(),
            max_wait_ms: default_max_wait(),
            debug: false,
        }
    }
}

/// Locally persisted configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedConfiguration {
    pub config: Configuration,
    /// Epoch milliseconds at which the configuration was fetched.
    pub cached_at_ms: i64,
}

impl CachedConfiguration {
    pub fn new(config: Configuration, cached_at_ms: i64) -> Self {
        Self {
            config,
            cached_at_ms,
        }
    }

    /// Whether the record is younger than `ttl` at `now_ms`.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let age = now_ms.saturating_sub(self.cached_at_ms);
        age >= 0 && (age as u128) < ttl.as_millis()
    }
}
