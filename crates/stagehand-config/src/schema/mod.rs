//! Settings schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use stagehand_protocols::defaults::{
    CONFIG_TTL, CRM_ORIGIN, DEFAULT_CONFIG_URL, MONITORED_URL_PATTERNS,
};

mod schema_runtime;

pub use schema_runtime::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Per-user data directory for the host (`~/.local/share/stagehand` on Linux).
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stagehand")
}

/// Root settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub crm: CrmSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub navigator: NavigatorSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Directory holding the cached configuration record.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .path
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
            .unwrap_or_else(default_data_dir)
    }

    /// Directory for rolling log files.
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .directory
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
            .unwrap_or_else(|| default_data_dir().join("logs"))
    }
}

/// Remote configuration document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Location of the published configuration JSON.
    #[serde(default = "default_config_url")]
    pub config_url: String,

    /// Lifetime of a cached configuration.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl RemoteSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            config_url: default_config_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_config_url() -> String {
    DEFAULT_CONFIG_URL.to_string()
}

fn default_cache_ttl_secs() -> u64 {
    CONFIG_TTL.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Host CRM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmSettings {
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Request URL globs whose completion is relayed to pages.
    #[serde(default = "default_monitored_patterns")]
    pub monitored_patterns: Vec<String>,

    /// Domain whose frame-blocking response headers are stripped.
    #[serde(default = "default_frame_rule_domain")]
    pub frame_rule_domain: String,
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            monitored_patterns: default_monitored_patterns(),
            frame_rule_domain: default_frame_rule_domain(),
        }
    }
}

fn default_origin() -> String {
    CRM_ORIGIN.to_string()
}

fn default_monitored_patterns() -> Vec<String> {
    MONITORED_URL_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_frame_rule_domain() -> String {
    "recruit.zoho.com".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
