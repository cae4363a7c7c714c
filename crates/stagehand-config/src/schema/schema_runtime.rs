//! Storage, navigator and logging settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::default_true;

/// Persistence of the cached configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// When disabled every lookup goes to the network.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Storage directory. Defaults to the per-user data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: None,
        }
    }
}

/// Auto-navigation windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorSettings {
    /// Delay before the first search attempt.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long the navigation guard stays installed after a click.
    #[serde(default = "default_guard_window_ms")]
    pub guard_window_ms: u64,

    /// Total popup-dismissal window.
    #[serde(default = "default_popup_window_ms")]
    pub popup_window_ms: u64,

    #[serde(default = "default_popup_interval_ms")]
    pub popup_interval_ms: u64,

    /// Delay before re-evaluating after a location change.
    #[serde(default = "default_reentry_delay_ms")]
    pub reentry_delay_ms: u64,
}

impl NavigatorSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn guard_window(&self) -> Duration {
        Duration::from_millis(self.guard_window_ms)
    }

    pub fn popup_window(&self) -> Duration {
        Duration::from_millis(self.popup_window_ms)
    }

    pub fn popup_interval(&self) -> Duration {
        Duration::from_millis(self.popup_interval_ms)
    }

    pub fn reentry_delay(&self) -> Duration {
        Duration::from_millis(self.reentry_delay_ms)
    }
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            guard_window_ms: default_guard_window_ms(),
            popup_window_ms: default_popup_window_ms(),
            popup_interval_ms: default_popup_interval_ms(),
            reentry_delay_ms: default_reentry_delay_ms(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    1_000
}

fn default_guard_window_ms() -> u64 {
    10_000
}

fn default_popup_window_ms() -> u64 {
    30_000
}

fn default_popup_interval_ms() -> u64 {
    1_000
}

fn default_reentry_delay_ms() -> u64 {
    500
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Rolling log file directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
