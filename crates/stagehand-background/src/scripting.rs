//! Scripts the background context runs in a tab's main world.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackgroundError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select2Options {
    pub placeholder: String,
    pub width: String,
}

impl Default for Select2Options {
    fn default() -> Self {
        Self {
            placeholder: "Select a job".to_string(),
            width: "style".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "script", rename_all = "snake_case")]
pub enum PageScript {
    /// Enhance the select control at `selector` with the page's select2 plugin.
    Select2 {
        selector: String,
        #[serde(flatten)]
        options: Select2Options,
    },
}

impl PageScript {
    pub fn select2(selector: impl Into<String>) -> Self {
        Self::Select2 {
            selector: selector.into(),
            options: Select2Options::default(),
        }
    }
}

#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(&self, tab_id: i64, script: PageScript) -> Result<(), BackgroundError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select2_defaults() {
        let script = PageScript::select2("#qv-job-select");
        let json = serde_json::to_value(&script).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "script": "select2",
                "selector": "#qv-job-select",
                "placeholder": "Select a job",
                "width": "style"
            })
        );
    }
}
