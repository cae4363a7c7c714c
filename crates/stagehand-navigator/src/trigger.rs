//! URL predicates deciding when the navigator runs.

use std::sync::LazyLock;

use regex::Regex;

/// Query marker requesting the Applications view.
pub const AUTO_CLICK_MARKER: &str = "autoClick=applications";

const APPLICATIONS_SUBMODULE: &str = "submodule=Applications";

static JOB_ID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"id=(\d+)").ok());

/// A job opening detail page that asked for its Applications view.
pub fn should_auto_click(url: &str) -> bool {
    url.contains("EntityInfo.do") && url.contains("module=JobOpenings") && has_explicit_trigger(url)
}

/// `autoClick=applications` or the JobOpenings submodule.
pub fn has_explicit_trigger(url: &str) -> bool {
    url.contains(AUTO_CLICK_MARKER) || url.contains("submodule=JobOpenings")
}

pub fn is_applications_view(url: &str) -> bool {
    url.contains(APPLICATIONS_SUBMODULE)
}

/// Pages on which an earlier activation stays recorded.
pub fn keeps_activation(url: &str) -> bool {
    is_applications_view(url) || url.contains("module=JobOpenings")
}

/// Digits of the first `id=` parameter.
pub fn extract_job_id(url: &str) -> Option<String> {
    JOB_ID
        .as_ref()?
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
