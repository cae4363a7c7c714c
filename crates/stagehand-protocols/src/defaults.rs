//! Built-in configuration used when the remote document is unavailable.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::types::{
    AutoApplicationsConfig, Configuration, CrmEndpoints, DropdownValues, StageDefinition,
};

/// Published location of the remote configuration document.
pub const DEFAULT_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/akshayr-ts/ts-extension-main/main/plugin-config.json";

/// Organisation permitted by the built-in configuration.
pub const DEFAULT_ORGANIZATION: &str = "org801559407";

/// Lifetime of a cached configuration.
pub const CONFIG_TTL: Duration = Duration::from_secs(30 * 60);

/// Host CRM origin.
pub const CRM_ORIGIN: &str = "https://recruit.zoho.com";

/// Host CRM requests whose completion is relayed to page contexts.
pub const MONITORED_URL_PATTERNS: [&str; 3] = [
    "https://recruit.zoho.com/recruit/*/ShowDetails.do*",
    "https://recruit.zoho.com/recruit/*/ShowEntityInfo.do*",
    "https://recruit.zoho.com/recruit/*/EditCommonModule.do?module=Leads",
];

/// Colour used for unknown stage themes.
pub const DEFAULT_STAGE_COLOR: &str = "#6b7280";

/// Background colour for a stage theme name.
pub fn stage_color(theme: &str) -> &'static str {
    match theme {
        "apple-blossom" => "#a54444",
        "sheen-gold" => "#d0a72b",
        "darkgreen" => "#00868c",
        "darkblue" => "#1e3a8a",
        "birdflower-green" => "#CCD118",
        "lightgreen" => "#1a936a",
        "red" => "#ed0707",
        "yellow" => "#f59e0b",
        "cadet" => "#6b7280",
        _ => DEFAULT_STAGE_COLOR,
    }
}

/// Configuration substituted when the remote fetch fails.
///
/// `pipeline_stages` is intentionally empty so consumers render the fallback list.
pub fn default_configuration() -> Configuration {
    Configuration {
        version: "1.0.0".to_string(),
        allowed_organizations: BTreeSet::from([DEFAULT_ORGANIZATION.to_string()]),
        zoho_config: Some(CrmEndpoints {
            base_urls: vec![CRM_ORIGIN.to_string()],
            url_patterns: MONITORED_URL_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }),
        dropdown_values: DropdownValues::default(),
        pipeline_stages: Vec::new(),
        auto_applications: AutoApplicationsConfig::default(),
    }
}

/// The built-in twelve-stage pipeline.
pub fn fallback_stages() -> Vec<StageDefinition> {
    [
        ("Applied", "APL", "#a54444", "apple-blossom"),
        ("AI Database", "AID", "#a54444", "apple-blossom"),
        ("AI Linkedin", "AIL", "#a54444", "apple-blossom"),
        ("ShortList", "SL", "#d0a72b", "sheen-gold"),
        ("Booked", "BKD", "#1a936a", "lightgreen"),
        ("Spoken-to", "ST", "#1e3a8a", "darkblue"),
        ("Chase VI", "CVI", "#1e3a8a", "darkblue"),
        ("Submitted", "SBMT", "#00868c", "darkgreen"),
        ("Hired", "HRD", "#1a936a", "lightgreen"),
        ("Rejected", "RJD", "#ed0707", "red"),
        ("Rejected by client", "RJC", "#ed0707", "red"),
        ("Archived", "ARC", "#6b7280", "cadet"),
    ]
    .into_iter()
    .map(|(label, short, background, badge)| {
        StageDefinition::new(label, short, label, background, badge)
    })
    .collect()
}
