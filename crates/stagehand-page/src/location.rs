//! Page URL helpers and `request-completed` routing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PageError;

static ORG_SEGMENT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/org([0-9]+)/").ok());

/// Parsed location of a host CRM page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    pub fn parse(href: &str) -> Result<Self, PageError> {
        let url = Url::parse(href).map_err(|e| PageError::InvalidUrl {
            url: href.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { url })
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// `scheme://host[:port]`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Organisation digits from a `/org{digits}/` path segment.
    pub fn org_id(&self) -> Option<String> {
        org_id_from_path(self.url.path())
    }

    /// Organisation key as listed in `allowed_organizations`.
    pub fn org_key(&self) -> Option<String> {
        self.org_id().map(|id| format!("org{id}"))
    }

    /// Last path segment, e.g. `ShowDetails.do`.
    pub fn action(&self) -> &str {
        self.url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or("")
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Organisation digits from a URL path.
pub fn org_id_from_path(path: &str) -> Option<String> {
    let pattern = ORG_SEGMENT.as_ref()?;
    pattern
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Sub-view of the Leads module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Submodule {
    Leads,
    Applications,
}

impl Submodule {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Leads" => Some(Self::Leads),
            "Applications" => Some(Self::Applications),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leads => "Leads",
            Self::Applications => "Applications",
        }
    }
}

impl fmt::Display for Submodule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completed host CRM request means for the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRoute {
    /// Leads list reloaded: refresh the job list.
    LeadsList,
    /// Applications list reloaded: decorate every row.
    ApplicationsList,
    /// A lead or application detail view loaded.
    Detail {
        submodule: Submodule,
        entity_id: String,
    },
    Ignored,
}

impl RequestRoute {
    pub fn from_url(url: &str) -> Self {
        let Ok(location) = PageLocation::parse(url) else {
            return Self::Ignored;
        };
        if location.query("module").as_deref() != Some("Leads") {
            return Self::Ignored;
        }
        let Some(submodule) = location.query("submodule").as_deref().and_then(Submodule::parse)
        else {
            return Self::Ignored;
        };

        match (location.action(), submodule) {
            ("ShowDetails.do", Submodule::Leads) => Self::LeadsList,
            ("ShowDetails.do", Submodule::Applications) => Self::ApplicationsList,
            ("ShowEntityInfo.do", Submodule::Leads) => Self::detail(submodule, location.query("entityId")),
            ("ShowEntityInfo.do", Submodule::Applications) => Self::detail(submodule, location.query("id")),
            _ => Self::Ignored,
        }
    }

    fn detail(submodule: Submodule, entity_id: Option<String>) -> Self {
        match entity_id {
            Some(entity_id) if !entity_id.is_empty() => Self::Detail {
                submodule,
                entity_id,
            },
            _ => Self::Ignored,
        }
    }
}
