//! Deep links that open a job opening's Applications view.
//!
//! The direct link lands on the job opening page with the auto-click
//! marker, which starts the navigator. The fallback link opens the
//! Candidates tab filtered to the job's associated applications and works
//! without the extension.

use serde::Serialize;
use url::Url;

use stagehand_protocols::defaults::DEFAULT_ORGANIZATION;

use crate::error::NavigatorError;

/// Candidates filter for applications associated with one job opening.
#[derive(Debug, Serialize)]
struct AssociatedJobFilter<'a> {
    searchfieldtype: &'static str,
    searchfield: &'static str,
    #[serde(rename = "searchModule")]
    search_module: &'static str,
    condition: &'static str,
    /// `{job id}:{job name}`
    value: String,
    entityname: &'a str,
    #[serde(rename = "assPopOutView")]
    pop_out_view: bool,
}

impl<'a> AssociatedJobFilter<'a> {
    fn new(job_id: &str, job_name: &'a str) -> Self {
        Self {
            searchfieldtype: "ASSJO",
            searchfield: "CrmPotential:POTENTIALID",
            search_module: "Potentials",
            condition: "0",
            value: format!("{job_id}:{job_name}"),
            entityname: job_name,
            pop_out_view: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationsLinks {
    /// `org`-prefixed organisation key used in both links.
    pub org_key: String,
    /// Job opening page carrying the auto-click marker.
    pub direct: String,
    /// Filtered Candidates tab.
    pub fallback: String,
}

/// Organisation key with the `org` prefix. A blank id means the built-in
/// organisation.
pub fn org_key(org: &str) -> String {
    let org = org.trim();
    if org.is_empty() {
        DEFAULT_ORGANIZATION.to_string()
    } else if org.starts_with("org") {
        org.to_string()
    } else {
        format!("org{org}")
    }
}

/// Build both links for a job opening under `origin`.
///
/// `refreshed_at_ms` becomes the fallback link's cache-busting `refresh`
/// parameter.
pub fn applications_links(
    origin: &str,
    org: &str,
    job_id: &str,
    job_name: &str,
    refreshed_at_ms: i64,
) -> Result<ApplicationsLinks, NavigatorError> {
    let (job_id, job_name) = (job_id.trim(), job_name.trim());
    if job_id.is_empty() || job_name.is_empty() {
        return Err(NavigatorError::Link(format!(
            "job id {job_id:?} and name {job_name:?} are both required"
        )));
    }

    let org_key = org_key(org);
    let base = Url::parse(origin)?.join(&format!("recruit/{org_key}/"))?;

    let mut direct = base.join("EntityInfo.do")?;
    direct
        .query_pairs_mut()
        .append_pair("module", "JobOpenings")
        .append_pair("id", job_id)
        .append_pair("submodule", "JobOpenings")
        .append_pair("autoClick", "applications");

    let filters = serde_json::to_string(&[AssociatedJobFilter::new(job_id, job_name)])
        .map_err(|e| NavigatorError::Link(e.to_string()))?;
    let mut fallback = base.join("ShowTab.do")?;
    fallback
        .query_pairs_mut()
        .append_pair("module", "Candidates")
        .append_pair("filters", &filters)
        .append_pair("jobId", job_id)
        .append_pair("submodule", "Applications")
        .append_pair("tab", "Applications")
        .append_pair("view", "list")
        .append_pair("reload", "true")
        .append_pair("refresh", &refreshed_at_ms.to_string())
        .append_pair("forceLoad", "true");

    Ok(ApplicationsLinks {
        org_key,
        direct: direct.into(),
        fallback: fallback.into(),
    })
}
