//! Host CRM endpoints used by the page integrator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use stagehand_dom::{Document, Matcher};
use stagehand_protocols::Job;
use tracing::debug;

use crate::error::CrmError;
use crate::location::PageLocation;

/// Saved-view id sent with every job association.
pub const ASSOCIATION_QUERY_ID: &str = "707589000030836003";

/// Campaign status given to a newly associated candidate.
const ASSOCIATION_STATUS: &str = "Pre-ShortListed";

/// Organisation and CSRF token of the page issuing CRM calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmSession {
    pub origin: String,
    pub org_id: String,
    pub csrf_token: Option<String>,
}

impl CrmSession {
    pub fn new(origin: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            org_id: org_id.into(),
            csrf_token: None,
        }
    }

    pub fn with_csrf(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Session for the page at `location`, reading the CSRF token from `document`.
    pub fn from_page(location: &PageLocation, document: &Document) -> Result<Self, CrmError> {
        let org_id = location
            .org_id()
            .ok_or_else(|| CrmError::MissingOrg(location.href().to_string()))?;
        let mut session = Self::new(location.origin(), org_id);
        session.csrf_token = document
            .select_first(&Matcher::tag("input").attr_eq("name", "crmcsrfparam").into())
            .and_then(|input| input.attr("value"))
            .map(str::to_string);
        Ok(session)
    }

    pub fn endpoint(&self, action: &str) -> String {
        format!("{}/recruit/org{}/{action}", self.origin, self.org_id)
    }

    fn csrf(&self) -> Result<&str, CrmError> {
        self.csrf_token.as_deref().ok_or(CrmError::MissingCsrf)
    }
}

/// Host CRM operations.
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Move an application to `status`.
    async fn update_status(&self, session: &CrmSession, entity_id: &str, status: &str) -> Result<(), CrmError>;

    /// Associate a candidate with a job opening.
    async fn associate(
        &self,
        session: &CrmSession,
        candidate_id: &str,
        job_id: &str,
        all_job_ids: &[String],
    ) -> Result<(), CrmError>;

    /// Open job openings.
    async fn job_openings(&self, session: &CrmSession) -> Result<Vec<Job>, CrmError>;
}

#[derive(Debug, Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobListResponse {
    #[serde(rename = "rowCount", default)]
    row_count: Option<u64>,
    #[serde(default)]
    body: Vec<JobRow>,
}

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "ENTITYID")]
    entity_id: serde_json::Value,
    #[serde(rename = "CONTENT", default)]
    content: Vec<serde_json::Value>,
}

impl JobRow {
    fn into_job(self) -> Job {
        Job::new(value_text(&self.entity_id), self.content.first().map(value_text).unwrap_or_default())
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// [`CrmClient`] over reqwest.
pub struct HttpCrmClient {
    client: Client,
}

impl HttpCrmClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CrmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrmError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    async fn post_form(&self, session: &CrmSession, action: &str, form: &[(&str, &str)]) -> Result<(), CrmError> {
        let url = session.endpoint(action);
        debug!(url = %url, "Posting to host CRM");
        let response = self
            .client
            .post(&url)
            .header("x-recruit-org", &session.org_id)
            .header("x-requested-with", "XMLHttpRequest")
            .form(form)
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;
        expect_success(response).await
    }
}

impl Default for HttpCrmClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Success only when the body is JSON with `message == "success"`.
async fn expect_success(response: Response) -> Result<(), CrmError> {
    let status = response.status();
    if !status.is_success() {
        return Err(CrmError::Status {
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| CrmError::Network(e.to_string()))?;
    let ack: Acknowledgement =
        serde_json::from_str(&body).map_err(|e| CrmError::UnexpectedBody(e.to_string()))?;
    match ack.message.as_deref() {
        Some("success") => Ok(()),
        _ => Err(CrmError::UnexpectedBody(body)),
    }
}

#[async_trait]
impl CrmClient for HttpCrmClient {
    async fn update_status(&self, session: &CrmSession, entity_id: &str, status: &str) -> Result<(), CrmError> {
        let csrf = session.csrf()?;
        let form = [
            ("module", "Applications"),
            ("entityId", entity_id),
            ("comments", ""),
            ("status", status),
            ("actualStatusVal", status),
            ("isunlock", "false"),
            ("canCount", ""),
            ("crmcsrfparam", csrf),
        ];
        self.post_form(session, "UpdateResumeStatus.do", &form).await
    }

    async fn associate(
        &self,
        session: &CrmSession,
        candidate_id: &str,
        job_id: &str,
        all_job_ids: &[String],
    ) -> Result<(), CrmError> {
        let csrf = session.csrf()?;
        let total_ids = all_job_ids.join(";");
        let form = [
            ("camp_status", ASSOCIATION_STATUS),
            ("description", ""),
            ("id", job_id),
            ("crmcsrfparam", csrf),
            ("frommodule", "Potentials"),
            ("tomodule", "Leads"),
            ("entityId", candidate_id),
            ("isBulk", "false"),
            ("queryId", ASSOCIATION_QUERY_ID),
            ("searchText", ""),
            ("totalIds", total_ids.as_str()),
            ("encryptedFiltersSearch", ""),
            ("encryptedAdvSearch", ""),
        ];
        self.post_form(session, "AddToCampaigns.do", &form).await
    }

    async fn job_openings(&self, session: &CrmSession) -> Result<Vec<Job>, CrmError> {
        let response = self
            .client
            .get(session.endpoint("ShowDetails.do"))
            .header("x-recruit-org", &session.org_id)
            .query(&[
                ("module", "Potentials"),
                ("submodule", "Potentials"),
                ("toolTip", "Job Openings"),
                ("isload", "true"),
                ("clearCache", "false"),
            ])
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrmError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;
        let list: JobListResponse =
            serde_json::from_str(&body).map_err(|e| CrmError::UnexpectedBody(e.to_string()))?;
        debug!(row_count = ?list.row_count, "Fetched job openings");
        Ok(list.body.into_iter().map(JobRow::into_job).collect())
    }
}

#[cfg(test)]
#[path = "crm_tests.rs"]
mod tests;
