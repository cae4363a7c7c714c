//! Widgets injected next to host CRM records.

use serde::{Deserialize, Serialize};
use stagehand_protocols::Job;

use crate::control::StageControl;

pub const CANDIDATE_LINK_TOOLTIP: &str = "View this Candidate";

/// Tab index used for the injected quick-view candidate tab.
pub const CANDIDATE_TAB_INDEX: u32 = 14;

pub const JOB_SELECT_ID: &str = "qv-job-select";

pub const ASSOCIATE_LABEL: &str = "Associate now";
pub const ASSOCIATE_BUSY_LABEL: &str = "Associating...";

/// Icon link from a list row to the candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    pub href: String,
    pub tooltip: String,
}

impl CandidateLink {
    pub fn new(origin: &str, org_id: &str, candidate_id: &str, entity_id: &str) -> Self {
        Self {
            href: format!(
                "{origin}/recruit/org{org_id}/EntityInfo.do?module=Candidates&submodule=Candidates&id={candidate_id}&entityId={entity_id}"
            ),
            tooltip: CANDIDATE_LINK_TOOLTIP.to_string(),
        }
    }
}

/// Navigation entry of the quick-view candidate tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabNavItem {
    pub tab: u32,
    pub label: String,
}

/// Content section of the quick-view candidate tab: an embedded edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabSection {
    pub section_id: String,
    pub frame_url: String,
}

impl TabSection {
    pub fn candidate(origin: &str, org_id: &str, candidate_id: &str) -> Self {
        Self {
            section_id: format!("qs-tab{CANDIDATE_TAB_INDEX}"),
            frame_url: format!("{origin}/recruit/org{org_id}/EditEntity.do?module=Candidates&id={candidate_id}"),
        }
    }
}

/// Job picker plus "Associate now" button for a quick-view lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociateJobWidget {
    pub select_id: String,
    pub candidate_id: String,
    pub jobs: Vec<Job>,
    pub button_label: String,
}

impl AssociateJobWidget {
    pub fn new(candidate_id: impl Into<String>, jobs: Vec<Job>) -> Self {
        Self {
            select_id: JOB_SELECT_ID.to_string(),
            candidate_id: candidate_id.into(),
            jobs,
            button_label: ASSOCIATE_LABEL.to_string(),
        }
    }

    /// CSS selector handed to the select enhancer.
    pub fn selector(&self) -> String {
        format!("#{}", self.select_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    StageControl(StageControl),
    CandidateLink(CandidateLink),
    TabNavItem(TabNavItem),
    TabSection(TabSection),
    AssociateJob(AssociateJobWidget),
}
