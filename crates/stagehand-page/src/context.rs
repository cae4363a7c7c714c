//! Per-page-load state owned by the integrator.

use std::collections::HashMap;

use parking_lot::RwLock;
use stagehand_protocols::{Job, StageList};

use crate::control::{ControlId, StageControl};
use crate::location::PageLocation;

#[derive(Debug, Default)]
struct PageState {
    allowed: Option<bool>,
    stages: Option<StageList>,
    jobs: Vec<Job>,
    controls: HashMap<ControlId, StageControl>,
}

/// State for one page load: location, stage list, jobs and rendered controls.
#[derive(Debug)]
pub struct PageContext {
    location: PageLocation,
    state: RwLock<PageState>,
}

impl PageContext {
    pub fn new(location: PageLocation) -> Self {
        Self {
            location,
            state: RwLock::new(PageState::default()),
        }
    }

    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    /// `None` until the organisation check has run.
    pub fn is_allowed(&self) -> Option<bool> {
        self.state.read().allowed
    }

    pub fn set_allowed(&self, allowed: bool) {
        self.state.write().allowed = Some(allowed);
    }

    pub fn stages(&self) -> Option<StageList> {
        self.state.read().stages.clone()
    }

    pub fn set_stages(&self, stages: StageList) {
        self.state.write().stages = Some(stages);
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.state.read().jobs.clone()
    }

    pub fn job_ids(&self) -> Vec<String> {
        self.state.read().jobs.iter().map(|job| job.id.clone()).collect()
    }

    pub fn clear_jobs(&self) {
        self.state.write().jobs.clear();
    }

    pub fn set_jobs(&self, jobs: Vec<Job>) {
        self.state.write().jobs = jobs;
    }

    /// Track a rendered control, replacing any earlier one for the same record.
    pub fn register_control(&self, control: StageControl) {
        self.state.write().controls.insert(control.id.clone(), control);
    }

    pub fn control(&self, id: &ControlId) -> Option<StageControl> {
        self.state.read().controls.get(id).cloned()
    }

    pub fn control_count(&self) -> usize {
        self.state.read().controls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ViewKind;

    fn context() -> PageContext {
        PageContext::new(PageLocation::parse("https://recruit.zoho.com/recruit/org1/Home.do").unwrap())
    }

    #[test]
    fn test_initial_state() {
        let ctx = context();
        assert!(ctx.is_allowed().is_none());
        assert!(ctx.stages().is_none());
        assert!(ctx.jobs().is_empty());
        assert_eq!(ctx.control_count(), 0);
        assert_eq!(ctx.location().org_id().as_deref(), Some("1"));
    }

    #[test]
    fn test_jobs_replace_and_clear() {
        let ctx = context();
        ctx.set_jobs(vec![Job::new("1", "A"), Job::new("2", "B")]);
        assert_eq!(ctx.job_ids(), ["1", "2"]);
        ctx.clear_jobs();
        assert!(ctx.jobs().is_empty());
    }

    #[test]
    fn test_register_control_replaces() {
        let ctx = context();
        let stages = StageList::fallback();
        let id = ControlId::new(ViewKind::ListRow, "11");
        ctx.register_control(StageControl::render(id.clone(), &stages, "Applied"));
        ctx.register_control(StageControl::render(id.clone(), &stages, "Hired"));
        assert_eq!(ctx.control_count(), 1);
        assert_eq!(ctx.control(&id).unwrap().current_label(), "Hired");
    }
}
