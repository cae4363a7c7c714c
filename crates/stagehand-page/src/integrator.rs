//! Page integrator: injects stage controls and widgets into host CRM views.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use stagehand_dom::{Document, DomError, DomNode, ElementRef, Matcher, Selector};
use stagehand_protocols::{
    BackgroundPort, BackgroundRequest, Job, PageMessage, RetryPolicy, Scheduler, StageList, TokioScheduler,
};
use tracing::{debug, info, warn};

use crate::catalog::StageCatalog;
use crate::context::PageContext;
use crate::control::{ControlId, StageControl, StatusChangeRequest, ViewKind};
use crate::crm::{CrmClient, CrmSession};
use crate::error::{CrmError, PageError};
use crate::location::{PageLocation, RequestRoute, Submodule};
use crate::notify::{Notification, Notifier};
use crate::pipeline::is_pipeline_setup_page;
use crate::status::{current_status, detail_probes, quick_view_probes, row_probes};
use crate::surface::{BadgeUpdate, PageSurface, Placement};
use crate::widgets::{AssociateJobWidget, CANDIDATE_TAB_INDEX, CandidateLink, TabNavItem, TabSection, Widget};

/// Delays used by the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegratorTuning {
    /// Wait after page load before loading stages.
    pub settle_delay: Duration,
    /// Poll interval while waiting for the stage list.
    pub stage_poll_interval: Duration,
    /// Wait between a quick view opening and its widgets being injected.
    pub quick_view_delay: Duration,
}

impl Default for IntegratorTuning {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1000),
            stage_poll_interval: Duration::from_millis(500),
            quick_view_delay: Duration::from_millis(1000),
        }
    }
}

/// `data-params` payload on list rows and quick-view containers.
#[derive(Debug, Deserialize)]
struct RecordParams {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(rename = "candId", default)]
    cand_id: Option<serde_json::Value>,
    #[serde(default)]
    module: Option<String>,
}

impl RecordParams {
    fn record_id(&self) -> Option<String> {
        self.id.as_ref().map(value_text)
    }

    fn candidate_id(&self) -> Option<String> {
        self.cand_id.as_ref().map(value_text)
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn missing(what: &str) -> PageError {
    DomError::ElementNotFound(what.to_string()).into()
}

fn malformed(element: &str, message: &str) -> PageError {
    DomError::MalformedParams {
        element: element.to_string(),
        message: message.to_string(),
    }
    .into()
}

/// 1-based position among the parent's children.
fn child_position(element: ElementRef<'_>) -> Option<(usize, usize)> {
    let parent = element.parent()?;
    let siblings: Vec<_> = parent.children().collect();
    let index = siblings.iter().position(|s| *s == element)?;
    Some((index + 1, siblings.len()))
}

/// `td:nth-child(n)` inside `scope`.
fn nth_cell(scope: ElementRef<'_>, n: usize) -> Option<ElementRef<'_>> {
    scope
        .descendants()
        .find(|e| e.tag() == "td" && child_position(*e).map(|(pos, _)| pos) == Some(n))
}

/// `li:nth-last-child(n)` inside `scope`.
fn nth_last_item(scope: ElementRef<'_>, n: usize) -> Option<ElementRef<'_>> {
    scope.descendants().find(|e| {
        e.tag() == "li" && child_position(*e).map(|(pos, len)| len + 1 - pos) == Some(n)
    })
}

fn status_failure_message(error: &PageError) -> String {
    match error {
        PageError::Crm(CrmError::Status { status }) => {
            format!("Unable to update status. Server response: {status}")
        }
        PageError::Crm(CrmError::UnexpectedBody(_)) => {
            "Unable to update status, no success message received".to_string()
        }
        other => other.to_string(),
    }
}

fn association_failure_message(error: &PageError) -> String {
    match error {
        PageError::Crm(CrmError::Status { status }) => {
            format!("Unable to associate candidate with job. Server response: {status}")
        }
        PageError::Crm(CrmError::UnexpectedBody(_)) => {
            "Unable to associate candidate with job, no success message received".to_string()
        }
        other => other.to_string(),
    }
}

/// Drives every stage control and widget on one host CRM page.
pub struct PageIntegrator {
    context: PageContext,
    port: Arc<dyn BackgroundPort>,
    crm: Arc<dyn CrmClient>,
    surface: Arc<dyn PageSurface>,
    notifier: Arc<dyn Notifier>,
    scheduler: Arc<dyn Scheduler>,
    tuning: IntegratorTuning,
}

impl PageIntegrator {
    pub fn new(
        location: PageLocation,
        port: Arc<dyn BackgroundPort>,
        crm: Arc<dyn CrmClient>,
        surface: Arc<dyn PageSurface>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            context: PageContext::new(location),
            port,
            crm,
            surface,
            notifier,
            scheduler: Arc::new(TokioScheduler),
            tuning: IntegratorTuning::default(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_tuning(mut self, tuning: IntegratorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    fn is_enabled(&self) -> bool {
        self.context.is_allowed() == Some(true)
    }

    fn report(&self, error: &PageError) {
        warn!(error = %error, "Page integration step failed");
        self.notifier.notify(Notification::error(error.to_string()));
    }

    /// Page loaded: gate on the organisation, settle, then load stages.
    ///
    /// Returns `false` when the organisation may not use the extension, in
    /// which case every later event is ignored.
    pub async fn start(&self) -> bool {
        if !self.check_organization().await {
            return false;
        }
        self.scheduler.sleep(self.tuning.settle_delay).await;
        self.load_stages().await;
        true
    }

    async fn check_organization(&self) -> bool {
        let Some(org_key) = self.context.location().org_key() else {
            warn!(url = %self.context.location().href(), "No organization in page URL");
            self.context.set_allowed(false);
            return false;
        };

        let allowed = match self.port.validate_organization(&org_key).await {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!(org = %org_key, error = %e, "Organization validation failed");
                false
            }
        };
        if allowed {
            info!(org = %org_key, "Page integration enabled");
        } else {
            info!(org = %org_key, "Organization not allowed, page integration disabled");
        }
        self.context.set_allowed(allowed);
        allowed
    }

    async fn snapshot(&self) -> Result<Document, PageError> {
        self.surface.snapshot().await
    }

    /// Resolve the stage list for this page and store it in the context.
    pub async fn load_stages(&self) -> StageList {
        let document = match self.snapshot().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Snapshot failed, loading stages from configuration");
                Document::empty(self.context.location().href())
            }
        };
        let stages = StageCatalog::load(&document, self.port.as_ref()).await;
        info!(count = stages.len(), "Stage list ready");
        self.context.set_stages(stages.clone());
        stages
    }

    /// The pipeline editor changed: reload stages after the settle delay.
    pub async fn on_pipeline_changed(&self) {
        if !self.is_enabled() {
            return;
        }
        match self.snapshot().await {
            Ok(document) if is_pipeline_setup_page(&document) => {}
            Ok(_) => return,
            Err(e) => {
                warn!(error = %e, "Snapshot failed");
                return;
            }
        }
        debug!("Pipeline changed, refreshing stages");
        self.scheduler.sleep(self.tuning.settle_delay).await;
        self.load_stages().await;
    }

    async fn wait_for_stages(&self) -> StageList {
        RetryPolicy::unbounded(self.tuning.stage_poll_interval)
            .run(self.scheduler.as_ref(), |_| {
                let stages = self.context.stages();
                async move { stages }
            })
            .await
            .unwrap_or_else(StageList::fallback)
    }

    /// A host CRM request completed in this tab.
    pub async fn on_message(&self, message: PageMessage) {
        let PageMessage::RequestCompleted { url } = message;
        if !self.is_enabled() {
            debug!(url = %url, "Integration disabled, ignoring request");
            return;
        }

        match RequestRoute::from_url(&url) {
            RequestRoute::LeadsList => {
                self.refresh_jobs().await;
            }
            RequestRoute::ApplicationsList => {
                self.update_applications_table().await;
            }
            RequestRoute::Detail { submodule, entity_id } => {
                self.inject_detail_control(submodule, &entity_id).await;
            }
            RequestRoute::Ignored => debug!(url = %url, "Request needs no page update"),
        }
    }

    /// Rebuild the job list from the host CRM, or from configuration when that fails.
    pub async fn refresh_jobs(&self) -> usize {
        self.context.clear_jobs();

        let mut jobs = match self.fetch_live_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                let message = match &e {
                    PageError::Crm(CrmError::Status { status }) => {
                        format!("Unable to fetch job openings. Server response: {status}")
                    }
                    other => other.to_string(),
                };
                warn!(error = %e, "Failed to fetch job openings");
                self.notifier.notify(Notification::error(message));
                Vec::new()
            }
        };

        if jobs.is_empty() {
            info!("No live job openings, using configured job list");
            jobs = self.configured_jobs().await;
        }

        let count = jobs.len();
        debug!(count, "Job list refreshed");
        self.context.set_jobs(jobs);
        count
    }

    async fn fetch_live_jobs(&self) -> Result<Vec<Job>, PageError> {
        let document = self.snapshot().await?;
        let session = CrmSession::from_page(self.context.location(), &document)?;
        Ok(self.crm.job_openings(&session).await?)
    }

    async fn configured_jobs(&self) -> Vec<Job> {
        match self.port.dropdown_values().await {
            Ok((values, _)) if !values.is_empty() => values.iter().map(Job::from).collect(),
            Ok(_) => {
                warn!("Configuration has no job openings");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load configured job openings");
                Vec::new()
            }
        }
    }

    /// Decorate every Applications list row. Returns the number of rows given a control.
    pub async fn update_applications_table(&self) -> usize {
        let stages = self.wait_for_stages().await;
        let document = match self.snapshot().await {
            Ok(document) => document,
            Err(e) => {
                self.report(&e);
                return 0;
            }
        };

        let rows = document.select_all(
            &Selector::new(Matcher::tag("table").with_id("listViewTable"))
                .descendant(Matcher::tag("tbody"))
                .descendant(Matcher::tag("tr")),
        );
        debug!(rows = rows.len(), "Decorating applications table");

        let mut decorated = 0;
        for row in rows {
            match self.decorate_row(row, &stages).await {
                Ok(()) => decorated += 1,
                Err(e) => self.report(&e),
            }
        }
        decorated
    }

    async fn decorate_row(&self, row: ElementRef<'_>, stages: &StageList) -> Result<(), PageError> {
        let params: RecordParams = row.json_attr("data-params")?;
        let entity_id = row.attr("id").ok_or_else(|| malformed("tr", "row has no id"))?;

        if let Err(e) = self.inject_candidate_link(row, &params, entity_id).await {
            self.report(&e);
        }

        let cell = nth_cell(row, 6).ok_or_else(|| missing("td:nth-child(6)"))?;
        let status = current_status(row_probes(), row, stages);
        let control = StageControl::render(ControlId::new(ViewKind::ListRow, entity_id), stages, &status);
        self.surface
            .insert(&cell.locator(), Placement::Append, Widget::StageControl(control.clone()))
            .await?;
        self.context.register_control(control);
        Ok(())
    }

    async fn inject_candidate_link(
        &self,
        row: ElementRef<'_>,
        params: &RecordParams,
        entity_id: &str,
    ) -> Result<(), PageError> {
        let cell = row
            .select_first(&Matcher::tag("td").into())
            .ok_or_else(|| missing("td"))?;
        let candidate_id = params
            .candidate_id()
            .ok_or_else(|| malformed("tr", "missing candId"))?;
        let location = self.context.location();
        let org_id = location
            .org_id()
            .ok_or_else(|| CrmError::MissingOrg(location.href().to_string()))?;

        let link = CandidateLink::new(&location.origin(), &org_id, &candidate_id, entity_id);
        self.surface
            .insert(&cell.locator(), Placement::Append, Widget::CandidateLink(link))
            .await
    }

    /// Add a stage control to a lead or application detail page.
    pub async fn inject_detail_control(&self, submodule: Submodule, entity_id: &str) {
        let stages = self.wait_for_stages().await;
        if let Err(e) = self.try_inject_detail_control(submodule, entity_id, &stages).await {
            self.report(&e);
        }
    }

    async fn try_inject_detail_control(
        &self,
        submodule: Submodule,
        entity_id: &str,
        stages: &StageList,
    ) -> Result<(), PageError> {
        let document = self.snapshot().await?;
        let target = document
            .select_first(&Matcher::class("detail-header-box").into())
            .ok_or_else(|| missing(".detail-header-box"))?;

        let status = current_status(detail_probes(), document.root(), stages);
        let control = StageControl::render(
            ControlId::new(ViewKind::Detail(submodule), entity_id),
            stages,
            &status,
        );
        self.surface
            .insert(&target.locator(), Placement::Append, Widget::StageControl(control.clone()))
            .await?;
        self.context.register_control(control);
        Ok(())
    }

    /// A node was added under the quick-view host.
    pub async fn on_quick_view_added(&self, added: DomNode) {
        if !self.is_enabled() {
            return;
        }

        let fragment = Document::from_root(self.context.location().href(), added);
        let root = fragment.root();
        let container = match root.attr("id") {
            Some("qv-main-container") => root,
            Some("candInnerQV") => match root.select_first(&Matcher::id("qv-main-container").into()) {
                Some(container) => container,
                None => {
                    self.report(&missing("#qv-main-container"));
                    return;
                }
            },
            _ => return,
        };

        let params: RecordParams = match container.json_attr("data-params") {
            Ok(params) => params,
            Err(e) => {
                self.report(&e.into());
                return;
            }
        };
        let Some(record_id) = params.record_id() else {
            self.report(&malformed("#qv-main-container", "missing id"));
            return;
        };

        if let Err(e) = self.inject_candidate_tab(&record_id).await {
            self.report(&e);
        }

        self.scheduler.sleep(self.tuning.quick_view_delay).await;

        match params.module.as_deref() {
            Some("Applications") => self.inject_quick_view_control(&record_id).await,
            Some("Leads") => self.inject_associate_job(&record_id).await,
            other => debug!(module = ?other, "Quick view needs no widget"),
        }
    }

    async fn inject_candidate_tab(&self, record_id: &str) -> Result<(), PageError> {
        let document = self.snapshot().await?;
        let row = document
            .elements()
            .find(|e| e.tag() == "tr" && e.attr("id") == Some(record_id))
            .ok_or_else(|| missing(&format!("tr[id=\"{record_id}\"]")))?;
        let params: RecordParams = row.json_attr("data-params")?;
        let candidate_id = params
            .candidate_id()
            .ok_or_else(|| malformed("tr", "missing candId"))?;

        let location = self.context.location();
        let org_id = location
            .org_id()
            .ok_or_else(|| CrmError::MissingOrg(location.href().to_string()))?;

        let navigation = document
            .find_by_id("qs-navigation")
            .and_then(|nav| nth_last_item(nav, 2))
            .ok_or_else(|| missing("#qs-navigation li:nth-last-child(2)"))?;
        let contents = document
            .find_by_id("qs-tab-content")
            .ok_or_else(|| missing("#qs-tab-content"))?;

        self.surface
            .insert(
                &navigation.locator(),
                Placement::After,
                Widget::TabNavItem(TabNavItem {
                    tab: CANDIDATE_TAB_INDEX,
                    label: "Candidate".to_string(),
                }),
            )
            .await?;
        self.surface
            .insert(
                &contents.locator(),
                Placement::Append,
                Widget::TabSection(TabSection::candidate(&location.origin(), &org_id, &candidate_id)),
            )
            .await
    }

    async fn inject_quick_view_control(&self, record_id: &str) {
        let stages = self.wait_for_stages().await;
        if let Err(e) = self.try_inject_quick_view_control(record_id, &stages).await {
            self.report(&e);
        }
    }

    async fn try_inject_quick_view_control(&self, record_id: &str, stages: &StageList) -> Result<(), PageError> {
        let document = self.snapshot().await?;
        let container = document
            .find_by_id("qv-main-container")
            .ok_or_else(|| missing("#qv-main-container"))?;
        let target = container
            .select_first(&Matcher::id("social-icons").into())
            .ok_or_else(|| missing("#social-icons"))?;

        let status = current_status(quick_view_probes(), container, stages);
        let control = StageControl::render(ControlId::new(ViewKind::QuickView, record_id), stages, &status);
        self.surface
            .insert(&target.locator(), Placement::Append, Widget::StageControl(control.clone()))
            .await?;
        self.context.register_control(control);
        Ok(())
    }

    async fn inject_associate_job(&self, record_id: &str) {
        if let Err(e) = self.try_inject_associate_job(record_id).await {
            self.report(&e);
        }
    }

    async fn try_inject_associate_job(&self, record_id: &str) -> Result<(), PageError> {
        let document = self.snapshot().await?;
        let target = document
            .find_by_id("qv-main-container")
            .and_then(|container| container.select_first(&Matcher::id("social-icons").into()))
            .ok_or_else(|| missing("#qv-main-container #social-icons"))?;

        let widget = AssociateJobWidget::new(record_id, self.context.jobs());
        let selector = widget.selector();
        self.surface
            .insert(&target.locator(), Placement::Append, Widget::AssociateJob(widget))
            .await?;

        if let Err(e) = self.port.post(BackgroundRequest::InitSelect2 { selector }).await {
            warn!(error = %e, "Failed to request select enhancement");
        }
        Ok(())
    }

    /// The user picked `value` in a stage control.
    ///
    /// Returns `true` when the host CRM confirmed the change and the control
    /// was updated. Any failure leaves the control as it was and shows an
    /// error notification.
    pub async fn on_stage_selected(&self, control_id: &ControlId, value: &str) -> bool {
        let Some(control) = self.context.control(control_id) else {
            self.report(&PageError::UnknownControl(control_id.to_string()));
            return false;
        };
        let Some(request) = control.select(value) else {
            debug!(control = %control_id, value, "Selection is not a stage");
            return false;
        };

        match self.submit_status(&request).await {
            Ok(()) => {
                self.apply_status(control, &request).await;
                true
            }
            Err(e) => {
                warn!(control = %control_id, error = %e, "Status update failed");
                self.notifier.notify(Notification::error(status_failure_message(&e)));
                false
            }
        }
    }

    async fn submit_status(&self, request: &StatusChangeRequest) -> Result<(), PageError> {
        let document = self.snapshot().await?;
        let session = CrmSession::from_page(self.context.location(), &document)?;
        self.crm
            .update_status(&session, request.entity_id(), request.status())
            .await?;
        Ok(())
    }

    async fn apply_status(&self, mut control: StageControl, request: &StatusChangeRequest) {
        control.apply_success(&request.option);
        self.context.register_control(control.clone());
        if let Err(e) = self.surface.update_control(&control).await {
            warn!(control = %control.id, error = %e, "Failed to redraw control");
        }

        let badge = match control.id.view {
            ViewKind::Detail(Submodule::Applications) => Some((
                Selector::new(Matcher::class("cand-status-value")).descendant(Matcher::class("nedit-status")),
                true,
            )),
            ViewKind::QuickView => Some((
                Selector::new(Matcher::id("qv-main-container")).descendant(Matcher::id("qvStatusArea")),
                false,
            )),
            _ => None,
        };
        if let Some((selector, with_tooltip)) = badge {
            self.restyle_badge(&selector, request, with_tooltip).await;
        }

        info!(entity_id = request.entity_id(), status = request.status(), "Status updated");
        self.notifier
            .notify(Notification::info(format!("Status updated to: {}", request.status())));
    }

    async fn restyle_badge(&self, selector: &Selector, request: &StatusChangeRequest, with_tooltip: bool) {
        let document = match self.snapshot().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Snapshot failed, badge not restyled");
                return;
            }
        };
        let Some(badge) = document.select_first(selector) else {
            debug!(selector = %selector, "No status badge to restyle");
            return;
        };

        let stages = self.context.stages().unwrap_or_else(StageList::fallback);
        let update = BadgeUpdate {
            remove_classes: stages.badge_classes().into_iter().map(str::to_string).collect(),
            add_class: request.option.badge_class.clone(),
            text: request.status().to_string(),
            tooltip: with_tooltip.then(|| request.status().to_string()),
        };
        if let Err(e) = self.surface.restyle_badge(&badge.locator(), update).await {
            warn!(error = %e, "Failed to restyle status badge");
        }
    }

    /// The user clicked "Associate now" for `candidate_id`.
    pub async fn on_associate_clicked(&self, candidate_id: &str, job_id: &str) -> bool {
        if let Err(e) = self.surface.set_associate_busy(candidate_id, true).await {
            warn!(error = %e, "Failed to mark associate button busy");
        }

        let associated = match self.submit_association(candidate_id, job_id).await {
            Ok(()) => {
                info!(candidate_id, job_id, "Candidate associated with job");
                self.notifier
                    .notify(Notification::success("Candidate associated with job successfully!"));
                true
            }
            Err(e) => {
                warn!(candidate_id, job_id, error = %e, "Job association failed");
                self.notifier
                    .notify(Notification::error(association_failure_message(&e)));
                false
            }
        };

        if let Err(e) = self.surface.set_associate_busy(candidate_id, false).await {
            warn!(error = %e, "Failed to restore associate button");
        }
        associated
    }

    async fn submit_association(&self, candidate_id: &str, job_id: &str) -> Result<(), PageError> {
        let document = self.snapshot().await?;
        let session = CrmSession::from_page(self.context.location(), &document)?;
        self.crm
            .associate(&session, candidate_id, job_id, &self.context.job_ids())
            .await?;
        Ok(())
    }

    /// Ask the background to drop its cached configuration.
    pub async fn clear_config_cache(&self) -> bool {
        match self.port.request(BackgroundRequest::ClearConfigCache).await {
            Ok(response) => response.success,
            Err(e) => {
                warn!(error = %e, "Failed to clear configuration cache");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "integrator_tests.rs"]
mod tests;
