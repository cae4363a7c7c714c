use super::*;
use std::sync::{OnceLock, Weak};

use async_trait::async_trait;
use stagehand_dom::{Document, DomNode, ElementLocator};
use stagehand_protocols::{
    BackgroundRequest, BackgroundResponse, Configuration, ManualClock, ProtocolError,
};

use crate::session::{ACTIVATED_FLAG, MemorySessionFlags};

const TRIGGER: &str =
    "https://recruit.zoho.com/recruit/org42/EntityInfo.do?module=JobOpenings&id=5550001&autoClick=applications";
const APPLICATIONS: &str =
    "https://recruit.zoho.com/recruit/org42/EntityInfo.do?module=JobOpenings&id=5550001&submodule=Applications";
const OTHER_APPLICATIONS: &str =
    "https://recruit.zoho.com/recruit/org42/EntityInfo.do?module=JobOpenings&id=6660002&submodule=Applications";
const JOB_LIST: &str = "https://recruit.zoho.com/recruit/org42/ShowDetails.do?module=JobOpenings";
const CANDIDATES: &str = "https://recruit.zoho.com/recruit/org42/ShowDetails.do?module=Candidates";

fn empty_page() -> DomNode {
    DomNode::element("body").child(DomNode::element("div").id("content"))
}

fn job_page() -> DomNode {
    DomNode::element("body").child(
        DomNode::element("div").class("quick-access").child(
            DomNode::element("a")
                .id("apps")
                .attr("href", "/recruit/org42/EntityInfo.do?module=JobOpenings&submodule=Applications")
                .text("Applications (3)"),
        ),
    )
}

fn nag_page() -> DomNode {
    DomNode::element("body").child(DomNode::element("div").class("modal").children([
        DomNode::element("p").text("Please select at least one record"),
        DomNode::element("button").id("dismiss").class("close").text("×"),
    ]))
}

#[derive(Default)]
struct FakeHost {
    pages: Vec<DomNode>,
    url: Mutex<String>,
    snapshots: Mutex<usize>,
    scrolls: Mutex<Vec<ElementLocator>>,
    clicks: Mutex<Vec<(ElementLocator, ClickMethod)>>,
    unavailable: Vec<ClickMethod>,
    /// Each performed click navigates to the next URL, if any.
    navigations: Mutex<Vec<String>>,
    restores: Mutex<Vec<String>>,
    policy: OnceLock<Weak<AutoNavigator>>,
    decisions: Mutex<Vec<NavigationDecision>>,
    /// Set the activation flag once the first snapshot has been taken.
    activated_elsewhere: OnceLock<Arc<MemorySessionFlags>>,
}

impl FakeHost {
    fn at(url: &str, pages: Vec<DomNode>) -> Self {
        Self {
            pages,
            url: Mutex::new(url.to_string()),
            ..Self::default()
        }
    }

    fn navigating_to(self, urls: &[&str]) -> Self {
        *self.navigations.lock() = urls.iter().rev().map(|u| u.to_string()).collect();
        self
    }

    fn without(mut self, methods: &[ClickMethod]) -> Self {
        self.unavailable = methods.to_vec();
        self
    }

    fn snapshot_count(&self) -> usize {
        *self.snapshots.lock()
    }
}

#[async_trait]
impl NavigatorHost for FakeHost {
    async fn snapshot(&self) -> Result<Document, NavigatorError> {
        let mut count = self.snapshots.lock();
        let index = (*count).min(self.pages.len().saturating_sub(1));
        *count += 1;
        if let Some(flags) = self.activated_elsewhere.get() {
            flags.set(ACTIVATED_FLAG);
        }
        let root = self
            .pages
            .get(index)
            .cloned()
            .ok_or_else(|| NavigatorError::Host("no page".to_string()))?;
        Ok(Document::from_root(self.url.lock().clone(), root))
    }

    async fn current_url(&self) -> Result<String, NavigatorError> {
        Ok(self.url.lock().clone())
    }

    async fn scroll_into_view(&self, target: &ElementLocator) -> Result<(), NavigatorError> {
        self.scrolls.lock().push(target.clone());
        Ok(())
    }

    async fn click(&self, target: &ElementLocator, method: ClickMethod) -> Result<bool, NavigatorError> {
        if self.unavailable.contains(&method) {
            return Ok(false);
        }
        self.clicks.lock().push((target.clone(), method));
        let Some(next) = self.navigations.lock().pop() else {
            return Ok(true);
        };
        let decision = match self.policy.get().and_then(Weak::upgrade) {
            Some(navigator) => navigator.decide(&next),
            None => NavigationDecision::Allow,
        };
        self.decisions.lock().push(decision);
        if decision == NavigationDecision::Allow {
            *self.url.lock() = next;
        }
        Ok(true)
    }

    async fn restore(&self, url: &str) -> Result<(), NavigatorError> {
        self.restores.lock().push(url.to_string());
        *self.url.lock() = url.to_string();
        Ok(())
    }
}

struct FakePort {
    config: Option<Configuration>,
}

#[async_trait]
impl BackgroundPort for FakePort {
    async fn request(&self, request: BackgroundRequest) -> Result<BackgroundResponse, ProtocolError> {
        match (request, &self.config) {
            (BackgroundRequest::GetConfig, Some(config)) => Ok(BackgroundResponse::with_config(config.clone())),
            _ => Err(ProtocolError::Disconnected("port closed".to_string())),
        }
    }

    async fn post(&self, _request: BackgroundRequest) -> Result<(), ProtocolError> {
        Ok(())
    }
}

fn config_with(auto: AutoApplicationsConfig) -> Option<Configuration> {
    Some(Configuration {
        auto_applications: auto,
        ..Configuration::default()
    })
}

struct Harness {
    navigator: Arc<AutoNavigator>,
    host: Arc<FakeHost>,
    flags: Arc<MemorySessionFlags>,
    clock: Arc<ManualClock>,
}

fn harness_with(host: FakeHost, config: Option<Configuration>, tuning: NavigatorTuning) -> Harness {
    let host = Arc::new(host);
    let flags = Arc::new(MemorySessionFlags::new());
    let clock = Arc::new(ManualClock::new(0));
    let navigator = AutoNavigator::new(host.clone(), Arc::new(FakePort { config }), flags.clone())
        .with_scheduler(clock.clone())
        .with_clock(clock.clone())
        .with_tuning(tuning);
    Harness {
        navigator: Arc::new(navigator),
        host,
        flags,
        clock,
    }
}

/// Route the host's scripted navigations through the navigator's policy.
fn wire_policy(h: &Harness) {
    let _ = h.host.policy.set(Arc::downgrade(&h.navigator));
}

fn harness(host: FakeHost) -> Harness {
    harness_with(host, config_with(AutoApplicationsConfig::default()), NavigatorTuning::default())
}

/// Tuning with the popup window closed, so the guard is still armed when
/// `run` returns.
fn guarding_tuning() -> NavigatorTuning {
    NavigatorTuning {
        popup_window: Duration::ZERO,
        ..NavigatorTuning::default()
    }
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test]
async fn test_untriggered_page_does_nothing() {
    let h = harness(FakeHost::at(JOB_LIST, vec![job_page()]));
    assert_eq!(h.navigator.run(JOB_LIST).await, NavigationOutcome::NotTriggered);
    assert_eq!(h.host.snapshot_count(), 0);
    assert_eq!(h.navigator.phase(), NavigatorPhase::Idle);
    assert!(h.clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_arriving_on_applications_records_activation() {
    let url = format!("{APPLICATIONS}&autoClick=applications");
    let h = harness(FakeHost::at(&url, vec![job_page()]));
    assert_eq!(h.navigator.run(&url).await, NavigationOutcome::AlreadyOnApplications);
    assert!(h.flags.is_set(ACTIVATED_FLAG));
    assert!(h.host.clicks.lock().is_empty());
}

#[tokio::test]
async fn test_disabled_configuration() {
    let auto = AutoApplicationsConfig {
        enabled: false,
        ..AutoApplicationsConfig::default()
    };
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![job_page()]),
        config_with(auto),
        NavigatorTuning::default(),
    );
    assert_eq!(h.navigator.run(TRIGGER).await, NavigationOutcome::Disabled);
    assert_eq!(h.host.snapshot_count(), 0);
}

#[tokio::test]
async fn test_activates_link_on_first_attempt() {
    let h = harness(FakeHost::at(TRIGGER, vec![job_page()]).navigating_to(&[APPLICATIONS]));

    let outcome = h.navigator.run(TRIGGER).await;
    assert_eq!(
        outcome,
        NavigationOutcome::Activated {
            probe: "a[href*=\"Applications\"]".to_string(),
            method: ClickMethod::Native,
        }
    );
    assert!(h.navigator.is_activated());
    assert_eq!(h.navigator.phase(), NavigatorPhase::Done);

    let scrolls = h.host.scrolls.lock();
    let clicks = h.host.clicks.lock();
    assert_eq!(scrolls.len(), 1);
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].0, scrolls[0]);
    assert!(clicks[0].0.css_path.ends_with("a#apps"));

    // settle, pre-click, guard delay, then thirty popup sweeps
    let sleeps = h.clock.sleeps();
    assert_eq!(&sleeps[..3], &[ms(1000), ms(200), ms(1000)]);
    assert_eq!(sleeps.len(), 33);
    assert!(sleeps[3..].iter().all(|s| *s == ms(1000)));
}

#[tokio::test]
async fn test_link_appearing_later_is_found() {
    let h = harness(FakeHost::at(
        TRIGGER,
        vec![empty_page(), empty_page(), job_page()],
    ));
    let outcome = h.navigator.run(TRIGGER).await;
    assert!(matches!(outcome, NavigationOutcome::Activated { .. }));
    assert_eq!(&h.clock.sleeps()[..4], &[ms(1000), ms(500), ms(500), ms(200)]);
}

#[tokio::test]
async fn test_exhausted_budget_clicks_nothing() {
    let auto = AutoApplicationsConfig {
        retry_interval_ms: 500,
        max_wait_ms: 2000,
        ..AutoApplicationsConfig::default()
    };
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![empty_page()]),
        config_with(auto),
        NavigatorTuning::default(),
    );

    assert_eq!(h.navigator.run(TRIGGER).await, NavigationOutcome::NotFound { attempts: 4 });
    assert_eq!(h.host.snapshot_count(), 4);
    assert!(h.host.clicks.lock().is_empty());
    assert!(!h.navigator.is_activated());
    assert_eq!(h.navigator.phase(), NavigatorPhase::Done);
    assert_eq!(h.clock.sleeps(), vec![ms(1000), ms(500), ms(500), ms(500)]);
}

#[tokio::test]
async fn test_unreachable_configuration_uses_default_budget() {
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![empty_page()]),
        None,
        NavigatorTuning::default(),
    );
    assert_eq!(h.navigator.run(TRIGGER).await, NavigationOutcome::NotFound { attempts: 20 });
    let sleeps = h.clock.sleeps();
    assert_eq!(sleeps.len(), 20);
    assert!(sleeps[1..].iter().all(|s| *s == ms(500)));
}

#[tokio::test]
async fn test_zero_tuning_values_keep_defaults() {
    let auto = AutoApplicationsConfig {
        retry_interval_ms: 0,
        max_wait_ms: 0,
        ..AutoApplicationsConfig::default()
    };
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![empty_page()]),
        config_with(auto),
        NavigatorTuning::default(),
    );
    assert_eq!(h.navigator.run(TRIGGER).await, NavigationOutcome::NotFound { attempts: 20 });
}

#[tokio::test]
async fn test_budget_shorter_than_interval_still_tries_once() {
    let auto = AutoApplicationsConfig {
        retry_interval_ms: 500,
        max_wait_ms: 300,
        ..AutoApplicationsConfig::default()
    };
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![empty_page()]),
        config_with(auto),
        NavigatorTuning::default(),
    );
    assert_eq!(h.navigator.run(TRIGGER).await, NavigationOutcome::NotFound { attempts: 1 });
}

#[tokio::test]
async fn test_explicit_trigger_clears_stale_flag() {
    let h = harness(FakeHost::at(TRIGGER, vec![job_page()]));
    h.flags.set(ACTIVATED_FLAG);
    let outcome = h.navigator.run(TRIGGER).await;
    assert!(matches!(outcome, NavigationOutcome::Activated { .. }));
}

#[tokio::test]
async fn test_activation_during_search_stops_it() {
    let h = harness(FakeHost::at(TRIGGER, vec![empty_page(), job_page()]));
    let _ = h.host.activated_elsewhere.set(h.flags.clone());

    let outcome = h.navigator.run(TRIGGER).await;
    assert_eq!(outcome, NavigationOutcome::AlreadyActivated);
    assert_eq!(h.host.snapshot_count(), 1);
    assert!(h.host.clicks.lock().is_empty());
    assert_eq!(h.navigator.phase(), NavigatorPhase::Done);
}

#[tokio::test]
async fn test_click_falls_back_to_handler_property() {
    let h = harness(FakeHost::at(TRIGGER, vec![job_page()]).without(&[ClickMethod::Native]));
    let outcome = h.navigator.run(TRIGGER).await;
    assert!(matches!(
        outcome,
        NavigationOutcome::Activated {
            method: ClickMethod::HandlerProperty,
            ..
        }
    ));
}

#[tokio::test]
async fn test_unclickable_link_fails_and_clears_flag() {
    let h = harness(FakeHost::at(TRIGGER, vec![job_page()]).without(&ClickMethod::ORDER));
    let outcome = h.navigator.run(TRIGGER).await;
    assert!(matches!(outcome, NavigationOutcome::ActivationFailed { .. }));
    assert!(!h.navigator.is_activated());
    assert_eq!(h.navigator.phase(), NavigatorPhase::Done);
}

#[tokio::test]
async fn test_guard_blocks_other_jobs_applications() {
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![job_page()]).navigating_to(&[APPLICATIONS]),
        config_with(AutoApplicationsConfig::default()),
        guarding_tuning(),
    );
    h.navigator.run(TRIGGER).await;

    assert_eq!(h.navigator.decide(OTHER_APPLICATIONS), NavigationDecision::Deny);
    assert_eq!(h.navigator.decide(APPLICATIONS), NavigationDecision::Allow);
    assert_eq!(h.navigator.decide(CANDIDATES), NavigationDecision::Allow);

    h.clock.advance(Duration::from_secs(10));
    assert_eq!(h.navigator.decide(OTHER_APPLICATIONS), NavigationDecision::Allow);
}

#[tokio::test]
async fn test_wrong_location_is_reverted() {
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![job_page()]).navigating_to(&[APPLICATIONS]),
        config_with(AutoApplicationsConfig::default()),
        guarding_tuning(),
    );
    h.navigator.run(TRIGGER).await;

    let change = h.navigator.on_location_changed(OTHER_APPLICATIONS).await;
    assert_eq!(change, LocationChange::Reverted(APPLICATIONS.to_string()));
    assert_eq!(h.host.restores.lock().as_slice(), &[APPLICATIONS.to_string()]);

    assert_eq!(h.navigator.on_location_changed(APPLICATIONS).await, LocationChange::Kept);
}

#[tokio::test]
async fn test_popup_dismissal_restores_applications_url() {
    let tuning = NavigatorTuning {
        popup_window: Duration::from_secs(1),
        ..NavigatorTuning::default()
    };
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![job_page(), nag_page()]).navigating_to(&[APPLICATIONS, JOB_LIST]),
        config_with(AutoApplicationsConfig::default()),
        tuning,
    );
    h.navigator.run(TRIGGER).await;

    let clicks = h.host.clicks.lock();
    assert_eq!(clicks.len(), 2);
    assert!(clicks[1].0.css_path.ends_with("button#dismiss"));
    assert_eq!(h.host.restores.lock().as_slice(), &[APPLICATIONS.to_string()]);
    assert_eq!(*h.host.url.lock(), APPLICATIONS);
    assert_eq!(h.clock.sleeps().last(), Some(&ms(500)));
}

#[tokio::test]
async fn test_popup_navigation_is_suppressed_while_armed() {
    let tuning = NavigatorTuning {
        popup_window: Duration::from_secs(1),
        ..NavigatorTuning::default()
    };
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![job_page(), nag_page()]).navigating_to(&[APPLICATIONS, JOB_LIST]),
        config_with(AutoApplicationsConfig::default()),
        tuning,
    );
    wire_policy(&h);
    h.navigator.run(TRIGGER).await;

    assert_eq!(
        h.host.decisions.lock().as_slice(),
        &[NavigationDecision::Allow, NavigationDecision::Deny]
    );
    assert!(h.host.restores.lock().is_empty());
    assert_eq!(*h.host.url.lock(), APPLICATIONS);
}

#[tokio::test]
async fn test_repeated_location_is_unchanged() {
    let h = harness(FakeHost::at(JOB_LIST, vec![empty_page()]));
    h.navigator.run(JOB_LIST).await;
    assert_eq!(h.navigator.on_location_changed(JOB_LIST).await, LocationChange::Unchanged);
}

#[tokio::test]
async fn test_leaving_job_openings_clears_flag_and_reevaluates() {
    let h = harness(FakeHost::at(CANDIDATES, vec![empty_page()]));
    h.flags.set(ACTIVATED_FLAG);

    let change = h.navigator.on_location_changed(CANDIDATES).await;
    assert_eq!(change, LocationChange::Reevaluated(NavigationOutcome::NotTriggered));
    assert!(!h.flags.is_set(ACTIVATED_FLAG));
    assert_eq!(h.clock.sleeps(), vec![ms(500)]);
}

#[tokio::test]
async fn test_job_openings_pages_keep_flag() {
    let h = harness(FakeHost::at(JOB_LIST, vec![empty_page()]));
    h.flags.set(ACTIVATED_FLAG);

    let change = h.navigator.on_location_changed(JOB_LIST).await;
    assert_eq!(change, LocationChange::Reevaluated(NavigationOutcome::NotTriggered));
    assert!(h.flags.is_set(ACTIVATED_FLAG));
}

#[tokio::test]
async fn test_activated_applications_view_is_kept() {
    let h = harness(FakeHost::at(APPLICATIONS, vec![empty_page()]));
    h.flags.set(ACTIVATED_FLAG);
    assert_eq!(h.navigator.on_location_changed(APPLICATIONS).await, LocationChange::Kept);
    assert!(h.clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_location_change_to_trigger_page_searches_again() {
    let h = harness_with(
        FakeHost::at(TRIGGER, vec![job_page()]),
        config_with(AutoApplicationsConfig::default()),
        guarding_tuning(),
    );
    let change = h.navigator.on_location_changed(TRIGGER).await;
    assert!(matches!(
        change,
        LocationChange::Reevaluated(NavigationOutcome::Activated { .. })
    ));
    assert_eq!(&h.clock.sleeps()[..2], &[ms(500), ms(1000)]);
}

#[test]
fn test_tuning_from_settings() {
    let settings = NavigatorSettings {
        settle_delay_ms: 2000,
        guard_window_ms: 5000,
        popup_window_ms: 0,
        popup_interval_ms: 250,
        reentry_delay_ms: 100,
    };
    let tuning = NavigatorTuning::from(&settings);
    assert_eq!(tuning.settle_delay, ms(2000));
    assert_eq!(tuning.guard_window, ms(5000));
    assert_eq!(tuning.popup_window, Duration::ZERO);
    assert_eq!(tuning.popup_interval, ms(250));
    assert_eq!(tuning.reentry_delay, ms(100));
    assert_eq!(tuning.pre_click_delay, ms(200));
}
