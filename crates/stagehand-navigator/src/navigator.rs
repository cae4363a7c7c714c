//! The auto-navigator state machine.
//!
//! `Idle → Searching → Activating → Guarding → Done`. A search that spends
//! its whole budget goes straight to `Done` without clicking anything.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use stagehand_config::NavigatorSettings;
use stagehand_protocols::{
    AutoApplicationsConfig, BackgroundPort, Clock, RetryPolicy, Scheduler, SystemClock, TokioScheduler,
};
use tracing::{debug, info, trace, warn};

use crate::error::NavigatorError;
use crate::finder::{ApplicationsFinder, FoundLink};
use crate::guard::{NavigationDecision, NavigationGuard, NavigationPolicy};
use crate::host::{ClickMethod, NavigatorHost};
use crate::popup::{DismissalKind, find_dismissal};
use crate::session::{Activation, SessionFlags};
use crate::trigger::{is_applications_view, keeps_activation, should_auto_click};

/// Fixed delays and windows of the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorTuning {
    /// Wait before the first search attempt.
    pub settle_delay: Duration,
    /// Wait between scrolling the link into view and clicking it.
    pub pre_click_delay: Duration,
    /// Wait between the click and arming the guard.
    pub guard_delay: Duration,
    pub guard_window: Duration,
    pub popup_window: Duration,
    pub popup_interval: Duration,
    pub reentry_delay: Duration,
}

impl Default for NavigatorTuning {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1000),
            pre_click_delay: Duration::from_millis(200),
            guard_delay: Duration::from_millis(1000),
            guard_window: Duration::from_secs(10),
            popup_window: Duration::from_secs(30),
            popup_interval: Duration::from_secs(1),
            reentry_delay: Duration::from_millis(500),
        }
    }
}

impl From<&NavigatorSettings> for NavigatorTuning {
    fn from(settings: &NavigatorSettings) -> Self {
        Self {
            settle_delay: settings.settle_delay(),
            guard_window: settings.guard_window(),
            popup_window: settings.popup_window(),
            popup_interval: settings.popup_interval(),
            reentry_delay: settings.reentry_delay(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigatorPhase {
    Idle,
    Searching,
    Activating,
    Guarding,
    Done,
}

/// Result of one navigator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// The page does not ask for auto-navigation.
    NotTriggered,
    /// `auto_applications.enabled` is off.
    Disabled,
    /// Already on the Applications view; recorded as activated.
    AlreadyOnApplications,
    /// The session flag was set by another run while this one was searching.
    AlreadyActivated,
    /// The link was clicked.
    Activated { probe: String, method: ClickMethod },
    /// The search budget ran out.
    NotFound { attempts: u32 },
    /// The link was found but could not be clicked.
    ActivationFailed { reason: String },
}

/// Reaction to a location change reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationChange {
    /// Same URL as last seen.
    Unchanged,
    /// The guard sent the tab back to this URL.
    Reverted(String),
    /// Activated Applications view; nothing to do.
    Kept,
    Reevaluated(NavigationOutcome),
}

/// Navigation blocked while a dismissed popup settles.
#[derive(Debug, Clone)]
struct Suppression {
    origin: String,
    until_ms: i64,
}

#[derive(Debug)]
struct NavigatorState {
    phase: NavigatorPhase,
    last_url: Option<String>,
    guard: Option<Arc<NavigationGuard>>,
    suppression: Option<Suppression>,
}

enum Attempt {
    Found(FoundLink),
    Preempted,
}

/// Opens a job opening's Applications view once per tab session.
pub struct AutoNavigator {
    host: Arc<dyn NavigatorHost>,
    port: Arc<dyn BackgroundPort>,
    activation: Activation,
    finder: ApplicationsFinder,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    tuning: NavigatorTuning,
    state: Mutex<NavigatorState>,
}

impl AutoNavigator {
    pub fn new(host: Arc<dyn NavigatorHost>, port: Arc<dyn BackgroundPort>, flags: Arc<dyn SessionFlags>) -> Self {
        Self {
            host,
            port,
            activation: Activation::new(flags),
            finder: ApplicationsFinder::new(),
            scheduler: Arc::new(TokioScheduler),
            clock: Arc::new(SystemClock),
            tuning: NavigatorTuning::default(),
            state: Mutex::new(NavigatorState {
                phase: NavigatorPhase::Idle,
                last_url: None,
                guard: None,
                suppression: None,
            }),
        }
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tuning(mut self, tuning: NavigatorTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn phase(&self) -> NavigatorPhase {
        self.state.lock().phase
    }

    pub fn is_activated(&self) -> bool {
        self.activation.is_activated()
    }

    /// Clear the activation flag so the next qualifying page searches again.
    pub fn reset(&self) {
        self.activation.reset();
    }

    fn set_phase(&self, phase: NavigatorPhase) {
        let mut state = self.state.lock();
        if state.phase != phase {
            debug!(from = ?state.phase, to = ?phase, "Navigator phase");
            state.phase = phase;
        }
    }

    async fn load_settings(&self) -> AutoApplicationsConfig {
        match self.port.get_config().await {
            Ok(config) => config.auto_applications,
            Err(e) => {
                debug!(error = %e, "Using default auto-navigation settings");
                AutoApplicationsConfig::default()
            }
        }
    }

    /// Evaluate `url` and, when it asks for it, open the Applications view.
    ///
    /// After a successful click this keeps running through the guard and
    /// popup-dismissal windows before returning.
    pub async fn run(&self, url: &str) -> NavigationOutcome {
        self.state.lock().last_url = Some(url.to_string());

        if !should_auto_click(url) {
            return NavigationOutcome::NotTriggered;
        }
        let settings = self.load_settings().await;
        if !settings.enabled {
            debug!("Auto-navigation disabled by configuration");
            return NavigationOutcome::Disabled;
        }
        if is_applications_view(url) {
            self.activation.mark();
            self.set_phase(NavigatorPhase::Done);
            return NavigationOutcome::AlreadyOnApplications;
        }
        // Every triggering URL is explicit, so a flag left by an earlier
        // visit is stale. A flag set during the search preempts it.
        self.activation.reset();

        self.set_phase(NavigatorPhase::Searching);
        self.scheduler.sleep(self.tuning.settle_delay).await;

        let policy = RetryPolicy::from_budget(settings.max_wait(), settings.retry_interval());
        let mut attempts = 0;
        let found = policy
            .run(self.scheduler.as_ref(), |n| {
                attempts = n;
                self.attempt(n, settings.debug)
            })
            .await;

        let outcome = match found {
            Some(Attempt::Found(link)) => self.activate(link).await,
            Some(Attempt::Preempted) => NavigationOutcome::AlreadyActivated,
            None => {
                info!(attempts, "Applications link not found");
                NavigationOutcome::NotFound { attempts }
            }
        };
        self.set_phase(NavigatorPhase::Done);
        outcome
    }

    async fn attempt(&self, n: u32, verbose: bool) -> Option<Attempt> {
        if self.activation.is_activated() {
            return Some(Attempt::Preempted);
        }
        let doc = match self.host.snapshot().await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, attempt = n, "Snapshot failed");
                return None;
            }
        };
        let found = self.finder.find(&doc);
        if verbose {
            debug!(attempt = n, found = found.is_some(), "Searched for Applications link");
        } else {
            trace!(attempt = n, found = found.is_some(), "Searched for Applications link");
        }
        found.map(Attempt::Found)
    }

    async fn activate(&self, link: FoundLink) -> NavigationOutcome {
        self.activation.mark();
        self.set_phase(NavigatorPhase::Activating);
        info!(probe = %link.probe, text = %link.text, "Activating Applications link");

        let method = match self.click_link(&link).await {
            Ok(method) => method,
            Err(e) => {
                warn!(error = %e, "Could not click Applications link");
                self.activation.reset();
                return NavigationOutcome::ActivationFailed { reason: e.to_string() };
            }
        };

        self.scheduler.sleep(self.tuning.guard_delay).await;
        self.arm_guard().await;
        self.sweep_popups().await;

        NavigationOutcome::Activated {
            probe: link.probe,
            method,
        }
    }

    async fn click_link(&self, link: &FoundLink) -> Result<ClickMethod, NavigatorError> {
        self.host.scroll_into_view(&link.locator).await?;
        self.scheduler.sleep(self.tuning.pre_click_delay).await;
        for method in ClickMethod::ORDER {
            if self.host.click(&link.locator, method).await? {
                return Ok(method);
            }
        }
        Err(NavigatorError::Host("no click method available".to_string()))
    }

    async fn arm_guard(&self) {
        let url = match self.host.current_url().await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Current URL unavailable, guarding last known page");
                self.state.lock().last_url.clone().unwrap_or_default()
            }
        };
        let guard = NavigationGuard::arm(&url, self.tuning.guard_window, self.clock.clone());
        let mut state = self.state.lock();
        state.guard = Some(Arc::new(guard));
        state.phase = NavigatorPhase::Guarding;
    }

    async fn sweep_popups(&self) {
        let interval_ms = self.tuning.popup_interval.as_millis().max(1);
        let sweeps = self.tuning.popup_window.as_millis() / interval_ms;
        for _ in 0..sweeps {
            self.scheduler.sleep(self.tuning.popup_interval).await;
            match self.dismiss_popup().await {
                Ok(Some(kind)) => debug!(?kind, "Dismissed popup"),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "Popup sweep failed"),
            }
        }
    }

    /// One popup sweep: click at most one element, then restore the
    /// Applications URL if the click navigated away.
    async fn dismiss_popup(&self) -> Result<Option<DismissalKind>, NavigatorError> {
        let doc = self.host.snapshot().await?;
        let Some(dismissal) = find_dismissal(&doc) else {
            return Ok(None);
        };
        let origin = self.host.current_url().await?;
        let window = dismissal.kind.suppression_window();

        self.state.lock().suppression = Some(Suppression {
            origin: origin.clone(),
            until_ms: self.clock.now_millis() + window.as_millis() as i64,
        });
        let clicked = self.host.click(&dismissal.target, ClickMethod::Native).await;
        self.scheduler.sleep(window).await;
        self.state.lock().suppression = None;
        clicked?;

        let current = self.host.current_url().await?;
        if current != origin && is_applications_view(&origin) {
            info!(from = %current, to = %origin, "Restoring Applications view after popup");
            self.host.restore(&origin).await?;
        }
        Ok(Some(dismissal.kind))
    }

    /// Location change reported by the host.
    pub async fn on_location_changed(&self, url: &str) -> LocationChange {
        let guard = {
            let mut state = self.state.lock();
            if state.last_url.as_deref() == Some(url) {
                return LocationChange::Unchanged;
            }
            state.last_url = Some(url.to_string());
            state.guard.clone()
        };

        if let Some(back) = guard.and_then(|g| g.observe(url)) {
            if let Err(e) = self.host.restore(&back).await {
                warn!(error = %e, "Could not revert navigation");
            }
            return LocationChange::Reverted(back);
        }

        if is_applications_view(url) && self.activation.is_activated() {
            return LocationChange::Kept;
        }
        if !keeps_activation(url) {
            self.activation.reset();
        }

        self.scheduler.sleep(self.tuning.reentry_delay).await;
        LocationChange::Reevaluated(self.run(url).await)
    }
}

impl NavigationPolicy for AutoNavigator {
    fn decide(&self, target: &str) -> NavigationDecision {
        let state = self.state.lock();
        if let Some(suppression) = &state.suppression {
            if self.clock.now_millis() < suppression.until_ms
                && target != suppression.origin
                && is_applications_view(&suppression.origin)
            {
                debug!(url = target, "Navigation suppressed after popup dismissal");
                return NavigationDecision::Deny;
            }
        }
        match &state.guard {
            Some(guard) => guard.decide(target),
            None => NavigationDecision::Allow,
        }
    }
}

#[cfg(test)]
#[path = "navigator_tests.rs"]
mod tests;
