//! Keeps the tab on the Applications view of the job that was opened.
//!
//! The host shell asks a [`NavigationPolicy`] before every scripted
//! navigation (history push/replace, `location.assign`/`replace`) and
//! reports each observed location change back through
//! [`NavigationGuard::observe`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use stagehand_protocols::Clock;
use tracing::{debug, info};

use crate::trigger::{extract_job_id, is_applications_view};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationDecision {
    Allow,
    Deny,
}

/// Consulted by the host shell before it performs a navigation.
pub trait NavigationPolicy: Send + Sync {
    fn decide(&self, target: &str) -> NavigationDecision;
}

/// An Applications view that does not belong to the target job.
///
/// Matching is by substring, so job `12` also accepts a URL carrying
/// `id=123`.
pub fn is_wrong_applications_page(url: &str, target_job_id: Option<&str>) -> bool {
    if !is_applications_view(url) {
        return false;
    }
    match target_job_id {
        Some(job) => !(url.contains(&format!("id={job}")) || url.contains(&format!("entityid={job}"))),
        None => !url.contains("JobOpenings"),
    }
}

/// Time-boxed guard armed right after the Applications link was clicked.
pub struct NavigationGuard {
    target_job_id: Option<String>,
    last_good: Mutex<String>,
    expires_at_ms: i64,
    clock: Arc<dyn Clock>,
}

impl NavigationGuard {
    /// Arm for `window`, taking the target job from `current_url`.
    pub fn arm(current_url: &str, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let target_job_id = extract_job_id(current_url);
        let expires_at_ms = clock.now_millis() + window.as_millis() as i64;
        info!(job_id = ?target_job_id, window_ms = window.as_millis() as u64, "Navigation guard armed");
        Self {
            target_job_id,
            last_good: Mutex::new(current_url.to_string()),
            expires_at_ms,
            clock,
        }
    }

    pub fn target_job_id(&self) -> Option<&str> {
        self.target_job_id.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.clock.now_millis() < self.expires_at_ms
    }

    pub fn last_good_url(&self) -> String {
        self.last_good.lock().clone()
    }

    pub fn is_wrong(&self, url: &str) -> bool {
        is_wrong_applications_page(url, self.target_job_id.as_deref())
    }

    /// Record an observed location.
    ///
    /// Returns the URL to revert to when the tab landed on a wrong
    /// Applications view while the guard is active.
    pub fn observe(&self, url: &str) -> Option<String> {
        if !self.is_active() {
            return None;
        }
        let mut last_good = self.last_good.lock();
        if *last_good == url {
            return None;
        }
        if self.is_wrong(url) {
            debug!(url, revert_to = %*last_good, "Landed on wrong Applications page");
            return Some(last_good.clone());
        }
        *last_good = url.to_string();
        None
    }
}

impl fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("target_job_id", &self.target_job_id)
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

impl NavigationPolicy for NavigationGuard {
    fn decide(&self, target: &str) -> NavigationDecision {
        if self.is_active() && self.is_wrong(target) {
            debug!(url = target, "Blocked navigation to wrong Applications page");
            return NavigationDecision::Deny;
        }
        NavigationDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_protocols::ManualClock;

    const JOB_PAGE: &str =
        "https://recruit.zoho.com/recruit/org42/EntityInfo.do?module=JobOpenings&id=12&submodule=Applications";

    #[test]
    fn test_non_applications_urls_are_never_wrong() {
        assert!(!is_wrong_applications_page("x?module=Candidates&id=99", Some("12")));
        assert!(!is_wrong_applications_page("x?module=Candidates", None));
    }

    #[test]
    fn test_wrong_with_job_id() {
        assert!(!is_wrong_applications_page("x?submodule=Applications&id=12", Some("12")));
        assert!(!is_wrong_applications_page("x?submodule=Applications&entityid=12", Some("12")));
        assert!(is_wrong_applications_page("x?submodule=Applications&id=99", Some("12")));
        // entityId is matched case-sensitively
        assert!(is_wrong_applications_page("x?submodule=Applications&entityId=12", Some("12")));
    }

    #[test]
    fn test_job_id_matching_is_substring() {
        assert!(!is_wrong_applications_page("x?submodule=Applications&id=123", Some("12")));
        assert!(!is_wrong_applications_page(
            "x?submodule=Applications&id=99&parentid=12",
            Some("12")
        ));
        assert!(is_wrong_applications_page("x?submodule=Applications&id=1", Some("12")));
    }

    #[test]
    fn test_wrong_without_job_id() {
        assert!(!is_wrong_applications_page("x?module=JobOpenings&submodule=Applications", None));
        assert!(is_wrong_applications_page("x?module=Candidates&submodule=Applications", None));
    }

    #[test]
    fn test_guard_denies_only_while_active() {
        let clock = Arc::new(ManualClock::new(0));
        let guard = NavigationGuard::arm(JOB_PAGE, Duration::from_secs(10), clock.clone());
        assert_eq!(guard.target_job_id(), Some("12"));

        let other_job = "https://recruit.zoho.com/recruit/org42/EntityInfo.do?module=JobOpenings&id=88&submodule=Applications";
        assert_eq!(guard.decide(other_job), NavigationDecision::Deny);
        assert_eq!(guard.decide(JOB_PAGE), NavigationDecision::Allow);
        assert_eq!(guard.decide("x?module=Candidates"), NavigationDecision::Allow);

        clock.advance(Duration::from_secs(10));
        assert!(!guard.is_active());
        assert_eq!(guard.decide(other_job), NavigationDecision::Allow);
    }

    #[test]
    fn test_observe_reverts_wrong_page_and_tracks_good_ones() {
        let clock = Arc::new(ManualClock::new(0));
        let guard = NavigationGuard::arm(JOB_PAGE, Duration::from_secs(10), clock.clone());

        assert_eq!(guard.observe(JOB_PAGE), None);
        assert_eq!(
            guard.observe("x?submodule=Applications&id=77").as_deref(),
            Some(JOB_PAGE)
        );
        assert_eq!(guard.last_good_url(), JOB_PAGE);

        let good = "x?submodule=Applications&id=12&page=2";
        assert_eq!(guard.observe(good), None);
        assert_eq!(guard.last_good_url(), good);
        assert_eq!(guard.observe("x?submodule=Applications&id=77").as_deref(), Some(good));

        clock.advance(Duration::from_secs(11));
        assert_eq!(guard.observe("x?submodule=Applications&id=77"), None);
    }
}
