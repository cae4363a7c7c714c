//! # Stagehand Navigator
//!
//! Opens a job opening's Applications view when the page asks for it, then
//! keeps the tab there while the host CRM settles.
//!
//! ## Core Concepts
//!
//! - **AutoNavigator**: the `Idle → Searching → Activating → Guarding →
//!   Done` state machine driven by a bounded [`RetryPolicy`](stagehand_protocols::RetryPolicy).
//! - **ApplicationsFinder**: ordered probes for the Applications link, with
//!   a free-text fallback over clickable elements.
//! - **NavigationGuard**: a time-boxed [`NavigationPolicy`] that refuses
//!   Applications views belonging to another job.
//! - **Popup dismissal**: closes "select at least one" style nag dialogs
//!   and undoes the navigation they trigger.
//! - **SessionFlags**: tab-scoped storage for the activation flag.
//! - **Deep links**: job opening URLs that start the navigator, plus a
//!   filtered Candidates fallback.

mod error;
mod finder;
mod guard;
mod host;
mod links;
mod navigator;
mod popup;
mod session;
mod trigger;

pub use error::NavigatorError;
pub use finder::{ApplicationsFinder, FoundLink};
pub use guard::{NavigationDecision, NavigationGuard, NavigationPolicy, is_wrong_applications_page};
pub use host::{ClickMethod, NavigatorHost};
pub use links::{ApplicationsLinks, applications_links, org_key};
pub use navigator::{AutoNavigator, LocationChange, NavigationOutcome, NavigatorPhase, NavigatorTuning};
pub use popup::{Dismissal, DismissalKind, NAG_PHRASES, POPUP_CONTAINERS, find_dismissal};
pub use session::{ACTIVATED_FLAG, Activation, MemorySessionFlags, SessionFlags};
pub use trigger::{
    AUTO_CLICK_MARKER, extract_job_id, has_explicit_trigger, is_applications_view, keeps_activation, should_auto_click,
};
