//! # Stagehand Page
//!
//! Page-context integration with the host CRM.
//!
//! ## Core Concepts
//!
//! - **PageIntegrator**: reacts to `request-completed` notifications and
//!   quick-view mutations by injecting stage controls, candidate links and
//!   the associate-job widget.
//! - **StageCatalog**: resolves the stage list from the live pipeline screen,
//!   the remote configuration, or the built-in fallback.
//! - **Probes**: ordered strategy lists that read a record's current status
//!   from a DOM snapshot.
//! - **CrmClient**: the host CRM's form-encoded endpoints.
//! - **PageSurface**: the hosting shell that captures snapshots and applies
//!   widget mutations.
//!
//! All page state lives in a [`PageContext`] owned by the integrator.

mod catalog;
mod context;
mod control;
mod crm;
mod error;
mod frame;
mod integrator;
mod location;
mod notify;
mod pipeline;
mod short_form;
mod status;
mod surface;
mod widgets;

pub use catalog::StageCatalog;
pub use context::PageContext;
pub use control::{ControlId, Placeholder, StageControl, StageOption, StatusChangeRequest, ViewKind};
pub use crm::{ASSOCIATION_QUERY_ID, CrmClient, CrmSession, HttpCrmClient};
pub use error::{CrmError, PageError};
pub use frame::{EMBEDDED_FRAME_HIDDEN, EmbeddedFrame};
pub use integrator::{IntegratorTuning, PageIntegrator};
pub use location::{PageLocation, RequestRoute, Submodule};
pub use notify::{NotifyLevel, Notification, Notifier, TracingNotifier};
pub use pipeline::{is_pipeline_page, scrape_pipeline};
pub use short_form::short_form;
pub use status::{Probe, UNKNOWN_STATUS, current_status, detail_probes, quick_view_probes, row_probes};
pub use surface::{BadgeUpdate, PageSurface, Placement};
pub use widgets::{AssociateJobWidget, CandidateLink, TabNavItem, TabSection, Widget};
