//! Candidate edit form embedded in the quick-view tab.

use std::sync::Arc;

use stagehand_protocols::PageMessage;
use tracing::{debug, warn};

use crate::error::PageError;
use crate::notify::{Notification, Notifier};
use crate::surface::PageSurface;

/// Host chrome hidden inside the embedded form.
pub const EMBEDDED_FRAME_HIDDEN: &str = "#tabLayer,#cancelLeadsBtn,#wmstoolbar,.new-form-edit-layout";

/// Handler for a page loaded inside the injected candidate tab frame.
pub struct EmbeddedFrame {
    surface: Arc<dyn PageSurface>,
    notifier: Arc<dyn Notifier>,
    original_url: String,
}

impl EmbeddedFrame {
    pub fn new(surface: Arc<dyn PageSurface>, notifier: Arc<dyn Notifier>, original_url: impl Into<String>) -> Self {
        Self {
            surface,
            notifier,
            original_url: original_url.into(),
        }
    }

    /// Hide the host toolbars around the edit form.
    pub async fn start(&self) -> Result<(), PageError> {
        let css = format!("{EMBEDDED_FRAME_HIDDEN}{{display: none !important;}}");
        self.surface.inject_style(&css).await
    }

    /// A save inside the frame completed: confirm and reload the form.
    pub async fn on_message(&self, message: PageMessage) {
        match message {
            PageMessage::RequestCompleted { url } => {
                debug!(url = %url, "Embedded form request completed");
                self.notifier
                    .notify(Notification::success("Candidate updated successfully"));
                if let Err(e) = self.surface.navigate(&self.original_url).await {
                    warn!(error = %e, "Failed to reload embedded form");
                }
            }
        }
    }
}
