//! Stage list resolution for a page load.

use stagehand_dom::Document;
use stagehand_protocols::{BackgroundPort, StageList};
use tracing::{debug, info, warn};

use crate::pipeline::{pipeline_container, scrape_pipeline};

/// Resolves the stages offered by every control on the page.
pub struct StageCatalog;

impl StageCatalog {
    /// Scrape the pipeline screen when present, otherwise use the configured
    /// stages. Empty or invalid lists fall back to the built-in stages.
    pub async fn load(document: &Document, port: &dyn BackgroundPort) -> StageList {
        if let Some(container) = pipeline_container(document) {
            info!("Loading stages from the pipeline screen");
            return StageList::or_fallback(scrape_pipeline(container));
        }

        match port.get_config().await {
            Ok(config) => {
                debug!(count = config.pipeline_stages.len(), "Loaded configured stages");
                config.stage_list()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load configuration, using fallback stages");
                StageList::fallback()
            }
        }
    }
}
