//! Stage extraction from the host CRM's own pipeline screen.

use stagehand_dom::{Document, ElementRef, Matcher, Selector};
use stagehand_protocols::StageDefinition;
use stagehand_protocols::defaults::stage_color;
use tracing::debug;

use crate::short_form::short_form;

/// The pipeline container, when the page is the pipeline configuration screen.
pub fn pipeline_container(document: &Document) -> Option<ElementRef<'_>> {
    document.find_by_id("pp-main-div")
}

pub fn is_pipeline_page(document: &Document) -> bool {
    pipeline_container(document).is_some()
}

/// The pipeline editor whose mutations trigger a stage reload.
pub fn is_pipeline_setup_page(document: &Document) -> bool {
    document.find_by_id("setupPipeline").is_some()
}

/// One stage per `.status-value` entry under each `dl.sp-reorder-list` group.
///
/// Groups without `.stage-details-td` are skipped, as are entries missing a
/// `value` attribute or text.
pub fn scrape_pipeline(container: ElementRef<'_>) -> Vec<StageDefinition> {
    let groups = container.select_all(&Selector::new(Matcher::tag("dl").with_class("sp-reorder-list")));
    let details = Selector::new(Matcher::class("stage-details-td"));
    let entries = Selector::new(Matcher::class("status-value"));

    let mut stages = Vec::new();
    for (index, group) in groups.into_iter().enumerate() {
        let Some(detail) = group.select_first(&details) else {
            debug!(group = index + 1, "Pipeline group has no stage details");
            continue;
        };
        let stage_name = detail.data("stagename").unwrap_or_default();
        let theme = detail.data("stagecolor").unwrap_or_default();

        for entry in group.select_all(&entries) {
            let value = entry.attr("value").unwrap_or_default();
            let text = entry.text_content();
            let text = text.trim();
            if value.is_empty() || text.is_empty() {
                continue;
            }
            stages.push(
                StageDefinition::new(text, short_form(text), value, stage_color(theme), theme)
                    .with_stage_name(stage_name),
            );
        }
    }

    debug!(count = stages.len(), "Scraped pipeline stages");
    stages
}
