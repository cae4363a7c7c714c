//! Current-status probes.
//!
//! Each view has an ordered list of pure probes over a DOM scope. The first
//! probe that answers wins; when none does the status is [`UNKNOWN_STATUS`].

use stagehand_dom::{ElementRef, Matcher, Selector};
use stagehand_protocols::StageList;

/// Status shown when no probe matches.
pub const UNKNOWN_STATUS: &str = "NA";

/// One way of reading a record's current status inside `scope`.
pub type Probe = fn(ElementRef<'_>, &StageList) -> Option<String>;

const ROW_PROBES: &[Probe] = &[
    status_display,
    hidden_status_input,
    badge_class,
    row_data_status,
    status_span,
];

const DETAIL_PROBES: &[Probe] = &[
    candidate_status_value,
    entity_status_input,
    header_status_value,
    badge_class,
    status_span,
];

const QUICK_VIEW_PROBES: &[Probe] = &[quick_view_status_area, status_span, badge_class];

/// Probes for a list-view row.
pub fn row_probes() -> &'static [Probe] {
    ROW_PROBES
}

/// Probes for a detail page, scoped to the whole document.
pub fn detail_probes() -> &'static [Probe] {
    DETAIL_PROBES
}

/// Probes for a quick-view container.
pub fn quick_view_probes() -> &'static [Probe] {
    QUICK_VIEW_PROBES
}

/// Run `probes` in order. Empty answers also yield [`UNKNOWN_STATUS`].
pub fn current_status(probes: &[Probe], scope: ElementRef<'_>, stages: &StageList) -> String {
    probes
        .iter()
        .find_map(|probe| probe(scope, stages))
        .filter(|status| !status.is_empty())
        .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text_content().trim().to_string()
}

fn status_display(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    scope
        .select_first(&Matcher::class("nedit-status").into())
        .map(trimmed_text)
}

fn hidden_status_input(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    let group = [
        Selector::new(Matcher::tag("input").attr_contains("id", "Status")),
        Selector::new(Matcher::tag("input").attr_contains("name", "status")),
    ];
    scope
        .select_first_of(&group)
        .map(|input| input.attr("value").unwrap_or_default().to_string())
}

fn badge_class(scope: ElementRef<'_>, stages: &StageList) -> Option<String> {
    stages
        .iter()
        .filter(|stage| !stage.badge_class.is_empty())
        .find(|stage| {
            scope
                .select_first(&Matcher::class(&stage.badge_class).into())
                .is_some()
        })
        .map(|stage| stage.value.clone())
}

fn row_data_status(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    scope
        .data("status")
        .filter(|status| !status.is_empty())
        .map(str::to_string)
}

fn status_span(scope: ElementRef<'_>, stages: &StageList) -> Option<String> {
    let span = scope.select_first(&Matcher::tag("span").attr_contains("class", "status").into())?;
    let text = trimmed_text(span);
    stages
        .iter()
        .find(|stage| text.contains(stage.value.as_str()) || text.contains(stage.label.as_str()))
        .map(|stage| stage.value.clone())
}

fn candidate_status_value(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    scope
        .select_first(
            &Selector::new(Matcher::class("cand-status-value")).descendant(Matcher::class("nedit-status")),
        )
        .map(trimmed_text)
}

fn entity_status_input(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    scope
        .select_first(&Matcher::id("entityStatus").into())
        .map(|input| input.attr("value").unwrap_or_default().to_string())
}

fn header_status_value(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    scope
        .select_first(
            &Selector::new(Matcher::id("header_STATUS"))
                .descendant(Matcher::class("cand-status-value"))
                .descendant(Matcher::class("nedit-status")),
        )
        .map(trimmed_text)
}

fn quick_view_status_area(scope: ElementRef<'_>, _: &StageList) -> Option<String> {
    scope
        .select_first(&Matcher::id("qvStatusArea").into())
        .map(trimmed_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_dom::{Document, DomNode};

    fn doc(root: DomNode) -> Document {
        Document::from_root("https://recruit.zoho.com/recruit/org1/ShowDetails.do", root)
    }

    fn row(cells: Vec<DomNode>) -> DomNode {
        DomNode::element("tr").id("11").children(cells)
    }

    fn row_status(node: DomNode) -> String {
        let document = doc(DomNode::element("tbody").child(node));
        let row = document.select_first(&Matcher::tag("tr").into()).unwrap();
        current_status(row_probes(), row, &StageList::fallback())
    }

    #[test]
    fn test_row_status_display_wins() {
        let status = row_status(row(vec![
            DomNode::element("td").child(DomNode::element("span").class("nedit-status").text(" Booked ")),
            DomNode::element("td").child(DomNode::element("input").attr("id", "leadStatus").attr("value", "Hired")),
        ]));
        assert_eq!(status, "Booked");
    }

    #[test]
    fn test_row_hidden_input() {
        let status = row_status(row(vec![DomNode::element("td").child(
            DomNode::element("input").attr("name", "lead_status").attr("value", "Hired"),
        )]));
        assert_eq!(status, "Hired");
    }

    #[test]
    fn test_row_badge_class_in_stage_order() {
        let status = row_status(row(vec![DomNode::element("td").children([
            DomNode::element("i").class("darkblue"),
            DomNode::element("i").class("sheen-gold"),
        ])]));
        assert_eq!(status, "ShortList");
    }

    #[test]
    fn test_row_data_status() {
        let status = row_status(row(Vec::new()).attr("data-status", "Archived"));
        assert_eq!(status, "Archived");
    }

    #[test]
    fn test_row_status_span_matches_label() {
        let status = row_status(row(vec![DomNode::element("td").child(
            DomNode::element("span").class("lead-status-text").text("Now: Rejected by client"),
        )]));
        assert_eq!(status, "Rejected");
    }

    #[test]
    fn test_row_no_match_is_unknown() {
        let status = row_status(row(vec![DomNode::element("td").text("Alice")]));
        assert_eq!(status, UNKNOWN_STATUS);
    }

    #[test]
    fn test_row_empty_input_is_unknown() {
        let status = row_status(row(vec![DomNode::element("td").child(
            DomNode::element("input").attr("id", "leadStatus").attr("value", ""),
        )]));
        assert_eq!(status, UNKNOWN_STATUS);
    }

    #[test]
    fn test_detail_probes_in_order() {
        let document = doc(DomNode::element("body").children([
            DomNode::element("input").id("entityStatus").attr("value", "Hired"),
            DomNode::element("div").class("cand-status-value").child(
                DomNode::element("span").class("nedit-status").text("Submitted"),
            ),
        ]));
        let status = current_status(detail_probes(), document.root(), &StageList::fallback());
        assert_eq!(status, "Submitted");

        let document = doc(DomNode::element("body").child(
            DomNode::element("input").id("entityStatus").attr("value", "Hired"),
        ));
        let status = current_status(detail_probes(), document.root(), &StageList::fallback());
        assert_eq!(status, "Hired");
    }

    #[test]
    fn test_quick_view_status_area() {
        let document = doc(DomNode::element("div").id("qv-main-container").child(
            DomNode::element("span").id("qvStatusArea").text("Chase VI"),
        ));
        let status = current_status(quick_view_probes(), document.root(), &StageList::fallback());
        assert_eq!(status, "Chase VI");
    }

    #[test]
    fn test_quick_view_span_before_badge() {
        let document = doc(DomNode::element("div").id("qv-main-container").children([
            DomNode::element("i").class("red"),
            DomNode::element("span").class("status").text("Booked"),
        ]));
        let status = current_status(quick_view_probes(), document.root(), &StageList::fallback());
        assert_eq!(status, "Booked");
    }
}
