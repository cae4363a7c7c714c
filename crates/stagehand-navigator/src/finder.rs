//! Locating the Applications link on a job opening page.
//!
//! Probes run in a fixed order. Each one takes the first element it
//! selects, the way `querySelector` would, and accepts it only when it is
//! rendered. When every probe misses, a free-text scan over clickable
//! elements gets the final word.

use serde::Serialize;
use stagehand_dom::{Document, ElementLocator, ElementRef, Matcher, Selector};

const NEEDLE: &str = "applications";

/// Containers whose links are searched by their text.
const LINK_CONTAINERS: &[&str] = &[
    "relatedList",
    "sidebar",
    "quick-links",
    "quicklinks",
    "ql-container",
    "related-list",
    "entity-actions",
    "related-modules",
    "module-nav",
    "submodule-nav",
];

/// Attributes that make a free-text match actionable.
const ACTION_ATTRIBUTES: &[&str] = &["href", "onclick", "data-module"];

/// A located Applications link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundLink {
    pub locator: ElementLocator,
    /// Probe that matched, rendered as a CSS-like selector.
    pub probe: String,
    pub text: String,
}

/// Ordered probe list for the Applications link.
#[derive(Debug, Clone)]
pub struct ApplicationsFinder {
    probes: Vec<Selector>,
    clickable: Vec<Selector>,
}

impl Default for ApplicationsFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationsFinder {
    pub fn new() -> Self {
        Self {
            probes: default_probes(),
            clickable: clickable_group(),
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    pub fn find(&self, doc: &Document) -> Option<FoundLink> {
        for probe in &self.probes {
            let Some(element) = doc.select_first(probe) else {
                continue;
            };
            if element.is_visible() {
                return Some(found(element, probe.to_string()));
            }
        }
        self.scan_clickable(doc)
    }

    fn scan_clickable(&self, doc: &Document) -> Option<FoundLink> {
        doc.select_all_of(&self.clickable)
            .into_iter()
            .find(|e| {
                e.text_content().trim().to_lowercase().contains(NEEDLE)
                    && e.is_visible()
                    && ACTION_ATTRIBUTES.iter().any(|a| e.has_attr(a))
            })
            .map(|e| found(e, "clickable:contains(applications)".to_string()))
    }
}

fn found(element: ElementRef<'_>, probe: String) -> FoundLink {
    FoundLink {
        locator: element.locator(),
        probe,
        text: element.text_content().trim().to_string(),
    }
}

fn link() -> Matcher {
    Matcher::tag("a")
}

fn text_link(needle: &str) -> Matcher {
    link().text_contains(needle)
}

fn within(container: Matcher, subject: Matcher) -> Selector {
    Selector::new(container).descendant(subject)
}

fn default_probes() -> Vec<Selector> {
    let mut probes: Vec<Selector> = vec![
        link().attr_contains("href", "Applications").into(),
        link().attr_contains("href", "submodule=Applications").into(),
        link()
            .attr_contains("href", "Candidates")
            .attr_contains("href", "Applications")
            .into(),
        within(Matcher::class("quick-access"), link().attr_contains("title", "Applications")),
        within(Matcher::class("quick-access"), text_link(NEEDLE)),
    ];
    probes.extend(
        LINK_CONTAINERS
            .iter()
            .map(|container| within(Matcher::class(container), text_link(NEEDLE))),
    );
    probes.extend([
        Matcher::any().attr_eq("data-module", "Applications").into(),
        Matcher::any().attr_eq("data-submodule", "Applications").into(),
        link().attr_contains("data-title", "Applications").into(),
        link().attr_contains("title", "Applications").into(),
        link().attr_contains("title", "applications").into(),
        Matcher::class("applications-link").into(),
        Matcher::class("app-link").into(),
        Matcher::class("lyte-shortcut").attr_contains("title", "Applications").into(),
        Matcher::class("shortcut-item").attr_contains("title", "Applications").into(),
        within(Matcher::tag("td"), text_link(NEEDLE)),
        within(Matcher::tag("tr"), text_link(NEEDLE)),
        within(Matcher::class("related-info"), text_link(NEEDLE)),
        text_link("view applications").into(),
        text_link("show applications").into(),
        text_link("applications list").into(),
    ]);
    probes
}

fn clickable_group() -> Vec<Selector> {
    vec![
        Matcher::tags(["a", "button"]).into(),
        Matcher::tags(["span", "div"]).attr_present("onclick").into(),
        Matcher::class("clickable").into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_dom::DomNode;

    fn page(body: DomNode) -> Document {
        Document::from_root(
            "https://recruit.zoho.com/recruit/org42/EntityInfo.do?module=JobOpenings&id=7",
            DomNode::element("body").child(body),
        )
    }

    #[test]
    fn test_href_probe_wins() {
        let doc = page(
            DomNode::element("div").children([
                DomNode::element("a").class("sidebar-link").text("Applications"),
                DomNode::element("a")
                    .id("apps")
                    .attr("href", "/recruit/EntityInfo.do?submodule=Applications")
                    .text("12"),
            ]),
        );
        let link = ApplicationsFinder::new().find(&doc).unwrap();
        assert!(link.locator.css_path.ends_with("a#apps"));
        assert_eq!(link.probe, "a[href*=\"Applications\"]");
    }

    #[test]
    fn test_hidden_match_falls_through_to_next_probe() {
        let doc = page(
            DomNode::element("div").children([
                DomNode::element("a")
                    .attr("href", "/Applications")
                    .text("Applications")
                    .hidden(),
                DomNode::element("div").class("sidebar").child(
                    DomNode::element("a").id("side").text("Applications (4)"),
                ),
            ]),
        );
        let link = ApplicationsFinder::new().find(&doc).unwrap();
        assert!(link.locator.css_path.ends_with("a#side"));
        assert_eq!(link.text, "Applications (4)");
    }

    #[test]
    fn test_first_match_only_per_probe() {
        // querySelector semantics: a hidden first match does not let a later
        // element of the same probe through.
        let doc = page(DomNode::element("div").children([
            DomNode::element("a").class("app-link").hidden(),
            DomNode::element("a").class("app-link").id("second"),
        ]));
        assert!(ApplicationsFinder::new().find(&doc).is_none());
    }

    #[test]
    fn test_container_text_match_is_case_insensitive() {
        let doc = page(DomNode::element("ul").class("related-modules").child(
            DomNode::element("li").child(DomNode::element("a").id("rel").text("APPLICATIONS")),
        ));
        let link = ApplicationsFinder::new().find(&doc).unwrap();
        assert!(link.locator.css_path.ends_with("a#rel"));
    }

    #[test]
    fn test_data_module_probe() {
        let doc = page(
            DomNode::element("span")
                .id("tab")
                .attr("data-module", "Applications")
                .text("Apps"),
        );
        let link = ApplicationsFinder::new().find(&doc).unwrap();
        assert_eq!(link.probe, "[data-module=\"Applications\"]");
    }

    #[test]
    fn test_clickable_fallback_requires_action_attribute() {
        let inert = page(DomNode::element("button").text("Open applications"));
        assert!(ApplicationsFinder::new().find(&inert).is_none());

        let actionable = page(
            DomNode::element("button")
                .id("open")
                .attr("onclick", "openApps()")
                .text("  Open applications  "),
        );
        let link = ApplicationsFinder::new().find(&actionable).unwrap();
        assert_eq!(link.probe, "clickable:contains(applications)");
        assert_eq!(link.text, "Open applications");
    }

    #[test]
    fn test_clickable_fallback_skips_hidden() {
        let doc = page(DomNode::element("div").children([
            DomNode::element("div")
                .attr("onclick", "a()")
                .text("Applications")
                .hidden(),
            DomNode::element("div")
                .class("clickable")
                .id("visible")
                .attr("data-module", "Applications-legacy")
                .text("applications"),
        ]));
        let link = ApplicationsFinder::new().find(&doc).unwrap();
        assert!(link.locator.css_path.ends_with("div#visible"));
    }

    #[test]
    fn test_nothing_found() {
        let doc = page(DomNode::element("a").attr("href", "/Candidates").text("Candidates"));
        assert!(ApplicationsFinder::new().find(&doc).is_none());
    }
}
