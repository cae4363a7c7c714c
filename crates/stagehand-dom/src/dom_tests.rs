use super::*;

fn sample() -> Document {
    let root = DomNode::element("html").child(
        DomNode::element("body").children([
            DomNode::element("div")
                .id("header_STATUS")
                .child(
                    DomNode::element("span")
                        .class("cand-status-value")
                        .child(DomNode::element("span").class("nedit-status").text("Submitted")),
                ),
            DomNode::element("table").id("listViewTable").child(
                DomNode::element("tbody").children([
                    DomNode::element("tr")
                        .attr("data-params", r#"{"id":"11","candId":"21"}"#)
                        .handle("row-1")
                        .child(DomNode::element("td").text("Alice")),
                    DomNode::element("tr")
                        .attr("data-params", "not json")
                        .child(DomNode::element("td").text("Bob")),
                ]),
            ),
            DomNode::element("div")
                .class("modal")
                .hidden()
                .child(DomNode::element("button").class("close").text("Close")),
        ]),
    );
    Document::from_root("https://recruit.zoho.com/recruit/org1/ShowDetails.do", root)
}

#[test]
fn test_document_order_and_len() {
    let doc = sample();
    let tags: Vec<_> = doc.elements().map(|e| e.tag()).collect();
    assert_eq!(tags[0], "html");
    assert_eq!(tags[1], "body");
    assert_eq!(tags[2], "div");
    assert_eq!(doc.len(), tags.len());
    assert!(doc.url().ends_with("ShowDetails.do"));
}

#[test]
fn test_find_by_id_and_classes() {
    let doc = sample();
    let header = doc.find_by_id("header_STATUS").unwrap();
    assert_eq!(header.tag(), "div");
    assert!(doc.find_by_id("missing").is_none());

    let badge = doc.select_first(&Matcher::class("nedit-status").into()).unwrap();
    assert!(badge.has_class("nedit-status"));
    assert_eq!(badge.own_text(), "Submitted");
}

#[test]
fn test_descendant_selector() {
    let doc = sample();
    let selector = Selector::new(Matcher::id("header_STATUS"))
        .descendant(Matcher::class("cand-status-value"))
        .descendant(Matcher::class("nedit-status"));
    let found = doc.select_first(&selector).unwrap();
    assert_eq!(found.text_content(), "Submitted");

    let wrong_scope = Selector::new(Matcher::id("listViewTable")).descendant(Matcher::class("nedit-status"));
    assert!(doc.select_first(&wrong_scope).is_none());
}

#[test]
fn test_select_all_rows() {
    let doc = sample();
    let rows = doc.select_all(
        &Selector::new(Matcher::tag("table").with_id("listViewTable"))
            .descendant(Matcher::tag("tbody"))
            .descendant(Matcher::tag("tr")),
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].handle(), Some("row-1"));
    assert_eq!(rows[1].text_content(), "Bob");
}

#[test]
fn test_select_first_of_uses_document_order() {
    let doc = sample();
    let group = [
        Selector::from(Matcher::tag("td")),
        Selector::from(Matcher::class("cand-status-value")),
    ];
    let first = doc.select_first_of(&group).unwrap();
    assert!(first.has_class("cand-status-value"));
    assert_eq!(doc.select_all_of(&group).len(), 3);
}

#[test]
fn test_visibility_inherits_from_ancestors() {
    let doc = sample();
    let close = doc.select_first(&Matcher::class("close").into()).unwrap();
    assert!(!close.is_visible());
    assert!(doc.select_first(&Matcher::class("close").visible().into()).is_none());

    let td = doc.select_first(&Matcher::tag("td").into()).unwrap();
    assert!(td.is_visible());
}

#[test]
fn test_text_contains_is_case_insensitive() {
    let doc = sample();
    let m = Matcher::tag("td").text_contains("ALICE");
    assert_eq!(doc.select_all(&m.into()).len(), 1);

    let either = Matcher::tag("td").text_contains("alice").text_contains("bob");
    assert_eq!(doc.select_all(&either.into()).len(), 2);
}

#[test]
fn test_attribute_operators() {
    let doc = sample();
    let present = Matcher::tag("tr").attr_present("data-params");
    assert_eq!(doc.select_all(&present.into()).len(), 2);

    let contains = Matcher::tag("tr").attr_contains("data-params", "candId");
    assert_eq!(doc.select_all(&contains.into()).len(), 1);

    let starts = Matcher::any().attr_starts_with("id", "header_");
    assert!(doc.exists(&starts.into()));

    let eq = Matcher::any().attr_eq("id", "header");
    assert!(!doc.exists(&eq.into()));
}

#[test]
fn test_closest_and_contains() {
    let doc = sample();
    let td = doc.select_first(&Matcher::tag("td").into()).unwrap();
    let row = td.closest(&Matcher::tag("tr")).unwrap();
    assert_eq!(row.handle(), Some("row-1"));
    assert!(row.contains(&td));
    assert!(!td.contains(&row));
    assert!(td.closest(&Matcher::tag("form")).is_none());
}

#[test]
fn test_json_attr() {
    #[derive(Debug, serde::Deserialize)]
    struct Params {
        id: String,
        #[serde(rename = "candId")]
        cand_id: String,
    }

    let doc = sample();
    let rows = doc.select_all(&Matcher::tag("tr").into());
    let params: Params = rows[0].json_attr("data-params").unwrap();
    assert_eq!(params.id, "11");
    assert_eq!(params.cand_id, "21");

    let err = rows[1].json_attr::<Params>("data-params").unwrap_err();
    assert!(matches!(err, DomError::MalformedParams { .. }));

    let missing = rows[0].json_attr::<Params>("data-other").unwrap_err();
    assert!(missing.to_string().contains("data-other"));
}

#[test]
fn test_locator_css_path() {
    let doc = sample();
    let badge = doc.select_first(&Matcher::class("nedit-status").into()).unwrap();
    let locator = badge.locator();
    assert!(locator.handle.is_none());
    assert_eq!(
        locator.css_path,
        "html > body:nth-child(1) > div#header_STATUS > span:nth-child(1) > span:nth-child(1)"
    );

    let rows = doc.select_all(&Matcher::tag("tr").into());
    assert!(rows[1].css_path().ends_with("tr:nth-child(2)"));
}

#[test]
fn test_from_json_snapshot() {
    let json = r#"{
        "tag": "DIV",
        "attributes": {"id": "qv-main-container", "data-params": "{}"},
        "children": [
            {"tag": "span", "text": "Quick", "visible": false}
        ]
    }"#;
    let doc = Document::from_json("about:blank", json).unwrap();
    assert_eq!(doc.root().tag(), "div");
    let span = doc.root().children().next().unwrap();
    assert!(!span.is_visible());
    assert_eq!(doc.root().text_content(), "Quick");

    assert!(Document::from_json("about:blank", "{\"tag\":").is_err());
}

#[test]
fn test_matcher_display() {
    let m = Matcher::tag("a").attr_contains("href", "module=Applications");
    assert_eq!(m.to_string(), "a[href*=\"module=Applications\"]");

    let s = Selector::new(Matcher::class("cand-status-value")).descendant(Matcher::class("nedit-status"));
    assert_eq!(s.to_string(), ".cand-status-value .nedit-status");

    assert_eq!(Matcher::any().visible().to_string(), "*:visible");
}

#[test]
fn test_node_builder_class_appends() {
    let node = DomNode::element("div").class("a").class("b");
    assert_eq!(node.attributes.get("class").map(String::as_str), Some("a b"));
}
