//! Nag popups raised by the host after the Applications view opens.
//!
//! The host shows "select at least one record" style dialogs that, once
//! dismissed, tend to navigate away. Only dialogs carrying one of
//! [`NAG_PHRASES`] are closed. Stray backdrops are clicked when no dialog
//! qualifies.

use std::time::Duration;

use serde::Serialize;
use stagehand_dom::{Document, ElementLocator, ElementRef, Matcher, Selector};

/// Classes marking a popup container.
pub const POPUP_CONTAINERS: &[&str] = &[
    "modal",
    "alert",
    "notification",
    "toast",
    "zp-modal",
    "zp-alert",
    "lyte-modal",
];

/// Lowercased container text that identifies a nag popup.
pub const NAG_PHRASES: &[&str] = &[
    "select at least one",
    "please select",
    "no records selected",
    "choose at least",
];

const BACKDROPS: &[&str] = &["modal-backdrop", "overlay", "popup-overlay"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalKind {
    CloseControl,
    Backdrop,
}

impl DismissalKind {
    /// How long navigation away from the current page stays blocked after
    /// the click.
    pub fn suppression_window(self) -> Duration {
        match self {
            DismissalKind::CloseControl => Duration::from_millis(500),
            DismissalKind::Backdrop => Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dismissal {
    pub kind: DismissalKind,
    pub target: ElementLocator,
}

fn within(container: &str, subject: Matcher) -> Selector {
    Selector::new(Matcher::class(container)).descendant(subject)
}

fn button_labelled(container: &str, label: &str) -> Selector {
    within(container, Matcher::tag("button").text_contains(label))
}

/// Close controls, most specific first.
fn close_controls() -> Vec<Selector> {
    let mut controls = vec![within("modal-dialog", Matcher::class("close"))];
    controls.extend(
        POPUP_CONTAINERS
            .iter()
            .map(|container| within(container, Matcher::class("close"))),
    );
    controls.extend([
        Matcher::any().attr_eq("data-dismiss", "modal").into(),
        Matcher::any().attr_eq("data-dismiss", "alert").into(),
        button_labelled("modal", "ok"),
        button_labelled("modal", "close"),
        button_labelled("modal", "cancel"),
        button_labelled("alert", "ok"),
        button_labelled("alert", "close"),
        Matcher::tag("button").attr_eq("title", "Close").into(),
        Matcher::tag("button").attr_eq("aria-label", "Close").into(),
        Matcher::class("close-button").into(),
        Matcher::class("dismiss-button").into(),
        Matcher::class("toast-close").into(),
        Matcher::class("notification-close").into(),
        Matcher::class("message-close").into(),
    ]);
    controls
}

/// Nearest popup container, the element itself included.
fn popup_container<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    std::iter::once(element)
        .chain(element.ancestors())
        .find(|e| POPUP_CONTAINERS.iter().any(|c| e.has_class(c)))
}

fn is_nag(container: ElementRef<'_>) -> bool {
    let text = container.text_content().to_lowercase();
    NAG_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Pick the one element to click in this sweep, if any.
pub fn find_dismissal(doc: &Document) -> Option<Dismissal> {
    let close = close_controls().iter().find_map(|selector| {
        let control = doc.select_first(selector)?;
        if !control.is_visible() {
            return None;
        }
        let container = popup_container(control)?;
        is_nag(container).then(|| Dismissal {
            kind: DismissalKind::CloseControl,
            target: control.locator(),
        })
    });
    if close.is_some() {
        return close;
    }

    doc.elements()
        .find(|e| BACKDROPS.iter().any(|c| e.has_class(c)) && e.is_visible())
        .map(|backdrop| Dismissal {
            kind: DismissalKind::Backdrop,
            target: backdrop.locator(),
        })
}
