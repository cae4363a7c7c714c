//! # Stagehand DOM
//!
//! A serializable snapshot of a host page's DOM and the query helpers the
//! page probes are built from.
//!
//! The hosting shell captures the page as a [`DomNode`] tree. [`Document`]
//! flattens it into an arena in document order so probes can walk parents,
//! children and descendants cheaply. Queries are expressed as [`Matcher`]s
//! (one compound selector) chained into [`Selector`]s (descendant
//! combinators).
//!
//! Visibility follows the browser's `offsetParent` rule: an element is
//! visible only when it and every ancestor are rendered.

mod document;
mod element;
mod error;
mod node;
mod selector;

pub use document::{Document, NodeId};
pub use element::{ElementLocator, ElementRef};
pub use error::DomError;
pub use node::DomNode;
pub use selector::{AttrOp, Matcher, Selector};

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
