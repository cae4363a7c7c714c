//! Compound matchers and descendant selector chains.

use std::fmt;

use crate::element::ElementRef;

/// Attribute test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrOp {
    /// `[name]`
    Present,
    /// `[name="v"]`
    Equals(String),
    /// `[name*="v"]`
    Contains(String),
    /// `[name^="v"]`
    StartsWith(String),
}

impl AttrOp {
    fn test(&self, value: &str) -> bool {
        match self {
            AttrOp::Present => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Contains(v) => value.contains(v.as_str()),
            AttrOp::StartsWith(v) => value.starts_with(v.as_str()),
        }
    }
}

/// One compound selector: every configured condition must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matcher {
    tags: Vec<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, AttrOp)>,
    /// Lowercased needles, any of which may appear in the text content.
    text_needles: Vec<String>,
    visible_only: bool,
}

impl Matcher {
    /// Matches every element.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self::any().with_tag(tag)
    }

    /// Matches any of the given tags.
    pub fn tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut matcher = Self::any();
        for tag in tags {
            matcher = matcher.with_tag(tag);
        }
        matcher
    }

    pub fn id(id: &str) -> Self {
        Self::any().with_id(id)
    }

    pub fn class(class: &str) -> Self {
        Self::any().with_class(class)
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_ascii_lowercase());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr_present(self, name: &str) -> Self {
        self.attr(name, AttrOp::Present)
    }

    pub fn attr_eq(self, name: &str, value: &str) -> Self {
        self.attr(name, AttrOp::Equals(value.to_string()))
    }

    pub fn attr_contains(self, name: &str, value: &str) -> Self {
        self.attr(name, AttrOp::Contains(value.to_string()))
    }

    pub fn attr_starts_with(self, name: &str, value: &str) -> Self {
        self.attr(name, AttrOp::StartsWith(value.to_string()))
    }

    pub fn attr(mut self, name: &str, op: AttrOp) -> Self {
        self.attributes.push((name.to_string(), op));
        self
    }

    /// Case-insensitive text-content containment. Repeated calls widen the
    /// set of accepted needles.
    pub fn text_contains(mut self, needle: &str) -> Self {
        self.text_needles.push(needle.to_lowercase());
        self
    }

    /// Only rendered elements match.
    pub fn visible(mut self) -> Self {
        self.visible_only = true;
        self
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|t| t == element.tag()) {
            return false;
        }
        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        let attributes_hold = self
            .attributes
            .iter()
            .all(|(name, op)| element.attr(name).is_some_and(|v| op.test(v)));
        if !attributes_hold {
            return false;
        }
        if !self.text_needles.is_empty() {
            let text = element.text_content().to_lowercase();
            if !self.text_needles.iter().any(|n| text.contains(n.as_str())) {
                return false;
            }
        }
        !self.visible_only || element.is_visible()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tags.as_slice() {
            [] => {}
            [tag] => write!(f, "{tag}")?,
            tags => write!(f, ":is({})", tags.join(","))?,
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for (name, op) in &self.attributes {
            match op {
                AttrOp::Present => write!(f, "[{name}]")?,
                AttrOp::Equals(v) => write!(f, "[{name}=\"{v}\"]")?,
                AttrOp::Contains(v) => write!(f, "[{name}*=\"{v}\"]")?,
                AttrOp::StartsWith(v) => write!(f, "[{name}^=\"{v}\"]")?,
            }
        }
        if !self.text_needles.is_empty() {
            write!(f, ":contains({})", self.text_needles.join("|"))?;
        }
        if self.tags.is_empty()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.text_needles.is_empty()
        {
            write!(f, "*")?;
        }
        if self.visible_only {
            write!(f, ":visible")?;
        }
        Ok(())
    }
}

/// Chain of matchers joined by descendant combinators. The last matcher is
/// the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    chain: Vec<Matcher>,
}

impl Selector {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            chain: vec![matcher],
        }
    }

    /// Narrow to descendants matching `matcher`.
    pub fn descendant(mut self, matcher: Matcher) -> Self {
        self.chain.push(matcher);
        self
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        let Some((subject, scopes)) = self.chain.split_last() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }

        let mut pending = scopes.iter().rev().peekable();
        for ancestor in element.ancestors() {
            match pending.peek() {
                None => break,
                Some(scope) if scope.matches(&ancestor) => {
                    pending.next();
                }
                Some(_) => {}
            }
        }
        pending.peek().is_none()
    }
}

impl From<Matcher> for Selector {
    fn from(matcher: Matcher) -> Self {
        Self::new(matcher)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, matcher) in self.chain.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}
