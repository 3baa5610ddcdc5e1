//! Document access: the parts of the page the conferencing client mutates.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Document mutation failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Document unavailable: {0}")]
    Unavailable(String),
}

/// CSS `display` values the controller toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    None,
    Block,
}

/// Kind of a node in the document head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadTag {
    Style,
    Link,
}

/// A `<style>` or `<link>` node in the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadNode {
    pub tag: HeadTag,
    pub rel: Option<String>,
    pub href: Option<String>,
    /// Names of `data-*` attributes present on the node.
    pub data_attributes: Vec<String>,
}

impl HeadNode {
    /// A bare `<style>` node.
    #[must_use]
    pub fn style() -> Self {
        Self {
            tag: HeadTag::Style,
            rel: None,
            href: None,
            data_attributes: Vec::new(),
        }
    }

    /// A `<link rel=... href=...>` node.
    pub fn link(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            tag: HeadTag::Link,
            rel: Some(rel.into()),
            href: Some(href.into()),
            data_attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_data_attribute(mut self, name: impl Into<String>) -> Self {
        self.data_attributes.push(name.into());
        self
    }

    fn href_contains(&self, needle: &str) -> bool {
        self.href.as_deref().is_some_and(|href| href.contains(needle))
    }
}

/// Selects head nodes for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeMatcher {
    /// `style[data-*]` carrying the named attribute.
    StyleWithAttribute(String),
    /// Any `link` whose href contains the substring.
    LinkHrefContains(String),
    /// `link[rel="stylesheet"]` whose href contains the substring.
    StylesheetHrefContains(String),
}

impl NodeMatcher {
    /// Whether `node` is selected.
    #[must_use]
    pub fn matches(&self, node: &HeadNode) -> bool {
        match self {
            NodeMatcher::StyleWithAttribute(attribute) => {
                node.tag == HeadTag::Style && node.data_attributes.iter().any(|a| a == attribute)
            }
            NodeMatcher::LinkHrefContains(needle) => {
                node.tag == HeadTag::Link && node.href_contains(needle)
            }
            NodeMatcher::StylesheetHrefContains(needle) => {
                node.tag == HeadTag::Link
                    && node.rel.as_deref() == Some("stylesheet")
                    && node.href_contains(needle)
            }
        }
    }
}

/// The page document.
pub trait Document: Send + Sync {
    /// Set the `display` style of the element with `element_id`.
    ///
    /// # Errors
    ///
    /// `DocumentError::ElementNotFound` if no such element exists.
    fn set_display(&self, element_id: &str, display: Display) -> Result<(), DocumentError>;

    /// Remove every child of the element with `element_id`.
    ///
    /// # Errors
    ///
    /// `DocumentError::ElementNotFound` if no such element exists.
    fn clear_children(&self, element_id: &str) -> Result<(), DocumentError>;

    /// Remove every head node selected by `matcher`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// `DocumentError::Unavailable` if the document cannot be queried.
    fn remove_nodes(&self, matcher: &NodeMatcher) -> Result<usize, DocumentError>;

    /// Clear an inline style property on `<body>`.
    ///
    /// # Errors
    ///
    /// `DocumentError::Unavailable` if the body cannot be updated.
    fn reset_body_style(&self, property: &str) -> Result<(), DocumentError>;
}

#[derive(Debug, Clone)]
struct Element {
    display: Display,
    children: Vec<String>,
}

#[derive(Debug, Default)]
struct DocumentState {
    elements: HashMap<String, Element>,
    head: Vec<HeadNode>,
    body_style: HashMap<String, String>,
}

/// Document held in memory, for hosts without a real page and for tests.
#[derive(Debug, Default)]
pub struct InMemoryDocument {
    state: Mutex<DocumentState>,
}

impl InMemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document that already contains a hidden, empty element `id`.
    pub fn with_element(id: impl Into<String>) -> Self {
        let document = Self::new();
        document.insert_element(id);
        document
    }

    /// Add a hidden, empty element.
    pub fn insert_element(&self, id: impl Into<String>) {
        self.lock().elements.insert(
            id.into(),
            Element {
                display: Display::None,
                children: Vec::new(),
            },
        );
    }

    /// Append a child to an existing element. Returns `false` if it does not exist.
    pub fn append_child(&self, id: &str, child: impl Into<String>) -> bool {
        match self.lock().elements.get_mut(id) {
            Some(element) => {
                element.children.push(child.into());
                true
            }
            None => false,
        }
    }

    pub fn append_head(&self, node: HeadNode) {
        self.lock().head.push(node);
    }

    pub fn set_body_style(&self, property: impl Into<String>, value: impl Into<String>) {
        self.lock().body_style.insert(property.into(), value.into());
    }

    #[must_use]
    pub fn display(&self, id: &str) -> Option<Display> {
        self.lock().elements.get(id).map(|e| e.display)
    }

    #[must_use]
    pub fn children(&self, id: &str) -> Vec<String> {
        self.lock()
            .elements
            .get(id)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn head_nodes(&self) -> Vec<HeadNode> {
        self.lock().head.clone()
    }

    #[must_use]
    pub fn body_style(&self, property: &str) -> Option<String> {
        self.lock().body_style.get(property).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document for InMemoryDocument {
    fn set_display(&self, element_id: &str, display: Display) -> Result<(), DocumentError> {
        let mut state = self.lock();
        let element = state
            .elements
            .get_mut(element_id)
            .ok_or_else(|| DocumentError::ElementNotFound(element_id.to_string()))?;
        element.display = display;
        Ok(())
    }

    fn clear_children(&self, element_id: &str) -> Result<(), DocumentError> {
        let mut state = self.lock();
        let element = state
            .elements
            .get_mut(element_id)
            .ok_or_else(|| DocumentError::ElementNotFound(element_id.to_string()))?;
        element.children.clear();
        Ok(())
    }

    fn remove_nodes(&self, matcher: &NodeMatcher) -> Result<usize, DocumentError> {
        let mut state = self.lock();
        let before = state.head.len();
        state.head.retain(|node| !matcher.matches(node));
        Ok(before - state.head.len())
    }

    fn reset_body_style(&self, property: &str) -> Result<(), DocumentError> {
        self.lock().body_style.remove(property);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_matchers() {
        let marked_style = HeadNode::style().with_data_attribute("data-zoom");
        let plain_style = HeadNode::style();
        let zoom_icon = HeadNode::link("icon", "https://source.zoom.us/favicon.ico");
        let zoom_sheet = HeadNode::link("stylesheet", "https://source.zoom.us/css/react-select.css");
        let app_sheet = HeadNode::link("stylesheet", "/assets/index.css");

        let style = NodeMatcher::StyleWithAttribute("data-zoom".to_string());
        assert!(style.matches(&marked_style));
        assert!(!style.matches(&plain_style));

        let link = NodeMatcher::LinkHrefContains("zoom".to_string());
        assert!(link.matches(&zoom_icon));
        assert!(link.matches(&zoom_sheet));
        assert!(!link.matches(&app_sheet));

        let sheet = NodeMatcher::StylesheetHrefContains("zoom".to_string());
        assert!(!sheet.matches(&zoom_icon));
        assert!(sheet.matches(&zoom_sheet));
        assert!(!sheet.matches(&marked_style));
    }

    #[test]
    fn test_container_display_and_children() {
        let document = InMemoryDocument::with_element("root");
        assert!(document.append_child("root", "video"));
        assert!(!document.append_child("missing", "video"));

        document.set_display("root", Display::Block).unwrap();
        assert_eq!(document.display("root"), Some(Display::Block));

        document.clear_children("root").unwrap();
        assert!(document.children("root").is_empty());
    }

    #[test]
    fn test_missing_element_is_an_error() {
        let document = InMemoryDocument::new();

        assert_eq!(
            document.set_display("root", Display::None),
            Err(DocumentError::ElementNotFound("root".to_string()))
        );
        assert!(document.clear_children("root").is_err());
    }

    #[test]
    fn test_remove_nodes_counts_removed() {
        let document = InMemoryDocument::new();
        document.append_head(HeadNode::style().with_data_attribute("data-zoom"));
        document.append_head(HeadNode::style().with_data_attribute("data-zoom"));
        document.append_head(HeadNode::style());

        let removed = document
            .remove_nodes(&NodeMatcher::StyleWithAttribute("data-zoom".to_string()))
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(document.head_nodes(), vec![HeadNode::style()]);
    }

    #[test]
    fn test_reset_body_style() {
        let document = InMemoryDocument::new();
        document.set_body_style("overflow", "hidden");

        document.reset_body_style("overflow").unwrap();
        document.reset_body_style("margin").unwrap();

        assert_eq!(document.body_style("overflow"), None);
    }
}
