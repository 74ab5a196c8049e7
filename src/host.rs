//! Host page abstraction.
//!
//! The engine never talks to a real DOM directly; it operates on a
//! [`HostDocument`] that can resolve selectors to content containers and a
//! [`ContentContainer`] that exposes the state the view machine snapshots
//! and mutates. `MemoryDocument` is the in-memory implementation the test
//! suites drive.

use std::collections::HashMap;

use crate::error::PreviewError;

/// Identifier of a container within a document.
pub type NodeId = usize;

/// Selectors probed for the raw file content, most specific first.
pub const CONTAINER_SELECTORS: [&str; 4] = [
    "pre.file-content",
    ".file-preview pre",
    "pre",
    ".content",
];

/// One mutable content element on the host page.
pub trait ContentContainer {
    fn raw_html(&self) -> &str;
    fn raw_text(&self) -> &str;
    fn tag_name(&self) -> &str;
    fn css_class(&self) -> &str;
    /// Replaces the container's markup. May fail if the host page rejects
    /// the mutation.
    fn set_html(&mut self, html: &str) -> Result<(), PreviewError>;
    fn set_css_class(&mut self, class: &str) -> Result<(), PreviewError>;
}

/// The page the engine operates on.
pub trait HostDocument {
    /// Resolves a selector to a container id, or None when nothing matches.
    fn query(&self, selector: &str) -> Option<NodeId>;
    /// The plain-text leaf with the most text, used as a last-resort
    /// container when no selector matches.
    fn largest_text_leaf(&self) -> Option<NodeId>;
    fn container(&mut self, id: NodeId) -> Option<&mut dyn ContentContainer>;
}

/// Probes [`CONTAINER_SELECTORS`] in order, falling back to the largest
/// plain-text leaf. Returns None rather than an error when the page has no
/// usable container; callers treat that as "cannot operate here".
pub fn find_content_container(doc: &dyn HostDocument) -> Option<NodeId> {
    for selector in CONTAINER_SELECTORS {
        if let Some(id) = doc.query(selector) {
            return Some(id);
        }
    }
    doc.largest_text_leaf()
}

/// In-memory container used by tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryContainer {
    tag_name: String,
    css_class: String,
    html: String,
    text: String,
}

impl MemoryContainer {
    pub fn new(tag_name: &str, css_class: &str, text: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            css_class: css_class.to_string(),
            html: text.to_string(),
            text: text.to_string(),
        }
    }
}

impl ContentContainer for MemoryContainer {
    fn raw_html(&self) -> &str {
        &self.html
    }

    fn raw_text(&self) -> &str {
        &self.text
    }

    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn css_class(&self) -> &str {
        &self.css_class
    }

    fn set_html(&mut self, html: &str) -> Result<(), PreviewError> {
        self.html = html.to_string();
        self.text = strip_tags(html);
        Ok(())
    }

    fn set_css_class(&mut self, class: &str) -> Result<(), PreviewError> {
        self.css_class = class.to_string();
        Ok(())
    }
}

/// In-memory document: containers registered under selectors.
#[derive(Default)]
pub struct MemoryDocument {
    nodes: Vec<MemoryContainer>,
    selectors: HashMap<String, NodeId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a container under `selector`, returning its id.
    pub fn insert(&mut self, selector: &str, container: MemoryContainer) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(container);
        self.selectors.insert(selector.to_string(), id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryContainer> {
        self.nodes.get(id)
    }
}

impl HostDocument for MemoryDocument {
    fn query(&self, selector: &str) -> Option<NodeId> {
        self.selectors.get(selector).copied()
    }

    fn largest_text_leaf(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.text.trim().is_empty())
            .max_by_key(|(_, node)| node.text.len())
            .map(|(id, _)| id)
    }

    fn container(&mut self, id: NodeId) -> Option<&mut dyn ContentContainer> {
        self.nodes
            .get_mut(id)
            .map(|node| node as &mut dyn ContentContainer)
    }
}

/// Derives plain text from markup by dropping tags. Good enough for the
/// in-memory document; a real host page supplies its own text content.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            other if !in_tag => text.push(other),
            _ => {}
        }
    }
    text
}
