//! Mutable DOM tree used by the chapter rewrite passes.
//!
//! The tree is built once per document by [`crate::html::parse_html`], edited in
//! place by the passes in [`crate::rewrite`], and lowered to the Markdown AST by
//! the converter. Rewrites that replace structure with finished Markdown insert
//! `Markdown*` nodes, which the converter emits verbatim.

use crate::filter::Filter;

/// Node kinds in the chapter tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node
    Element,
    /// Text node
    Text,
    /// Document root
    Document,
    /// Pre-rendered Markdown that stands on its own block
    MarkdownBlock,
    /// Pre-rendered Markdown that flows with surrounding text
    MarkdownInline,
}

/// A node of the chapter tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node kind
    pub node_type: NodeType,

    /// Lowercase tag name for elements, `#text`, `#document` or `#markdown` otherwise
    pub node_name: String,

    /// Text for text and Markdown nodes
    pub node_value: Option<String>,

    /// Attributes in source order (elements only)
    pub attributes: Vec<(String, String)>,

    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_lowercase(),
            node_value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        node.attributes = attrs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect();
        node
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self::leaf(NodeType::Text, "#text", content)
    }

    /// Create an empty document root
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            node_name: "#document".to_string(),
            node_value: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a block of finished Markdown
    pub fn markdown_block(markdown: &str) -> Self {
        Self::leaf(NodeType::MarkdownBlock, "#markdown", markdown)
    }

    /// Create an inline fragment of finished Markdown
    pub fn markdown_inline(markdown: &str) -> Self {
        Self::leaf(NodeType::MarkdownInline, "#markdown", markdown)
    }

    fn leaf(node_type: NodeType, name: &str, value: &str) -> Self {
        Self {
            node_type,
            node_name: name.to_string(),
            node_value: Some(value.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get the tag name (lowercase)
    pub fn tag_name(&self) -> &str {
        &self.node_name
    }

    /// Check if this is an element with the given tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name == tag
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_lowercase(), value.to_string())),
        }
    }

    /// Check whether the `class` attribute lists the given class token
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|token| token == class))
            .unwrap_or(false)
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::text(text)];
    }

    /// Get all text content from this node and descendants.
    ///
    /// Markdown nodes contribute their source, so text read after a rewrite
    /// sees the markers that replaced elements.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match &self.node_value {
            Some(value) => out.push_str(value),
            None => self.children.iter().for_each(|c| c.push_text(out)),
        }
    }

    /// Find the first descendant (document order, excluding `self`) matching the filter
    pub fn find(&self, filter: &Filter) -> Option<&Node> {
        for child in &self.children {
            if filter.matches(child) {
                return Some(child);
            }
            if let Some(found) = child.find(filter) {
                return Some(found);
            }
        }
        None
    }

    /// Collect every descendant matching the filter, in document order
    pub fn find_all<'a>(&'a self, filter: &Filter) -> Vec<&'a Node> {
        let mut found = Vec::new();
        self.collect_matching(filter, &mut found);
        found
    }

    fn collect_matching<'a>(&'a self, filter: &Filter, found: &mut Vec<&'a Node>) {
        for child in &self.children {
            if filter.matches(child) {
                found.push(child);
            }
            child.collect_matching(filter, found);
        }
    }

    /// Detach and return the first descendant matching the filter
    pub fn remove_first(&mut self, filter: &Filter) -> Option<Node> {
        for i in 0..self.children.len() {
            if filter.matches(&self.children[i]) {
                return Some(self.children.remove(i));
            }
            if let Some(removed) = self.children[i].remove_first(filter) {
                return Some(removed);
            }
        }
        None
    }

    /// Remove every descendant matching the filter; returns how many were removed
    pub fn remove_all(&mut self, filter: &Filter) -> usize {
        let before = self.children.len();
        self.children.retain(|c| !filter.matches(c));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_all(filter);
        }
        removed
    }

    /// Offer every descendant matching the filter to `replace`, in document order.
    ///
    /// A returned node takes the matched node's place and is not visited again;
    /// `None` leaves the match in the tree and the walk continues inside it.
    pub fn replace_matching<F>(&mut self, filter: &Filter, mut replace: F) -> usize
    where
        F: FnMut(&Node) -> Option<Node>,
    {
        self.replace_matching_with(filter, &mut replace)
    }

    fn replace_matching_with(
        &mut self,
        filter: &Filter,
        replace: &mut dyn FnMut(&Node) -> Option<Node>,
    ) -> usize {
        let mut replaced = 0;
        for child in &mut self.children {
            if filter.matches(child) {
                if let Some(replacement) = replace(child) {
                    *child = replacement;
                    replaced += 1;
                    continue;
                }
            }
            replaced += child.replace_matching_with(filter, replace);
        }
        replaced
    }

    /// Visit every descendant element mutably, in document order
    pub fn for_each_element_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut Node),
    {
        self.for_each_element_mut_with(&mut visit);
    }

    fn for_each_element_mut_with(&mut self, visit: &mut dyn FnMut(&mut Node)) {
        for child in &mut self.children {
            if child.is_element() {
                visit(child);
            }
            child.for_each_element_mut_with(visit);
        }
    }
}
