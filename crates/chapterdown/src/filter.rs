//! Element filters used to locate structures in the chapter tree.

use crate::node::Node;

/// Type alias for predicate filters
pub type PredicateFn = Box<dyn Fn(&Node) -> bool + Send + Sync>;

/// A filter determines which elements a lookup or rewrite applies to
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match a tag carrying a class token
    Class { tag: String, class: String },
    /// Match a tag whose attribute has an exact value
    Attr {
        tag: String,
        name: String,
        value: String,
    },
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter for `<tag class="... class ...">`
    pub fn class(tag: &str, class: &str) -> Self {
        Filter::Class {
            tag: tag.to_lowercase(),
            class: class.to_string(),
        }
    }

    /// Create a filter for `<tag name="value">`
    pub fn attr(tag: &str, name: &str, value: &str) -> Self {
        Filter::Attr {
            tag: tag.to_lowercase(),
            name: name.to_lowercase(),
            value: value.to_string(),
        }
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// Check if this filter matches a node; only elements ever match
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        match self {
            Filter::TagName(t) => node.is_tag(t),
            Filter::TagNames(tags) => tags.iter().any(|t| node.is_tag(t)),
            Filter::Class { tag, class } => node.is_tag(tag) && node.has_class(class),
            Filter::Attr { tag, name, value } => {
                node.is_tag(tag) && node.attr(name) == Some(value.as_str())
            }
            Filter::Predicate(f) => f(node),
        }
    }
}
