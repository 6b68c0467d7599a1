//! XHTML parsing support.
//!
//! Chapters are XHTML, but they go through the error-tolerant HTML parser from
//! `scraper` so that any input yields a tree. The one XHTML construct the HTML
//! parser misreads, `<tag/>` on a non-void element, is expanded first.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;
use crate::utilities::is_void;

/// Matches `<name attrs/>` self-closing tags
static SELF_CLOSING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([A-Za-z][A-Za-z0-9:_.-]*)((?:\s+[^<>]*?)?)\s*/>"#).unwrap()
});

/// Parse an XHTML document into a Node tree rooted at a `#document` node.
///
/// Comments, doctypes and processing instructions are dropped.
///
/// # Example
///
/// ```rust
/// use chapterdown::parse_html;
///
/// let doc = parse_html("<html><body><p>Hello</p></body></html>");
/// assert_eq!(doc.text_content(), "Hello");
/// ```
pub fn parse_html(html: &str) -> Node {
    let html = expand_self_closing(html);
    let document = Html::parse_document(&html);

    let mut root = Node::document();
    root.add_child(scraper_to_node(document.root_element()));
    root
}

/// Rewrite `<span id="x"/>` as `<span id="x"></span>`; void elements are left alone
pub fn expand_self_closing(html: &str) -> String {
    SELF_CLOSING_RE
        .replace_all(html, |caps: &Captures| {
            let tag = &caps[1];
            if is_void(tag) {
                caps[0].to_string()
            } else {
                format!("<{}{}></{}>", tag, &caps[2], tag)
            }
        })
        .into_owned()
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef) -> Node {
    let tag = element.value().name();
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Node::element_with_attrs(tag, attrs);

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                node.add_child(Node::text(&text.text));
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
