//! Lookup tables and text helpers shared by the parser, rewrites and converter.

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "canvas", "center", "dd", "dir", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "menu", "nav", "noscript", "ol",
    "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Labels that turn a bold lead-in into a `:::label` admonition
pub const ADMONITION_LABELS: &[&str] = &[
    "note", "warning", "tip", "error", "caution", "important", "info",
];

/// `<span>` classes that carry the chapter title, highest priority first
pub const TITLE_CLASSES: &[&str] = &["appendixTitle", "chapterTitle", "title"];

/// Section class of boxed admonitions
pub const FEATURE_ADMONITION_CLASS: &str = "feature1";

/// Section class of titled callouts
pub const FEATURE_CALLOUT_CLASS: &str = "feature3";

/// Class of the ordered list holding footnote definitions
pub const NOTES_LIST_CLASS: &str = "notesList";

/// Class of a single footnote definition
pub const NOTE_ENTRY_CLASS: &str = "noteEntry";

/// Class of decorative divider `<div>`s inside callouts
pub const DIVIDER_CLASS: &str = "hr";

/// `role` of anchors pointing at a footnote
pub const NOTEREF_ROLE: &str = "doc-noteref";

/// `role` of anchors pointing back from a footnote
pub const BACKLINK_ROLE: &str = "doc-backlink";

/// Separates an admonition label from its body
pub const EM_SPACE: char = '\u{2003}';

/// Non-breaking space
pub const NBSP: char = '\u{a0}';

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Normalize a bold lead-in and return it if it names an admonition
pub fn admonition_label(lead: &str) -> Option<String> {
    let label = lead.trim().to_lowercase();
    ADMONITION_LABELS
        .contains(&label.as_str())
        .then_some(label)
}

/// Escape the characters the serializer would otherwise read as emphasis
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '*' | '_') {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Collapse runs of ASCII whitespace to a single space.
///
/// Non-breaking and em spaces are content in these books and survive.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_ascii_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
