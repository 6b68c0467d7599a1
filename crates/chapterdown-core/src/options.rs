//! Configuration options for Markdown serialization
//!
//! Headings are always ATX (`#`) and code blocks always fenced.

/// Options for Markdown serialization
#[derive(Debug, Clone)]
pub struct Options {
    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Fence string for code blocks; code is never hard-wrapped
    pub fence: String,

    /// Info string for fenced code blocks without an explicit language
    pub default_code_language: Option<String>,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            hr: "---".to_string(),
            bullet_list_marker: '-',
            fence: "```".to_string(),
            default_code_language: Some("cpp".to_string()),
            em_delimiter: '*',
            strong_delimiter: "**".to_string(),
        }
    }
}
