//! ChapterService - the main entry point for XHTML chapter to Markdown conversion.

use std::fs;
use std::path::Path;

use chapterdown_core::is_code_fence;

use crate::convert::render_markdown;
use crate::filter::Filter;
use crate::html::parse_html;
use crate::rewrite::{Context, Pipeline};
use crate::{ConversionError, Result};

// Re-export options from core
pub use chapterdown_core::Options as MarkdownOptions;

/// Options for ChapterService
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Extension of input chapters, without the dot
    pub source_extension: String,

    /// Extension of written Markdown files, without the dot
    pub target_extension: String,

    /// Prepended to chapter links once the source extension is stripped
    pub link_prefix: String,

    /// `alt` text of images replaced by `special_image_tag`
    pub special_image_alt: String,

    /// Inline tag emitted in place of the marker image
    pub special_image_tag: String,

    /// Markdown serialization options
    pub markdown: MarkdownOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            source_extension: "xhtml".to_string(),
            target_extension: "md".to_string(),
            link_prefix: "../".to_string(),
            special_image_alt: "C++23".to_string(),
            special_image_tag: "<cpp23></cpp23>".to_string(),
            markdown: MarkdownOptions::default(),
        }
    }
}

/// A converted chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Title found in the source, if any
    pub title: Option<String>,
    /// Markdown body without front matter
    pub body: String,
}

impl Chapter {
    /// The `---`-delimited front matter block, present only when there is a title
    pub fn front_matter(&self) -> Option<String> {
        self.title
            .as_ref()
            .map(|title| format!("---\ntitle: \"{}\"\n---\n\n", title))
    }

    /// Full file contents: front matter, body, trailing newline
    pub fn to_markdown(&self) -> String {
        let mut out = self.front_matter().unwrap_or_default();
        out.push_str(&self.body);
        out.push('\n');
        out
    }
}

/// The main service for converting chapters to Markdown
pub struct ChapterService {
    options: ConvertOptions,
    pipeline: Pipeline,
}

impl ChapterService {
    /// Create a new ChapterService with default options
    pub fn new() -> Self {
        Self::with_options(ConvertOptions::default())
    }

    /// Create a ChapterService with custom options
    pub fn with_options(options: ConvertOptions) -> Self {
        Self {
            options,
            pipeline: Pipeline::chapter(),
        }
    }

    /// Get the current options
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ConvertOptions {
        &mut self.options
    }

    /// Get mutable access to the rewrite pipeline
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Convert one XHTML document
    pub fn convert(&self, html: &str) -> Chapter {
        let mut document = parse_html(html);

        let mut ctx = Context::new(&self.options);
        self.pipeline.run(&mut document, &mut ctx);

        let root = document.find(&Filter::tag("body")).unwrap_or(&document);
        let markdown = render_markdown(root, &self.options.markdown);

        Chapter {
            title: ctx.title,
            body: unescape_code_underscores(&markdown, &self.options.markdown.fence),
        }
    }

    /// Convert one XHTML document to the full output text
    pub fn convert_to_string(&self, html: &str) -> String {
        self.convert(html).to_markdown()
    }

    /// Read, convert and write one file. Nothing is written unless conversion succeeds.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<Chapter> {
        let bytes = fs::read(input).map_err(|source| ConversionError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        let html = String::from_utf8(bytes).map_err(|source| ConversionError::Encoding {
            path: input.to_path_buf(),
            source,
        })?;

        let chapter = self.convert(&html);

        fs::write(output, chapter.to_markdown()).map_err(|source| ConversionError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        Ok(chapter)
    }
}

impl Default for ChapterService {
    fn default() -> Self {
        Self::new()
    }
}

/// Undo underscore escaping inside inline code spans.
///
/// A span opens with a run of backticks and closes at the next run of the same
/// length. Fenced code blocks are copied unchanged.
pub fn unescape_code_underscores(markdown: &str, fence: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut prose = String::new();
    let mut in_fence = false;

    for line in markdown.split_inclusive('\n') {
        let is_fence = is_code_fence(line.trim_end_matches('\n'), fence);
        if in_fence || is_fence {
            out.push_str(&unescape_spans(&prose));
            prose.clear();
            out.push_str(line);
            if is_fence {
                in_fence = !in_fence;
            }
        } else {
            prose.push_str(line);
        }
    }

    out.push_str(&unescape_spans(&prose));
    out
}

fn unescape_spans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('`') {
        out.push_str(&rest[..start]);
        let (opener, after) = rest[start..].split_at(backtick_run(&rest[start..]));

        match closing_run(after, opener.len()) {
            Some(end) => {
                out.push_str(opener);
                out.push_str(&after[..end].replace("\\_", "_"));
                out.push_str(opener);
                rest = &after[end + opener.len()..];
            }
            None => {
                out.push_str(opener);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Length of the backtick run at the start of `text`
fn backtick_run(text: &str) -> usize {
    text.len() - text.trim_start_matches('`').len()
}

/// Offset of the first backtick run of exactly `len` in `text`
fn closing_run(text: &str, len: usize) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = text[offset..].find('`') {
        let start = offset + pos;
        let run = backtick_run(&text[start..]);
        if run == len {
            return Some(start);
        }
        offset = start + run;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<html xmlns=\"http://www.w3.org/1999/xhtml\"><head><title>Book</title></head><body>{}</body></html>",
            body
        )
    }

    #[test]
    fn test_no_title_no_front_matter() {
        let service = ChapterService::new();
        let result = service.convert_to_string(&page("<p>Hello World</p>"));
        assert_eq!(result, "Hello World\n");
    }

    #[test]
    fn test_front_matter() {
        let service = ChapterService::new();
        let result = service.convert_to_string(&page(
            r#"<h1><span class="chapterTitle">  Getting Started </span></h1><p>Body</p>"#,
        ));
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(&lines[..3], &["---", "title: \"Getting Started\"", "---"]);
        assert_eq!(result, "---\ntitle: \"Getting Started\"\n---\n\nBody\n");
    }

    #[test]
    fn test_head_is_not_rendered() {
        let service = ChapterService::new();
        let chapter = service.convert(&page("<p>Only body</p>"));
        assert_eq!(chapter.body, "Only body");
    }

    #[test]
    fn test_code_span_underscores() {
        assert_eq!(
            unescape_code_underscores(r"`my\_var` and some\_text and `a\_b\_c`", "```"),
            r"`my_var` and some\_text and `a_b_c`"
        );
    }

    #[test]
    fn test_code_span_pairs_equal_backtick_runs() {
        assert_eq!(
            unescape_code_underscores(r"``a`b\_c`` then \_emph\_ text and `c\_d`", "```"),
            r"``a`b_c`` then \_emph\_ text and `c_d`"
        );
    }

    #[test]
    fn test_unclosed_backtick_is_text() {
        assert_eq!(
            unescape_code_underscores(r"a ` stray and \_b\_", "```"),
            r"a ` stray and \_b\_"
        );
    }

    #[test]
    fn test_fenced_code_is_untouched() {
        let markdown = "```cpp\nauto s = \"`\";\nx\\_y\n```\n\n\\_kept\\_ and `a\\_b`";
        assert_eq!(
            unescape_code_underscores(markdown, "```"),
            "```cpp\nauto s = \"`\";\nx\\_y\n```\n\n\\_kept\\_ and `a_b`"
        );
    }

    #[test]
    fn test_code_span_with_backtick_keeps_prose_escaped() {
        let service = ChapterService::new();
        let chapter = service.convert(&page(
            "<p><code>a`b</code> then _emph_ text and <code>c</code></p>",
        ));
        assert_eq!(chapter.body, r"``a`b`` then \_emph\_ text and `c`");
    }

    #[test]
    fn test_code_block_blank_lines_survive() {
        let service = ChapterService::new();
        let chapter = service.convert(&page(
            "<p>Before</p><pre><code>int a;\n\n\n\nint b;</code></pre>",
        ));
        assert_eq!(chapter.body, "Before\n\n```cpp\nint a;\n\n\n\nint b;\n```");
    }

    #[test]
    fn test_inline_code_keeps_underscore() {
        let service = ChapterService::new();
        let chapter = service.convert(&page("<p>Set <code>my_var</code> first.</p>"));
        assert_eq!(chapter.body, "Set `my_var` first.");
    }

    #[test]
    fn test_headings_and_lists() {
        let service = ChapterService::new();
        let chapter = service.convert(&page(
            "<h1>Dropped</h1><h2>Section</h2><ul><li>One</li><li><em>Two</em></li></ul>",
        ));
        assert_eq!(chapter.body, "## Section\n\n- One\n- *Two*");
    }

    #[test]
    fn test_custom_options() {
        let mut options = ConvertOptions::default();
        options.markdown.default_code_language = Some("rust".to_string());
        let service = ChapterService::with_options(options);
        let chapter = service.convert(&page("<pre><code>fn main() {}</code></pre>"));
        assert_eq!(chapter.body, "```rust\nfn main() {}\n```");
    }
}
