//! Markdown AST serialization
//!
//! Converts Markdown AST nodes into Markdown text.

use crate::ast::{Block, Inline, ListItem};
use crate::options::Options;

/// Serialize a block to Markdown string
pub fn serialize(block: &Block, options: &Options) -> String {
    let mut output = String::with_capacity(4096);
    serialize_block(block, options, &mut output);

    // Post-process: collapse blank lines outside code and trim
    collapse_and_trim(&mut output, &options.fence);
    output
}

fn serialize_block(block: &Block, options: &Options, out: &mut String) {
    match block {
        Block::Document(blocks) => serialize_blocks(blocks, options, out),

        Block::Heading { level, content } => serialize_heading(*level, content, options, out),

        Block::Paragraph(inlines) => {
            let start_len = out.len();
            serialize_inlines(inlines, options, out);
            let text = out[start_len..].trim().to_string();
            out.truncate(start_len);
            if !text.is_empty() {
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }

        Block::BlockQuote(blocks) => {
            let start_len = out.len();
            serialize_blocks(blocks, options, out);

            // Process the content we just wrote to add > prefixes
            let content = out[start_len..].trim_end().to_string();
            out.truncate(start_len);

            for (i, line) in content.lines().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push('>');
                if !line.is_empty() {
                    out.push(' ');
                    out.push_str(line);
                }
            }
            out.push_str("\n\n");
        }

        Block::List {
            ordered,
            start,
            items,
        } => serialize_list(*ordered, *start, items, options, out),

        Block::CodeBlock { language, code } => {
            serialize_code_block(language.as_deref(), code, options, out)
        }

        Block::ThematicBreak => {
            out.push_str(&options.hr);
            out.push_str("\n\n");
        }

        Block::Table { headers, rows } => serialize_table(headers, rows, options, out),

        Block::Raw(markdown) => {
            out.push_str(markdown.trim_matches('\n'));
            out.push_str("\n\n");
        }
    }
}

fn serialize_blocks(blocks: &[Block], options: &Options, out: &mut String) {
    for block in blocks {
        if !block.is_blank() {
            serialize_block(block, options, out);
        }
    }
}

fn serialize_heading(level: u8, content: &[Inline], options: &Options, out: &mut String) {
    let mut text = String::new();
    serialize_inlines(content, options, &mut text);
    let text = text.trim();

    if text.is_empty() {
        return;
    }

    for _ in 0..level {
        out.push('#');
    }
    out.push(' ');
    out.push_str(text);
    out.push_str("\n\n");
}

fn serialize_list(
    ordered: bool,
    start: u32,
    items: &[ListItem],
    options: &Options,
    out: &mut String,
) {
    for (i, item) in items.iter().enumerate() {
        let prefix = if ordered {
            format!("{}. ", start + i as u32)
        } else {
            format!("{} ", options.bullet_list_marker)
        };

        serialize_list_item(item, &prefix, options, out);
    }

    out.push('\n');
}

fn serialize_list_item(item: &ListItem, prefix: &str, options: &Options, out: &mut String) {
    let mut content = String::new();

    for (i, block) in item.content.iter().filter(|b| !b.is_blank()).enumerate() {
        let mut rendered = String::new();
        serialize_block(block, options, &mut rendered);
        let rendered = rendered.trim_matches('\n');

        if i > 0 {
            // Nested lists hug the paragraph they belong to
            if matches!(block, Block::List { .. }) {
                content.push('\n');
            } else {
                content.push_str("\n\n");
            }
        }
        content.push_str(rendered);
    }

    // Indent continuation lines
    let continuation_indent = " ".repeat(prefix.chars().count());

    out.push_str(prefix);
    for (i, line) in content.lines().enumerate() {
        if i > 0 && !line.is_empty() {
            out.push_str(&continuation_indent);
        }
        out.push_str(line);
        out.push('\n');
    }
    if content.is_empty() {
        out.push('\n');
    }
}

fn serialize_code_block(language: Option<&str>, code: &str, options: &Options, out: &mut String) {
    let code = code.trim_end_matches('\n');
    let language = language.or(options.default_code_language.as_deref());

    out.push_str(&options.fence);
    out.push_str(language.unwrap_or(""));
    out.push('\n');
    out.push_str(code);
    out.push('\n');
    out.push_str(&options.fence);
    out.push_str("\n\n");
}

fn serialize_table(
    headers: &[Vec<Inline>],
    rows: &[Vec<Vec<Inline>>],
    options: &Options,
    out: &mut String,
) {
    if headers.is_empty() {
        return;
    }

    let render_cell = |cell: &Vec<Inline>| {
        let mut text = String::new();
        serialize_inlines(cell, options, &mut text);
        text.trim().replace('\n', " ").replace('|', "\\|")
    };

    let header_cells: Vec<String> = headers.iter().map(render_cell).collect();
    let row_cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(render_cell).collect())
        .collect();

    // Calculate column widths, minimum width of 3 for separator
    let mut widths: Vec<usize> = header_cells.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &row_cells {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    push_table_row(&header_cells, &widths, out);

    // Separator row
    out.push('|');
    for &width in &widths {
        out.push(' ');
        for _ in 0..width {
            out.push('-');
        }
        out.push_str(" |");
    }
    out.push('\n');

    for row in &row_cells {
        push_table_row(row, &widths, out);
    }

    out.push('\n');
}

fn push_table_row(cells: &[String], widths: &[usize], out: &mut String) {
    out.push('|');
    for (i, cell) in cells.iter().enumerate() {
        out.push(' ');
        out.push_str(cell);
        let width = widths.get(i).copied().unwrap_or(3);
        for _ in cell.chars().count()..width {
            out.push(' ');
        }
        out.push_str(" |");
    }
    out.push('\n');
}

fn serialize_inlines(inlines: &[Inline], options: &Options, out: &mut String) {
    for inline in inlines {
        serialize_inline(inline, options, out);
    }
}

fn serialize_inline(inline: &Inline, options: &Options, out: &mut String) {
    match inline {
        Inline::Text(text) => out.push_str(text),

        Inline::Strong(content) => {
            let delimiter = options.strong_delimiter.clone();
            wrap_inlines(content, &delimiter, options, out);
        }

        Inline::Emphasis(content) => {
            let delimiter = options.em_delimiter.to_string();
            wrap_inlines(content, &delimiter, options, out);
        }

        Inline::Code(code) => {
            if !code.is_empty() {
                let backticks = "`".repeat(longest_backtick_run(code) + 1);
                let space = if code.starts_with('`') || code.ends_with('`') {
                    " "
                } else {
                    ""
                };
                out.push_str(&backticks);
                out.push_str(space);
                out.push_str(code);
                out.push_str(space);
                out.push_str(&backticks);
            }
        }

        Inline::Link {
            content,
            url,
            title,
        } => {
            out.push('[');
            serialize_inlines(content, options, out);
            out.push_str("](");
            out.push_str(url);
            if let Some(t) = title {
                out.push_str(" \"");
                out.push_str(t);
                out.push('"');
            }
            out.push(')');
        }

        Inline::Image { alt, url, title } => {
            out.push_str("![");
            out.push_str(alt);
            out.push_str("](");
            out.push_str(url);
            if let Some(t) = title {
                out.push_str(" \"");
                out.push_str(t);
                out.push('"');
            }
            out.push(')');
        }

        Inline::LineBreak => out.push_str("  \n"),

        Inline::Raw(markdown) => out.push_str(markdown),
    }
}

fn longest_backtick_run(code: &str) -> usize {
    code.split(|c: char| c != '`').map(str::len).max().unwrap_or(0)
}

/// Wrap serialized inlines in a delimiter, keeping surrounding whitespace outside it
fn wrap_inlines(content: &[Inline], delimiter: &str, options: &Options, out: &mut String) {
    let mut inner = String::new();
    serialize_inlines(content, options, &mut inner);
    if inner.trim().is_empty() {
        return;
    }

    let trimmed = inner.trim();
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];

    out.push_str(leading);
    out.push_str(delimiter);
    out.push_str(trimmed);
    out.push_str(delimiter);
    out.push_str(trailing);
}

/// Check whether a serialized line opens or closes a fenced code block.
///
/// Indentation and a leading list marker are skipped, so fences inside list
/// items are recognized. Text after the fence must not contain a backtick,
/// which keeps inline code spans at the start of a line from matching.
pub fn is_code_fence(line: &str, fence: &str) -> bool {
    if fence.is_empty() {
        return false;
    }
    let line = strip_list_marker(line.trim_start());
    line.strip_prefix(fence)
        .is_some_and(|info| !info.contains('`'))
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line
        .strip_prefix(&['-', '*', '+'][..])
        .and_then(|rest| rest.strip_prefix(' '))
    {
        return rest.trim_start();
    }
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    match line[digits..].strip_prefix(". ") {
        Some(rest) if digits > 0 => rest.trim_start(),
        _ => line,
    }
}

/// Allow at most one blank line between lines, except inside fenced code
fn collapse_and_trim(s: &mut String, fence: &str) {
    let mut lines: Vec<&str> = Vec::new();
    let mut in_fence = false;
    let mut previous_blank = false;

    for line in s.trim_matches('\n').split('\n') {
        let is_fence = is_code_fence(line, fence);
        let blank = line.is_empty() && !in_fence;

        if !(blank && previous_blank) {
            lines.push(line);
        }
        previous_blank = blank;
        if is_fence {
            in_fence = !in_fence;
        }
    }

    *s = lines.join("\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_options() -> Options {
        Options::default()
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn test_paragraph() {
        let block = Block::Paragraph(vec![text("Hello World")]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "Hello World");
    }

    #[test]
    fn test_heading_atx() {
        let block = Block::Heading {
            level: 3,
            content: vec![text("Section")],
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "### Section");
    }

    #[test]
    fn test_strong_and_emphasis() {
        let block = Block::Paragraph(vec![
            Inline::Strong(vec![text("bold")]),
            text(" and "),
            Inline::Emphasis(vec![text("italic")]),
        ]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "**bold** and *italic*");
    }

    #[test]
    fn test_emphasis_keeps_spaces_outside_delimiters() {
        let block = Block::Paragraph(vec![
            text("a"),
            Inline::Emphasis(vec![text(" word ")]),
            text("b"),
        ]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "a *word* b");
    }

    #[test]
    fn test_inline_code() {
        let block = Block::Paragraph(vec![Inline::Code("my_var".to_string())]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "`my_var`");
    }

    #[test]
    fn test_inline_code_with_backtick() {
        let block = Block::Paragraph(vec![Inline::Code("`x`".to_string())]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "`` `x` ``");
    }

    #[test]
    fn test_link_with_title() {
        let block = Block::Paragraph(vec![Inline::Link {
            content: vec![text("Next")],
            url: "../chapter2".to_string(),
            title: Some("Chapter 2".to_string()),
        }]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "[Next](../chapter2 \"Chapter 2\")");
    }

    #[test]
    fn test_code_block_default_language() {
        let block = Block::CodeBlock {
            language: None,
            code: "int x = 1;\n".to_string(),
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "```cpp\nint x = 1;\n```");
    }

    #[test]
    fn test_code_block_explicit_language() {
        let block = Block::CodeBlock {
            language: Some("rust".to_string()),
            code: "let x = 1;".to_string(),
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "```rust\nlet x = 1;\n```");
    }

    #[test]
    fn test_code_block_is_not_wrapped() {
        let long_line = "x".repeat(200);
        let block = Block::CodeBlock {
            language: None,
            code: long_line.clone(),
        };
        let result = serialize(&block, &default_options());
        assert!(result.lines().any(|l| l == long_line));
    }

    #[test]
    fn test_blockquote() {
        let block = Block::BlockQuote(vec![Block::Paragraph(vec![text("Quote")])]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "> Quote");
    }

    #[test]
    fn test_unordered_list() {
        let block = Block::List {
            ordered: false,
            start: 1,
            items: vec![
                ListItem::from_inlines(vec![text("One")]),
                ListItem::from_inlines(vec![text("Two")]),
            ],
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "- One\n- Two");
    }

    #[test]
    fn test_ordered_list_start() {
        let block = Block::List {
            ordered: true,
            start: 3,
            items: vec![
                ListItem::from_inlines(vec![text("Third")]),
                ListItem::from_inlines(vec![text("Fourth")]),
            ],
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "3. Third\n4. Fourth");
    }

    #[test]
    fn test_nested_list() {
        let inner = Block::List {
            ordered: false,
            start: 1,
            items: vec![ListItem::from_inlines(vec![text("Inner")])],
        };
        let block = Block::List {
            ordered: false,
            start: 1,
            items: vec![ListItem::new(vec![
                Block::Paragraph(vec![text("Outer")]),
                inner,
            ])],
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "- Outer\n  - Inner");
    }

    #[test]
    fn test_thematic_break() {
        let result = serialize(&Block::ThematicBreak, &default_options());
        assert_eq!(result, "---");
    }

    #[test]
    fn test_raw_block_is_verbatim() {
        let block = Block::Document(vec![
            Block::Paragraph(vec![text("Before")]),
            Block::Raw("[^1]: First note\n[^2]: Second note\n".to_string()),
            Block::Paragraph(vec![text("After")]),
        ]);
        let result = serialize(&block, &default_options());
        assert_eq!(
            result,
            "Before\n\n[^1]: First note\n[^2]: Second note\n\nAfter"
        );
    }

    #[test]
    fn test_table() {
        let block = Block::Table {
            headers: vec![vec![text("A")], vec![text("B")]],
            rows: vec![vec![vec![text("1")], vec![text("2")]]],
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "| A   | B   |\n| --- | --- |\n| 1   | 2   |");
    }

    #[test]
    fn test_collapse_newlines() {
        let block = Block::Document(vec![
            Block::Raw("one\n\n\n\n".to_string()),
            Block::Paragraph(vec![text("two")]),
        ]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "one\n\ntwo");
    }

    #[test]
    fn test_code_block_keeps_blank_lines() {
        let block = Block::Document(vec![
            Block::Paragraph(vec![text("Before")]),
            Block::CodeBlock {
                language: None,
                code: "int a;\n\n\n\nint b;".to_string(),
            },
            Block::Paragraph(vec![text("After")]),
        ]);
        let result = serialize(&block, &default_options());
        assert_eq!(
            result,
            "Before\n\n```cpp\nint a;\n\n\n\nint b;\n```\n\nAfter"
        );
    }

    #[test]
    fn test_code_block_in_list_keeps_blank_lines() {
        let block = Block::List {
            ordered: false,
            start: 1,
            items: vec![ListItem::new(vec![Block::CodeBlock {
                language: None,
                code: "a\n\n\nb".to_string(),
            }])],
        };
        let result = serialize(&block, &default_options());
        assert_eq!(result, "- ```cpp\n  a\n\n\n  b\n  ```");
    }

    #[test]
    fn test_is_code_fence() {
        assert!(is_code_fence("```cpp", "```"));
        assert!(is_code_fence("  ```", "```"));
        assert!(is_code_fence("- ```cpp", "```"));
        assert!(is_code_fence("12. ```", "```"));
        assert!(!is_code_fence("```a``b```", "```"));
        assert!(!is_code_fence("text ```", "```"));
    }

    #[test]
    fn test_inline_code_fence_outgrows_content() {
        let block = Block::Paragraph(vec![Inline::Code("a``b".to_string())]);
        let result = serialize(&block, &default_options());
        assert_eq!(result, "```a``b```");
    }
}
