//! Convert the chapter Node tree to Markdown AST
//!
//! Block-level elements become [`Block`]s; runs of text and inline elements
//! between them are grouped into paragraphs. Pre-rendered Markdown nodes are
//! passed through as `Raw` blocks or inlines.

use chapterdown_core::{inlines_are_blank, serialize, Block, Inline, ListItem, Options};

use crate::node::{Node, NodeType};
use crate::utilities::{clean_attribute, collapse_whitespace, escape_markdown, is_block};

/// Convert a node (and its subtree) to a Markdown AST Block
pub fn convert(node: &Node) -> Block {
    Block::Document(convert_blocks(std::iter::once(node)))
}

/// Convert a node and serialize it straight to Markdown text
pub fn render_markdown(node: &Node, options: &Options) -> String {
    serialize(&convert(node), options)
}

/// Convert a sequence of sibling nodes to blocks
fn convert_blocks<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut run: Vec<Inline> = Vec::new();

    for node in nodes {
        match node.node_type {
            NodeType::Text => push_text(node, &mut run),
            NodeType::MarkdownInline => run.push(Inline::Raw(markdown_of(node))),
            NodeType::MarkdownBlock => {
                flush_run(&mut run, &mut blocks);
                blocks.push(Block::Raw(markdown_of(node)));
            }
            NodeType::Document => {
                flush_run(&mut run, &mut blocks);
                blocks.extend(convert_blocks(node.children()));
            }
            NodeType::Element if is_block(node.tag_name()) => {
                flush_run(&mut run, &mut blocks);
                if let Some(block) = convert_block(node) {
                    blocks.push(block);
                }
            }
            NodeType::Element => convert_inline_element(node, &mut run),
        }
    }

    flush_run(&mut run, &mut blocks);
    blocks
}

/// Close the pending inline run as a paragraph
fn flush_run(run: &mut Vec<Inline>, blocks: &mut Vec<Block>) {
    let inlines = std::mem::take(run);
    if !inlines_are_blank(&inlines) {
        blocks.push(Block::Paragraph(inlines));
    }
}

/// Convert a block-level element node to a Block
fn convert_block(node: &Node) -> Option<Block> {
    let tag = node.tag_name();

    match tag {
        "p" => {
            let inlines = collect_inlines(node);
            (!inlines_are_blank(&inlines)).then_some(Block::Paragraph(inlines))
        }

        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = tag[1..].parse().ok()?;
            let content = collect_inlines(node);
            (!inlines_are_blank(&content)).then_some(Block::Heading { level, content })
        }

        "blockquote" => {
            let blocks = convert_blocks(node.children());
            (!blocks.is_empty()).then_some(Block::BlockQuote(blocks))
        }

        "ul" | "ol" => {
            let start = node
                .attr("start")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1);
            let items = collect_list_items(node);
            (!items.is_empty()).then_some(Block::List {
                ordered: tag == "ol",
                start,
                items,
            })
        }

        "pre" => Some(Block::CodeBlock {
            language: code_language(node),
            code: node.text_content(),
        }),

        "hr" => Some(Block::ThematicBreak),

        "table" => convert_table(node),

        // Containers: body, div, section, aside, li outside a list, ...
        _ => {
            let mut blocks = convert_blocks(node.children());
            match blocks.len() {
                0 => None,
                1 => blocks.pop(),
                _ => Some(Block::Document(blocks)),
            }
        }
    }
}

/// Language of a `<pre>` block from a `language-*` class on it or its `<code>`
fn code_language(pre: &Node) -> Option<String> {
    let from_class = |node: &Node| {
        node.attr("class").and_then(|c| {
            c.split_whitespace()
                .find_map(|s| s.strip_prefix("language-"))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };

    pre.element_children()
        .filter(|c| c.is_tag("code"))
        .find_map(from_class)
        .or_else(|| from_class(pre))
}

/// Collect list items from ul/ol
fn collect_list_items(node: &Node) -> Vec<ListItem> {
    node.element_children()
        .filter(|c| c.is_tag("li"))
        .map(|li| ListItem::new(convert_blocks(li.children())))
        .collect()
}

/// Convert a table element
fn convert_table(node: &Node) -> Option<Block> {
    let mut headers: Vec<Vec<Inline>> = Vec::new();
    let mut rows: Vec<Vec<Vec<Inline>>> = Vec::new();

    let mut add_row = |tr: &Node, in_head: bool| {
        let mut row = Vec::new();
        let mut is_header = in_head;

        for cell in tr.element_children() {
            if cell.is_tag("th") {
                is_header = true;
                row.push(collect_inlines(cell));
            } else if cell.is_tag("td") {
                row.push(collect_inlines(cell));
            }
        }

        if row.is_empty() {
            return;
        }
        if is_header && headers.is_empty() {
            headers = row;
        } else {
            rows.push(row);
        }
    };

    for child in node.element_children() {
        match child.tag_name() {
            "thead" | "tbody" | "tfoot" => {
                let in_head = child.is_tag("thead");
                for tr in child.element_children().filter(|c| c.is_tag("tr")) {
                    add_row(tr, in_head);
                }
            }
            "tr" => add_row(child, false),
            _ => {}
        }
    }

    if headers.is_empty() && rows.is_empty() {
        return None;
    }

    // If no headers, use first row as headers
    if headers.is_empty() {
        headers = rows.remove(0);
    }

    Some(Block::Table { headers, rows })
}

/// Collect inline content from a node's children
fn collect_inlines(node: &Node) -> Vec<Inline> {
    let mut inlines = Vec::new();

    for child in node.children() {
        match child.node_type {
            NodeType::Text => push_text(child, &mut inlines),
            NodeType::MarkdownInline | NodeType::MarkdownBlock => {
                inlines.push(Inline::Raw(markdown_of(child)))
            }
            NodeType::Element => convert_inline_element(child, &mut inlines),
            NodeType::Document => inlines.extend(collect_inlines(child)),
        }
    }

    inlines
}

/// Convert an inline element, appending its Markdown to `out`
fn convert_inline_element(node: &Node, out: &mut Vec<Inline>) {
    match node.tag_name() {
        "strong" | "b" => {
            let inner = collect_inlines(node);
            if !inlines_are_blank(&inner) {
                out.push(Inline::Strong(inner));
            }
        }

        "em" | "i" => {
            let inner = collect_inlines(node);
            if !inlines_are_blank(&inner) {
                out.push(Inline::Emphasis(inner));
            }
        }

        "code" | "kbd" | "samp" | "tt" => {
            let text = node.text_content();
            if !text.is_empty() {
                out.push(Inline::Code(text));
            }
        }

        "a" => {
            let content = collect_inlines(node);
            let title = clean_attribute(node.attr("title"));

            match clean_attribute(node.attr("href")) {
                Some(url) => out.push(Inline::Link {
                    content,
                    url,
                    title,
                }),
                // Anchors without a target are just their text
                None => out.extend(content),
            }
        }

        "img" => {
            if let Some(url) = clean_attribute(node.attr("src")) {
                out.push(Inline::Image {
                    alt: node.attr("alt").unwrap_or("").to_string(),
                    url,
                    title: clean_attribute(node.attr("title")),
                });
            }
        }

        "br" => out.push(Inline::LineBreak),

        // Never rendered
        "script" | "style" | "noscript" | "template" | "head" | "title" | "meta" | "link" => {}

        // span, sup, sub, small, and block elements nested in inline context
        _ => out.extend(collect_inlines(node)),
    }
}

fn push_text(node: &Node, out: &mut Vec<Inline>) {
    let collapsed = collapse_whitespace(node.node_value.as_deref().unwrap_or(""));
    if !collapsed.is_empty() {
        out.push(Inline::Text(escape_markdown(&collapsed)));
    }
}

fn markdown_of(node: &Node) -> String {
    node.node_value.clone().unwrap_or_default()
}
