//! The chapter rewrites: links, title, footnotes, admonitions and cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Context;
use crate::convert::render_markdown;
use crate::filter::Filter;
use crate::node::Node;
use crate::utilities::{
    admonition_label, escape_markdown, BACKLINK_ROLE, DIVIDER_CLASS, EM_SPACE,
    FEATURE_ADMONITION_CLASS, FEATURE_CALLOUT_CLASS, NBSP, NOTEREF_ROLE, NOTES_LIST_CLASS,
    NOTE_ENTRY_CLASS, TITLE_CLASSES,
};

/// Matches `*text*` emphasis (and each half of `**strong**`)
static EMPHASIS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]*)\*").unwrap());

/// Matches any run of whitespace
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Point links at sibling chapters: `foo.xhtml` becomes `../foo`
pub fn rewrite_links(document: &mut Node, ctx: &mut Context<'_>) {
    let suffix = format!(".{}", ctx.options.source_extension);
    let prefix = ctx.options.link_prefix.as_str();

    document.for_each_element_mut(|node| {
        if !node.is_tag("a") {
            return;
        }
        let rewritten = node
            .attr("href")
            .and_then(|href| href.strip_suffix(suffix.as_str()))
            .map(|stem| format!("{prefix}{stem}"));
        if let Some(href) = rewritten {
            node.set_attr("href", &href);
        }
    });
}

/// Take the title from the first `<span>` of the highest-priority title class
pub fn extract_title(document: &mut Node, ctx: &mut Context<'_>) {
    ctx.title = TITLE_CLASSES
        .iter()
        .find_map(|class| document.find(&Filter::class("span", class)))
        .map(|span| span.text_content().trim().to_string())
        .filter(|title| !title.is_empty());
}

/// Drop the first `<h1>`; it repeats the title
pub fn remove_heading(document: &mut Node, _ctx: &mut Context<'_>) {
    document.remove_first(&Filter::tag("h1"));
}

/// Replace note reference anchors with `[^N]` markers
pub fn inline_noterefs(document: &mut Node, _ctx: &mut Context<'_>) {
    let sup = Filter::tag("sup");
    document.replace_matching(&Filter::attr("a", "role", NOTEREF_ROLE), |anchor| {
        anchor
            .find(&sup)
            .map(|sup| Node::markdown_inline(&format!("[^{}]", sup.text_content())))
    });
}

/// Replace each notes list with `[^N]: text` footnote definitions
pub fn extract_notes(document: &mut Node, _ctx: &mut Context<'_>) {
    let entry = Filter::class("li", NOTE_ENTRY_CLASS);
    let backlink = Filter::attr("a", "role", BACKLINK_ROLE);

    document.replace_matching(&Filter::class("ol", NOTES_LIST_CLASS), |list| {
        let mut lines = Vec::new();
        for item in list.find_all(&entry) {
            let mut item = item.clone();
            let Some(link) = item.remove_first(&backlink) else {
                continue;
            };
            let number = link.text_content();
            let text = item.text_content().trim().replace(NBSP, "");
            lines.push(format!("[^{}]: {}", number.trim(), escape_markdown(&text)));
        }
        Some(Node::markdown_block(&format!("{}\n", lines.join("\n"))))
    });
}

/// Turn back-links outside ordered lists into `[^N]` markers and flatten their parents
pub fn clean_backlinks(document: &mut Node, _ctx: &mut Context<'_>) {
    clean_backlinks_in(document, &Filter::attr("a", "role", BACKLINK_ROLE), false);
}

fn clean_backlinks_in(node: &mut Node, backlink: &Filter, in_list: bool) {
    let mut replaced = false;

    for child in &mut node.children {
        if !in_list && backlink.matches(child) {
            *child = Node::markdown_inline(&format!("[^{}]", child.text_content()));
            replaced = true;
        } else {
            let child_in_list = in_list || child.is_tag("ol");
            clean_backlinks_in(child, backlink, child_in_list);
        }
    }

    if replaced {
        let text = node.text_content().replace(NBSP, ": ");
        node.set_text(&text);
    }
}

/// Replace `<aside>` boxes holding a labelled `feature1` paragraph with `:::label` blocks
pub fn boxed_admonitions(document: &mut Node, ctx: &mut Context<'_>) {
    let options = &ctx.options.markdown;
    let section = Filter::class("section", FEATURE_ADMONITION_CLASS);
    let paragraph = Filter::tag("p");
    let bold = Filter::tag("b");

    document.replace_matching(&Filter::tag("aside"), |aside| {
        let p = aside.find(&section)?.find(&paragraph)?;
        let lead = p.find(&bold)?;
        if !p.text_content().contains(EM_SPACE) {
            return None;
        }
        let label = admonition_label(&lead.text_content())?;

        let mut body = p.clone();
        body.remove_first(&bold);
        let content = render_markdown(&body, options).replace(EM_SPACE, " ");
        let content = EMPHASIS_RE.replace_all(&content, "$1");
        let content = WHITESPACE_RE.replace_all(&content, " ");

        Some(Node::markdown_block(&format!(
            ":::{}\n{}\n:::\n",
            label,
            content.trim()
        )))
    });
}

/// Replace free-standing `<b>Label</b>&emsp;<i>text</i>` paragraphs with `:::label` blocks
pub fn inline_admonitions(document: &mut Node, _ctx: &mut Context<'_>) {
    let section = Filter::class("section", FEATURE_ADMONITION_CLASS);
    inline_admonitions_in(document, &section, false);
}

fn inline_admonitions_in(node: &mut Node, section: &Filter, in_section: bool) {
    for child in &mut node.children {
        if !in_section && child.is_tag("p") {
            if let Some(markdown) = inline_admonition(child) {
                *child = Node::markdown_block(&markdown);
                continue;
            }
        }
        let child_in_section = in_section || section.matches(child);
        inline_admonitions_in(child, section, child_in_section);
    }
}

fn inline_admonition(p: &Node) -> Option<String> {
    let lead = p.find(&Filter::tag("b"))?;
    let body = p.find(&Filter::tag("i"))?;
    if !p.text_content().contains(EM_SPACE) {
        return None;
    }
    let label = admonition_label(&lead.text_content())?;
    Some(format!(
        ":::{}\n{}\n:::\n",
        label,
        escape_markdown(body.text_content().trim())
    ))
}

/// Replace `<aside>` boxes with a headed `feature3` section by `:::tip[heading]` blocks
pub fn titled_callouts(document: &mut Node, ctx: &mut Context<'_>) {
    let options = &ctx.options.markdown;
    let section = Filter::class("section", FEATURE_CALLOUT_CLASS);
    let heading = Filter::tags(&["h2", "h3"]);
    let divider = Filter::class("div", DIVIDER_CLASS);

    document.replace_matching(&Filter::tag("aside"), |aside| {
        let found = aside.find(&section)?;
        let title = found.find(&heading)?.text_content().trim().to_string();

        let mut body = found.clone();
        body.remove_first(&heading);
        body.remove_all(&divider);
        let content = render_markdown(&body, options);

        Some(Node::markdown_block(&format!(
            ":::tip[{}]\n{}\n:::\n",
            title, content
        )))
    });
}

/// Remove scripts, styles and horizontal rules
pub fn remove_unwanted(document: &mut Node, _ctx: &mut Context<'_>) {
    let removed = document.remove_all(&Filter::tags(&["script", "style", "hr"]));
    log::trace!("removed {} script/style/hr elements", removed);
}

/// Swap marker images for their custom inline tag
pub fn replace_special_images(document: &mut Node, ctx: &mut Context<'_>) {
    let options = ctx.options;
    let marker = Filter::attr("img", "alt", &options.special_image_alt);
    document.replace_matching(&marker, |_| {
        Some(Node::markdown_inline(&options.special_image_tag))
    });
}
