//! Rewrite pipeline applied to a chapter tree before conversion.
//!
//! A [`Pipeline`] is an ordered set of named passes. Each pass edits the tree
//! in place and may record findings (the title) in the shared [`Context`].

mod chapter;

pub use chapter::{
    boxed_admonitions, clean_backlinks, extract_notes, extract_title, inline_admonitions,
    inline_noterefs, remove_heading, remove_unwanted, replace_special_images, rewrite_links,
    titled_callouts,
};

use indexmap::IndexMap;

use crate::node::Node;
use crate::service::ConvertOptions;

/// Type alias for rewrite passes
pub type RewriteFn = Box<dyn Fn(&mut Node, &mut Context<'_>) + Send + Sync>;

/// State shared by the passes of one document
#[derive(Debug)]
pub struct Context<'a> {
    /// Options of the running conversion
    pub options: &'a ConvertOptions,
    /// Chapter title, once a pass has found one
    pub title: Option<String>,
}

impl<'a> Context<'a> {
    pub fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            title: None,
        }
    }
}

/// Ordered collection of named rewrite passes
pub struct Pipeline {
    passes: IndexMap<String, RewriteFn>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self {
            passes: IndexMap::new(),
        }
    }

    /// The chapter rewrites, in the order they must run
    pub fn chapter() -> Self {
        let mut pipeline = Self::new();
        pipeline
            .add("links", rewrite_links)
            .add("title", extract_title)
            .add("heading", remove_heading)
            .add("noterefs", inline_noterefs)
            .add("notes", extract_notes)
            .add("backlinks", clean_backlinks)
            .add("admonitions", boxed_admonitions)
            .add("inline-admonitions", inline_admonitions)
            .add("callouts", titled_callouts)
            .add("cleanup", remove_unwanted)
            .add("images", replace_special_images);
        pipeline
    }

    /// Append a pass; a pass with the same name is replaced in place
    pub fn add<F>(&mut self, name: &str, pass: F) -> &mut Self
    where
        F: Fn(&mut Node, &mut Context<'_>) + Send + Sync + 'static,
    {
        self.passes.insert(name.to_string(), Box::new(pass));
        self
    }

    /// Run every pass over the document
    pub fn run(&self, document: &mut Node, ctx: &mut Context<'_>) {
        for (name, pass) in &self.passes {
            log::debug!("rewrite pass `{}`", name);
            pass(document, ctx);
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::chapter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &'static str) -> impl Fn(&mut Node, &mut Context<'_>) + Send + Sync {
        move |_, ctx| {
            let seen = ctx.title.get_or_insert_with(String::new);
            seen.push_str(name);
        }
    }

    fn run(pipeline: &Pipeline, html: &str) -> (Node, Option<String>) {
        let options = ConvertOptions::default();
        let mut ctx = Context::new(&options);
        let mut doc = crate::parse_html(html);
        pipeline.run(&mut doc, &mut ctx);
        (doc, ctx.title)
    }

    #[test]
    fn test_passes_run_in_insertion_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add("a", record("a")).add("b", record("b")).add("c", record("c"));
        let (_, seen) = run(&pipeline, "<p>x</p>");
        assert_eq!(seen.as_deref(), Some("abc"));
    }

    #[test]
    fn test_add_replaces_in_place() {
        let mut pipeline = Pipeline::new();
        pipeline.add("a", record("a")).add("b", record("b")).add("c", record("c"));
        pipeline.add("b", record("B"));
        let (_, seen) = run(&pipeline, "<p>x</p>");
        assert_eq!(seen.as_deref(), Some("aBc"));
    }

    #[test]
    fn test_replace_chapter_pass() {
        let mut pipeline = Pipeline::chapter();
        pipeline.add("heading", |_, _| {});
        let (doc, title) = run(
            &pipeline,
            r#"<body><h1><span class="chapterTitle">Kept</span></h1></body>"#,
        );
        assert_eq!(title.as_deref(), Some("Kept"));
        assert!(doc.find(&crate::Filter::tag("h1")).is_some());
    }

    #[test]
    fn test_title_is_found_before_heading_is_dropped() {
        let (doc, title) = run(
            &Pipeline::chapter(),
            r#"<body><h1><span class="chapterTitle">Gone</span></h1><p>x</p></body>"#,
        );
        assert_eq!(title.as_deref(), Some("Gone"));
        assert!(doc.find(&crate::Filter::tag("h1")).is_none());
    }
}
