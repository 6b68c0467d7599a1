//! chapterdown-core - Markdown AST and serialization
//!
//! This crate provides the core data structures and serialization for the
//! Markdown dialect produced by `chapterdown`: ATX headings, `-` bullets,
//! `*` emphasis, fenced code blocks, and verbatim pre-rendered fragments for
//! footnotes and `:::` admonitions.
//!
//! # Architecture
//!
//! ```text
//!                            ┌──────────────┐
//! DOM Node Tree ────────────▶│ Markdown AST │ ──▶ Markdown String
//!                            └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use chapterdown_core::{Block, Inline, Options, serialize};
//!
//! let ast = Block::Document(vec![
//!     Block::Heading {
//!         level: 2,
//!         content: vec![Inline::Text("Hello World".to_string())],
//!     },
//!     Block::Paragraph(vec![
//!         Inline::Text("This is ".to_string()),
//!         Inline::Strong(vec![Inline::Text("bold".to_string())]),
//!         Inline::Text(" text.".to_string()),
//!     ]),
//! ]);
//!
//! let markdown = serialize(&ast, &Options::default());
//! assert_eq!(markdown, "## Hello World\n\nThis is **bold** text.");
//! ```

mod ast;
mod options;
mod serialize;

pub use ast::{inlines_are_blank, inlines_text_len, Block, Inline, ListItem};
pub use options::Options;
pub use serialize::{is_code_fence, serialize};
