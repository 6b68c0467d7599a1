//! # chapterdown
//!
//! Convert XHTML book chapters to Markdown with front matter.
//!
//! Each chapter is parsed into a mutable [`Node`] tree, normalized by an
//! ordered [`Pipeline`] of rewrites (chapter links, footnotes, `:::`
//! admonitions and callouts), then lowered to the Markdown AST from
//! `chapterdown-core` and serialized.
//!
//! ## Example
//!
//! ```rust
//! use chapterdown::ChapterService;
//!
//! let service = ChapterService::new();
//! let chapter = service.convert(
//!     r#"<html><body>
//!         <h1><span class="chapterTitle">Basics</span></h1>
//!         <p>See <a href="chapter2.xhtml">the next chapter</a>.</p>
//!     </body></html>"#,
//! );
//!
//! assert_eq!(chapter.title.as_deref(), Some("Basics"));
//! assert_eq!(chapter.body, "See [the next chapter](../chapter2).");
//! ```

pub mod batch;
mod convert;
pub mod filter;
pub mod html;
pub mod node;
pub mod rewrite;
mod service;
pub mod utilities;

use std::path::PathBuf;

pub use batch::{convert_directory, discover_inputs, BatchError, BatchReport};
pub use convert::{convert, render_markdown};
pub use filter::Filter;
pub use html::parse_html;
pub use node::{Node, NodeType};
pub use rewrite::{Context, Pipeline};
pub use service::{
    unescape_code_underscores, Chapter, ChapterService, ConvertOptions, MarkdownOptions,
};

/// Error converting a single chapter file
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    /// The file the error is about
    pub fn path(&self) -> &std::path::Path {
        match self {
            ConversionError::Read { path, .. }
            | ConversionError::Encoding { path, .. }
            | ConversionError::Write { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;
