//! richcopy - Obsidian-flavored Markdown to style-inlined HTML
//!
//! A conversion runs the Markdown through a staged comrak pipeline with
//! extension hooks, parses the result into a mutable DOM, removes filtered
//! elements, inlines snippet stylesheets and hands the result to a render
//! target: rich text or an image on the clipboard.
//!
//! ```ignore
//! use richcopy::config::ConversionConfig;
//! use richcopy::export::{Converter, LogNotifier, SystemClipboard};
//! use richcopy::style::SnippetDirectory;
//!
//! let snippets = SnippetDirectory::for_vault("/path/to/vault".as_ref());
//! let converter = Converter::new(snippets, LogNotifier);
//! converter.copy_html("==hi== #tag", &ConversionConfig::default(), &mut SystemClipboard::new())?;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod html;
pub mod markdown;
pub mod style;

pub use config::ConversionConfig;
pub use error::{Error, Result};
pub use export::Converter;
pub use html::Fragment;
pub use markdown::MarkdownPipeline;
