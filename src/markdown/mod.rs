//! Markdown to HTML conversion with Obsidian extensions
//!
//! comrak does the CommonMark + GFM work. Around it, this module runs text
//! pre-filters and a registry of extension hooks keyed to pipeline stages.
//!
//! # Example
//! ```ignore
//! use richcopy::config::ConversionConfig;
//! use richcopy::markdown::MarkdownPipeline;
//!
//! let config = ConversionConfig::default();
//! let html = MarkdownPipeline::new().to_html("==hi== #tag", &config);
//! ```

pub mod extensions;
mod filters;
pub mod hooks;
mod parser;
mod stash;

pub use extensions::default_hooks;
pub use filters::filter_comments;
pub use hooks::{Hook, HookContext, HookSet, Stage};
pub use parser::{comrak_options, MarkdownPipeline};
pub use stash::Stash;
