//! CSS inlining without a browser engine
//!
//! Snippet stylesheets are parsed with cssparser and their declarations are
//! copied onto matching elements of a [`Fragment`](crate::html::Fragment) as
//! `style` attributes, so the HTML keeps its look when pasted elsewhere.

mod declaration;
mod inliner;
mod snippets;
mod stylesheet;

pub use declaration::{Declaration, DeclarationBlock};
pub use inliner::{inline_styles, InlineReport};
pub use snippets::{load_stylesheets, InMemorySnippets, SnippetDirectory, StylesheetSource};
pub use stylesheet::{split_selector_list, StyleRule, Stylesheet};
