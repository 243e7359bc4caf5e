//! Staged markdown pipeline built around comrak
//!
//! comrak parses a whole document in one call and offers no callbacks between
//! its internal passes. The pipeline therefore owns the early passes itself:
//! a first comrak pass locates code and raw HTML blocks, which are hidden
//! behind stash tokens together with code spans and links ("HTML-block hashing"),
//! fires the hook stages on the protected text, resolves strikethrough, and
//! only then hands the restored text to comrak for block structure and the
//! remaining inline syntax. The last stage runs on comrak's HTML.

use comrak::nodes::NodeValue;
use comrak::{markdown_to_html, parse_document, Arena, Options};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

use crate::config::ConversionConfig;

use super::extensions::default_hooks;
use super::filters::filter_comments;
use super::hooks::{HookContext, HookSet, Stage};
use super::stash::{strip_sentinels, Stash};

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Markdown to HTML conversion with extension hooks.
#[derive(Debug)]
pub struct MarkdownPipeline {
    hooks: HookSet,
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownPipeline {
    /// Pipeline with the default Obsidian and extended syntax hooks.
    pub fn new() -> Self {
        Self::with_hooks(default_hooks())
    }

    /// Pipeline running a custom hook set.
    pub fn with_hooks(hooks: HookSet) -> Self {
        Self { hooks }
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookSet {
        &mut self.hooks
    }

    /// Full text conversion: comment removal, staged parse, optional wrap.
    pub fn to_html(&self, markdown: &str, config: &ConversionConfig) -> String {
        let text = filter_comments(markdown, config.remove_comments);
        let html = self.render(&text, config);
        if config.wrap_result {
            format!("<div id=\"content\">{}</div>", html)
        } else {
            html
        }
    }

    /// Run the staged parse on `markdown`.
    pub fn render(&self, markdown: &str, config: &ConversionConfig) -> String {
        let text = strip_sentinels(markdown).replace("\r\n", "\n");

        let mut stash = Stash::new();
        let text = protect_blocks(&text, &mut stash);
        let text = protect_code_spans(&text, &mut stash);
        let text = protect_inline_targets(&text, &mut stash);
        debug!("Protected {} fragments before running hooks", stash.len());

        let mut ctx = HookContext::new(config, &mut stash);
        let text = self.hooks.run(Stage::AfterHtmlBlocks, text, &mut ctx);
        let text = self.hooks.run(Stage::BeforeEmphasis, text, &mut ctx);
        let text = resolve_strikethrough(&text);
        let text = self.hooks.run(Stage::AfterStrikethrough, text, &mut ctx);

        let text = stash.restore(&text);
        let html = markdown_to_html(&text, &comrak_options());

        let mut stash = Stash::new();
        let mut ctx = HookContext::new(config, &mut stash);
        self.hooks.run(Stage::AfterParagraphs, html, &mut ctx)
    }
}

/// Options of the base parser.
///
/// Strikethrough is resolved by the pipeline so that single tildes stay
/// available for subscript. Soft breaks render as `<br />` like GitHub
/// comments do.
pub fn comrak_options() -> Options {
    let mut options = Options::default();

    // Extension options
    options.extension.strikethrough = false;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.header_ids = None;

    // Render options
    options.render.hardbreaks = true;
    options.render.unsafe_ = true; // Allow raw HTML

    options
}

fn resolve_strikethrough(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"~~(.+?)~~").expect("strikethrough pattern is valid"));
    re.replace_all(text, "<del>${1}</del>").into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Hashing
// ─────────────────────────────────────────────────────────────────────────────

/// Line ranges (0-based, end exclusive) of every code block and raw HTML
/// block, found from a first comrak pass.
///
/// Blocks nested in block quotes and list items are included. Their
/// container prefixes (`> `, list indentation) lie inside the range and are
/// restored untouched before the real parse.
fn raw_block_lines(text: &str) -> Vec<(usize, usize)> {
    let arena = Arena::new();
    let root = parse_document(&arena, text, &comrak_options());

    let mut ranges: Vec<(usize, usize)> = root
        .descendants()
        .filter_map(|node| {
            let ast = node.data.borrow();
            let range = match ast.value {
                NodeValue::CodeBlock(_) | NodeValue::HtmlBlock(_) => {
                    let start = ast.sourcepos.start.line.max(1) - 1;
                    let end = ast.sourcepos.end.line.max(start + 1);
                    Some((start, end))
                }
                _ => None,
            };
            range
        })
        .collect();

    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start < last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Stash a run of lines, keeping the final newline outside the token so the
/// block stays on lines of its own.
fn stash_lines(lines: &[&str], stash: &mut Stash) -> String {
    let block = lines.concat();
    match block.strip_suffix('\n') {
        Some(body) => format!("{}\n", stash.insert(body)),
        None => stash.insert(block),
    }
}

/// Replace fenced code, indented code and raw HTML blocks with tokens.
pub(crate) fn protect_blocks(text: &str, stash: &mut Stash) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len());

    let mut next = 0;
    for (start, end) in raw_block_lines(text) {
        let end = end.min(lines.len());
        if start < next || start >= end {
            continue;
        }
        out.push_str(&lines[next..start].concat());
        out.push_str(&stash_lines(&lines[start..end], stash));
        next = end;
    }
    out.push_str(&lines[next.min(lines.len())..].concat());
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline Protection
// ─────────────────────────────────────────────────────────────────────────────

fn backtick_run(bytes: &[u8], from: usize) -> usize {
    bytes[from..].iter().take_while(|b| **b == b'`').count()
}

fn blank_line_at(bytes: &[u8], from: usize) -> bool {
    bytes[from..]
        .iter()
        .take_while(|b| **b != b'\n')
        .all(|b| *b == b' ' || *b == b'\t')
}

/// Start of the backtick run of exactly `len` closing a code span.
fn find_code_span_close(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        match bytes[j] {
            b'`' => {
                let run = backtick_run(bytes, j);
                if run == len {
                    return Some(j);
                }
                j += run;
            }
            b'\n' if blank_line_at(bytes, j + 1) => return None,
            _ => j += 1,
        }
    }
    None
}

/// Replace inline code spans with tokens.
pub(crate) fn protect_code_spans(text: &str, stash: &mut Stash) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = backtick_run(bytes, i);
                match find_code_span_close(bytes, i + run, run) {
                    Some(close) => {
                        let end = close + run;
                        out.push_str(&text[last..i]);
                        out.push_str(&stash.insert(&text[i..end]));
                        i = end;
                        last = end;
                    }
                    None => i += run,
                }
            }
            _ => i += 1,
        }
    }
    out.push_str(&text[last..]);
    out
}

fn inline_target_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            // Images, destinations may hold one level of balanced parentheses
            r"!\[[^\]\n]*\]\((?:[^()\n]|\([^()\n]*\))*\)",
            // Link destinations
            r"|\]\((?:[^()\n]|\([^()\n]*\))*\)",
            // Bare URLs picked up by the autolink extension
            r"|(?:(?:https?|ftp)://|www\.)[^\s<]*[^\s<?!.,:;*_~=()\[\]'\x22]",
            // Footnote references
            r"|\[\^[^\]\s]+\]",
            // Reference definitions
            r"|(?m:^ {0,3}\[[^\]\n]+\]:.*$)",
            // Setext heading underlines
            r"|(?m:^ {0,3}=+[ \t]*$)",
        ))
        .expect("inline target pattern is valid")
    })
}

/// Replace images, link destinations, bare URLs, footnote references,
/// reference definitions and setext underlines with tokens.
pub(crate) fn protect_inline_targets(text: &str, stash: &mut Stash) -> String {
    stash.protect(text, inline_target_regex())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
