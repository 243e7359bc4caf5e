//! Obsidian and extended syntax hooks
//!
//! The transforms in this module add the syntax the base parser knows nothing
//! about: wikilinks, tags, highlights, super/subscript and custom spans.
//! [`default_hooks`] registers them at their pipeline stages. Each transform
//! is also exposed on its own so it can be tested or reused.
//!
//! Every transform returns its input unchanged when the option governing it
//! is off.

use crate::config::ConversionConfig;
use log::warn;
use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::hooks::{HookSet, Stage};
use super::stash::Stash;

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

/// Hook name: inline HTML and autolink protection.
pub const HTML_SPANS: &str = "html-spans";
/// Hook name: `^block-id` removal.
pub const BLOCK_REFERENCES: &str = "block-references";
/// Hook name: `#tag` styling or removal.
pub const TAGS: &str = "tags";
/// Hook name: single-word emphasis removal.
pub const EMPHASIS: &str = "emphasis";
/// Hook name: `[[wikilink]]` bracket removal.
pub const WIKILINKS: &str = "wikilinks";
/// Hook name: `==highlight==` spans.
pub const HIGHLIGHTS: &str = "highlights";
/// Hook name: super/subscript and custom spans.
pub const EXTENDED_SYNTAX: &str = "extended-syntax";
/// Hook name: `:::class` paragraph markers.
pub const PARAGRAPH_CLASSES: &str = "paragraph-classes";

/// The hook set used for every conversion.
pub fn default_hooks() -> HookSet {
    let mut hooks = HookSet::new();
    hooks
        .register(Stage::AfterHtmlBlocks, HTML_SPANS, |text, ctx| {
            protect_html_spans(text, ctx.stash())
        })
        .register(Stage::BeforeEmphasis, BLOCK_REFERENCES, |text, _| {
            strip_block_references(text)
        })
        .register(Stage::BeforeEmphasis, TAGS, |text, ctx| {
            transform_tags(text, ctx.config())
        })
        .register(Stage::BeforeEmphasis, EMPHASIS, |text, ctx| {
            if ctx.config().remove_emphasis {
                strip_emphasis(text)
            } else {
                text.to_string()
            }
        })
        .register(Stage::BeforeEmphasis, WIKILINKS, |text, ctx| {
            if ctx.config().remove_brackets {
                strip_wikilinks(text)
            } else {
                text.to_string()
            }
        })
        .register(Stage::AfterStrikethrough, HIGHLIGHTS, |text, ctx| {
            if ctx.config().obsidian_support {
                render_highlights(text)
            } else {
                text.to_string()
            }
        })
        .register(Stage::AfterStrikethrough, EXTENDED_SYNTAX, |text, ctx| {
            if ctx.config().extended_support {
                render_extended(text)
            } else {
                text.to_string()
            }
        })
        .register(Stage::AfterParagraphs, PARAGRAPH_CLASSES, |text, ctx| {
            if ctx.config().experimental {
                apply_paragraph_classes(text)
            } else {
                text.to_string()
            }
        });
    hooks
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline HTML
// ─────────────────────────────────────────────────────────────────────────────

fn html_span_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?s)<!--.*?-->",
            r"|<[A-Za-z][A-Za-z0-9+.-]{1,31}:[^\s<>]*>",
            r"|<[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*>",
            r"|</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>",
        ))
        .expect("html span pattern is valid")
    })
}

/// Swap inline tags, comments and autolinks for stash tokens.
///
/// Span hooks work on raw text and would otherwise rewrite attribute values
/// (`style="color: #fff"` looks like a tag, `title="==x=="` like a highlight).
pub fn protect_html_spans(text: &str, stash: &mut Stash) -> String {
    stash.protect(text, html_span_regex())
}

// ─────────────────────────────────────────────────────────────────────────────
// Cleanup
// ─────────────────────────────────────────────────────────────────────────────

/// Remove `^block-id` markers ending a line.
pub fn strip_block_references(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?m)\^\w+$").expect("block reference pattern is valid"));
    re.replace_all(text, "").into_owned()
}

/// Style or remove `#tag` tokens.
///
/// Removal takes precedence when both `remove_tags` and `obsidian_support`
/// are set.
pub fn transform_tags(text: &str, config: &ConversionConfig) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"#\w+").expect("tag pattern is valid"));

    if !config.handles_tags() {
        return text.to_string();
    }
    if config.remove_tags {
        re.replace_all(text, "").into_owned()
    } else {
        re.replace_all(text, r#"<span class="tag">$0</span>"#)
            .into_owned()
    }
}

/// Drop emphasis markers wrapped around a single word.
pub fn strip_emphasis(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[*~]+(\w+)[*~]+").expect("emphasis pattern is valid"));
    re.replace_all(text, "$1").into_owned()
}

/// Replace `[[target]]` with `target`, and `[[target|alias]]` with `alias`.
pub fn strip_wikilinks(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").expect("wikilink pattern is valid"));
    re.replace_all(text, |caps: &Captures| {
        let inner = &caps[1];
        match inner.split_once('|') {
            Some((_, alias)) => alias.to_string(),
            None => inner.to_string(),
        }
    })
    .into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Obsidian Syntax
// ─────────────────────────────────────────────────────────────────────────────

/// Turn `==text==` and `=={color}text==` into highlight spans.
pub fn render_highlights(text: &str) -> String {
    static COLORED: OnceLock<Regex> = OnceLock::new();
    static PLAIN: OnceLock<Regex> = OnceLock::new();
    let colored = COLORED.get_or_init(|| {
        Regex::new(r"==(?:\{(.*?)\})(.+?)==").expect("colored highlight pattern is valid")
    });
    let plain = PLAIN.get_or_init(|| Regex::new(r"==(.+?)==").expect("highlight pattern is valid"));

    let text = colored.replace_all(
        text,
        r#"<span class="cm-custom-highlight cm-highlight cm-custom-highlight-${1}">${2}</span>"#,
    );
    plain
        .replace_all(&text, r#"<span class="cm-custom-highlight cm-highlight">${1}</span>"#)
        .into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Extended Syntax
// ─────────────────────────────────────────────────────────────────────────────

fn custom_span_regex() -> Option<&'static fancy_regex::Regex> {
    static RE: OnceLock<Option<fancy_regex::Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        fancy_regex::Regex::new(
            r"!+(?<!!!!)(?![!\s])(?:\{([\w\s-]*?)\})?(.+?)!+(?<![!\s]!!)(?!!)",
        )
        .map_err(|e| warn!("Custom span pattern rejected: {}", e))
        .ok()
    })
    .as_ref()
}

/// Superscript, subscript and custom spans.
pub fn render_extended(text: &str) -> String {
    static SUP: OnceLock<Regex> = OnceLock::new();
    static SUB: OnceLock<Regex> = OnceLock::new();
    let sup = SUP.get_or_init(|| Regex::new(r"\^(.+?)\^").expect("superscript pattern is valid"));
    let sub = SUB.get_or_init(|| Regex::new(r"~(.+?)~").expect("subscript pattern is valid"));

    let text = sup.replace_all(text, "<sup>${1}</sup>");
    let text = sub.replace_all(&text, "<sub>${1}</sub>");
    render_custom_spans(&text)
}

/// Turn `!{class}text!` and `!!{class}text!!` into `<span class="class">`.
///
/// Delimiter runs of three or more `!` are left alone. If the matcher gives
/// up (backtracking limit) the text is returned unchanged.
pub fn render_custom_spans(text: &str) -> String {
    let Some(re) = custom_span_regex() else {
        return text.to_string();
    };

    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let caps = match caps {
            Ok(caps) => caps,
            Err(e) => {
                warn!("Custom span matching failed, leaving text as is: {}", e);
                return text.to_string();
            }
        };
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let class = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        output.push_str(&text[last..whole.start()]);
        if class.is_empty() {
            output.push_str(&format!("<span>{}</span>", body));
        } else {
            output.push_str(&format!("<span class=\"{}\">{}</span>", class, body));
        }
        last = whole.end();
    }
    output.push_str(&text[last..]);
    output
}

// ─────────────────────────────────────────────────────────────────────────────
// Experimental
// ─────────────────────────────────────────────────────────────────────────────

/// Give a paragraph a class from a leading `:::class` line.
///
/// Works on the rendered HTML and only recognises paragraphs the renderer
/// closed with `</p>` followed by a newline, so block elements nested in
/// other blocks are not always reached.
pub fn apply_paragraph_classes(html: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^<p>:{3,}([\w\- ]+)<br />\n").expect("paragraph class pattern is valid")
    });

    html.split_inclusive("</p>\n")
        .map(|paragraph| match re.captures(paragraph) {
            Some(caps) => {
                let class = caps[1].trim();
                let rest = &paragraph[caps[0].len()..];
                format!("<p class=\"{}\">{}", class, rest)
            }
            None => paragraph.to_string(),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
