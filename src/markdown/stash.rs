//! Placeholder stash for protected text
//!
//! Spans that the extension hooks must never rewrite (code, raw HTML, link
//! destinations) are swapped out for opaque tokens before the hook stages run
//! and swapped back before the base parser sees the text. A token is
//! `STX <index> ETX`, which no hook pattern can match.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Start-of-token sentinel.
pub const STASH_OPEN: char = '\u{2}';
/// End-of-token sentinel.
pub const STASH_CLOSE: char = '\u{3}';

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x02(\d+)\x03").expect("token pattern is valid"))
}

/// Protected fragments of the text being converted, addressed by token.
#[derive(Debug, Default)]
pub struct Stash {
    items: Vec<String>,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `raw` and return the token that stands in for it.
    pub fn insert(&mut self, raw: impl Into<String>) -> String {
        let index = self.items.len();
        self.items.push(raw.into());
        format!("{}{}{}", STASH_OPEN, index, STASH_CLOSE)
    }

    /// Replace every match of `pattern` in `text` with a token.
    pub fn protect(&mut self, text: &str, pattern: &Regex) -> String {
        pattern
            .replace_all(text, |caps: &Captures| self.insert(&caps[0]))
            .into_owned()
    }

    /// Put every stashed fragment back.
    ///
    /// A fragment may itself contain tokens of fragments stashed before it,
    /// so replacement repeats until nothing changes. Each pass resolves at
    /// least one nesting level, which bounds the loop by the stash size.
    pub fn restore(&self, text: &str) -> String {
        let mut current = text.to_string();
        for _ in 0..=self.items.len() {
            if !current.contains(STASH_OPEN) {
                break;
            }
            let next = token_regex()
                .replace_all(&current, |caps: &Captures| {
                    caps[1]
                        .parse::<usize>()
                        .ok()
                        .and_then(|index| self.items.get(index))
                        .cloned()
                        .unwrap_or_default()
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Remove stray sentinel characters so user text can never forge a token.
pub fn strip_sentinels(text: &str) -> String {
    text.chars()
        .filter(|c| *c != STASH_OPEN && *c != STASH_CLOSE)
        .collect()
}
