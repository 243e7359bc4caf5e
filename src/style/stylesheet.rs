//! Stylesheet parsing
//!
//! Only qualified (selector) rules are kept. At-rules such as `@media`,
//! `@import` or `@font-face` are skipped along with their blocks, and so is
//! anything cssparser cannot recover from.

use cssparser::{
    AtRuleParser, CowRcStr, ParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
    StyleSheetParser,
};
use log::debug;

use super::declaration::{parse_declaration_list, Declaration};

/// A selector rule and its declarations, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Selector list as written
    pub selector_text: String,
    pub declarations: Vec<Declaration>,
    /// Position of the rule among the sheet's kept rules
    pub index: usize,
}

impl StyleRule {
    /// The entries of the selector list, split on top-level commas.
    pub fn selectors(&self) -> Vec<&str> {
        split_selector_list(&self.selector_text)
    }
}

/// A parsed snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub name: String,
    pub rules: Vec<StyleRule>,
}

impl Stylesheet {
    /// Parse `css`. Never fails: unusable parts are dropped.
    pub fn parse(name: impl Into<String>, css: &str) -> Self {
        let name = name.into();
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        let stylesheet_parser = StyleSheetParser::new(&mut parser, &mut rule_parser);

        let mut skipped = 0;
        for result in stylesheet_parser {
            if result.is_err() {
                skipped += 1;
            }
        }
        if skipped > 0 {
            debug!("Stylesheet '{}': skipped {} at-rules or invalid rules", name, skipped);
        }

        Self { name, rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parser for top-level stylesheet rules.
struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<StyleRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // Skip all at-rules
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = String;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let selector = input.slice_from(start).trim();
        if selector.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(selector.to_string())
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let declarations = parse_declaration_list(input);
        let index = self.rules.len();
        self.rules.push(StyleRule {
            selector_text: prelude,
            declarations,
            index,
        });
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Selector Text Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Split a selector list on commas outside brackets, parentheses and strings.
pub fn split_selector_list(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

/// The compound selector an entry applies to: whatever follows its last
/// top-level combinator.
pub fn subject_compound(selector: &str) -> &str {
    let selector = selector.trim();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut subject_start = 0;

    for (i, c) in selector.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && (c.is_whitespace() || matches!(c, '>' | '+' | '~')) => {
                subject_start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    &selector[subject_start..]
}

/// Class names in a compound selector, ignoring those inside `:not(...)`
/// and other functional pseudo-classes or attribute selectors.
pub fn compound_classes(compound: &str) -> Vec<String> {
    let mut classes = Vec::new();
    let mut depth = 0usize;
    let mut chars = compound.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                let mut name = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '-' || next == '_' || !next.is_ascii() {
                        name.push(next);
                        chars.next();
                    } else if next == '\\' {
                        chars.next();
                        if let Some((_, escaped)) = chars.next() {
                            name.push(escaped);
                        }
                    } else {
                        break;
                    }
                }
                if !name.is_empty() {
                    classes.push(name);
                }
            }
            _ => {}
        }
    }
    classes
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
