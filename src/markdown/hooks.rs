//! Extension hook registry
//!
//! The markdown pipeline exposes a fixed sequence of [`Stage`]s. At each
//! stage boundary it hands the intermediate text to every hook registered for
//! that stage, in registration order, each hook receiving the previous one's
//! output. Hooks are plain text transforms: the only state they see is the
//! [`HookContext`] passed in by the pipeline.

use crate::config::ConversionConfig;
use log::debug;

use super::stash::Stash;

// ─────────────────────────────────────────────────────────────────────────────
// Stages
// ─────────────────────────────────────────────────────────────────────────────

/// Points in the parse pipeline where hooks run.
///
/// Variants are declared in pipeline order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// After raw HTML blocks and code have been swapped for placeholders
    AfterHtmlBlocks,
    /// Before emphasis and bold are resolved
    BeforeEmphasis,
    /// After `~~strikethrough~~` has been resolved
    AfterStrikethrough,
    /// On the finished HTML, after paragraphs have been wrapped
    AfterParagraphs,
}

impl Stage {
    /// All stages in the order the pipeline fires them.
    pub fn all() -> &'static [Stage] {
        &[
            Stage::AfterHtmlBlocks,
            Stage::BeforeEmphasis,
            Stage::AfterStrikethrough,
            Stage::AfterParagraphs,
        ]
    }

    /// Stable identifier used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::AfterHtmlBlocks => "hashHTMLBlocks.after",
            Stage::BeforeEmphasis => "italicsAndBold.before",
            Stage::AfterStrikethrough => "strikethrough.after",
            Stage::AfterParagraphs => "paragraphs.after",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook Context
// ─────────────────────────────────────────────────────────────────────────────

/// Per-conversion state handed to every hook.
pub struct HookContext<'a> {
    config: &'a ConversionConfig,
    stash: &'a mut Stash,
}

impl<'a> HookContext<'a> {
    pub fn new(config: &'a ConversionConfig, stash: &'a mut Stash) -> Self {
        Self { config, stash }
    }

    /// The configuration snapshot of the running conversion.
    pub fn config(&self) -> &ConversionConfig {
        self.config
    }

    /// Placeholder stash of the running conversion.
    pub fn stash(&mut self) -> &mut Stash {
        self.stash
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

type Transform = Box<dyn Fn(&str, &mut HookContext<'_>) -> String + Send + Sync>;

/// A named transform bound to one stage.
pub struct Hook {
    name: String,
    stage: Stage,
    transform: Transform,
}

impl Hook {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Apply this hook to `text`.
    pub fn apply(&self, text: &str, ctx: &mut HookContext<'_>) -> String {
        (self.transform)(text, ctx)
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("stage", &self.stage)
            .finish()
    }
}

/// Ordered registry of hooks.
#[derive(Debug, Default)]
pub struct HookSet {
    hooks: Vec<Hook>,
}

impl HookSet {
    /// An empty registry; every stage is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `transform` at `stage`. It runs after every hook already
    /// registered at the same stage.
    pub fn register<F>(&mut self, stage: Stage, name: impl Into<String>, transform: F) -> &mut Self
    where
        F: Fn(&str, &mut HookContext<'_>) -> String + Send + Sync + 'static,
    {
        self.hooks.push(Hook {
            name: name.into(),
            stage,
            transform: Box::new(transform),
        });
        self
    }

    /// Remove every hook called `name`. Returns how many were removed.
    pub fn unregister(&mut self, name: &str) -> usize {
        let before = self.hooks.len();
        self.hooks.retain(|hook| hook.name != name);
        before - self.hooks.len()
    }

    /// Names of the hooks registered at `stage`, in run order.
    pub fn names(&self, stage: Stage) -> Vec<&str> {
        self.at(stage).map(Hook::name).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    fn at(&self, stage: Stage) -> impl Iterator<Item = &Hook> {
        self.hooks.iter().filter(move |hook| hook.stage == stage)
    }

    /// Run every hook of `stage` over `text`, left to right.
    pub fn run(&self, stage: Stage, text: String, ctx: &mut HookContext<'_>) -> String {
        self.at(stage).fold(text, |text, hook| {
            let output = hook.apply(&text, ctx);
            if output != text {
                debug!("Hook '{}' rewrote text at {}", hook.name, stage.label());
            }
            output
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
