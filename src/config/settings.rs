//! Conversion settings for richcopy
//!
//! This module defines the `ConversionConfig` struct that holds every option
//! governing a conversion, with serde support for JSON persistence. Keys are
//! camelCase so that data saved by the host application loads unchanged.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Default maximum width of the rendered container on desktop.
pub const DEFAULT_RENDER_MAX_WIDTH: &str = "60vw";

/// Default maximum width of the rendered container on small viewports.
pub const DEFAULT_RENDER_MAX_WIDTH_MOBILE: &str = "90vw";

// ─────────────────────────────────────────────────────────────────────────────
// Conversion Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// All options consumed by a conversion.
///
/// The core never mutates this value. The converter clones it once at the
/// start of each conversion, so edits made by a settings UI while a
/// conversion is running are only seen by the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionConfig {
    /// Strip `[[...]]` wikilink brackets
    pub remove_brackets: bool,
    /// Strip emphasis markers around single words
    pub remove_emphasis: bool,
    /// Strip hashtag tokens entirely
    pub remove_tags: bool,
    /// Strip `%%...%%` comment spans
    pub remove_comments: bool,
    /// Handle highlights, tags and other Obsidian specific syntax
    pub obsidian_support: bool,
    /// Handle super/subscript and custom spans
    pub extended_support: bool,
    /// Enable unreliable features (paragraph classes)
    pub experimental: bool,
    /// Wrap the resulting HTML in `<div id="content">`
    pub wrap_result: bool,
    /// Remove classes whose style has been inlined
    pub remove_inlined: bool,
    /// Snippet stylesheets to inline, in application order
    pub snippets: Vec<String>,
    /// CSS maximum width of the container when rendering to an image
    #[serde(rename = "renderMaxwidth")]
    pub render_max_width: String,
    /// Same as `render_max_width`, for small viewports
    #[serde(rename = "renderMaxwidthMobile")]
    pub render_max_width_mobile: String,
    /// Enable selector filtering of the generated HTML
    pub use_filter: bool,
    /// Selector of the elements removed when filtering
    pub filter_selector: String,
    /// Rasterization scale factor
    pub render_scale: f32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            remove_brackets: true,
            remove_emphasis: false,
            remove_tags: false,
            remove_comments: true,
            obsidian_support: true,
            extended_support: false,
            experimental: false,
            wrap_result: true,
            remove_inlined: false,
            snippets: Vec::new(),
            render_max_width: DEFAULT_RENDER_MAX_WIDTH.to_string(),
            render_max_width_mobile: DEFAULT_RENDER_MAX_WIDTH_MOBILE.to_string(),
            use_filter: false,
            filter_selector: String::new(),
            render_scale: 2.0,
        }
    }
}

impl ConversionConfig {
    /// Minimum allowed render scale.
    pub const MIN_RENDER_SCALE: f32 = 1.0;
    /// Maximum allowed render scale.
    pub const MAX_RENDER_SCALE: f32 = 10.0;

    /// A configuration with every syntax hook and filter switched off.
    ///
    /// Markdown goes through the base parser untouched by any extension.
    pub fn plain() -> Self {
        Self {
            remove_brackets: false,
            remove_comments: false,
            obsidian_support: false,
            wrap_result: false,
            ..Default::default()
        }
    }

    /// Whether the tag hook has anything to do.
    pub fn handles_tags(&self) -> bool {
        self.remove_tags || self.obsidian_support
    }

    /// Whether post-parse filtering will run.
    pub fn filter_enabled(&self) -> bool {
        self.use_filter && !self.filter_selector.trim().is_empty()
    }

    /// Maximum render width for the given viewport class.
    pub fn max_width_for(&self, mobile: bool) -> &str {
        if mobile {
            &self.render_max_width_mobile
        } else {
            &self.render_max_width
        }
    }

    /// Sanitize values to ensure they are within valid ranges.
    pub fn sanitize(&mut self) {
        if !self.render_scale.is_finite() {
            self.render_scale = Self::default().render_scale;
        }
        self.render_scale = self
            .render_scale
            .clamp(Self::MIN_RENDER_SCALE, Self::MAX_RENDER_SCALE);

        if self.render_max_width.trim().is_empty() {
            self.render_max_width = DEFAULT_RENDER_MAX_WIDTH.to_string();
        }
        if self.render_max_width_mobile.trim().is_empty() {
            self.render_max_width_mobile = DEFAULT_RENDER_MAX_WIDTH_MOBILE.to_string();
        }

        // Keep the first occurrence of each snippet
        let mut seen = std::collections::HashSet::new();
        self.snippets.retain(|name| seen.insert(name.clone()));
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_stored_plugin_defaults() {
        let config = ConversionConfig::default();
        assert!(config.remove_brackets);
        assert!(!config.remove_emphasis);
        assert!(!config.remove_tags);
        assert!(config.remove_comments);
        assert!(config.obsidian_support);
        assert!(!config.extended_support);
        assert!(!config.experimental);
        assert!(config.wrap_result);
        assert!(!config.remove_inlined);
        assert!(config.snippets.is_empty());
        assert_eq!(config.render_max_width, "60vw");
        assert!(!config.use_filter);
        assert_eq!(config.render_scale, 2.0);
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_string(&ConversionConfig::default()).unwrap();
        assert!(json.contains("\"removeBrackets\""));
        assert!(json.contains("\"renderMaxwidth\""));
        assert!(json.contains("\"renderMaxwidthMobile\""));
        assert!(json.contains("\"filterSelector\""));
        assert!(!json.contains("remove_brackets"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ConversionConfig =
            serde_json::from_str(r#"{"extendedSupport": true, "snippets": ["a"]}"#).unwrap();
        assert!(config.extended_support);
        assert_eq!(config.snippets, vec!["a".to_string()]);
        assert!(config.remove_brackets);
        assert_eq!(config.render_scale, 2.0);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let result: Result<ConversionConfig, _> =
            serde_json::from_str(r#"{"removeTags": true, "futureOption": 3}"#);
        assert!(result.unwrap().remove_tags);
    }

    #[test]
    fn test_sanitize_render_scale() {
        let mut config = ConversionConfig::default();
        config.render_scale = 0.2;
        config.sanitize();
        assert_eq!(config.render_scale, ConversionConfig::MIN_RENDER_SCALE);

        config.render_scale = 42.0;
        config.sanitize();
        assert_eq!(config.render_scale, ConversionConfig::MAX_RENDER_SCALE);

        config.render_scale = f32::NAN;
        config.sanitize();
        assert_eq!(config.render_scale, 2.0);
    }

    #[test]
    fn test_sanitize_widths_and_snippets() {
        let mut config = ConversionConfig::default();
        config.render_max_width = "  ".to_string();
        config.snippets = vec!["a".into(), "b".into(), "a".into()];
        config.sanitize();
        assert_eq!(config.render_max_width, DEFAULT_RENDER_MAX_WIDTH);
        assert_eq!(config.snippets, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_from_json_sanitized() {
        let config = ConversionConfig::from_json_sanitized(r#"{"renderScale": 0}"#).unwrap();
        assert_eq!(config.render_scale, 1.0);
    }

    #[test]
    fn test_filter_enabled_requires_selector() {
        let mut config = ConversionConfig::default();
        config.use_filter = true;
        assert!(!config.filter_enabled());
        config.filter_selector = ".annotation".to_string();
        assert!(config.filter_enabled());
    }

    #[test]
    fn test_plain_disables_hooks() {
        let config = ConversionConfig::plain();
        assert!(!config.remove_brackets);
        assert!(!config.remove_comments);
        assert!(!config.handles_tags());
        assert!(!config.extended_support);
        assert!(!config.experimental);
        assert!(!config.wrap_result);
    }

    #[test]
    fn test_max_width_for() {
        let config = ConversionConfig::default();
        assert_eq!(config.max_width_for(false), "60vw");
        assert_eq!(config.max_width_for(true), "90vw");
    }
}
