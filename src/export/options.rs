//! Render targets and raster options

use serde::{Deserialize, Serialize};

use crate::config::ConversionConfig;
use crate::style::DeclarationBlock;

// ─────────────────────────────────────────────────────────────────────────────
// Render Target
// ─────────────────────────────────────────────────────────────────────────────

/// Where a conversion ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderTarget {
    /// Rich text on the clipboard
    #[default]
    Html,
    /// A PNG image on the clipboard
    Png,
}

impl RenderTarget {
    /// Get the display label for this target.
    pub fn label(&self) -> &'static str {
        match self {
            RenderTarget::Html => "Copy as HTML",
            RenderTarget::Png => "Copy as PNG",
        }
    }

    /// Start of the notice shown when the target fails.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            RenderTarget::Html => "Failed to copy as HTML",
            RenderTarget::Png => "Failed to copy as IMG",
        }
    }

    /// Get all available render targets.
    pub fn all() -> &'static [RenderTarget] {
        &[RenderTarget::Html, RenderTarget::Png]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raster Options
// ─────────────────────────────────────────────────────────────────────────────

/// Padding applied to the container while it is rendered.
pub const RENDER_PADDING: &str = "2em";

/// Background painted behind the rendered container.
pub const RENDER_BACKGROUND: &str = "rgba(30, 30, 30, 1)";

/// Everything a rasterizer needs besides the fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    /// CSS `max-width` of the container
    pub max_width: String,
    /// CSS `padding` of the container
    pub padding: String,
    /// Pixel ratio of the produced image
    pub scale: f32,
    /// CSS color behind the content
    pub background: String,
}

impl RasterOptions {
    /// Options for the given configuration and viewport class.
    pub fn from_config(config: &ConversionConfig, mobile: bool) -> Self {
        Self {
            max_width: config.max_width_for(mobile).to_string(),
            padding: RENDER_PADDING.to_string(),
            scale: config
                .render_scale
                .clamp(ConversionConfig::MIN_RENDER_SCALE, ConversionConfig::MAX_RENDER_SCALE),
            background: RENDER_BACKGROUND.to_string(),
        }
    }

    /// The container style while rendering: `current` with max-width and
    /// padding set.
    pub fn container_style(&self, current: Option<&str>) -> String {
        let mut style = current.map(DeclarationBlock::parse).unwrap_or_default();
        style.set("max-width", self.max_width.as_str(), false);
        style.set("padding", self.padding.as_str(), false);
        style.to_css()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_target_labels() {
        assert_eq!(RenderTarget::Html.label(), "Copy as HTML");
        assert_eq!(RenderTarget::all().len(), 2);
        assert_eq!(RenderTarget::default(), RenderTarget::Html);
    }

    #[test]
    fn test_render_target_serde() {
        let json = serde_json::to_string(&RenderTarget::Png).unwrap();
        assert_eq!(json, "\"png\"");
    }

    #[test]
    fn test_raster_options_from_config() {
        let config = ConversionConfig::default();
        let options = RasterOptions::from_config(&config, false);
        assert_eq!(options.max_width, "60vw");
        assert_eq!(options.padding, "2em");
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.background, "rgba(30, 30, 30, 1)");

        let options = RasterOptions::from_config(&config, true);
        assert_eq!(options.max_width, "90vw");
    }

    #[test]
    fn test_raster_scale_is_clamped() {
        let config = ConversionConfig {
            render_scale: 25.0,
            ..ConversionConfig::default()
        };
        assert_eq!(RasterOptions::from_config(&config, false).scale, 10.0);
    }

    #[test]
    fn test_container_style_merges() {
        let options = RasterOptions::from_config(&ConversionConfig::default(), false);
        assert_eq!(
            options.container_style(Some("color: red; padding: 0")),
            "color: red; padding: 2em; max-width: 60vw;"
        );
        assert_eq!(options.container_style(None), "max-width: 60vw; padding: 2em;");
    }
}
