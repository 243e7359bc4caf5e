//! Conversion entry points
//!
//! A [`Converter`] runs a whole conversion: markdown pipeline, fragment
//! construction, filtering, style inlining and finally the render target.
//! Every failure ends up as a notice for the user and an `Err` for the
//! caller; recoverable problems (a bad filter selector, a missing snippet)
//! are logged and the conversion carries on.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{info, warn};

use super::clipboard::{ClipboardContent, ClipboardPayload, ClipboardSink};
use super::notice::{LogNotifier, Notice, Notifier};
use super::options::{RasterOptions, RenderTarget};
use super::raster::{render_image, ImageBlob, Rasterizer};
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use crate::html::{self, Fragment};
use crate::markdown::MarkdownPipeline;
use crate::style::{inline_styles, load_stylesheets, InMemorySnippets, StylesheetSource};

/// Progress notice shown while an image is produced.
pub const GENERATING_IMAGE: &str = "Generating Image";

/// Notice shown once an image reached the clipboard.
pub const IMAGE_EXPORTED: &str = "Exported to png";

/// Runs conversions against a snippet source and a notice surface.
pub struct Converter {
    pipeline: MarkdownPipeline,
    snippets: Box<dyn StylesheetSource + Send + Sync>,
    notifier: Box<dyn Notifier + Send + Sync>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(InMemorySnippets::new(), LogNotifier)
    }
}

impl Converter {
    /// Converter using the default hooks.
    pub fn new(
        snippets: impl StylesheetSource + Send + Sync + 'static,
        notifier: impl Notifier + Send + Sync + 'static,
    ) -> Self {
        Self {
            pipeline: MarkdownPipeline::new(),
            snippets: Box::new(snippets),
            notifier: Box::new(notifier),
        }
    }

    /// Replace the markdown pipeline, for custom hook sets.
    pub fn with_pipeline(mut self, pipeline: MarkdownPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn pipeline(&self) -> &MarkdownPipeline {
        &self.pipeline
    }

    /// Convert `markdown` into a filtered, styled fragment.
    pub fn to_fragment(&self, markdown: &str, config: &ConversionConfig) -> Result<Fragment> {
        self.build_fragment(markdown, &config.clone())
    }

    fn build_fragment(&self, markdown: &str, config: &ConversionConfig) -> Result<Fragment> {
        let html = panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.to_html(markdown, config)))
            .map_err(|payload| Error::Conversion(panic_message(payload.as_ref())))?;
        let mut fragment = Fragment::parse(&html)?;

        if config.filter_enabled() {
            match html::filter(&config.filter_selector, &mut fragment) {
                Ok(removed) => info!("Filter removed {} element(s)", removed),
                Err(e) => warn!("Filtering skipped: {}", e),
            }
        }

        let sheets = load_stylesheets(self.snippets.as_ref(), &config.snippets);
        if !sheets.is_empty() {
            let report = inline_styles(&mut fragment, &sheets, config.remove_inlined);
            info!(
                "Inlined {} stylesheet(s): {} element(s) styled, {} class(es) removed",
                sheets.len(),
                report.styled_elements,
                report.removed_classes
            );
        }

        Ok(fragment)
    }

    /// Convert `markdown` and put the HTML on `clipboard` as rich text.
    pub fn copy_html(
        &self,
        markdown: &str,
        config: &ConversionConfig,
        clipboard: &mut dyn ClipboardSink,
    ) -> Result<ClipboardPayload> {
        // One snapshot per conversion
        let config = config.clone();
        let result = self.build_fragment(markdown, &config).and_then(|fragment| {
            let payload = ClipboardPayload::html(fragment.inner_html()?);
            clipboard.write(ClipboardContent::Html(payload.clone()))?;
            Ok(payload)
        });
        self.report(RenderTarget::Html, result)
    }

    /// Convert `markdown`, render it through `rasterizer` and put the image
    /// on `clipboard`.
    pub fn copy_image(
        &self,
        markdown: &str,
        config: &ConversionConfig,
        rasterizer: &dyn Rasterizer,
        clipboard: &mut dyn ClipboardSink,
        mobile: bool,
    ) -> Result<ImageBlob> {
        let config = config.clone();
        self.notifier.notify(Notice::progress(GENERATING_IMAGE));
        let result = self.build_fragment(markdown, &config).and_then(|mut fragment| {
            let options = RasterOptions::from_config(&config, mobile);
            let blob = render_image(&mut fragment, rasterizer, &options)?;
            clipboard.write(ClipboardContent::Image(blob.clone()))?;
            Ok(blob)
        });
        self.notifier.clear_progress();

        let blob = self.report(RenderTarget::Png, result)?;
        self.notifier.notify(Notice::info(IMAGE_EXPORTED));
        Ok(blob)
    }

    fn report<T>(&self, target: RenderTarget, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!("{} failed: {}", target.label(), e);
            self.notifier
                .notify(Notice::error(format!("{}:\n{}", target.failure_prefix(), e)));
        }
        result
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "pipeline panicked".to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::notice::{MemoryNotifier, NoticeLevel};
    use crate::markdown::{default_hooks, Stage};
    use image::RgbaImage;
    use std::io::Cursor;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<ClipboardContent>,
    }

    impl ClipboardSink for Recorder {
        fn write(&mut self, content: ClipboardContent) -> Result<()> {
            self.writes.push(content);
            Ok(())
        }
    }

    struct FixedRasterizer(Option<Vec<u8>>);

    impl Rasterizer for FixedRasterizer {
        fn rasterize(&self, _fragment: &Fragment, _options: &RasterOptions) -> Result<ImageBlob> {
            match &self.0 {
                Some(bytes) => Ok(ImageBlob::png(bytes.clone())),
                None => Err(Error::Render("renderer unavailable".to_string())),
            }
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn converter(snippets: InMemorySnippets) -> (Converter, Arc<MemoryNotifier>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let converter = Converter::new(snippets, Arc::clone(&notifier));
        (converter, notifier)
    }

    #[test]
    fn test_copy_html_writes_payload() {
        let (converter, notifier) = converter(InMemorySnippets::new());
        let mut clipboard = Recorder::default();
        let payload = converter
            .copy_html("See [[Target]]", &ConversionConfig::default(), &mut clipboard)
            .unwrap();

        assert_eq!(payload.html, "<div id=\"content\"><p>See Target</p>\n</div>");
        assert_eq!(payload.html, payload.text);
        assert_eq!(clipboard.writes, vec![ClipboardContent::Html(payload)]);
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_snippets_are_inlined() {
        let snippets = InMemorySnippets::new().with("theme", "p { color: red }");
        let (converter, _) = converter(snippets);
        let config = ConversionConfig {
            snippets: vec!["theme".to_string(), "missing".to_string()],
            ..ConversionConfig::default()
        };
        let fragment = converter.to_fragment("text", &config).unwrap();
        assert!(fragment.inner_html().unwrap().contains("<p style=\"color: red;\">text</p>"));
    }

    #[test]
    fn test_invalid_filter_is_recovered() {
        let (converter, _) = converter(InMemorySnippets::new());
        let config = ConversionConfig {
            use_filter: true,
            filter_selector: "p[".to_string(),
            ..ConversionConfig::default()
        };
        let fragment = converter.to_fragment("kept", &config).unwrap();
        assert!(fragment.text().contains("kept"));
    }

    #[test]
    fn test_filter_removes_elements() {
        let (converter, _) = converter(InMemorySnippets::new());
        let config = ConversionConfig {
            use_filter: true,
            filter_selector: "h1".to_string(),
            ..ConversionConfig::default()
        };
        let fragment = converter.to_fragment("# Title\n\nbody", &config).unwrap();
        assert!(!fragment.text().contains("Title"));
        assert!(fragment.text().contains("body"));
    }

    #[test]
    fn test_panicking_hook_is_conversion_error() {
        let mut hooks = default_hooks();
        hooks.register(Stage::BeforeEmphasis, "explodes", |_, _| panic!("hook exploded"));
        let (converter, notifier) = converter(InMemorySnippets::new());
        let converter = converter.with_pipeline(MarkdownPipeline::with_hooks(hooks));

        let mut clipboard = Recorder::default();
        let result = converter.copy_html("text", &ConversionConfig::default(), &mut clipboard);
        assert!(matches!(result, Err(Error::Conversion(ref m)) if m == "hook exploded"));
        assert!(clipboard.writes.is_empty());

        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(
            notices[0].message,
            "Failed to copy as HTML:\nFailed to convert MD to HTML: hook exploded"
        );
    }

    #[test]
    fn test_copy_image_success() {
        let (converter, notifier) = converter(InMemorySnippets::new());
        let mut clipboard = Recorder::default();
        let blob = converter
            .copy_image(
                "text",
                &ConversionConfig::default(),
                &FixedRasterizer(Some(png_bytes())),
                &mut clipboard,
                false,
            )
            .unwrap();

        assert_eq!(clipboard.writes, vec![ClipboardContent::Image(blob)]);
        let messages: Vec<String> = notifier.notices().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec![GENERATING_IMAGE, IMAGE_EXPORTED]);
        assert!(notifier.progress().is_none());
    }

    #[test]
    fn test_copy_image_failure_leaves_clipboard() {
        let (converter, notifier) = converter(InMemorySnippets::new());
        let mut clipboard = Recorder::default();
        let result = converter.copy_image(
            "text",
            &ConversionConfig::default(),
            &FixedRasterizer(None),
            &mut clipboard,
            true,
        );

        assert!(matches!(result, Err(Error::Render(_))));
        assert!(clipboard.writes.is_empty());
        let last = notifier.notices().pop().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert!(last.message.starts_with("Failed to copy as IMG:\n"));
    }
}
