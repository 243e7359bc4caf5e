//! Rendering the fragment to an image
//!
//! Turning HTML into pixels needs a layout engine, which the host provides
//! through [`Rasterizer`]. This module prepares the container for rendering
//! and puts it back afterwards, whatever the renderer did.

use std::ops::Deref;

use image::RgbaImage;
use log::debug;

use super::options::RasterOptions;
use crate::error::{Error, Result};
use crate::html::Fragment;

/// MIME type of PNG blobs.
pub const PNG_MIME: &str = "image/png";

/// Encoded image produced by a [`Rasterizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageBlob {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            mime: PNG_MIME.to_string(),
            bytes,
        }
    }

    /// Decode the blob into RGBA pixels.
    pub fn decode(&self) -> Result<RgbaImage> {
        if self.bytes.is_empty() {
            return Err(Error::Render("renderer returned an empty image".to_string()));
        }
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        Ok(self.decode()?.dimensions())
    }
}

/// External HTML-to-image renderer.
pub trait Rasterizer {
    /// Render `fragment`'s container, children included.
    fn rasterize(&self, fragment: &Fragment, options: &RasterOptions) -> Result<ImageBlob>;
}

/// Applies the render-time container style and restores the previous one
/// when dropped.
pub struct RootStyleGuard<'a> {
    fragment: &'a mut Fragment,
    previous: Option<String>,
}

impl<'a> RootStyleGuard<'a> {
    pub fn apply(fragment: &'a mut Fragment, options: &RasterOptions) -> Self {
        let previous = fragment.root_style();
        let style = options.container_style(previous.as_deref());
        fragment.set_root_style(Some(style));
        Self { fragment, previous }
    }
}

impl Deref for RootStyleGuard<'_> {
    type Target = Fragment;

    fn deref(&self) -> &Fragment {
        &*self.fragment
    }
}

impl Drop for RootStyleGuard<'_> {
    fn drop(&mut self) {
        self.fragment.set_root_style(self.previous.take());
    }
}

/// Render `fragment` and check that the renderer produced a usable image.
///
/// The container style is restored before this returns, on success and on
/// failure alike.
pub fn render_image(
    fragment: &mut Fragment,
    rasterizer: &dyn Rasterizer,
    options: &RasterOptions,
) -> Result<ImageBlob> {
    let guard = RootStyleGuard::apply(fragment, options);
    let blob = rasterizer.rasterize(&guard, options)?;
    drop(guard);

    let (width, height) = blob.dimensions()?;
    debug!(
        "Rendered {}x{} image at scale {}",
        width, height, options.scale
    );
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use std::cell::RefCell;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let image = RgbaImage::from_pixel(3, 2, image::Rgba([30, 30, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct StyleSpy {
        seen: RefCell<Option<String>>,
        fail: bool,
    }

    impl Rasterizer for StyleSpy {
        fn rasterize(&self, fragment: &Fragment, _options: &RasterOptions) -> Result<ImageBlob> {
            *self.seen.borrow_mut() = fragment.root_style();
            if self.fail {
                Err(Error::Render("no display".to_string()))
            } else {
                Ok(ImageBlob::png(tiny_png()))
            }
        }
    }

    fn options() -> RasterOptions {
        RasterOptions::from_config(&ConversionConfig::default(), false)
    }

    #[test]
    fn test_renderer_sees_render_style() {
        let mut fragment = Fragment::parse("<p>a</p>").unwrap();
        let spy = StyleSpy {
            seen: RefCell::new(None),
            fail: false,
        };
        let blob = render_image(&mut fragment, &spy, &options()).unwrap();
        assert_eq!(blob.mime, PNG_MIME);
        assert_eq!(blob.dimensions().unwrap(), (3, 2));
        assert_eq!(
            spy.seen.borrow().as_deref(),
            Some("max-width: 60vw; padding: 2em;")
        );
        assert_eq!(fragment.root_style(), None);
    }

    #[test]
    fn test_style_restored_on_failure() {
        let mut fragment = Fragment::parse("<p>a</p>").unwrap();
        fragment.set_root_style(Some("color: red;".to_string()));
        let spy = StyleSpy {
            seen: RefCell::new(None),
            fail: true,
        };
        let result = render_image(&mut fragment, &spy, &options());
        assert!(matches!(result, Err(Error::Render(_))));
        assert_eq!(fragment.root_style().as_deref(), Some("color: red;"));
    }

    #[test]
    fn test_invalid_image_is_render_error() {
        let blob = ImageBlob::png(b"not a png".to_vec());
        assert!(matches!(blob.decode(), Err(Error::Render(_))));
        assert!(matches!(ImageBlob::png(Vec::new()).decode(), Err(Error::Render(_))));
    }
}
