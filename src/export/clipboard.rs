//! Clipboard Operations
//!
//! Conversions hand their result to a [`ClipboardSink`]. [`SystemClipboard`]
//! writes to the platform clipboard through arboard. [`FocusAwareClipboard`]
//! holds a write back while the host window is unfocused, since some
//! platforms reject clipboard writes from background windows.

use std::borrow::Cow;

use arboard::{Clipboard, ImageData};
use log::{debug, info};

use super::raster::ImageBlob;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard Content
// ─────────────────────────────────────────────────────────────────────────────

/// Rich text with its plain text alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub html: String,
    pub text: String,
}

impl ClipboardPayload {
    /// A payload carrying `html` in both formats.
    pub fn html(html: impl Into<String>) -> Self {
        let html = html.into();
        Self {
            text: html.clone(),
            html,
        }
    }
}

/// Something to put on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    Html(ClipboardPayload),
    Image(ImageBlob),
}

impl ClipboardContent {
    fn describe(&self) -> String {
        match self {
            ClipboardContent::Html(payload) => format!("{} bytes of HTML", payload.html.len()),
            ClipboardContent::Image(blob) => format!("{} image ({} bytes)", blob.mime, blob.bytes.len()),
        }
    }
}

/// Destination of conversion results.
pub trait ClipboardSink {
    fn write(&mut self, content: ClipboardContent) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// System Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// The platform clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl ClipboardSink for SystemClipboard {
    fn write(&mut self, content: ClipboardContent) -> Result<()> {
        // Decode before touching the clipboard so a bad image writes nothing
        let image = match &content {
            ClipboardContent::Image(blob) => Some(blob.decode()?),
            ClipboardContent::Html(_) => None,
        };

        let mut clipboard = Clipboard::new()
            .map_err(|e| Error::Clipboard(format!("Clipboard access error: {}", e)))?;

        match (content, image) {
            (ClipboardContent::Html(payload), _) => {
                clipboard.set_html(payload.html, Some(payload.text))?;
            }
            (ClipboardContent::Image(_), Some(image)) => {
                let (width, height) = image.dimensions();
                clipboard.set_image(ImageData {
                    width: width as usize,
                    height: height as usize,
                    bytes: Cow::Owned(image.into_raw()),
                })?;
            }
            (ClipboardContent::Image(_), None) => {
                return Err(Error::Clipboard("image was not decoded".to_string()));
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Focus Handling
// ─────────────────────────────────────────────────────────────────────────────

/// Defers writes made while the host is unfocused until focus returns.
///
/// Only the latest deferred write is kept.
#[derive(Debug)]
pub struct FocusAwareClipboard<S: ClipboardSink> {
    inner: S,
    focused: bool,
    pending: Option<ClipboardContent>,
}

impl<S: ClipboardSink> FocusAwareClipboard<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            focused: true,
            pending: None,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn focus_lost(&mut self) {
        self.focused = false;
    }

    /// Mark the host focused and flush the deferred write, if any.
    pub fn focus_gained(&mut self) -> Result<()> {
        self.focused = true;
        match self.pending.take() {
            Some(content) => {
                info!("Focus regained, writing {}", content.describe());
                self.inner.write(content)
            }
            None => Ok(()),
        }
    }
}

impl<S: ClipboardSink> ClipboardSink for FocusAwareClipboard<S> {
    fn write(&mut self, content: ClipboardContent) -> Result<()> {
        if self.focused {
            return self.inner.write(content);
        }
        if self.pending.is_some() {
            debug!("Replacing deferred clipboard write");
        }
        debug!("Host unfocused, deferring {}", content.describe());
        self.pending = Some(content);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
