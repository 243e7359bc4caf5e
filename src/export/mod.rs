//! Render targets for converted documents
//!
//! # Architecture
//!
//! - `converter.rs` - Conversion entry points (`copy_html`, `copy_image`)
//! - `options.rs` - Render targets and raster options
//! - `raster.rs` - Image rendering through a host-provided rasterizer
//! - `clipboard.rs` - Platform clipboard and focus-deferred writes
//! - `notice.rs` - User-visible notices

pub mod clipboard;
pub mod converter;
pub mod notice;
pub mod options;
pub mod raster;

pub use clipboard::{
    ClipboardContent, ClipboardPayload, ClipboardSink, FocusAwareClipboard, SystemClipboard,
};
pub use converter::Converter;
pub use notice::{LogNotifier, MemoryNotifier, Notice, NoticeLevel, Notifier};
pub use options::{RasterOptions, RenderTarget};
pub use raster::{render_image, ImageBlob, Rasterizer, RootStyleGuard};
