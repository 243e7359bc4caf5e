//! Configuration module for richcopy
//!
//! This module holds the conversion options and their JSON persistence
//! to platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
