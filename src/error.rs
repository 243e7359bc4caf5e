//! Centralized error handling for richcopy
//!
//! This module provides a unified error type that covers every failure a
//! conversion can hit: configuration persistence, the markdown pipeline,
//! selector filtering, stylesheet loading, rendering and clipboard writes.
//!
//! Some of these are recoverable inside a conversion (an invalid filter
//! selector, a broken snippet) and are only logged; the rest abort the
//! conversion and reach the caller.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Conversion Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The markdown pipeline or the HTML fragment could not be produced
    Conversion(String),

    /// A CSS selector could not be compiled
    Selector { selector: String },

    /// A stylesheet could not be loaded or parsed
    Stylesheet {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The external renderer failed to rasterize the fragment
    Render(String),

    /// Clipboard access or write failed
    Clipboard(String),
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Error::Clipboard(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Render(format!("Invalid image data: {}", err))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Conversion Errors
            Error::Conversion(msg) => write!(f, "Failed to convert MD to HTML: {}", msg),
            Error::Selector { selector } => write!(f, "Invalid selector '{}'", selector),
            Error::Stylesheet { name, source } => {
                write!(f, "Failed to load stylesheet '{}': {}", name, source)
            }

            // Output Errors
            Error::Render(msg) => write!(f, "Failed to convert to image: {}", msg),
            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::Stylesheet { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::ConfigDirNotFound
            | Error::Conversion(_)
            | Error::Selector { .. }
            | Error::Render(_)
            | Error::Clipboard(_) => None,
        }
    }
}

impl Error {
    /// Whether a conversion may continue after this error.
    ///
    /// Selector and stylesheet failures only disable the step they belong to;
    /// everything else aborts the conversion.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Selector { .. } | Error::Stylesheet { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_creation() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_display_conversion_error() {
        let err = Error::Conversion("hook failed".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Failed to convert MD to HTML"));
        assert!(msg.contains("hook failed"));
    }

    #[test]
    fn test_display_selector_error() {
        let err = Error::Selector {
            selector: "div[".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid selector 'div['");
    }

    #[test]
    fn test_display_stylesheet_error() {
        let err = Error::Stylesheet {
            name: "callouts".to_string(),
            source: Box::new(io::Error::new(io::ErrorKind::NotFound, "missing")),
        };
        let msg = err.to_string();
        assert!(msg.contains("callouts"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_display_config_dir_not_found() {
        let err = Error::ConfigDirNotFound;
        let msg = format!("{}", err);
        assert_eq!(msg, "Configuration directory not found");
    }

    #[test]
    fn test_error_source_chaining() {
        use std::error::Error as StdError;
        let err = Error::Stylesheet {
            name: "a".to_string(),
            source: Box::new(io::Error::new(io::ErrorKind::Other, "x")),
        };
        assert!(err.source().is_some());

        let err = Error::Render("renderer crashed".to_string());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Selector {
            selector: "[".to_string()
        }
        .is_recoverable());
        assert!(!Error::Clipboard("denied".to_string()).is_recoverable());
        assert!(!Error::Conversion("boom".to_string()).is_recoverable());
    }

    #[test]
    fn test_unwrap_or_warn_default_ok() {
        let result: super::Result<i32> = Ok(42);
        let value = result.unwrap_or_warn_default(0, "test context");
        assert_eq!(value, 42);
    }

    #[test]
    fn test_unwrap_or_warn_default_err() {
        let result: super::Result<i32> = Err(Error::Render("test".to_string()));
        let value = result.unwrap_or_warn_default(0, "test context");
        assert_eq!(value, 0);
    }
}
