//! Error types for fontshelf.
//!
//! Repository operations return these errors after logging them. The font
//! loader is the boundary that swallows them so the application keeps running
//! with whatever fonts could be loaded.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the fontshelf library.
#[derive(Debug, Error)]
pub enum FontShelfError {
    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // Registry errors
    #[error("XML error: {message}")]
    Xml { message: String },

    #[error("Malformed registry {path}: {message}")]
    Registry { path: PathBuf, message: String },

    #[error("Font already installed: {name}")]
    FontExists { name: String },

    // Rendering environment errors
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Face rejected by rendering environment: {message}")]
    FaceRejected { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for fontshelf operations.
pub type Result<T> = std::result::Result<T, FontShelfError>;

impl From<std::io::Error> for FontShelfError {
    fn from(err: std::io::Error) -> Self {
        FontShelfError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<quick_xml::de::DeError> for FontShelfError {
    fn from(err: quick_xml::de::DeError) -> Self {
        FontShelfError::Xml {
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::se::SeError> for FontShelfError {
    fn from(err: quick_xml::se::SeError) -> Self {
        FontShelfError::Xml {
            message: err.to_string(),
        }
    }
}

impl FontShelfError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        FontShelfError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a malformed-registry error for `path`.
    pub fn registry(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FontShelfError::Registry {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether a later `load()` may succeed without user intervention.
    ///
    /// Parse and IO failures are transient from the loader's point of view:
    /// the registry may be mid-write or the disk briefly unavailable.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FontShelfError::Io { .. }
                | FontShelfError::Xml { .. }
                | FontShelfError::Registry { .. }
                | FontShelfError::Timeout(_)
        )
    }
}
