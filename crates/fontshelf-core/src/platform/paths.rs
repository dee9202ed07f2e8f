//! Platform-specific path utilities.
//!
//! This module provides functions to get platform-specific paths for:
//! - The user font repository
//! - File URLs handed to the rendering environment
//! - Source file extensions

use crate::config::{AppConfig, RepositoryConfig};
use crate::error::{FontShelfError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// Get the application data directory.
///
/// # Platform Behavior
/// Uses the `dirs` crate which handles platform differences:
/// - **Linux**: `~/.local/share/fontshelf`
/// - **Windows**: `%APPDATA%\fontshelf`
/// - **macOS**: `~/Library/Application Support/fontshelf`
pub fn app_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| FontShelfError::Config {
        message: "Could not determine app data directory".to_string(),
    })?;
    Ok(data_dir.join(AppConfig::APP_DIR_NAME))
}

/// Get the root of the user font repository.
pub fn user_fonts_dir() -> Result<PathBuf> {
    Ok(app_data_dir()?.join(RepositoryConfig::USER_FONTS_DIR_NAME))
}

/// Resolve the `file://` URL for a face file.
///
/// Relative paths are resolved against the current directory first because
/// file URLs must be absolute.
pub fn file_url(path: &Path) -> Result<Url> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| FontShelfError::io_with_path(e, path))?
            .join(path)
    };

    Url::from_file_path(&absolute).map_err(|_| FontShelfError::Other(format!(
        "Cannot build file URL for {}",
        absolute.display()
    )))
}

/// Extension of `path` including the leading dot, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
