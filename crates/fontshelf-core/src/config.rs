//! Centralized configuration for fontshelf.
//!
//! This module provides configuration constants for repository layout,
//! registry serialization, and face registration.

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    /// Directory under the platform data directory holding user state.
    pub const APP_DIR_NAME: &'static str = "fontshelf";
}

/// On-disk layout of a font repository.
pub struct RepositoryConfig;

impl RepositoryConfig {
    pub const REGISTRY_FILE_NAME: &'static str = "registry.xml";
    pub const USER_FONTS_DIR_NAME: &'static str = "fonts";
    /// Subdirectory of a document's working directory holding embedded fonts.
    pub const DOCUMENT_FONTS_DIR_NAME: &'static str = "fonts";
    pub const REGISTRY_NAMESPACE: &'static str = "http://www.evolus.vn/Namespace/Pencil";
    /// Location used when a font name has no filesystem-safe characters.
    pub const FALLBACK_LOCATION: &'static str = "font";
    pub const REGISTRY_TEMP_SUFFIX: &'static str = "tmp";
}

/// Face registration against the rendering environment.
pub struct LoaderConfig;

impl LoaderConfig {
    /// Upper bound for each of the two awaits of a single face.
    pub const FACE_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
    pub const READY_PROBE_SIZE: &'static str = "1em";
    pub const SOURCE_FORMAT: &'static str = "truetype";
    pub const UNINSTALL_LABEL: &'static str = "Uninstall";
    pub const CANCEL_LABEL: &'static str = "Cancel";
    pub const EVENT_CHANNEL_CAPACITY: usize = 16;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_are_reasonable() {
        assert!(LoaderConfig::FACE_LOAD_TIMEOUT > Duration::ZERO);
        assert!(LoaderConfig::FACE_LOAD_TIMEOUT <= Duration::from_secs(60));
    }

    #[test]
    fn test_registry_file_name() {
        assert!(RepositoryConfig::REGISTRY_FILE_NAME.ends_with(".xml"));
    }
}
