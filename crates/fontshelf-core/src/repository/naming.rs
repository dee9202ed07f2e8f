//! Filesystem-safe location and file names for installed fonts.
//!
//! A font's location is derived from its display name once, on first save,
//! and never changes afterwards.

use crate::config::RepositoryConfig;
use crate::models::{FontStyle, FontWeight};
use crate::platform::dotted_extension;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

/// Regex for runs of spaces.
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").unwrap());

/// Regex for anything outside `[A-Za-z0-9-]`.
static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\-]+").unwrap());

/// Derive a location slug from a font's display name.
///
/// # Rules Applied
/// 1. Collapse runs of spaces into a single `-`
/// 2. Strip every character outside `[A-Za-z0-9-]`
/// 3. Fall back to [`RepositoryConfig::FALLBACK_LOCATION`] when nothing is left
///
/// # Examples
///
/// ```
/// use fontshelf::repository::naming::location_slug;
///
/// assert_eq!(location_slug("Acme Sans"), "Acme-Sans");
/// assert_eq!(location_slug("My Font!"), "My-Font");
/// ```
pub fn location_slug(name: &str) -> String {
    let hyphenated = SPACE_RUNS.replace_all(name, "-");
    let slug = NON_SLUG.replace_all(&hyphenated, "").to_string();

    if slug.is_empty() {
        RepositoryConfig::FALLBACK_LOCATION.to_string()
    } else {
        slug
    }
}

/// Pick a free location for `slug` under `repo_dir`.
///
/// Returns `slug` itself when free, otherwise the first of `slug_1`,
/// `slug_2`, ... that neither exists on disk nor appears in `claimed`.
/// Suffixes always extend the base slug, never a previous candidate.
pub fn resolve_location(repo_dir: &Path, slug: &str, claimed: &HashSet<String>) -> String {
    let is_free = |candidate: &str| {
        !claimed.contains(candidate) && !repo_dir.join(candidate).exists()
    };

    if is_free(slug) {
        return slug.to_string();
    }

    let mut index: u32 = 1;
    loop {
        let candidate = format!("{}_{}", slug, index);
        if is_free(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// File name for a variant copied into `location`.
///
/// Format: `location-weight-style.ext`, with the extension taken from the
/// source file.
pub fn variant_href(location: &str, weight: FontWeight, style: FontStyle, source: &Path) -> String {
    format!(
        "{}-{}-{}{}",
        location,
        weight.as_str(),
        style.as_str(),
        dotted_extension(source)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_location_slug_basic() {
        assert_eq!(location_slug("Acme Sans"), "Acme-Sans");
        assert_eq!(location_slug("Open   Sans"), "Open-Sans");
        assert_eq!(location_slug("Fira-Code"), "Fira-Code");
    }

    #[test]
    fn test_location_slug_strips_specials() {
        assert_eq!(location_slug("My Font!"), "My-Font");
        assert_eq!(location_slug("Über Grotesk"), "ber-Grotesk");
        assert_eq!(location_slug("a_b.c"), "abc");
    }

    #[test]
    fn test_location_slug_fallback() {
        assert_eq!(location_slug(""), "font");
        assert_eq!(location_slug("!!!"), "font");
    }

    #[test]
    fn test_resolve_location_free() {
        let temp_dir = TempDir::new().unwrap();
        let claimed = HashSet::new();
        assert_eq!(resolve_location(temp_dir.path(), "My-Font", &claimed), "My-Font");
    }

    #[test]
    fn test_resolve_location_monotonic_suffixes() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("My-Font")).unwrap();
        std::fs::create_dir(temp_dir.path().join("My-Font_1")).unwrap();

        let mut claimed = HashSet::new();
        claimed.insert("My-Font_2".to_string());

        assert_eq!(
            resolve_location(temp_dir.path(), "My-Font", &claimed),
            "My-Font_3"
        );
    }

    #[test]
    fn test_variant_href() {
        assert_eq!(
            variant_href(
                "Acme-Sans",
                FontWeight::Bold,
                FontStyle::Italic,
                Path::new("/tmp/AcmeSans-BI.otf")
            ),
            "Acme-Sans-bold-italic.otf"
        );
        assert_eq!(
            variant_href(
                "Acme-Sans",
                FontWeight::Normal,
                FontStyle::Normal,
                Path::new("/tmp/acme")
            ),
            "Acme-Sans-normal-normal"
        );
    }
}
