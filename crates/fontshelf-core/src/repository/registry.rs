//! `registry.xml` reading and writing.
//!
//! ```xml
//! <FontRegistry xmlns="http://www.evolus.vn/Namespace/Pencil">
//!   <Font name="Acme Sans" location="Acme-Sans">
//!     <FontStyle weight="normal" style="normal" href="Acme-Sans-normal-normal.ttf"/>
//!   </Font>
//! </FontRegistry>
//! ```
//!
//! Writes go to a temporary sibling which is synced and renamed over the
//! registry, so a crash never leaves a truncated file behind.

use crate::config::RepositoryConfig;
use crate::models::{Font, FontStyle, FontVariant, FontWeight, RepositoryType};
use crate::{FontShelfError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Root element of the registry file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename = "FontRegistry")]
pub struct RegistryDocument {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "Option::is_none")]
    pub xmlns: Option<String>,
    #[serde(rename = "Font", default)]
    pub fonts: Vec<FontEntry>,
}

/// `<Font>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontEntry {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@location", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "FontStyle", default)]
    pub styles: Vec<FontStyleEntry>,
}

/// `<FontStyle>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyleEntry {
    #[serde(rename = "@weight")]
    pub weight: String,
    #[serde(rename = "@style")]
    pub style: String,
    #[serde(rename = "@href", default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl RegistryDocument {
    /// Build the document for persisted fonts.
    ///
    /// Every font must already have a location and every variant an href.
    pub fn from_fonts(fonts: &[Font]) -> Result<Self> {
        let mut entries = Vec::with_capacity(fonts.len());

        for font in fonts {
            let location = font.location.clone().ok_or_else(|| {
                FontShelfError::Other(format!("Font '{}' has no location", font.name))
            })?;

            let styles = font
                .variants
                .iter()
                .map(|variant| {
                    let href = variant.href.clone().ok_or_else(|| {
                        FontShelfError::Other(format!(
                            "Variant {} {} of '{}' has no href",
                            variant.weight, variant.style, font.name
                        ))
                    })?;
                    Ok(FontStyleEntry {
                        weight: variant.weight.as_str().to_string(),
                        style: variant.style.as_str().to_string(),
                        href: Some(href),
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            entries.push(FontEntry {
                name: font.name.clone(),
                location: Some(location),
                styles,
            });
        }

        Ok(Self {
            xmlns: Some(RepositoryConfig::REGISTRY_NAMESPACE.to_string()),
            fonts: entries,
        })
    }

    /// Resolve entries into fonts rooted at `repo_dir`.
    ///
    /// `registry_path` is only used for error context.
    pub fn into_fonts(
        self,
        repo_dir: &Path,
        repo_type: RepositoryType,
        registry_path: &Path,
    ) -> Result<Vec<Font>> {
        let mut fonts = Vec::with_capacity(self.fonts.len());

        for entry in self.fonts {
            let location = entry.location.ok_or_else(|| {
                FontShelfError::registry(
                    registry_path,
                    format!("font '{}' has no location", entry.name),
                )
            })?;
            let font_dir = repo_dir.join(&location);

            let mut variants = Vec::with_capacity(entry.styles.len());
            for style_entry in entry.styles {
                let weight = FontWeight::parse(&style_entry.weight).ok_or_else(|| {
                    FontShelfError::registry(
                        registry_path,
                        format!("unknown weight '{}'", style_entry.weight),
                    )
                })?;
                let style = FontStyle::parse(&style_entry.style).ok_or_else(|| {
                    FontShelfError::registry(
                        registry_path,
                        format!("unknown style '{}'", style_entry.style),
                    )
                })?;
                let href = style_entry.href.ok_or_else(|| {
                    FontShelfError::registry(
                        registry_path,
                        format!("style of font '{}' has no href", entry.name),
                    )
                })?;

                variants.push(FontVariant {
                    name: entry.name.clone(),
                    weight,
                    style,
                    file_path: font_dir.join(&href),
                    href: Some(href),
                    provenance: repo_type,
                });
            }

            fonts.push(Font {
                name: entry.name,
                location: Some(location),
                variants,
            });
        }

        Ok(fonts)
    }
}

/// Read and parse a registry file.
///
/// Returns `None` if the file doesn't exist.
pub fn read_registry(path: &Path) -> Result<Option<RegistryDocument>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| FontShelfError::Io {
        message: format!("Failed to read {}", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e),
    })?;

    let document: RegistryDocument =
        quick_xml::de::from_str(&contents).map_err(|e| FontShelfError::Xml {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

    Ok(Some(document))
}

/// Serialize a registry document to an XML string.
pub fn to_xml_string(document: &RegistryDocument) -> Result<String> {
    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    document.serialize(serializer)?;

    Ok(format!("{}{}\n", XML_DECLARATION, body))
}

/// Write a registry document atomically.
///
/// The parent directory must exist.
pub fn write_registry(path: &Path, document: &RegistryDocument) -> Result<()> {
    let serialized = to_xml_string(document)?;

    let parent = path.parent().ok_or_else(|| FontShelfError::Config {
        message: format!("Registry path has no parent: {}", path.display()),
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(RepositoryConfig::REGISTRY_FILE_NAME)
        .suffix(RepositoryConfig::REGISTRY_TEMP_SUFFIX)
        .tempfile_in(parent)
        .map_err(|e| FontShelfError::Io {
            message: format!("Failed to create temp file in {}", parent.display()),
            path: Some(parent.to_path_buf()),
            source: Some(e),
        })?;

    write_and_sync(&mut temp, serialized.as_bytes()).map_err(|e| FontShelfError::Io {
        message: format!("Failed to write temp file {}", temp.path().display()),
        path: Some(temp.path().to_path_buf()),
        source: Some(e),
    })?;

    temp.persist(path).map_err(|e| FontShelfError::Io {
        message: format!("Failed to replace {}", path.display()),
        path: Some(path.to_path_buf()),
        source: Some(e.error),
    })?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

fn write_and_sync(temp: &mut NamedTempFile, bytes: &[u8]) -> std::io::Result<()> {
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.as_file().sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn persisted_font() -> Font {
        Font {
            name: "Acme Sans".into(),
            location: Some("Acme-Sans".into()),
            variants: vec![FontVariant {
                name: "Acme Sans".into(),
                weight: FontWeight::Bold,
                style: FontStyle::Italic,
                href: Some("Acme-Sans-bold-italic.ttf".into()),
                provenance: RepositoryType::User,
                file_path: PathBuf::from("/fonts/Acme-Sans/Acme-Sans-bold-italic.ttf"),
            }],
        }
    }

    #[test]
    fn test_write_and_read_registry() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.xml");

        let document = RegistryDocument::from_fonts(&[persisted_font()]).unwrap();
        write_registry(&path, &document).unwrap();

        let read = read_registry(&path).unwrap().expect("registry should exist");
        assert_eq!(read.fonts, document.fonts);

        let fonts = read
            .into_fonts(temp_dir.path(), RepositoryType::Document, &path)
            .unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].variants[0].provenance, RepositoryType::Document);
        assert_eq!(
            fonts[0].variants[0].file_path,
            temp_dir
                .path()
                .join("Acme-Sans")
                .join("Acme-Sans-bold-italic.ttf")
        );
    }

    #[test]
    fn test_serialized_shape() {
        let document = RegistryDocument::from_fonts(&[persisted_font()]).unwrap();
        let xml = to_xml_string(&document).unwrap();

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<FontRegistry xmlns=\"http://www.evolus.vn/Namespace/Pencil\">"));
        assert!(xml.contains("<Font name=\"Acme Sans\" location=\"Acme-Sans\">"));
        assert!(xml.contains(
            "<FontStyle weight=\"bold\" style=\"italic\" href=\"Acme-Sans-bold-italic.ttf\"/>"
        ));
    }

    #[test]
    fn test_read_registry_without_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.xml");
        fs::write(
            &path,
            r#"<FontRegistry><Font name="Mono" location="Mono"/></FontRegistry>"#,
        )
        .unwrap();

        let document = read_registry(&path).unwrap().unwrap();
        assert_eq!(document.fonts.len(), 1);
        assert!(document.fonts[0].styles.is_empty());
    }

    #[test]
    fn test_read_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_registry(&temp_dir.path().join("registry.xml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unknown_weight_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.xml");
        fs::write(
            &path,
            r#"<FontRegistry><Font name="Mono" location="Mono"><FontStyle weight="900" style="normal" href="a.ttf"/></Font></FontRegistry>"#,
        )
        .unwrap();

        let document = read_registry(&path).unwrap().unwrap();
        let err = document
            .into_fonts(temp_dir.path(), RepositoryType::User, &path)
            .unwrap_err();
        assert!(matches!(err, FontShelfError::Registry { .. }));
    }

    #[test]
    fn test_unsaved_font_cannot_be_serialized() {
        let mut font = persisted_font();
        font.location = None;
        assert!(RegistryDocument::from_fonts(&[font]).is_err());
    }
}
