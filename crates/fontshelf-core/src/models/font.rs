//! Font catalog types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Normalized weight stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(FontWeight::Normal),
            "bold" => Some(FontWeight::Bold),
            _ => None,
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized style stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(FontStyle::Normal),
            "italic" => Some(FontStyle::Italic),
            _ => None,
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of variants a font can be installed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl VariantKind {
    /// Taxonomy order; variants are created in this order.
    pub const ALL: [VariantKind; 4] = [
        VariantKind::Regular,
        VariantKind::Bold,
        VariantKind::Italic,
        VariantKind::BoldItalic,
    ];

    pub fn weight(&self) -> FontWeight {
        match self {
            VariantKind::Regular | VariantKind::Italic => FontWeight::Normal,
            VariantKind::Bold | VariantKind::BoldItalic => FontWeight::Bold,
        }
    }

    pub fn style(&self) -> FontStyle {
        match self {
            VariantKind::Regular | VariantKind::Bold => FontStyle::Normal,
            VariantKind::Italic | VariantKind::BoldItalic => FontStyle::Italic,
        }
    }

    /// Name of the input field carrying this variant's source file.
    pub fn input_key(&self) -> &'static str {
        match self {
            VariantKind::Regular => "regularFilePath",
            VariantKind::Bold => "boldFilePath",
            VariantKind::Italic => "italicFilePath",
            VariantKind::BoldItalic => "boldItalicFilePath",
        }
    }
}

/// Which repository a face came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryType {
    User,
    Document,
}

impl RepositoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryType::User => "user",
            RepositoryType::Document => "document",
        }
    }
}

impl fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weight/style face of a font, backed by one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontVariant {
    /// Family name, same as the owning font.
    pub name: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// File name relative to the font's location; `None` until saved.
    pub href: Option<String>,
    #[serde(rename = "type")]
    pub provenance: RepositoryType,
    /// Absolute path of the backing file. Before the first save this is the
    /// source file the variant will be copied from.
    pub file_path: PathBuf,
}

/// A named font family and its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub name: String,
    /// Subdirectory of the repository; `None` until the font is first saved.
    pub location: Option<String>,
    pub variants: Vec<FontVariant>,
}

impl Font {
    /// A font that has not been persisted yet.
    pub fn unsaved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
            variants: Vec::new(),
        }
    }

    /// Independent copy that the next save will copy into a new location,
    /// with every variant tagged as belonging to `provenance`.
    pub fn detached_copy(&self, provenance: RepositoryType) -> Self {
        let mut copy = self.clone();
        copy.location = None;
        for variant in &mut copy.variants {
            variant.provenance = provenance;
        }
        copy
    }
}

/// Request to install a font from source files.
///
/// Mirrors the form data of the install dialog; any variant may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFont {
    pub font_name: String,
    #[serde(default)]
    pub regular_file_path: Option<PathBuf>,
    #[serde(default)]
    pub bold_file_path: Option<PathBuf>,
    #[serde(default)]
    pub italic_file_path: Option<PathBuf>,
    #[serde(default)]
    pub bold_italic_file_path: Option<PathBuf>,
}

impl NewFont {
    pub fn new(font_name: impl Into<String>) -> Self {
        Self {
            font_name: font_name.into(),
            ..Default::default()
        }
    }

    /// Set the source file for `kind`.
    pub fn with_variant(mut self, kind: VariantKind, path: impl Into<PathBuf>) -> Self {
        let path = Some(path.into());
        match kind {
            VariantKind::Regular => self.regular_file_path = path,
            VariantKind::Bold => self.bold_file_path = path,
            VariantKind::Italic => self.italic_file_path = path,
            VariantKind::BoldItalic => self.bold_italic_file_path = path,
        }
        self
    }

    /// Source file supplied for `kind`, if any. Empty paths count as absent.
    pub fn source_for(&self, kind: VariantKind) -> Option<&Path> {
        let path = match kind {
            VariantKind::Regular => &self.regular_file_path,
            VariantKind::Bold => &self.bold_file_path,
            VariantKind::Italic => &self.italic_file_path,
            VariantKind::BoldItalic => &self.bold_italic_file_path,
        };
        path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_mapping() {
        assert_eq!(VariantKind::Regular.weight(), FontWeight::Normal);
        assert_eq!(VariantKind::Regular.style(), FontStyle::Normal);
        assert_eq!(VariantKind::Bold.weight(), FontWeight::Bold);
        assert_eq!(VariantKind::Bold.style(), FontStyle::Normal);
        assert_eq!(VariantKind::Italic.weight(), FontWeight::Normal);
        assert_eq!(VariantKind::Italic.style(), FontStyle::Italic);
        assert_eq!(VariantKind::BoldItalic.weight(), FontWeight::Bold);
        assert_eq!(VariantKind::BoldItalic.style(), FontStyle::Italic);
    }

    #[test]
    fn test_weight_and_style_parse() {
        assert_eq!(FontWeight::parse("bold"), Some(FontWeight::Bold));
        assert_eq!(FontWeight::parse("700"), None);
        assert_eq!(FontStyle::parse("italic"), Some(FontStyle::Italic));
        assert_eq!(FontStyle::parse("oblique"), None);
    }

    #[test]
    fn test_new_font_from_form_json() {
        let json = r#"{"fontName": "Acme Sans", "regularFilePath": "/tmp/a.ttf", "boldFilePath": ""}"#;
        let data: NewFont = serde_json::from_str(json).unwrap();
        assert_eq!(data.font_name, "Acme Sans");
        assert_eq!(
            data.source_for(VariantKind::Regular),
            Some(Path::new("/tmp/a.ttf"))
        );
        assert_eq!(data.source_for(VariantKind::Bold), None);
        assert_eq!(data.source_for(VariantKind::Italic), None);
    }

    #[test]
    fn test_detached_copy_is_independent() {
        let mut font = Font::unsaved("Acme Sans");
        font.location = Some("Acme-Sans".into());
        font.variants.push(FontVariant {
            name: "Acme Sans".into(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            href: Some("Acme-Sans-normal-normal.ttf".into()),
            provenance: RepositoryType::User,
            file_path: PathBuf::from("/fonts/Acme-Sans/Acme-Sans-normal-normal.ttf"),
        });

        let mut copy = font.detached_copy(RepositoryType::Document);
        assert_eq!(copy.location, None);
        assert_eq!(copy.variants[0].provenance, RepositoryType::Document);

        copy.variants[0].href = None;
        assert_eq!(
            font.variants[0].href.as_deref(),
            Some("Acme-Sans-normal-normal.ttf")
        );
        assert_eq!(font.variants[0].provenance, RepositoryType::User);
    }
}
