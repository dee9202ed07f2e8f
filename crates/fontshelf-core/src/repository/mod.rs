//! Directory-backed font repositories.
//!
//! A repository owns one directory:
//!
//! ```text
//! <dir>/registry.xml
//! <dir>/<location>/<location>-<weight>-<style>.<ext>
//! ```
//!
//! Mutations always reload first, persist immediately, and leave the
//! in-memory catalog marked [`CacheState::Dirty`] so the next read goes back
//! to disk.

pub mod naming;
pub mod registry;

use crate::config::RepositoryConfig;
use crate::models::{Font, FontVariant, NewFont, RepositoryType, VariantKind};
use crate::{FontShelfError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub use registry::RegistryDocument;

/// Freshness of a repository's in-memory catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// Never read from disk.
    #[default]
    Empty,
    /// Matches the registry on disk.
    Loaded,
    /// Mutated or partially read; must be reloaded before it is trusted.
    Dirty,
}

/// A catalog of fonts persisted in one directory.
#[derive(Debug, Clone)]
pub struct FontRepository {
    dir_path: PathBuf,
    repo_type: RepositoryType,
    fonts: Vec<Font>,
    state: CacheState,
}

impl FontRepository {
    /// Create an empty, unloaded repository rooted at `dir_path`.
    pub fn new(dir_path: impl Into<PathBuf>, repo_type: RepositoryType) -> Self {
        Self {
            dir_path: dir_path.into(),
            repo_type,
            fonts: Vec::new(),
            state: CacheState::Empty,
        }
    }

    pub fn dir_path(&self) -> &Path {
        &self.dir_path
    }

    pub fn repo_type(&self) -> RepositoryType {
        self.repo_type
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == CacheState::Loaded
    }

    pub fn registry_path(&self) -> PathBuf {
        self.dir_path.join(RepositoryConfig::REGISTRY_FILE_NAME)
    }

    /// Fonts in registry order. May be stale unless [`is_loaded`](Self::is_loaded).
    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    /// All variants of all fonts, in font order then variant order.
    pub fn faces(&self) -> impl Iterator<Item = &FontVariant> + '_ {
        self.fonts.iter().flat_map(|font| font.variants.iter())
    }

    /// Exact-name lookup among the fonts currently in memory.
    pub fn get_font(&self, name: &str) -> Option<&Font> {
        self.fonts.iter().find(|font| font.name == name)
    }

    /// Replace the in-memory catalog with the registry on disk.
    ///
    /// A missing registry is an empty repository. On a parse failure the
    /// catalog is left empty and [`CacheState::Dirty`]; a later call may
    /// succeed.
    pub fn load(&mut self) -> Result<()> {
        self.fonts.clear();
        let registry_path = self.registry_path();

        let result = registry::read_registry(&registry_path).and_then(|document| match document {
            Some(document) => document.into_fonts(&self.dir_path, self.repo_type, &registry_path),
            None => Ok(Vec::new()),
        });

        match result {
            Ok(fonts) => {
                debug!(
                    "Loaded {} {} fonts from {}",
                    fonts.len(),
                    self.repo_type,
                    self.dir_path.display()
                );
                self.fonts = fonts;
                self.state = CacheState::Loaded;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load font registry {}: {}", registry_path.display(), e);
                self.state = CacheState::Dirty;
                Err(e)
            }
        }
    }

    /// Reload unless the catalog already matches the disk.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }
        self.load()
    }

    /// Install a font from the source files in `data` and persist it.
    ///
    /// One variant is created per taxonomy entry with a source file, in
    /// taxonomy order. A font with no source files is still recorded. Names
    /// are unique within a repository.
    pub fn add_font(&mut self, data: &NewFont) -> Result<()> {
        self.ensure_loaded()?;

        if self.get_font(&data.font_name).is_some() {
            warn!("Font '{}' already exists in {}", data.font_name, self.dir_path.display());
            return Err(FontShelfError::FontExists {
                name: data.font_name.clone(),
            });
        }

        let mut font = Font::unsaved(data.font_name.clone());
        for kind in VariantKind::ALL {
            let Some(source) = data.source_for(kind) else {
                continue;
            };
            font.variants.push(FontVariant {
                name: data.font_name.clone(),
                weight: kind.weight(),
                style: kind.style(),
                href: None,
                provenance: self.repo_type,
                file_path: source.to_path_buf(),
            });
        }

        info!(
            "Adding font '{}' with {} variant(s) to {}",
            font.name,
            font.variants.len(),
            self.dir_path.display()
        );

        self.fonts.push(font);
        let saved = self.save();
        self.state = CacheState::Dirty;
        saved
    }

    /// Remove the font named `name` and delete its directory.
    ///
    /// Returns `false` when no such font exists.
    pub fn remove_font(&mut self, name: &str) -> Result<bool> {
        self.ensure_loaded()?;

        let Some(index) = self.fonts.iter().position(|font| font.name == name) else {
            debug!("Font '{}' not found in {}, nothing to remove", name, self.dir_path.display());
            return Ok(false);
        };
        let font = self.fonts.remove(index);

        if let Some(location) = &font.location {
            let location_path = self.dir_path.join(location);
            match fs::remove_dir_all(&location_path) {
                Ok(()) => debug!("Deleted {}", location_path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Font directory already gone: {}", location_path.display());
                }
                Err(e) => {
                    error!("Failed to delete {}: {}", location_path.display(), e);
                    self.state = CacheState::Dirty;
                    return Err(FontShelfError::io_with_path(e, location_path));
                }
            }
        }

        info!("Removed font '{}' from {}", font.name, self.dir_path.display());

        let saved = self.save();
        self.state = CacheState::Dirty;
        saved.map(|()| true)
    }

    /// Append a copy of `font` that the next save will copy into this
    /// repository's own directory.
    pub fn push_unsaved(&mut self, font: &Font) {
        self.fonts.push(font.detached_copy(self.repo_type));
        self.state = CacheState::Dirty;
    }

    /// Persist the catalog, copying in files for fonts without a location.
    ///
    /// Either every new font is copied in and the registry rewritten, or
    /// nothing changes: on failure the directories created by this pass are
    /// removed, the catalog keeps its unsaved fonts, and the error is logged
    /// and returned.
    pub fn save(&mut self) -> Result<()> {
        self.write_catalog().map_err(|e| {
            error!("Failed to save font registry in {}: {}", self.dir_path.display(), e);
            e
        })
    }

    fn write_catalog(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir_path).map_err(|e| FontShelfError::Io {
            message: format!("Failed to create directory: {}", self.dir_path.display()),
            path: Some(self.dir_path.clone()),
            source: Some(e),
        })?;

        let mut staged = self.fonts.clone();
        let mut created = Vec::new();

        match self.stage_new_fonts(&mut staged, &mut created) {
            Ok(()) => {
                self.fonts = staged;
                Ok(())
            }
            Err(e) => {
                for dir in created.iter().rev() {
                    if let Err(cleanup) = fs::remove_dir_all(dir) {
                        warn!("Failed to clean up {}: {}", dir.display(), cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    /// Copy every unsaved font of `fonts` into a fresh location and write the
    /// registry. Directories are recorded in `created` as they are made.
    fn stage_new_fonts(&self, fonts: &mut [Font], created: &mut Vec<PathBuf>) -> Result<()> {
        let mut claimed: HashSet<String> = fonts
            .iter()
            .filter_map(|font| font.location.clone())
            .collect();

        for font in fonts.iter_mut() {
            if font.location.is_some() {
                continue;
            }

            let slug = naming::location_slug(&font.name);
            let location = naming::resolve_location(&self.dir_path, &slug, &claimed);
            let location_path = self.dir_path.join(&location);
            fs::create_dir(&location_path)
                .map_err(|e| FontShelfError::io_with_path(e, &location_path))?;
            created.push(location_path.clone());

            claimed.insert(location.clone());
            font.location = Some(location.clone());
            debug!("Assigned location '{}' to font '{}'", location, font.name);

            for variant in &mut font.variants {
                copy_variant(variant, &location, &location_path)?;
            }
        }

        let document = RegistryDocument::from_fonts(fonts)?;
        registry::write_registry(&self.registry_path(), &document)
    }
}

/// Copy a variant's source file into `location_path` and point it there.
fn copy_variant(variant: &mut FontVariant, location: &str, location_path: &Path) -> Result<()> {
    if !variant.file_path.exists() {
        return Err(FontShelfError::FileNotFound(variant.file_path.clone()));
    }

    let href = naming::variant_href(location, variant.weight, variant.style, &variant.file_path);
    let target = location_path.join(&href);

    fs::copy(&variant.file_path, &target).map_err(|e| FontShelfError::Io {
        message: format!(
            "Failed to copy {} to {}",
            variant.file_path.display(),
            target.display()
        ),
        path: Some(target.clone()),
        source: Some(e),
    })?;

    variant.href = Some(href);
    variant.file_path = target;
    Ok(())
}
