//! Keeps the rendering environment's font set in step with the repositories.
//!
//! The loader owns the user repository and, while a document is open, a
//! document repository. Reconciliation registers every face of both, user
//! faces first, strictly one at a time.

mod builder;
pub mod environment;

pub use builder::FontLoaderBuilder;
pub use environment::{
    AutoConfirm, BusyIndicator, FaceHandle, FaceQuery, FaceSource, FontEvent, NoBusyIndicator,
    RenderingEnvironment, UserPrompt,
};

use crate::config::{LoaderConfig, RepositoryConfig};
use crate::models::{Font, FontVariant, NewFont, RepositoryType};
use crate::repository::FontRepository;
use crate::{FontShelfError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Previously registered faces taken out of the environment.
    pub removed: usize,
    /// Faces registered and confirmed ready.
    pub registered: usize,
    /// Faces that were rejected, never became ready, or timed out.
    pub failed: usize,
}

/// Result of [`FontLoader::remove_font`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The user declined; nothing changed.
    Cancelled,
    Removed(SyncReport),
}

/// Owner of the font repositories and the faces registered from them.
///
/// Construct one per application with [`FontLoader::builder`] and pass it to
/// whatever needs it.
pub struct FontLoader {
    user_repo: FontRepository,
    document_repo: Option<FontRepository>,
    environment: Arc<dyn RenderingEnvironment>,
    prompt: Arc<dyn UserPrompt>,
    busy: Arc<dyn BusyIndicator>,
    event_tx: Option<mpsc::Sender<FontEvent>>,
    /// Faces this loader registered, by environment handle.
    managed: HashMap<FaceHandle, RepositoryType>,
    face_timeout: Option<Duration>,
    temp_root: Option<PathBuf>,
    scratch_dir: Option<TempDir>,
}

impl FontLoader {
    /// Create a builder for a loader driving `environment`.
    pub fn builder(environment: Arc<dyn RenderingEnvironment>) -> FontLoaderBuilder {
        FontLoaderBuilder::new(environment)
    }

    pub fn user_repo(&self) -> &FontRepository {
        &self.user_repo
    }

    pub fn document_repo(&self) -> Option<&FontRepository> {
        self.document_repo.as_ref()
    }

    /// Faces currently registered by this loader and their provenance.
    pub fn managed_faces(&self) -> &HashMap<FaceHandle, RepositoryType> {
        &self.managed
    }

    /// Point the document repository at `dir_path`, or drop it with `None`.
    pub fn set_document_repo_dir(&mut self, dir_path: Option<PathBuf>) {
        self.document_repo = dir_path.map(|dir| {
            debug!("Document font repository set to {}", dir.display());
            FontRepository::new(dir, RepositoryType::Document)
        });
    }

    /// Reload both repositories and make the environment match them.
    ///
    /// Faces this loader registered earlier are removed first. The faces of
    /// the user repository, then of the document repository, are then
    /// registered one after another. A face that fails is skipped. The
    /// `UserFontsLoaded` event is sent when the pass is over, whatever failed.
    /// A full event queue drops the event instead of stalling the pass.
    pub async fn load_fonts(&mut self) -> SyncReport {
        self.load_repositories();

        let targets: Vec<FontVariant> = self
            .user_repo
            .faces()
            .chain(self.document_repo.iter().flat_map(|repo| repo.faces()))
            .cloned()
            .collect();

        let mut report = SyncReport {
            removed: self.remove_managed_faces(),
            ..SyncReport::default()
        };

        for face in &targets {
            if self.register_face(face).await {
                report.registered += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            "Font sync complete: {} removed, {} registered, {} failed",
            report.removed, report.registered, report.failed
        );
        self.emit(FontEvent::UserFontsLoaded);
        report
    }

    /// Re-read both repositories from disk without touching the environment.
    pub fn load_repositories(&mut self) {
        if let Err(e) = self.user_repo.load() {
            warn!("Continuing without user fonts: {}", e);
        }
        if let Some(repo) = &mut self.document_repo {
            if let Err(e) = repo.load() {
                warn!("Continuing without document fonts: {}", e);
            }
        }
    }

    /// Whether the user repository has a font called `name`.
    ///
    /// Reads the registry first if the catalog is not current.
    pub fn is_font_existing(&mut self, name: &str) -> bool {
        if let Err(e) = self.user_repo.ensure_loaded() {
            warn!("Checking '{}' against a stale user repository: {}", name, e);
        }
        self.user_repo.get_font(name).is_some()
    }

    /// Add a font to the user repository and resynchronize.
    pub async fn install_new_font(&mut self, data: &NewFont) -> SyncReport {
        if let Err(e) = self.user_repo.add_font(data) {
            warn!("Failed to install font '{}': {}", data.font_name, e);
        }
        self.load_fonts().await
    }

    /// Ask the user, then uninstall `name` from the user repository and
    /// resynchronize.
    pub async fn remove_font(&mut self, name: &str) -> RemoveOutcome {
        let message = format!("Are you sure you want to uninstall '{}'?", name);
        let confirmed = self
            .prompt
            .confirm(&message, LoaderConfig::UNINSTALL_LABEL, LoaderConfig::CANCEL_LABEL)
            .await;
        if !confirmed {
            debug!("Uninstall of '{}' cancelled", name);
            return RemoveOutcome::Cancelled;
        }

        self.busy.busy();
        match self.user_repo.remove_font(name) {
            Ok(true) => {}
            Ok(false) => debug!("Font '{}' was not installed", name),
            Err(e) => warn!("Failed to uninstall font '{}': {}", name, e),
        }
        let report = self.load_fonts().await;
        self.busy.unbusy();

        RemoveOutcome::Removed(report)
    }

    /// Fonts of the user repository as last read.
    pub fn get_user_fonts(&self) -> &[Font] {
        self.user_repo.fonts()
    }

    /// Copy the named user fonts into the document repository.
    ///
    /// Creates a scratch document repository when none is set. Names already
    /// in the document repository, or unknown to the user repository, are
    /// skipped. Returns how many fonts were embedded.
    pub async fn embed_to_document_repo<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        if self.document_repo.is_none() {
            match self.scratch_fonts_dir() {
                Ok(dir) => {
                    info!("Creating document font repository at {}", dir.display());
                    self.document_repo = Some(FontRepository::new(dir, RepositoryType::Document));
                }
                Err(e) => {
                    error!("Cannot create document font repository: {}", e);
                    return 0;
                }
            }
        }

        if let Err(e) = self.user_repo.ensure_loaded() {
            warn!("Embedding from a stale user repository: {}", e);
        }

        let user_repo = &self.user_repo;
        let Some(document_repo) = self.document_repo.as_mut() else {
            return 0;
        };
        if let Err(e) = document_repo.ensure_loaded() {
            error!("Not embedding into an unreadable document repository: {}", e);
            return 0;
        }

        let mut embedded = 0;
        for name in names {
            let name = name.as_ref();
            if document_repo.get_font(name).is_some() {
                debug!("Font '{}' already embedded", name);
                continue;
            }
            let Some(font) = user_repo.get_font(name) else {
                debug!("Font '{}' is not a user font, not embedding", name);
                continue;
            };

            info!("Embedding font '{}'", name);
            document_repo.push_unsaved(font);
            embedded += 1;
        }

        if embedded > 0 {
            if let Err(e) = document_repo.save() {
                warn!("Embedded fonts were not persisted: {}", e);
            }
        }
        embedded
    }

    /// Register one face and wait until it is ready. Returns `false` on any
    /// failure.
    async fn register_face(&mut self, face: &FontVariant) -> bool {
        let source = match FaceSource::for_variant(face) {
            Ok(source) => source,
            Err(e) => {
                warn!("Skipping face of '{}': {}", face.name, e);
                return false;
            }
        };

        let environment = Arc::clone(&self.environment);
        let handle = match bounded(self.face_timeout, environment.add_face(&source)).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to add face {}: {}", source.query(), e);
                return false;
            }
        };
        self.managed.insert(handle, face.provenance);

        let query = source.query();
        match bounded(self.face_timeout, environment.probe_ready(&query)).await {
            Ok(()) => {
                debug!("Face {} ready ({})", query, face.provenance);
                true
            }
            Err(e) => {
                warn!("Face {} did not become ready: {}", query, e);
                false
            }
        }
    }

    /// Remove every active face this loader registered.
    fn remove_managed_faces(&mut self) -> usize {
        let owned: Vec<FaceHandle> = self
            .environment
            .active_faces()
            .into_iter()
            .filter(|handle| self.managed.contains_key(handle))
            .collect();

        for handle in &owned {
            self.environment.remove_face(*handle);
        }
        self.managed.clear();

        debug!("Removed {} managed face(s)", owned.len());
        owned.len()
    }

    /// Directory for a document repository when no document directory is set.
    fn scratch_fonts_dir(&mut self) -> Result<PathBuf> {
        if let Some(root) = &self.temp_root {
            return Ok(root.join(RepositoryConfig::DOCUMENT_FONTS_DIR_NAME));
        }

        if self.scratch_dir.is_none() {
            let dir = tempfile::Builder::new()
                .prefix("fontshelf-")
                .tempdir()
                .map_err(|e| FontShelfError::Io {
                    message: "Failed to create scratch directory".to_string(),
                    path: None,
                    source: Some(e),
                })?;
            self.scratch_dir = Some(dir);
        }

        self.scratch_dir
            .as_ref()
            .map(|dir| dir.path().join(RepositoryConfig::DOCUMENT_FONTS_DIR_NAME))
            .ok_or_else(|| FontShelfError::Other("Scratch directory unavailable".to_string()))
    }

    /// Notify listeners without waiting on them.
    fn emit(&self, event: FontEvent) {
        let Some(tx) = &self.event_tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Event queue full, dropping {}", event.name());
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("No listener for {}", event.name());
            }
        }
    }
}

/// Await `fut`, giving up after `limit` when one is set.
async fn bounded<T>(limit: Option<Duration>, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| FontShelfError::Timeout(limit))?,
        None => fut.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Environment that never resolves a probe.
    struct StalledEnvironment {
        next: Mutex<u64>,
    }

    #[async_trait]
    impl RenderingEnvironment for StalledEnvironment {
        async fn add_face(&self, _source: &FaceSource) -> Result<FaceHandle> {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            Ok(FaceHandle(*next))
        }

        async fn probe_ready(&self, _query: &FaceQuery) -> Result<()> {
            std::future::pending().await
        }

        fn active_faces(&self) -> Vec<FaceHandle> {
            Vec::new()
        }

        fn remove_face(&self, _handle: FaceHandle) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result = bounded(Some(Duration::from_secs(1)), std::future::pending::<Result<()>>()).await;
        assert!(matches!(result, Err(FontShelfError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_bounded_without_limit_passes_through() {
        let result = bounded(None, async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_probe_does_not_block_sync() {
        let repo_dir = tempfile::TempDir::new().unwrap();
        let mut loader = FontLoader::builder(Arc::new(StalledEnvironment {
            next: Mutex::new(0),
        }))
        .user_repo_dir(repo_dir.path())
        .face_timeout(Some(Duration::from_secs(2)))
        .build()
        .unwrap();

        let source = repo_dir.path().join("a.ttf");
        std::fs::write(&source, b"a").unwrap();
        let report = loader
            .install_new_font(
                &NewFont::new("Slow").with_variant(crate::models::VariantKind::Regular, &source),
            )
            .await;
        assert_eq!(report.registered, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(loader.managed_faces().len(), 1);
    }
}
