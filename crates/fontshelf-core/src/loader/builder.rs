//! Builder for configuring a FontLoader.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::LoaderConfig;
use crate::error::Result;
use crate::loader::environment::{
    AutoConfirm, BusyIndicator, FontEvent, NoBusyIndicator, RenderingEnvironment, UserPrompt,
};
use crate::loader::FontLoader;
use crate::models::RepositoryType;
use crate::platform;
use crate::repository::FontRepository;

/// Builder for configuring a [`FontLoader`].
///
/// # Example
///
/// ```rust,ignore
/// use fontshelf::FontLoader;
///
/// let mut loader = FontLoader::builder(environment)
///     .user_repo_dir("/home/me/.local/share/fontshelf/fonts")
///     .prompt(dialogs)
///     .build()?;
/// loader.load_fonts().await;
/// ```
pub struct FontLoaderBuilder {
    environment: Arc<dyn RenderingEnvironment>,
    user_repo_dir: Option<PathBuf>,
    document_repo_dir: Option<PathBuf>,
    temp_root: Option<PathBuf>,
    prompt: Arc<dyn UserPrompt>,
    busy: Arc<dyn BusyIndicator>,
    event_tx: Option<mpsc::Sender<FontEvent>>,
    face_timeout: Option<Duration>,
}

impl FontLoaderBuilder {
    /// Create a new builder driving `environment`.
    pub fn new(environment: Arc<dyn RenderingEnvironment>) -> Self {
        Self {
            environment,
            user_repo_dir: None,
            document_repo_dir: None,
            temp_root: None,
            prompt: Arc::new(AutoConfirm),
            busy: Arc::new(NoBusyIndicator),
            event_tx: None,
            face_timeout: Some(LoaderConfig::FACE_LOAD_TIMEOUT),
        }
    }

    /// Root of the user repository.
    ///
    /// Default: `<platform data dir>/fontshelf/fonts`
    pub fn user_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_repo_dir = Some(dir.into());
        self
    }

    /// Root of the document repository of the open document.
    ///
    /// Default: none
    pub fn document_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.document_repo_dir = Some(dir.into());
        self
    }

    /// Working directory of the open document. Embedding without a document
    /// repository creates one under `<root>/fonts`.
    ///
    /// Default: a private temporary directory removed with the loader
    pub fn temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Confirmation prompt used before uninstalling.
    ///
    /// Default: confirms everything
    pub fn prompt(mut self, prompt: Arc<dyn UserPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn busy_indicator(mut self, busy: Arc<dyn BusyIndicator>) -> Self {
        self.busy = busy;
        self
    }

    /// Channel receiving [`FontEvent`]s.
    pub fn events(mut self, tx: mpsc::Sender<FontEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Bound on each await of a face registration; `None` waits forever.
    ///
    /// Default: [`LoaderConfig::FACE_LOAD_TIMEOUT`]
    pub fn face_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.face_timeout = timeout;
        self
    }

    /// Build the loader. Nothing is read from disk until
    /// [`FontLoader::load_fonts`].
    pub fn build(self) -> Result<FontLoader> {
        let user_repo_dir = match self.user_repo_dir {
            Some(dir) => dir,
            None => platform::user_fonts_dir()?,
        };

        Ok(FontLoader {
            user_repo: FontRepository::new(user_repo_dir, RepositoryType::User),
            document_repo: self
                .document_repo_dir
                .map(|dir| FontRepository::new(dir, RepositoryType::Document)),
            environment: self.environment,
            prompt: self.prompt,
            busy: self.busy,
            event_tx: self.event_tx,
            managed: HashMap::new(),
            face_timeout: self.face_timeout,
            temp_root: self.temp_root,
            scratch_dir: None,
        })
    }
}
