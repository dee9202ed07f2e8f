//! Collaborators the font loader drives.
//!
//! The rendering environment, the confirmation prompt, and the busy
//! indicator belong to the host application. The loader only sees them
//! through these traits.

use crate::config::LoaderConfig;
use crate::models::{FontStyle, FontVariant, FontWeight};
use crate::platform::file_url;
use crate::Result;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// Opaque handle to a face registered in the rendering environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceHandle(pub u64);

/// Everything the environment needs to register one face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceSource {
    pub family: String,
    /// `file://` URL of the face file.
    pub source_url: String,
    pub format: &'static str,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl FaceSource {
    /// Build the registration request for a stored variant.
    pub fn for_variant(variant: &FontVariant) -> Result<Self> {
        Ok(Self {
            family: variant.name.clone(),
            source_url: file_url(&variant.file_path)?.to_string(),
            format: LoaderConfig::SOURCE_FORMAT,
            weight: variant.weight,
            style: variant.style,
        })
    }

    /// CSS `src` descriptor, e.g. `url(file:///a.ttf) format('truetype')`.
    pub fn css_src(&self) -> String {
        format!("url({}) format('{}')", self.source_url, self.format)
    }

    /// Readiness query for exactly this face.
    pub fn query(&self) -> FaceQuery {
        FaceQuery {
            family: self.family.clone(),
            weight: self.weight,
            style: self.style,
            size: LoaderConfig::READY_PROBE_SIZE,
        }
    }
}

/// A family/weight/style/size combination to wait for.
///
/// Displays as the CSS font shorthand: `italic bold 1em 'Acme Sans'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceQuery {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub size: &'static str,
}

impl fmt::Display for FaceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} '{}'", self.style, self.weight, self.size, self.family)
    }
}

/// The live font-rendering environment.
#[async_trait]
pub trait RenderingEnvironment: Send + Sync {
    /// Register a face. Resolves once the environment has accepted or
    /// rejected it.
    async fn add_face(&self, source: &FaceSource) -> Result<FaceHandle>;

    /// Resolve once `query` can be rendered.
    async fn probe_ready(&self, query: &FaceQuery) -> Result<()>;

    /// Handles of every face currently active, including ones this crate
    /// did not register.
    fn active_faces(&self) -> Vec<FaceHandle>;

    fn remove_face(&self, handle: FaceHandle);
}

/// Yes/no confirmation shown to the user.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Returns `true` when the user picked `accept_label`.
    async fn confirm(&self, message: &str, accept_label: &str, cancel_label: &str) -> bool;
}

/// Busy state of the host UI.
pub trait BusyIndicator: Send + Sync {
    fn busy(&self);
    fn unbusy(&self);
}

/// Notifications sent to the rest of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontEvent {
    /// Reconciliation finished; the active face set matches the repositories.
    UserFontsLoaded,
}

impl FontEvent {
    /// Channel sized for loader notifications, for [`FontLoaderBuilder::events`].
    ///
    /// [`FontLoaderBuilder::events`]: crate::FontLoaderBuilder::events
    pub fn channel() -> (mpsc::Sender<FontEvent>, mpsc::Receiver<FontEvent>) {
        mpsc::channel(LoaderConfig::EVENT_CHANNEL_CAPACITY)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FontEvent::UserFontsLoaded => "p:UserFontLoaded",
        }
    }
}

/// Prompt that accepts everything. Used when no prompt is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

#[async_trait]
impl UserPrompt for AutoConfirm {
    async fn confirm(&self, _message: &str, _accept_label: &str, _cancel_label: &str) -> bool {
        true
    }
}

/// Busy indicator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBusyIndicator;

impl BusyIndicator for NoBusyIndicator {
    fn busy(&self) {}
    fn unbusy(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryType;
    use std::path::PathBuf;

    #[test]
    fn test_query_display_is_css_shorthand() {
        let query = FaceQuery {
            family: "Acme Sans".into(),
            weight: FontWeight::Bold,
            style: FontStyle::Italic,
            size: "1em",
        };
        assert_eq!(query.to_string(), "italic bold 1em 'Acme Sans'");
    }

    #[cfg(unix)]
    #[test]
    fn test_face_source_for_variant() {
        let variant = FontVariant {
            name: "Acme Sans".into(),
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            href: Some("Acme-Sans-normal-normal.ttf".into()),
            provenance: RepositoryType::User,
            file_path: PathBuf::from("/fonts/Acme-Sans/Acme-Sans-normal-normal.ttf"),
        };

        let source = FaceSource::for_variant(&variant).unwrap();
        assert_eq!(source.family, "Acme Sans");
        assert_eq!(
            source.css_src(),
            "url(file:///fonts/Acme-Sans/Acme-Sans-normal-normal.ttf) format('truetype')"
        );
        assert_eq!(source.query().to_string(), "normal normal 1em 'Acme Sans'");
    }

    #[test]
    fn test_event_name() {
        assert_eq!(FontEvent::UserFontsLoaded.name(), "p:UserFontLoaded");
    }
}
