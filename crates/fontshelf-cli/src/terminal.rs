//! Terminal stand-ins for the host application's collaborators.
//!
//! There is no live rendering environment on the command line, so faces are
//! kept in an in-process table and every step is logged.

use async_trait::async_trait;
use fontshelf::{BusyIndicator, FaceHandle, FaceQuery, FaceSource, RenderingEnvironment, UserPrompt};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use url::Url;

/// Rendering environment that records faces and checks their files exist.
#[derive(Default)]
pub struct LoggingEnvironment {
    faces: Mutex<Vec<(FaceHandle, FaceSource)>>,
    next_handle: Mutex<u64>,
}

impl LoggingEnvironment {
    /// Faces currently registered, in registration order.
    pub fn faces(&self) -> Vec<FaceSource> {
        self.faces
            .lock()
            .map(|faces| faces.iter().map(|(_, source)| source.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RenderingEnvironment for LoggingEnvironment {
    async fn add_face(&self, source: &FaceSource) -> fontshelf::Result<FaceHandle> {
        let exists = Url::parse(&source.source_url)
            .ok()
            .and_then(|url| url.to_file_path().ok())
            .is_some_and(|path| path.exists());
        if !exists {
            return Err(fontshelf::FontShelfError::FaceRejected {
                message: format!("{} does not exist", source.source_url),
            });
        }

        let handle = {
            let mut next = self
                .next_handle
                .lock()
                .map_err(|_| fontshelf::FontShelfError::Other("handle counter poisoned".into()))?;
            *next += 1;
            FaceHandle(*next)
        };

        info!("Registered {} {} {} from {}", source.family, source.weight, source.style, source.css_src());
        if let Ok(mut faces) = self.faces.lock() {
            faces.push((handle, source.clone()));
        }
        Ok(handle)
    }

    async fn probe_ready(&self, query: &FaceQuery) -> fontshelf::Result<()> {
        debug!("Ready: {}", query);
        Ok(())
    }

    fn active_faces(&self) -> Vec<FaceHandle> {
        self.faces
            .lock()
            .map(|faces| faces.iter().map(|(handle, _)| *handle).collect())
            .unwrap_or_default()
    }

    fn remove_face(&self, handle: FaceHandle) {
        if let Ok(mut faces) = self.faces.lock() {
            faces.retain(|(h, _)| *h != handle);
        }
    }
}

/// Asks on stdin unless `assume_yes` is set.
pub struct TerminalPrompt {
    pub assume_yes: bool,
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str, accept_label: &str, cancel_label: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stdout = tokio::io::stdout();
        let question = format!("{} [{}/{}] ", message, accept_label, cancel_label);
        if stdout.write_all(question.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        if stdin.read_line(&mut line).await.is_err() {
            return false;
        }
        is_accept(&line, accept_label)
    }
}

/// Whether a typed answer means `accept_label`.
pub fn is_accept(answer: &str, accept_label: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y")
        || answer.eq_ignore_ascii_case("yes")
        || answer.eq_ignore_ascii_case(accept_label)
}

/// Logs busy transitions.
pub struct LogBusy;

impl BusyIndicator for LogBusy {
    fn busy(&self) {
        debug!("busy");
    }

    fn unbusy(&self) {
        debug!("idle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontshelf::{FontStyle, FontWeight};

    #[test]
    fn test_is_accept() {
        assert!(is_accept("y\n", "Uninstall"));
        assert!(is_accept("uninstall", "Uninstall"));
        assert!(!is_accept("\n", "Uninstall"));
        assert!(!is_accept("cancel", "Uninstall"));
    }

    #[tokio::test]
    async fn test_logging_environment_rejects_missing_file() {
        let env = LoggingEnvironment::default();
        let source = FaceSource {
            family: "Ghost".into(),
            source_url: "file:///nonexistent/ghost.ttf".into(),
            format: "truetype",
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
        };
        assert!(env.add_face(&source).await.is_err());
        assert!(env.active_faces().is_empty());
    }

    #[tokio::test]
    async fn test_logging_environment_tracks_faces() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("a.ttf");
        std::fs::write(&file, b"a").unwrap();

        let env = LoggingEnvironment::default();
        let source = FaceSource {
            family: "Acme".into(),
            source_url: fontshelf::platform::file_url(&file).unwrap().to_string(),
            format: "truetype",
            weight: FontWeight::Bold,
            style: FontStyle::Normal,
        };
        let handle = env.add_face(&source).await.unwrap();
        assert_eq!(env.faces(), vec![source]);

        env.remove_face(handle);
        assert!(env.faces().is_empty());
    }
}
