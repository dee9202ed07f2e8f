//! fontshelf - installable font repositories kept in sync with a live
//! font-rendering environment.
//!
//! A [`FontRepository`] is a directory holding `registry.xml` and one
//! subdirectory per installed font. The [`FontLoader`] owns the user
//! repository and an optional per-document repository, and registers their
//! faces with a [`RenderingEnvironment`] supplied by the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use fontshelf::{FontLoader, NewFont, VariantKind};
//!
//! #[tokio::main]
//! async fn main() -> fontshelf::Result<()> {
//!     let mut loader = FontLoader::builder(environment).build()?;
//!
//!     let report = loader
//!         .install_new_font(
//!             &NewFont::new("Acme Sans").with_variant(VariantKind::Regular, "/tmp/a.ttf"),
//!         )
//!         .await;
//!     println!("{} faces registered", report.registered);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod platform;
pub mod repository;

pub use error::{FontShelfError, Result};
pub use loader::{
    BusyIndicator, FaceHandle, FaceQuery, FaceSource, FontEvent, FontLoader, FontLoaderBuilder,
    RemoveOutcome, RenderingEnvironment, SyncReport, UserPrompt,
};
pub use models::{Font, FontStyle, FontVariant, FontWeight, NewFont, RepositoryType, VariantKind};
pub use repository::{CacheState, FontRepository};
