//! Data models shared by the repository and the loader.

mod font;

pub use font::{Font, FontStyle, FontVariant, FontWeight, NewFont, RepositoryType, VariantKind};
