//! Platform abstraction layer for cross-platform compatibility.
//!
//! All platform-dependent directory lookups and path-to-URL conversions live
//! here rather than being scattered through the repository and loader code.

pub mod paths;

pub use paths::{app_data_dir, dotted_extension, file_url, user_fonts_dir};
