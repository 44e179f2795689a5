//! Data models and constants shared across screenshotto
//!
//! - Application identity (name, version string)
//! - Capture backend identification
//! - Output image formats

use std::path::Path;

use crate::error::{AppError, AppResult};

/// Application name, used for directories, the config section and the
/// default image subdirectory.
pub const APP_NAME: &str = "Screenshotto";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns `"Screenshotto - version X.Y.Z"`
pub fn version_string() -> String {
    format!("{APP_NAME} - version {VERSION}")
}

/// Identifies the capture backend in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// No backend compiled in
    None,
    /// OS screenshot API via xcap
    Native,
    /// Synthetic images for tests
    Mock,
}

impl BackendType {
    /// Returns the backend type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::None => "none",
            BackendType::Native => "native",
            BackendType::Mock => "mock",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Image format chosen from the configured filename's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Lossless PNG
    Png,
    /// JPEG (alpha is dropped)
    Jpeg,
    /// Lossless WebP
    Webp,
    /// Uncompressed bitmap
    Bmp,
}

impl ImageFormat {
    /// Maps a file extension (without the dot, any case) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::Webp),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Picks the format for `path` from its extension
    ///
    /// # Errors
    ///
    /// [`AppError::UnsupportedFormat`] when the extension is missing or unknown.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| AppError::UnsupportedFormat {
            extension: ext.to_string(),
        })
    }

    /// Returns the format name used in logs and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }
}
