//! Error types for screenshotto operations
//!
//! Every variant carries enough context to print a useful message, and
//! [`AppError::remediation_hint`] suggests what the user can do about it.
//! The CLI prints the hint after the error itself.
//!
//! ```
//! use screenshotto_core::error::AppError;
//!
//! let error = AppError::UnsupportedFormat {
//!     extension: "tiff".to_string(),
//! };
//! assert!(error.remediation_hint().contains("filename"));
//! ```

use std::path::PathBuf;

use crate::model::BackendType;

/// Result type alias for screenshotto operations
pub type AppResult<T> = Result<T, AppError>;

/// Comprehensive error type for screenshotto
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A platform directory (config, pictures, logs) could not be determined
    #[error("Could not determine the platform {kind} directory")]
    NoPlatformDir {
        /// Which directory was being looked up
        kind: &'static str,
    },

    /// Reading or writing the config file failed
    #[error("I/O error accessing config at {path}: {source}")]
    ConfigIo {
        /// Config file or directory
        path:   PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The final image path is not usable as a file name
    #[error("Invalid image path '{path}': {reason}")]
    InvalidPath {
        /// Offending path
        path:   PathBuf,
        /// What is wrong with it
        reason: String,
    },

    /// The filename extension does not map to a supported image format
    #[error("Unsupported image format '{extension}'")]
    UnsupportedFormat {
        /// Extension taken from the configured filename
        extension: String,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Requested capture backend is not available
    #[error("Backend {backend} is not available on this platform")]
    BackendNotAvailable {
        /// Backend type that's unavailable
        backend: BackendType,
    },

    /// The OS screenshot API reported a failure
    #[error("Screen capture failed: {reason}")]
    CaptureFailed {
        /// Message from the backend
        reason: String,
    },

    /// A schedule file line could not be understood
    #[error("Schedule line {line} is not a valid job ({reason}): '{text}'")]
    ScheduleParse {
        /// 1-based line number
        line:   usize,
        /// The offending line, trimmed
        text:   String,
        /// What the parser expected
        reason: String,
    },

    /// An editor or file viewer could not be launched
    #[error("Failed to launch '{program}': {reason}")]
    LaunchFailed {
        /// Program that was started
        program: String,
        /// Why it failed
        reason:  String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Returns an actionable remediation hint for this error
    pub fn remediation_hint(&self) -> &str {
        match self {
            AppError::NoPlatformDir { .. } => {
                "Set HOME (or the platform equivalent) so the user directories can be located."
            }
            AppError::ConfigIo { .. } => {
                "Check that the config directory exists and is writable. Deleting the config \
                 file is safe; it will be regenerated with defaults."
            }
            AppError::InvalidPath { .. } => {
                "Check img_dir, strftime and filename in the config file. The final file name \
                 must be non-empty and must not contain <>:\"/\\|?*."
            }
            AppError::UnsupportedFormat { .. } => {
                "End the filename option with .png, .jpg, .jpeg, .webp or .bmp. The image format \
                 is chosen from the extension."
            }
            AppError::EncodingFailed { format, .. } => match format.as_str() {
                "jpeg" => "JPEG encoding failed. Try using a .png filename instead.",
                _ => "Image encoding failed. Try a different extension (.png, .jpg, .webp).",
            },
            AppError::BackendNotAvailable { backend } => match backend {
                BackendType::None => {
                    "This build has no screen capture backend. Rebuild with the native-capture \
                     feature enabled."
                }
                BackendType::Mock => "The mock backend is only available in tests.",
                BackendType::Native => {
                    "No monitors were found. Ensure a graphical session is running (DISPLAY or \
                     WAYLAND_DISPLAY on Linux)."
                }
            },
            AppError::CaptureFailed { .. } => {
                "The OS refused the capture. On macOS grant Screen Recording permission; on \
                 Linux ensure a graphical session is available."
            }
            AppError::ScheduleParse { .. } => {
                "Run 'screenshotto schedule edit' and fix the line. Lines look like 'every 10 \
                 minutes' or 'every monday at 09:00'. Comment lines start with #."
            }
            AppError::LaunchFailed { .. } => {
                "Set the EDITOR environment variable to an editor installed on this system."
            }
            AppError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
        }
    }
}
