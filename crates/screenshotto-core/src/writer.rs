//! Capture-and-save: the one thing screenshotto does
//!
//! read config → format filename from the capture time → call the OS
//! screenshot API → encode → write file.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::{
    capture::ScreenCapture,
    config::Config,
    error::AppResult,
    model::ImageFormat,
    naming::image_path,
    util::encode::encode_image,
};

/// Captures the whole desktop and saves it according to `config`.
///
/// `now` is the capture time used for the filename. The path and format are
/// checked before capturing, so a bad config never triggers a capture and
/// never leaves a partial file behind.
///
/// # Errors
///
/// - [`AppError::InvalidPath`](crate::error::AppError::InvalidPath) - the
///   generated file name is unusable
/// - [`AppError::UnsupportedFormat`](crate::error::AppError::UnsupportedFormat)
///   - the filename extension is not an image format
/// - capture, encoding and I/O errors from the respective steps
pub async fn save_screenshot(
    backend: &dyn ScreenCapture,
    config: &Config,
    now: NaiveDateTime,
) -> AppResult<PathBuf> {
    let path = image_path(config, &now)?;
    let format = ImageFormat::from_path(&path)?;

    let image = backend.capture_screen().await?;
    tracing::debug!(
        "Captured {}x{} via {} backend",
        image.width(),
        image.height(),
        backend.backend_type()
    );

    let bytes = encode_image(&image, format)?;
    tokio::fs::write(&path, bytes).await?;

    tracing::debug!("Screenshot saved to '{}'", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{capture::MockBackend, error::AppError};

    fn config_in(dir: &std::path::Path, filename: &str) -> Config {
        Config {
            img_dir:  dir.join("shots"),
            strftime: "%Y-%m-%d %H%M".to_string(),
            filename: filename.to_string(),
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_saves_png_named_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "{strftime}.png");
        let backend = MockBackend::new().with_monitors(vec![(0, 0, 64, 48)]);

        let path = save_screenshot(&backend, &config, noon()).await.unwrap();

        assert_eq!(path, dir.path().join("shots").join("2024-03-09 1200.png"));
        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (64, 48));
    }

    #[tokio::test]
    async fn test_saves_jpeg_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "Desktop - {strftime}.JPG");
        let backend = MockBackend::new().with_monitors(vec![(0, 0, 32, 32)]);

        let path = save_screenshot(&backend, &config, noon()).await.unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_unsupported_extension_skips_capture() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "{strftime}.tiff");
        let backend = MockBackend::new();

        let err = save_screenshot(&backend, &config, noon()).await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat { .. }));
        assert_eq!(backend.capture_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_file_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "bad|{strftime}.png");
        let backend = MockBackend::new();

        let err = save_screenshot(&backend, &config, noon()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn test_locale_date_time_pattern_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), "{strftime}.png");
        config.strftime = "%c".to_string();
        let backend = MockBackend::new().with_monitors(vec![(0, 0, 8, 8)]);

        let path = save_screenshot(&backend, &config, noon()).await.unwrap();
        assert_eq!(path, dir.path().join("shots").join("Sat Mar  9 12_00_00 2024.png"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_capture_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "{strftime}.png");
        let backend = MockBackend::new().with_error(AppError::CaptureFailed {
            reason: "no permission".to_string(),
        });

        assert!(save_screenshot(&backend, &config, noon()).await.is_err());
        assert_eq!(std::fs::read_dir(dir.path().join("shots")).unwrap().count(), 0);
    }
}
