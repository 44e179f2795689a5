//! Native capture backend using xcap
//!
//! Captures every monitor through the OS screenshot API (X11/Wayland via
//! xcap on Linux, GDI/DXGI on Windows, CoreGraphics on macOS) and stitches the
//! results into one image at each monitor's virtual-desktop position.
//!
//! xcap calls are synchronous, so the whole capture runs inside
//! `spawn_blocking`.

use async_trait::async_trait;

use super::{ImageBuffer, ScreenCapture};
use crate::{
    error::{AppError, AppResult},
    model::BackendType,
};

/// Full-desktop capture via `xcap::Monitor`
#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    /// Creates the backend. No OS resources are held between captures.
    pub fn new() -> Self {
        Self
    }

    fn capture_blocking() -> AppResult<ImageBuffer> {
        let monitors = xcap::Monitor::all().map_err(map_xcap_error)?;

        if monitors.is_empty() {
            tracing::error!("No monitors available for capture");
            return Err(AppError::BackendNotAvailable {
                backend: BackendType::Native,
            });
        }

        let mut parts = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            let x = monitor.x().map_err(map_xcap_error)?;
            let y = monitor.y().map_err(map_xcap_error)?;
            let image = monitor.capture_image().map_err(|e| {
                tracing::error!("xcap monitor capture failed: {}", e);
                map_xcap_error(e)
            })?;
            tracing::debug!(
                "Captured monitor at ({}, {}): {}x{}",
                x,
                y,
                image.width(),
                image.height()
            );
            parts.push((x, y, ImageBuffer::new(image::DynamicImage::ImageRgba8(image))));
        }

        let desktop = ImageBuffer::stitch(&parts);
        tracing::debug!(
            "Stitched {} monitor(s) into {}x{}",
            parts.len(),
            desktop.width(),
            desktop.height()
        );
        Ok(desktop)
    }
}

#[async_trait]
impl ScreenCapture for NativeBackend {
    async fn capture_screen(&self) -> AppResult<ImageBuffer> {
        tokio::task::spawn_blocking(Self::capture_blocking)
            .await
            .map_err(|e| {
                tracing::error!("Screen capture task panicked: {}", e);
                AppError::CaptureFailed {
                    reason: e.to_string(),
                }
            })?
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Native
    }
}

/// Maps xcap errors to [`AppError`]
///
/// Connection problems mean there is no usable display; anything else is a
/// capture failure with the xcap message attached.
fn map_xcap_error(e: xcap::XCapError) -> AppError {
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("display") || err_str.contains("connection") {
        tracing::warn!("xcap failed to connect to the display server");
        return AppError::BackendNotAvailable {
            backend: BackendType::Native,
        };
    }

    AppError::CaptureFailed {
        reason: e.to_string(),
    }
}
