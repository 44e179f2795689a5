//! Mock capture backend for testing
//!
//! [`MockBackend`] produces synthetic test-pattern images laid out like a
//! configurable set of monitors, so the writer and scheduler can be tested
//! without a display.
//!
//! ```
//! use screenshotto_core::capture::{MockBackend, ScreenCapture};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let backend = MockBackend::new().with_monitors(vec![(0, 0, 800, 600), (800, 0, 800, 600)]);
//!     let image = backend.capture_screen().await.unwrap();
//!     assert_eq!(image.dimensions(), (1600, 600));
//!     assert_eq!(backend.capture_count(), 1);
//! }
//! ```

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use super::{ImageBuffer, ScreenCapture};
use crate::{
    error::{AppError, AppResult},
    model::BackendType,
};

/// Monitor geometry: `(x, y, width, height)` on the virtual desktop
pub type MonitorRect = (i32, i32, u32, u32);

/// Mock capture backend for testing and development
#[derive(Debug)]
pub struct MockBackend {
    /// Optional delay to simulate capture latency
    delay:           Option<Duration>,
    /// Optional error to inject for testing error handling
    error_injection: Option<AppError>,
    /// Simulated monitor layout
    monitors:        Vec<MonitorRect>,
    /// Number of capture calls so far, including failed ones
    captures:        AtomicUsize,
}

impl MockBackend {
    /// Creates a mock with a single 1920x1080 monitor
    pub fn new() -> Self {
        Self {
            delay:           None,
            error_injection: None,
            monitors:        vec![(0, 0, 1920, 1080)],
            captures:        AtomicUsize::new(0),
        }
    }

    /// Replaces the simulated monitor layout
    pub fn with_monitors(mut self, monitors: Vec<MonitorRect>) -> Self {
        self.monitors = monitors;
        self
    }

    /// Sets a delay applied before every capture
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Injects an error that every capture will return
    pub fn with_error(mut self, error: AppError) -> Self {
        self.error_injection = Some(error);
        self
    }

    /// Number of times `capture_screen` has been called
    pub fn capture_count(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    /// Rebuilds the injected error; `AppError` is not `Clone`
    fn check_error_injection(&self) -> AppResult<()> {
        let Some(error) = &self.error_injection else {
            return Ok(());
        };
        Err(match error {
            AppError::BackendNotAvailable { backend } => {
                AppError::BackendNotAvailable { backend: *backend }
            }
            AppError::CaptureFailed { reason } => AppError::CaptureFailed {
                reason: reason.clone(),
            },
            AppError::IoError(e) => AppError::IoError(std::io::Error::new(e.kind(), e.to_string())),
            other => AppError::CaptureFailed {
                reason: other.to_string(),
            },
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScreenCapture for MockBackend {
    async fn capture_screen(&self) -> AppResult<ImageBuffer> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if let Some(duration) = self.delay {
            sleep(duration).await;
        }
        self.check_error_injection()?;

        if self.monitors.is_empty() {
            return Err(AppError::BackendNotAvailable {
                backend: BackendType::Mock,
            });
        }

        let parts: Vec<_> = self
            .monitors
            .iter()
            .map(|&(x, y, w, h)| (x, y, ImageBuffer::from_test_pattern(w, h)))
            .collect();
        tracing::debug!("Mock capture of {} monitor(s)", parts.len());

        Ok(ImageBuffer::stitch(&parts))
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_single_monitor() {
        let backend = MockBackend::new();
        let image = backend.capture_screen().await.unwrap();
        assert_eq!(image.dimensions(), (1920, 1080));
        assert_eq!(backend.backend_type(), BackendType::Mock);
    }

    #[tokio::test]
    async fn test_stacked_monitors() {
        let backend = MockBackend::new().with_monitors(vec![(0, 0, 100, 50), (0, -40, 80, 40)]);
        let image = backend.capture_screen().await.unwrap();
        assert_eq!(image.dimensions(), (100, 90));
    }

    #[tokio::test]
    async fn test_error_injection_counts_attempts() {
        let backend = MockBackend::new().with_error(AppError::CaptureFailed {
            reason: "denied".to_string(),
        });

        let err = backend.capture_screen().await.unwrap_err();
        assert!(matches!(err, AppError::CaptureFailed { reason } if reason == "denied"));
        assert_eq!(backend.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_no_monitors_is_unavailable() {
        let backend = MockBackend::new().with_monitors(Vec::new());
        let err = backend.capture_screen().await.unwrap_err();
        assert!(matches!(err, AppError::BackendNotAvailable { backend: BackendType::Mock }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_is_applied() {
        let backend = MockBackend::new().with_delay(Duration::from_secs(5));
        let started = tokio::time::Instant::now();
        backend.capture_screen().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
