//! Capability trait for screenshot capture backends

use async_trait::async_trait;

use super::ImageBuffer;
use crate::{error::AppResult, model::BackendType};

/// Capability: backend can capture the whole desktop.
///
/// Implementations must return one image covering every monitor. Blocking OS
/// calls belong in `tokio::task::spawn_blocking`.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    /// Captures every monitor and composes them into one image.
    async fn capture_screen(&self) -> AppResult<ImageBuffer>;

    /// Which backend this is, for logs and errors.
    fn backend_type(&self) -> BackendType;
}
