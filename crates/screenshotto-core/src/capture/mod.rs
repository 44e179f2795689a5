//! Capture backend trait and implementations
//!
//! Screenshotto only ever captures the whole desktop, so the backend surface
//! is a single trait:
//!
//! - [`ScreenCapture`] - capture every monitor into one [`ImageBuffer`]
//!
//! ## Backends
//!
//! | Backend          | Feature          | Source                        |
//! |------------------|------------------|-------------------------------|
//! | [`NativeBackend`] | `native-capture` | OS screenshot API via `xcap`  |
//! | [`MockBackend`]   | always           | synthetic test patterns       |
//!
//! Use [`create_default_backend()`] to get the backend for this build.

use std::sync::Arc;

use crate::error::AppResult;

pub mod image_buffer;
pub mod mock;
pub mod traits;

#[cfg(feature = "native-capture")]
pub mod native_backend;

pub use image_buffer::ImageBuffer;
pub use mock::MockBackend;
#[cfg(feature = "native-capture")]
pub use native_backend::NativeBackend;
pub use traits::ScreenCapture;

/// Creates the default capture backend for this build.
///
/// - **`native-capture` on**: [`NativeBackend`]
/// - **otherwise**: a structured `BackendNotAvailable` error
pub fn create_default_backend() -> AppResult<Arc<dyn ScreenCapture>> {
    #[cfg(feature = "native-capture")]
    {
        Ok(Arc::new(NativeBackend::new()))
    }

    #[cfg(not(feature = "native-capture"))]
    {
        Err(crate::error::AppError::BackendNotAvailable {
            backend: crate::model::BackendType::None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "native-capture")]
    #[test]
    fn test_default_backend_is_native() {
        let backend = create_default_backend().unwrap();
        assert_eq!(backend.backend_type(), crate::model::BackendType::Native);
    }

    #[cfg(not(feature = "native-capture"))]
    #[test]
    fn test_default_backend_unavailable_without_feature() {
        assert!(create_default_backend().is_err());
    }
}
