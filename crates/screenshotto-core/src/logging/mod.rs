//! Logging setup
//!
//! One `tracing` subscriber feeds two outputs:
//!
//! | Output  | Threshold                     | Format                                  |
//! |---------|-------------------------------|-----------------------------------------|
//! | stderr  | `INFO`, or `DEBUG` with `--debug` | `LEVEL   ` line, then the message    |
//! | logfile | `DEBUG`                       | timestamp, level, target, message       |
//!
//! Console output is held back until [`LogHandle::set_debug`] decides the
//! threshold. An event that repeats the one before it is dropped, and
//! multi-line messages are marked with `>>>>>>>>` and indented.
//!
//! `RUST_LOG` replaces the default filter for both outputs.

use std::path::{Path, PathBuf};

use tracing_subscriber::{EnvFilter, prelude::*};

use crate::error::{AppError, AppResult};

pub mod console;
pub mod dedup;
pub mod file;
pub mod format;

use console::ConsoleLayer;
use dedup::DuplicateFilter;
use file::{FileLayer, MAX_LOG_BYTES, RotatingFile};

/// Log file name inside the log directory
pub const LOG_FILE_NAME: &str = "screenshotto.log";

/// Used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "warn,screenshotto=debug,screenshotto_core=debug";

/// Controls the installed logger
#[derive(Clone)]
pub struct LogHandle {
    console:  ConsoleLayer,
    log_file: PathBuf,
}

impl LogHandle {
    /// Releases buffered console output at `DEBUG` (`debug`) or `INFO`
    pub fn set_debug(&self, debug: bool) {
        self.console.set_debug(debug);
    }

    /// Path of the active log file
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Installs the global subscriber and the panic hook.
///
/// # Errors
///
/// [`AppError::ConfigIo`] when the log file cannot be opened, or
/// [`AppError::IoError`] when a global subscriber is already installed.
pub fn init(log_dir: &Path) -> AppResult<LogHandle> {
    let log_file = log_dir.join(LOG_FILE_NAME);
    let file = RotatingFile::open(&log_file, MAX_LOG_BYTES).map_err(|source| {
        AppError::ConfigIo {
            path: log_file.clone(),
            source,
        }
    })?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console = ConsoleLayer::stderr();

    tracing_subscriber::registry()
        .with(filter)
        .with(DuplicateFilter::default())
        .with(console.clone())
        .with(FileLayer::new(file))
        .try_init()
        .map_err(|e| AppError::IoError(std::io::Error::other(e.to_string())))?;

    install_panic_hook();
    tracing::debug!("Logging to '{}'", log_file.display());

    Ok(LogHandle { console, log_file })
}

/// Routes panics through the logger so they reach the log file
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        tracing::error!("Uncaught exception\n{payload}\nat {location}");
    }));
}
