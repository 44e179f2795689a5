//! Log file with size-based rotation
//!
//! When the next record would push the file past the size limit, the file
//! is renamed to `<name>.1` (replacing any older backup) and a fresh file is
//! started. One backup is kept.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

use super::format::Record;

/// Rotate once the file reaches 5 MiB
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;

/// Append-only file that rotates at a size limit
pub struct RotatingFile {
    path:      PathBuf,
    max_bytes: u64,
    file:      File,
    len:       u64,
}

impl RotatingFile {
    /// Opens `path` for appending, creating parent directories
    pub fn open(path: &Path, max_bytes: u64) -> io::Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            max_bytes,
            file,
            len,
        })
    }

    /// The backup path (`screenshotto.log` → `screenshotto.log.1`)
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".1");
        PathBuf::from(name)
    }

    /// Appends `bytes`, rotating first if they would not fit
    pub fn write_record(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.len > 0 && self.len + bytes.len() as u64 >= self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(bytes)?;
        self.file.flush()?;
        self.len += bytes.len() as u64;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        let backup = self.backup_path();
        if backup.exists() {
            fs::remove_file(&backup)?;
        }
        fs::rename(&self.path, &backup)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.len = 0;
        Ok(())
    }
}

/// Writes every event that passes the filter to a [`RotatingFile`]
pub struct FileLayer {
    file: Mutex<RotatingFile>,
}

impl FileLayer {
    pub fn new(file: RotatingFile) -> Self {
        Self {
            file: Mutex::new(file),
        }
    }
}

impl<S: Subscriber> Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let line = Record::from_event(event).file_line();
        if let Ok(mut file) = self.file.lock() {
            // Nowhere left to report a failing log file
            let _ = file.write_record(line.as_bytes());
        }
    }
}
