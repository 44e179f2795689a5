//! Config file persistence
//!
//! One flat `[Screenshotto]` section with three keys, stored as TOML in the
//! platform config directory:
//!
//! - Windows:  `%APPDATA%\Screenshotto\Screenshotto.toml`
//! - Linux:    `~/.config/Screenshotto/Screenshotto.toml`
//! - macOS:    `~/Library/Application Support/Screenshotto/Screenshotto.toml`
//!
//! ```toml
//! [Screenshotto]
//! img_dir = "/home/me/Pictures/Screenshotto"
//! strftime = "%Y-%m-%d %H%M"
//! filename = "{strftime}.png"
//! ```
//!
//! The file is meant to be hand-edited, so loading is forgiving. Values are
//! repaired rather than rejected and the file is rewritten whenever anything
//! had to be fixed:
//!
//! - a missing file is generated from defaults;
//! - a file that is not valid TOML is read line by line as `key = value`;
//! - one pair of surrounding quotes is stripped from a value;
//! - characters Windows forbids in file names are replaced with `_` in
//!   `strftime` and `filename`;
//! - wrong-typed values and unparseable strftime patterns fall back to the
//!   default;
//! - missing keys are filled in from defaults.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::format::{Item, StrftimeItems};
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    model::APP_NAME,
};

/// Default timestamp format
pub const DEFAULT_STRFTIME: &str = "%Y-%m-%d %H%M";

/// Default filename template
pub const DEFAULT_FILENAME: &str = "{strftime}.png";

/// Characters not allowed in Windows file names
pub(crate) static INVALID_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static regex"));

// ── Paths ─────────────────────────────────────────────────────────────────────

/// Locations of every file screenshotto reads or writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Directory holding the config and schedule files
    pub config_dir:      PathBuf,
    /// The config file itself
    pub config_file:     PathBuf,
    /// The schedule file
    pub schedule_file:   PathBuf,
    /// Directory for the log file
    pub log_dir:         PathBuf,
    /// Default output directory written into new config files
    pub default_img_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolves all paths from the platform user directories.
    ///
    /// # Errors
    ///
    /// [`AppError::NoPlatformDir`] when the config or home directory cannot be
    /// determined.
    pub fn discover() -> AppResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or(AppError::NoPlatformDir { kind: "config" })?
            .join(APP_NAME);
        let log_dir = platform_log_dir().ok_or(AppError::NoPlatformDir { kind: "log" })?;
        let pictures = dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
            .ok_or(AppError::NoPlatformDir { kind: "pictures" })?;

        Ok(Self::from_parts(config_dir, log_dir, pictures.join(APP_NAME)))
    }

    /// Roots every path inside `root`.
    pub fn in_dir(root: &Path) -> Self {
        Self::from_parts(root.to_path_buf(), root.join("log"), root.join("Pictures").join(APP_NAME))
    }

    fn from_parts(config_dir: PathBuf, log_dir: PathBuf, default_img_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join(format!("{APP_NAME}.toml")),
            schedule_file: config_dir.join("schedule.txt"),
            config_dir,
            log_dir,
            default_img_dir,
        }
    }
}

/// Per-user log directory, following each platform's convention.
fn platform_log_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::data_local_dir().map(|d| d.join(APP_NAME).join("Logs"))
    }

    #[cfg(target_os = "macos")]
    {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join(APP_NAME))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        dirs::cache_dir().map(|d| d.join(APP_NAME).join("log"))
    }
}

// ── Config record ─────────────────────────────────────────────────────────────

/// The config record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where to save the images
    pub img_dir:  PathBuf,
    /// strftime pattern for the capture time
    pub strftime: String,
    /// Filename template; `{strftime}` is replaced by the formatted time
    pub filename: String,
}

impl Config {
    /// Defaults for a fresh config
    pub fn default_for(paths: &ConfigPaths) -> Self {
        Self {
            img_dir:  paths.default_img_dir.clone(),
            strftime: DEFAULT_STRFTIME.to_string(),
            filename: DEFAULT_FILENAME.to_string(),
        }
    }

    /// Whether any value differs from `original`
    pub fn has_changed(&self, original: &Config) -> bool {
        self != original
    }
}

/// A value as read from the file before normalization
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Str(String),
    /// Any non-string TOML value; holds the TOML type name
    Other(&'static str),
}

/// Outcome of normalizing raw values
#[derive(Debug)]
struct Normalized {
    config:        Config,
    require_regen: bool,
}

// ── Load / save ───────────────────────────────────────────────────────────────

/// Loads the config, creating or repairing the file as needed.
///
/// # Errors
///
/// [`AppError::ConfigIo`] when the file exists but cannot be read, or when a
/// repaired file cannot be written.
pub fn load_or_create(paths: &ConfigPaths) -> AppResult<Config> {
    let defaults = Config::default_for(paths);

    let text = match std::fs::read_to_string(&paths.config_file) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No existing config file.");
            write_config(paths, &defaults)?;
            tracing::info!("Config file: {}", paths.config_file.display());
            return Ok(defaults);
        }
        Err(source) => {
            return Err(AppError::ConfigIo {
                path: paths.config_file.clone(),
                source,
            });
        }
    };

    let (section, mut require_regen) = match parse_section(&text) {
        Some(parsed) => parsed,
        None => {
            tracing::warn!("No '{APP_NAME}' section in config. It will be regenerated.");
            (BTreeMap::new(), true)
        }
    };

    let normalized = normalize(&section, &defaults);
    require_regen |= normalized.require_regen;
    tracing::debug!("{:?}", normalized.config);

    if require_regen {
        write_config(paths, &normalized.config)?;
    }

    Ok(normalized.config)
}

/// Writes `config` with explanatory comments, creating the directory first.
///
/// # Errors
///
/// [`AppError::ConfigIo`] for file-system failures.
pub fn write_config(paths: &ConfigPaths, config: &Config) -> AppResult<()> {
    tracing::debug!("Writing config file to '{}'.", paths.config_file.display());
    std::fs::create_dir_all(&paths.config_dir).map_err(|source| AppError::ConfigIo {
        path: paths.config_dir.clone(),
        source,
    })?;

    std::fs::write(&paths.config_file, render_config(config)).map_err(|source| {
        AppError::ConfigIo {
            path: paths.config_file.clone(),
            source,
        }
    })
}

/// Renders the commented config file text
fn render_config(config: &Config) -> String {
    let quoted = |s: &str| toml::Value::String(s.to_string()).to_string();
    let mut out = String::new();

    let _ = writeln!(out, "[{APP_NAME}]");
    out.push_str("# This file will regenerate itself if you break it.\n");
    out.push_str("# :)\n\n");

    out.push_str("# Where to save the images\n");
    let _ = writeln!(out, "img_dir = {}\n", quoted(&config.img_dir.to_string_lossy()));

    out.push_str("# How to format the date/time\n");
    out.push_str("# See https://docs.rs/chrono/latest/chrono/format/strftime/ for a reference\n");
    out.push_str("# '%c' gives a complete date and time appropriate to your locale\n");
    out.push_str("# '%a %d %B %Y %H.%M' is nice and human-readable, like 'Sat 16 June 2018 09.00'\n");
    out.push_str("# '%Y-%m-%d %H%M' should be easy to sort and browse\n");
    let _ = writeln!(out, "strftime = {}\n", quoted(&config.strftime));

    out.push_str("# Image filename format\n");
    out.push_str("# {strftime} is replaced by the capture time formatted with the 'strftime' option\n");
    out.push_str("# You might like to use 'Desktop - {strftime}.png'\n");
    out.push_str("# Without {strftime} every new image overwrites the previous one.\n");
    out.push_str("# The image format follows the extension: .png, .jpg, .webp or .bmp\n");
    let _ = writeln!(out, "filename = {}", quoted(&config.filename));

    out
}

/// Extracts the `[Screenshotto]` section.
///
/// Returns the raw key/value map and whether the file must be rewritten
/// because it was not valid TOML, or `None` when there is no such section.
fn parse_section(text: &str) -> Option<(BTreeMap<String, RawValue>, bool)> {
    match toml::from_str::<toml::Table>(text) {
        Ok(table) => {
            let section = table.get(APP_NAME)?.as_table()?;
            let map = section
                .iter()
                .map(|(k, v)| {
                    let raw = match v {
                        toml::Value::String(s) => RawValue::Str(s.clone()),
                        other => RawValue::Other(other.type_str()),
                    };
                    (k.to_ascii_lowercase(), raw)
                })
                .collect();
            Some((map, false))
        }
        Err(e) => {
            tracing::debug!("Config is not valid TOML ({}), reading it as key = value lines", e);
            parse_lines(text).map(|map| (map, true))
        }
    }
}

/// INI-style fallback: `key = value` lines inside `[Screenshotto]`.
fn parse_lines(text: &str) -> Option<BTreeMap<String, RawValue>> {
    let mut in_section = false;
    let mut seen_section = false;
    let mut map = BTreeMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == APP_NAME;
            seen_section |= in_section;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) {
            map.insert(key.trim().to_ascii_lowercase(), RawValue::Str(value.trim().to_string()));
        }
    }

    seen_section.then_some(map)
}

/// Applies the repair rules to the raw section values.
fn normalize(section: &BTreeMap<String, RawValue>, defaults: &Config) -> Normalized {
    let mut require_regen = false;
    let mut present = 0usize;

    let mut value_for = |key: &str, default: &str| -> String {
        let Some(raw) = section.get(key) else {
            return default.to_string();
        };
        present += 1;

        let mut val = match raw {
            RawValue::Str(s) => s.clone(),
            RawValue::Other(kind) => {
                tracing::warn!("'{key}' in the config file should be text, not {kind}. Using the default.");
                require_regen = true;
                return default.to_string();
            }
        };

        if let Some(stripped) = strip_matching_quotes(&val) {
            tracing::warn!("Removed quotes around the value of {key} in the config file.");
            val = stripped.to_string();
            require_regen = true;
        }

        if key == "strftime" || key == "filename" {
            let count = INVALID_FILENAME_CHARS.find_iter(&val).count();
            if count > 0 {
                val = INVALID_FILENAME_CHARS.replace_all(&val, "_").into_owned();
                tracing::warn!(
                    "Replaced {count} characters that are not allowed in windows filenames in {key}."
                );
                require_regen = true;
            }
        }

        if key == "strftime" && !is_valid_strftime(&val) {
            tracing::warn!("'{val}' is not a valid strftime pattern. Using the default.");
            require_regen = true;
            return default.to_string();
        }

        val
    };

    let img_dir = value_for("img_dir", &defaults.img_dir.to_string_lossy());
    let strftime = value_for("strftime", &defaults.strftime);
    let filename = value_for("filename", &defaults.filename);

    if present < 3 {
        tracing::debug!(
            "Config file is missing one or more options. Generating a new file. Old settings \
             carry over."
        );
        require_regen = true;
    }

    Normalized {
        config: Config {
            img_dir: PathBuf::from(img_dir),
            strftime,
            filename,
        },
        require_regen,
    }
}

/// Returns the inner text when `val` is wrapped in matching `"` or `'`
fn strip_matching_quotes(val: &str) -> Option<&str> {
    if val.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find(|q| val.starts_with(*q) && val.ends_with(*q))
        .map(|_| &val[1..val.len() - 1])
}

/// Whether chrono accepts every specifier in `pattern`
pub fn is_valid_strftime(pattern: &str) -> bool {
    StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
