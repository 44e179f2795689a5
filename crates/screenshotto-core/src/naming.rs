//! Image filename generation
//!
//! A capture taken at time `t` is saved as `img_dir / filename` where every
//! `{strftime}` placeholder in the `filename` template is replaced by `t`
//! formatted with the `strftime` pattern. Characters a file name may not
//! contain are replaced with `_` in the formatted time, so patterns such as
//! `%c` or `%D` still give a single usable file name.
//!
//! ```
//! use chrono::NaiveDate;
//! use screenshotto_core::{config::Config, naming::image_file_name};
//!
//! let config = Config {
//!     img_dir:  "/tmp".into(),
//!     strftime: "%Y-%m-%d %H%M".to_string(),
//!     filename: "Desktop - {strftime}.png".to_string(),
//! };
//! let t = NaiveDate::from_ymd_opt(2018, 6, 16).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! assert_eq!(image_file_name(&config, &t), "Desktop - 2018-06-16 0900.png");
//! ```

use std::{fmt::Write as _, path::PathBuf};

use chrono::{NaiveDateTime, format::StrftimeItems};

use crate::{
    config::{Config, INVALID_FILENAME_CHARS},
    error::AppResult,
    util::path::validate_image_path,
};

/// Placeholder replaced by the formatted capture time
pub const STRFTIME_PLACEHOLDER: &str = "{strftime}";

/// Returns the file name an image captured at `timestamp` is saved as.
///
/// An invalid strftime pattern formats as an empty string rather than
/// panicking; config loading already replaces such patterns with the default.
pub fn image_file_name(config: &Config, timestamp: &NaiveDateTime) -> String {
    let mut date = String::new();
    if write!(date, "{}", timestamp.format_with_items(StrftimeItems::new(&config.strftime)))
        .is_err()
    {
        tracing::warn!("Could not format the capture time with '{}'", config.strftime);
        date.clear();
    }
    let date = INVALID_FILENAME_CHARS.replace_all(&date, "_");
    config.filename.replace(STRFTIME_PLACEHOLDER, &date)
}

/// Returns the full path for an image captured at `timestamp`, creating
/// `img_dir` and its parents if missing.
///
/// # Errors
///
/// - [`AppError::InvalidPath`](crate::error::AppError::InvalidPath) - the
///   generated name is not a single usable file name; nothing is created
/// - [`AppError::IoError`](crate::error::AppError::IoError) - the directory
///   cannot be created
pub fn image_path(config: &Config, timestamp: &NaiveDateTime) -> AppResult<PathBuf> {
    let path = validate_image_path(&config.img_dir, &image_file_name(config, timestamp))?;
    std::fs::create_dir_all(&config.img_dir)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::AppError;

    fn config(strftime: &str, filename: &str) -> Config {
        Config {
            img_dir:  PathBuf::from("/unused"),
            strftime: strftime.to_string(),
            filename: filename.to_string(),
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, s).unwrap()
    }

    #[test]
    fn test_default_template() {
        let c = config("%Y-%m-%d %H%M", "{strftime}.png");
        assert_eq!(image_file_name(&c, &at(2024, 1, 2, 3, 4, 5)), "2024-01-02 0304.png");
    }

    #[test]
    fn test_template_without_placeholder_is_constant() {
        let c = config("%Y", "latest.jpg");
        assert_eq!(image_file_name(&c, &at(2024, 1, 2, 3, 4, 5)), "latest.jpg");
        assert_eq!(image_file_name(&c, &at(2030, 9, 9, 9, 9, 9)), "latest.jpg");
    }

    #[test]
    fn test_placeholder_repeated() {
        let c = config("%d", "{strftime}-{strftime}.png");
        assert_eq!(image_file_name(&c, &at(2024, 1, 7, 0, 0, 0)), "07-07.png");
    }

    #[test]
    fn test_other_braces_are_literal() {
        let c = config("%Y", "{name} {strftime}.png");
        assert_eq!(image_file_name(&c, &at(2024, 1, 7, 0, 0, 0)), "{name} 2024.png");
    }

    #[test]
    fn test_human_readable_format() {
        let c = config("%a %d %B %Y %H.%M", "{strftime}.png");
        assert_eq!(image_file_name(&c, &at(2018, 6, 16, 9, 0, 0)), "Sat 16 June 2018 09.00.png");
    }

    #[test]
    fn test_invalid_pattern_formats_empty() {
        let c = config("%Y %", "shot {strftime}.png");
        assert_eq!(image_file_name(&c, &at(2024, 1, 7, 0, 0, 0)), "shot .png");
    }

    #[test]
    fn test_locale_date_time_has_no_colons() {
        let c = config("%c", "{strftime}.png");
        assert_eq!(image_file_name(&c, &at(2024, 3, 9, 12, 0, 0)), "Sat Mar  9 12_00_00 2024.png");
    }

    #[test]
    fn test_slashes_in_date_stay_in_one_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = config("%D", "{strftime}.png");
        c.img_dir = dir.path().join("shots");
        std::fs::create_dir_all(c.img_dir.join("03").join("09")).unwrap();

        let path = image_path(&c, &at(2024, 3, 9, 12, 0, 0)).unwrap();
        assert_eq!(path, c.img_dir.join("03_09_24.png"));
    }

    #[test]
    fn test_separator_in_template_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = config("%Y", "sub/{strftime}.png");
        c.img_dir = dir.path().join("shots");

        let err = image_path(&c, &at(2024, 1, 7, 0, 0, 0)).unwrap_err();
        assert!(matches!(err, AppError::InvalidPath { .. }));
        assert!(!c.img_dir.exists());
    }

    #[test]
    fn test_image_path_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = config("%Y", "{strftime}.png");
        c.img_dir = dir.path().join("nested").join("shots");

        let path = image_path(&c, &at(2024, 1, 7, 0, 0, 0)).unwrap();
        assert!(c.img_dir.is_dir());
        assert_eq!(path, c.img_dir.join("2024.png"));
    }
}
