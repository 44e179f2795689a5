//! Validation of the final image file name

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Longest file name most file systems accept, in bytes
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Characters that may not appear in a file name on Windows
pub const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Checks that `name` is a usable single file name and returns `dir/name`.
///
/// The name is checked as a string, before it is joined onto `dir`, so a
/// separator in it is rejected instead of becoming a subdirectory. It must be
/// non-empty, must not be `.`/`..`, must stay within [`MAX_FILE_NAME_LEN`]
/// bytes and must not contain reserved or control characters.
///
/// # Errors
///
/// [`AppError::InvalidPath`] describing the first problem found.
pub fn validate_image_path(dir: &Path, name: &str) -> AppResult<PathBuf> {
    let path = dir.join(name);
    let invalid = |reason: String| AppError::InvalidPath {
        path: path.clone(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("the file name is blank".to_string()));
    }
    if name == "." || name == ".." {
        return Err(invalid(format!("'{name}' is not a file name")));
    }
    if name.len() > MAX_FILE_NAME_LEN {
        return Err(invalid(format!(
            "the file name is {} bytes long (max {MAX_FILE_NAME_LEN})",
            name.len()
        )));
    }
    if let Some(c) = name.chars().find(|c| RESERVED_CHARS.contains(c) || c.is_control()) {
        return Err(invalid(format!("the file name contains {c:?}")));
    }
    if name.ends_with(' ') || name.ends_with('.') {
        return Err(invalid("the file name ends with a space or a dot".to_string()));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str) -> AppResult<PathBuf> {
        validate_image_path(Path::new("/tmp"), name)
    }

    #[test]
    fn test_valid_names() {
        assert_eq!(check("2024-01-02 0304.png").unwrap(), Path::new("/tmp/2024-01-02 0304.png"));
        assert!(check("Desktop - Sat 16 June.jpg").is_ok());
    }

    #[test]
    fn test_missing_file_name() {
        assert!(check("").is_err());
        assert!(check("   ").is_err());
        assert!(check("..").is_err());
    }

    #[test]
    fn test_reserved_characters() {
        let err = check("a?b.png").unwrap_err();
        assert!(err.to_string().contains("'?'"));
    }

    #[test]
    fn test_separator_is_not_a_subdirectory() {
        let err = check("03/09/24.png").unwrap_err();
        assert!(err.to_string().contains("'/'"));
        assert!(check("shots\\24.png").is_err());
    }

    #[test]
    fn test_control_characters() {
        assert!(check("a\tb.png").is_err());
    }

    #[test]
    fn test_too_long() {
        let name = format!("{}.png", "a".repeat(MAX_FILE_NAME_LEN));
        assert!(check(&name).is_err());
    }

    #[test]
    fn test_trailing_dot() {
        assert!(check("shot.").is_err());
    }
}
