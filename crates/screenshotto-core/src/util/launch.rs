//! Opening files in the user's editor or default viewer
//!
//! - [`edit_file`] blocks until the editor exits, like `git commit` does.
//!   `$VISUAL`, then `$EDITOR`, then `notepad` (Windows) / `vi` (elsewhere).
//! - [`open_file`] hands the file to the desktop's default application and
//!   returns immediately: `cmd /C start` (Windows), `open` (macOS),
//!   `xdg-open` (elsewhere).

use std::path::Path;

use tokio::process::Command;

use crate::error::{AppError, AppResult};

/// Resolves the editor command line from environment lookups.
///
/// The value may contain arguments (`code --wait`); it is split on
/// whitespace.
pub fn editor_command<F>(env_provider: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|key| env_provider(key))
        .map(|v| v.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .find(|parts| !parts.is_empty())
        .unwrap_or_else(|| vec![default_editor().to_string()])
}

fn default_editor() -> &'static str {
    if cfg!(target_os = "windows") { "notepad" } else { "vi" }
}

/// Opens `path` in the user's editor and waits for it to exit.
///
/// # Errors
///
/// [`AppError::LaunchFailed`] when the editor cannot be started or exits
/// unsuccessfully.
pub async fn edit_file(path: &Path) -> AppResult<()> {
    edit_file_with(path, |key| std::env::var(key).ok()).await
}

/// [`edit_file`] with the editor looked up through `env_provider`
pub async fn edit_file_with<F>(path: &Path, env_provider: F) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let command = editor_command(env_provider);
    let (program, args) = command.split_first().ok_or_else(|| AppError::LaunchFailed {
        program: String::new(),
        reason:  "no editor configured".to_string(),
    })?;

    tracing::debug!("Opening '{}' with {:?}", path.display(), command);
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .await
        .map_err(|e| AppError::LaunchFailed {
            program: program.clone(),
            reason:  e.to_string(),
        })?;

    if !status.success() {
        return Err(AppError::LaunchFailed {
            program: program.clone(),
            reason:  format!("exited with {status}"),
        });
    }
    Ok(())
}

/// Opens `path` with the platform's default application.
///
/// # Errors
///
/// [`AppError::LaunchFailed`] when the opener cannot be started.
pub async fn open_file(path: &Path) -> AppResult<()> {
    let mut command = opener_command();
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    tracing::debug!("Opening '{}' with {}", path.display(), program);

    command
        .arg(path)
        .spawn()
        .map_err(|e| AppError::LaunchFailed {
            program,
            reason: e.to_string(),
        })?;
    Ok(())
}

fn opener_command() -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open")
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Command::new("xdg-open")
    }
}
