mod config;
pub mod database;

pub use config::Config;
pub use database::{Database, SessionOutcome, SessionRecord, SessionStats};

use std::path::PathBuf;

/// Returns the data directory, `~/.config/focusgate[-dev]/` by default.
///
/// `FOCUSGATE_DATA_DIR` overrides the location outright (used by the CLI
/// E2E tests); otherwise set `FOCUSGATE_ENV=dev` to use the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    if let Ok(dir) = std::env::var("FOCUSGATE_DATA_DIR") {
        if !dir.trim().is_empty() {
            let dir = PathBuf::from(dir);
            std::fs::create_dir_all(&dir)?;
            return Ok(dir);
        }
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusgate-dev")
    } else {
        base_dir.join("focusgate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
