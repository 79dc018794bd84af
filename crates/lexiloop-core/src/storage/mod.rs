mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, ReviewConfig, StatsConfig, VocabularyConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the Lexiloop data directory, creating it if needed.
///
/// `LEXILOOP_DATA_DIR` wins when set. Otherwise `~/.config/lexiloop[-dev]/`
/// based on `LEXILOOP_ENV` (set `LEXILOOP_ENV=dev` for a development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("LEXILOOP_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LEXILOOP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lexiloop-dev")
            } else {
                base_dir.join("lexiloop")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
