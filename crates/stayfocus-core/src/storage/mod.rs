mod config;
pub mod database;
mod memory;

pub use config::{Config, LoggingConfig, TimerSettings, UserConfig};
pub use database::{Database, SessionStats, StudySession};
pub use memory::MemorySessionStore;

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `STAYFOCUS_DATA_DIR` wins when set. Otherwise `~/.config/stayfocus[-dev]/`,
/// where `STAYFOCUS_ENV=dev` selects the development directory.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STAYFOCUS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STAYFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("stayfocus-dev")
            } else {
                base_dir.join("stayfocus")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
