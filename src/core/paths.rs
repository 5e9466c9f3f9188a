//! Centralized path helpers for config, cache, and data directories.

use std::env;
use std::path::PathBuf;

use crate::core::app;

/// Environment variable that relocates the record store (cached questions, notes, usage).
pub const DATA_DIR_ENV: &str = "STUDY_BUDDY_DATA_DIR";

/// Project directories (config, data) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Config directory (~/.config/study-buddy/).
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// User-wide `.env`, read after the one in the working directory.
pub fn env_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join(".env"))
}

/// Data directory for the record store (~/.local/share/study-buddy/store/).
/// `STUDY_BUDDY_DATA_DIR` overrides it.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    project_dirs().map(|d| d.data_dir().join("store"))
}
