//! Path utilities.
//!
//! - [`get_mneme_dir`] - `~/.mneme/` (base directory)
//! - [`get_config_path`] - `~/.mneme/config.toml`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Get the mneme base directory.
///
/// Resolution order:
/// 1. `MNEME_HOME` environment variable (if set)
/// 2. `~/.mneme/` (default)
pub fn get_mneme_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("MNEME_HOME")
        && !home.is_empty()
    {
        return Ok(PathBuf::from(home));
    }

    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".mneme"))
}

/// Get the default config file path: `~/.mneme/config.toml`
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_mneme_dir()?.join("config.toml"))
}
