//! Filesystem locations used across Keygate crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "KEYGATE_CONFIG_DIR";

const CONFIG_DIR_NAME: &str = ".keygate";

/// The user's home directory
///
/// `HOME` is consulted before the platform lookup so that a service started
/// with an overridden `HOME` finds the same files as its launch scripts.
pub fn home_dir() -> Result<Utf8PathBuf> {
    let home = std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;

    Utf8PathBuf::from_path_buf(home).map_err(|p| {
        Error::invalid_config(format!("Home directory is not UTF-8: {}", p.display()))
    })
}

/// Keygate's config directory: `$KEYGATE_CONFIG_DIR`, else `~/.keygate`
pub fn default_config_dir() -> Result<Utf8PathBuf> {
    match std::env::var(CONFIG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => Ok(Utf8PathBuf::from(dir)),
        _ => Ok(home_dir()?.join(CONFIG_DIR_NAME)),
    }
}
