//! Where converge looks for its manifest
//!
//! The manifest is, in order:
//!
//! 1. the `--file` argument (or `CONVERGE_MANIFEST`, handled by clap)
//! 2. `converge.toml` in the working directory
//! 3. `converge.toml` in the config directory
//!
//! The config directory is `CONVERGE_CONFIG_DIR` when set, then
//! `$XDG_CONFIG_HOME/converge`, then `%APPDATA%\converge` on Windows or
//! `~/.config/converge` elsewhere.

use anyhow::{Context, Result};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Overrides the config directory
pub const ENV_CONFIG_DIR: &str = "CONVERGE_CONFIG_DIR";

/// Manifest file name
pub const MANIFEST_FILE: &str = "converge.toml";

const APP_DIR: &str = "converge";

/// Directory holding the user-level manifest
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let dir = expand(&dir);
        log::debug!("Config dir from {}: {}", ENV_CONFIG_DIR, dir.display());
        return Ok(dir);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join(APP_DIR));
    }

    #[cfg(windows)]
    if let Some(app_data) = dirs::config_dir() {
        return Ok(app_data.join(APP_DIR));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join(APP_DIR))
}

/// Locate the manifest to load
pub fn manifest_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand(&path.to_string_lossy()));
    }

    let local = PathBuf::from(MANIFEST_FILE);
    if local.is_file() {
        log::debug!("Using {} from the working directory", MANIFEST_FILE);
        return Ok(local);
    }

    let path = config_dir()?.join(MANIFEST_FILE);
    log::debug!("Using manifest {}", path.display());
    Ok(path)
}

/// Expand `~` and `$VARS` in a manifest path
///
/// A reference to an unset variable leaves the whole string untouched.
pub fn expand(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw).unwrap_or(Cow::Borrowed(raw));
    PathBuf::from(expanded.into_owned())
}
