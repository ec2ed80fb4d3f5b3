//! Path helpers for XDG directories and config files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const APP_DIR: &str = "capystore";

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `$XDG_CONFIG_HOME/capystore`
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| home_dir().join(".config"))
        .join(APP_DIR)
}

/// `$XDG_CACHE_HOME/capystore`
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| home_dir().join(".cache"))
        .join(APP_DIR)
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Last catalog fetched from the network, used when offline.
pub fn snapshot_path() -> PathBuf {
    cache_dir().join("list.json")
}

/// Downloaded icons and screenshots.
pub fn image_cache_dir() -> PathBuf {
    cache_dir().join("images")
}

/// Installed-version preferences.
pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.json")
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Replace the contents of `path` through a sibling temp file and a rename,
/// so readers only ever see the old or the new contents.
pub fn write_replacing(path: &Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
