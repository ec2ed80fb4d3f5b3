//! Store configuration.
//!
//! Read from `$XDG_CONFIG_HOME/capystore/config.json`. Missing files and
//! missing fields fall back to defaults.

use capy_catalog::{current_platform, paths};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CATALOG_URL: &str = "https://apps.fyne.io/api/v1/list.json";
const DEFAULT_FEATURED_URL: &str = "https://apps.fyne.io/api/v1/featured.json";
const DEFAULT_ASSET_BASE: &str = "https://apps.fyne.io";
/// Package path of the store itself; always shown as installed.
const DEFAULT_SELF_PACKAGE: &str = "fyne.io/apps";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub catalog_url: String,
    pub featured_url: String,
    /// Prefix for featured assets given as site-relative paths.
    pub asset_base: String,
    pub snapshot_path: Option<PathBuf>,
    pub preferences_path: Option<PathBuf>,
    pub image_cache_dir: Option<PathBuf>,
    /// Override for the platform used by the compatibility filter.
    pub platform: Option<String>,
    pub self_package: String,
    pub installer: InstallerConfig,
}

/// External install helper command line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Added only when an icon could be downloaded.
    pub icon_args: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            featured_url: DEFAULT_FEATURED_URL.to_string(),
            asset_base: DEFAULT_ASSET_BASE.to_string(),
            snapshot_path: None,
            preferences_path: None,
            image_cache_dir: None,
            platform: None,
            self_package: DEFAULT_SELF_PACKAGE.to_string(),
            installer: InstallerConfig::default(),
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            program: "fyne".to_string(),
            args: vec![
                "get".to_string(),
                "--appID".to_string(),
                "{id}".to_string(),
                "{package}".to_string(),
            ],
            icon_args: vec!["--icon".to_string(), "{icon}".to_string()],
        }
    }
}

impl StoreConfig {
    /// Load from config file, or return default if not found.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring invalid config {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Save to config file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        paths::ensure_parent(path)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn platform(&self) -> &str {
        self.platform.as_deref().unwrap_or(current_platform())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path.clone().unwrap_or_else(paths::snapshot_path)
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.preferences_path
            .clone()
            .unwrap_or_else(paths::preferences_path)
    }

    pub fn image_cache_dir(&self) -> PathBuf {
        self.image_cache_dir
            .clone()
            .unwrap_or_else(paths::image_cache_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load(&dir.path().join("config.json"));
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.platform(), current_platform());
        assert_eq!(config.snapshot_path(), paths::snapshot_path());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"platform": "powerpc", "installer": {"program": "/usr/local/bin/get"}}"#,
        )
        .unwrap();

        let config = StoreConfig::load(&path);
        assert_eq!(config.platform(), "powerpc");
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.installer.program, "/usr/local/bin/get");
        assert_eq!(config.installer.args, InstallerConfig::default().args);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{").unwrap();
        assert_eq!(StoreConfig::load(&path), StoreConfig::default());
    }

    #[test]
    fn test_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capystore").join("config.json");
        let config = StoreConfig {
            snapshot_path: Some(dir.path().join("list.json")),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(StoreConfig::load(&path), config);
    }
}
