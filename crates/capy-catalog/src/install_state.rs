//! Installed-version bookkeeping.
//!
//! Each installed app leaves a single preference `installed.<id>` holding the
//! version that was installed. The store is injected so callers decide where
//! preferences live.

use crate::error::PreferenceError;
use crate::paths::write_replacing;
use crate::record::AppRecord;

use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub const INSTALL_KEY_PREFIX: &str = "installed.";

/// String key-value preference store.
///
/// Every `get`/`set` touches exactly one key and is atomic for that key.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Install status of one catalog record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallState {
    NotInstalled,
    Installed,
    UpgradeAvailable,
}

/// Preference key for an app.
pub fn install_key(app: &AppRecord) -> String {
    format!("{}{}", INSTALL_KEY_PREFIX, app.id)
}

/// Version recorded when the app was installed, if any.
pub fn installed_version(store: &dyn PreferenceStore, app: &AppRecord) -> Option<String> {
    store.get(&install_key(app)).filter(|v| !v.is_empty())
}

/// Compare the stored version against the record's current one.
pub fn is_installed(store: &dyn PreferenceStore, app: &AppRecord) -> InstallState {
    match installed_version(store, app) {
        None => InstallState::NotInstalled,
        Some(v) if v == app.effective_version() => InstallState::Installed,
        Some(_) => InstallState::UpgradeAvailable,
    }
}

/// Record the app's current version as installed.
pub fn mark_installed(store: &dyn PreferenceStore, app: &AppRecord) -> Result<(), PreferenceError> {
    debug!("Marking {} installed at {}", app.id, app.effective_version());
    store.set(&install_key(app), app.effective_version())
}

/// Process-local store, nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept in a JSON object on disk.
/// The whole file is rewritten on every `set`.
#[derive(Debug)]
pub struct JsonPreferences {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl JsonPreferences {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), PreferenceError> {
        let json = serde_json::to_string_pretty(values)?;
        write_replacing(&self.path, json.as_bytes())?;
        Ok(())
    }
}

impl PreferenceStore for JsonPreferences {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        // Memory only changes once the file has been written.
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());
        self.save(&updated)?;
        *values = updated;
        Ok(())
    }
}
