//! Catalog record model.
//!
//! Wire keys are PascalCase (`ID`, `Name`, `Icon`, ...). Older catalog
//! revisions used `Img`, `Excerpt` and `Homepage`; those are accepted as
//! aliases on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stored for apps that do not publish one.
pub const LATEST_VERSION: &str = "latest";

/// One application listed in the store catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppRecord {
    /// Stable unique key, e.g. "xyz.andy.beebui".
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Icon image URI.
    #[serde(default, alias = "Img")]
    pub icon: String,
    #[serde(default)]
    pub developer: String,
    #[serde(default, alias = "Excerpt")]
    pub summary: String,
    /// Catalog page for this app.
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(default, alias = "Homepage")]
    pub website: String,
    /// Grouping key for the category tree. Empty means ungrouped.
    #[serde(default)]
    pub category: String,
    #[serde(rename = "Date", default)]
    pub release_date: Option<DateTime<Utc>>,
    /// Opaque version string, may be empty.
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub source: AppSource,
    /// Comma separated platform identifiers. Empty means every platform.
    #[serde(default)]
    pub requires: String,
}

/// A screenshot reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Screenshot {
    pub image: String,
    /// "desktop", "mobile", ...
    #[serde(rename = "Type", default)]
    pub kind: String,
}

/// Where the installable code comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSource {
    /// Repository URI.
    #[serde(default)]
    pub git: String,
    /// Package path handed to the installer.
    #[serde(default)]
    pub package: String,
}

impl AppRecord {
    /// Check compatibility against an explicit platform identifier.
    /// Tokens are compared verbatim: no trimming, no case folding.
    pub fn is_compatible_with(&self, platform: &str) -> bool {
        if self.requires.is_empty() {
            return true;
        }

        self.requires.split(',').any(|token| token == platform)
    }

    /// Check compatibility against the platform we are running on.
    pub fn is_compatible(&self) -> bool {
        self.is_compatible_with(current_platform())
    }

    /// Version recorded when this app gets installed.
    pub fn effective_version(&self) -> &str {
        if self.version.is_empty() {
            LATEST_VERSION
        } else {
            &self.version
        }
    }

    /// Key used for case-insensitive display ordering.
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Platform identifier as catalogs spell it.
///
/// Catalogs use Go-style OS names, so macOS is "darwin".
pub fn current_platform() -> &'static str {
    platform_id(std::env::consts::OS)
}

fn platform_id(os: &'static str) -> &'static str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requiring(requires: &str) -> AppRecord {
        AppRecord {
            id: "test.app".to_string(),
            requires: requires.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_compatible_with_os() {
        let mut app = requiring("darwin");
        assert!(app.is_compatible_with("darwin"));
        assert!(!app.is_compatible_with("powerpc"));

        app.requires = "linux,powerpc".to_string();
        assert!(app.is_compatible_with("powerpc"));

        app.requires.clear();
        assert!(app.is_compatible_with("powerpc"));
    }

    #[test]
    fn test_compatible_is_exact_token_match() {
        let app = requiring("linux, darwin");
        assert!(app.is_compatible_with("linux"));
        assert!(!app.is_compatible_with("darwin"));
        assert!(!app.is_compatible_with("Linux"));
        assert!(!app.is_compatible_with("lin"));
    }

    #[test]
    fn test_compatible_with_current_platform() {
        let app = requiring("linux");
        assert_eq!(app.is_compatible(), current_platform() == "linux");

        let app = requiring(current_platform());
        assert!(app.is_compatible());
    }

    #[test]
    fn test_effective_version() {
        let mut app = requiring("");
        assert_eq!(app.effective_version(), "latest");
        app.version = "1.2".to_string();
        assert_eq!(app.effective_version(), "1.2");
    }

    #[test]
    fn test_platform_id_uses_catalog_names() {
        assert_eq!(platform_id("macos"), "darwin");
        assert_eq!(platform_id("linux"), "linux");
        assert_eq!(platform_id("windows"), "windows");
    }

    #[test]
    fn test_legacy_field_aliases() {
        let json = r#"{"ID":"a","Name":"A","Img":"i.png","Excerpt":"short","Homepage":"https://a.dev"}"#;
        let app: AppRecord = serde_json::from_str(json).unwrap();
        assert_eq!(app.icon, "i.png");
        assert_eq!(app.summary, "short");
        assert_eq!(app.website, "https://a.dev");
    }
}
