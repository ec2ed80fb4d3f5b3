//! Catalog implementation.

use crate::error::DecodeError;
use crate::record::{AppRecord, current_platform};

use std::collections::BTreeMap;
use std::io::Read;

/// The full set of apps from one load cycle, keyed by ID.
///
/// Built once per load and never patched: a refresh replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    apps: BTreeMap<String, AppRecord>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records. Later duplicates replace earlier ones.
    pub fn from_records(records: impl IntoIterator<Item = AppRecord>) -> Self {
        let apps = records
            .into_iter()
            .map(|app| (app.id.clone(), app))
            .collect();
        Self { apps }
    }

    /// Decode a catalog from a JSON stream.
    ///
    /// Accepts either an array of records or an object keyed by ID. In the
    /// keyed form a record without an `ID` takes its key.
    pub fn decode<R: Read>(reader: R) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    /// Decode a catalog from an in-memory JSON document.
    pub fn decode_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    fn from_value(value: serde_json::Value) -> Result<Self, DecodeError> {
        let records: Vec<AppRecord> = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value)?,
            serde_json::Value::Object(_) => {
                let keyed: BTreeMap<String, AppRecord> = serde_json::from_value(value)?;
                keyed
                    .into_iter()
                    .map(|(key, mut app)| {
                        if app.id.is_empty() {
                            app.id = key;
                        }
                        app
                    })
                    .collect()
            }
            serde_json::Value::Null => return Err(DecodeError::Shape("null")),
            serde_json::Value::Bool(_) => return Err(DecodeError::Shape("a boolean")),
            serde_json::Value::Number(_) => return Err(DecodeError::Shape("a number")),
            serde_json::Value::String(_) => return Err(DecodeError::Shape("a string")),
        };

        if let Some(index) = records.iter().position(|app| app.id.is_empty()) {
            return Err(DecodeError::MissingId { index });
        }

        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Get app details by ID.
    pub fn get(&self, id: &str) -> Option<&AppRecord> {
        self.apps.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.apps.contains_key(id)
    }

    /// Iterate records in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &AppRecord> {
        self.apps.values()
    }

    /// Keep only apps that run on the current platform.
    pub fn filter_compatible(&self) -> Catalog {
        self.filter_compatible_for(current_platform())
    }

    /// Keep only apps that run on `platform`.
    pub fn filter_compatible_for(&self, platform: &str) -> Catalog {
        let apps = self
            .apps
            .iter()
            .filter(|(_, app)| app.is_compatible_with(platform))
            .map(|(id, app)| (id.clone(), app.clone()))
            .collect();
        Catalog { apps }
    }

    /// Records sorted for display by case-insensitive name.
    /// Equal names keep ID order.
    pub fn order_for_display(&self) -> DisplayOrder<'_> {
        let mut apps: Vec<&AppRecord> = self.apps.values().collect();
        apps.sort_by_cached_key(|app| app.sort_key());
        DisplayOrder { apps }
    }
}

impl FromIterator<AppRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = AppRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

/// Sorted view over a catalog. Can be iterated any number of times.
#[derive(Clone, Debug)]
pub struct DisplayOrder<'a> {
    apps: Vec<&'a AppRecord>,
}

impl<'a> DisplayOrder<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a AppRecord> + '_ {
        self.apps.iter().copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.iter().map(|app| app.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl<'a, 'b> IntoIterator for &'b DisplayOrder<'a> {
    type Item = &'a AppRecord;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, &'a AppRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.apps.iter().copied()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const FIXTURE: &str = include_str!("../testdata/list.json");

    pub(crate) fn app(id: &str, name: &str, category: &str) -> AppRecord {
        AppRecord {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    fn requiring(id: &str, requires: &str) -> AppRecord {
        AppRecord {
            id: id.to_string(),
            requires: requires.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_fixture() {
        let catalog = Catalog::decode(FIXTURE.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 8);

        let app = catalog.get("xyz.andy.beebui").unwrap();
        assert_eq!(app.name, "beebUI");
        assert_eq!(
            app.icon,
            "https://github.com/andydotxyz/beebui/blob/master/beebui.png?raw=true"
        );
        assert_eq!(app.developer, "Andy Williams");
        assert_eq!(app.summary, "A BBC Micro Emulator based on Fyne and skx/gobasic");
        assert_eq!(app.url, "https://apps.fyne.io/apps/beebui.html");
        assert_eq!(app.website, "https://github.com/andydotxyz/beebui");
        assert_eq!(app.category, "games");
        assert_eq!(
            app.release_date.map(|d| d.to_rfc3339()),
            Some("2019-03-17T19:32:14+00:00".to_string())
        );
        assert_eq!(app.version, "");
        assert_eq!(app.source.git, "https://github.com/andydotxyz/beebui.git");
        assert_eq!(app.source.package, "github.com/andydotxyz/beebui/cmd/beebui");
        assert_eq!(app.screenshots.len(), 2);
        assert_eq!(app.screenshots[1].kind, "mobile");
    }

    #[test]
    fn test_decode_keyed_object() {
        let json = r#"{
            "a.one": {"Name": "One"},
            "a.two": {"ID": "a.two", "Name": "Two"}
        }"#;
        let catalog = Catalog::decode(json.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a.one").unwrap().name, "One");
        assert_eq!(catalog.get("a.two").unwrap().name, "Two");
    }

    #[test]
    fn test_decode_duplicate_ids_last_write_wins() {
        let json = r#"[{"ID": "dup", "Name": "First"}, {"ID": "dup", "Name": "Second"}]"#;
        let catalog = Catalog::decode(json.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("dup").unwrap().name, "Second");
    }

    #[test]
    fn test_decode_truncated_fails() {
        let truncated = &FIXTURE[..FIXTURE.len() / 2];
        let err = Catalog::decode(truncated.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_decode_malformed_date_fails() {
        let json = r#"[{"ID": "a", "Name": "A", "Date": "yesterday"}]"#;
        assert!(matches!(
            Catalog::decode(json.as_bytes()),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        assert!(matches!(
            Catalog::decode("42".as_bytes()),
            Err(DecodeError::Shape("a number"))
        ));
        assert!(matches!(
            Catalog::decode(r#"[{"ID": 7}]"#.as_bytes()),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_empty_id_fails() {
        let json = r#"[{"ID": "a"}, {"Name": "nameless"}]"#;
        assert!(matches!(
            Catalog::decode(json.as_bytes()),
            Err(DecodeError::MissingId { index: 1 })
        ));
    }

    #[test]
    fn test_filter_compatible() {
        let os = current_platform();
        let catalog = Catalog::from_records([
            requiring("a", os),
            requiring("b", &format!("{},powerpc", os)),
            requiring("c", "powerpc"),
            requiring("d", ""),
        ]);

        assert_eq!(catalog.len(), 4);
        let filtered = catalog.filter_compatible();
        assert_eq!(filtered.len(), 3);
        assert!(!filtered.contains("c"));
    }

    #[test]
    fn test_filter_compatible_is_idempotent() {
        let catalog = Catalog::decode(FIXTURE.as_bytes()).unwrap();
        for platform in ["linux", "darwin", "windows", "powerpc"] {
            let once = catalog.filter_compatible_for(platform);
            assert_eq!(once.filter_compatible_for(platform), once);
        }
    }

    #[test]
    fn test_filter_compatible_keeps_exactly_matching() {
        let catalog = Catalog::decode(FIXTURE.as_bytes()).unwrap();
        let filtered = catalog.filter_compatible_for("windows");
        for app in catalog.iter() {
            let expected =
                app.requires.is_empty() || app.requires.split(',').any(|t| t == "windows");
            assert_eq!(filtered.contains(&app.id), expected, "{}", app.id);
        }
    }

    #[test]
    fn test_order_for_display_case_insensitive() {
        let catalog = Catalog::from_records([
            app("1", "zebra", ""),
            app("2", "Apple", ""),
            app("3", "banana", ""),
            app("4", "Cherry", ""),
        ]);

        let order = catalog.order_for_display();
        let names: Vec<_> = order.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "banana", "Cherry", "zebra"]);
    }

    #[test]
    fn test_order_for_display_is_stable() {
        let catalog = Catalog::from_records([
            app("c", "Same", ""),
            app("a", "same", ""),
            app("b", "SAME", ""),
            app("0", "Other", ""),
        ]);

        let order = catalog.order_for_display();
        assert_eq!(order.ids().collect::<Vec<_>>(), vec!["0", "a", "b", "c"]);
    }

    #[test]
    fn test_order_for_display_is_restartable() {
        let catalog = Catalog::decode(FIXTURE.as_bytes()).unwrap();
        let order = catalog.order_for_display();
        let first: Vec<_> = order.ids().collect();
        let second: Vec<_> = (&order).into_iter().map(|a| a.id.as_str()).collect();
        assert_eq!(first, second);
        assert_eq!(order.len(), catalog.len());

        let keys: Vec<_> = order.iter().map(|a| a.sort_key()).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
}
