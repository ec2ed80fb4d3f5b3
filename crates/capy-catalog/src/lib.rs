//! capy-catalog: App store catalog for CapyStore.
//!
//! Provides:
//! - Catalog fetching with a local snapshot fallback
//! - Decoding into an ID-keyed catalog
//! - Platform compatibility filtering
//! - Display ordering and the category tree
//! - Installed-version tracking through an injected preference store
//! - Featured list parsing

pub mod catalog;
pub mod error;
pub mod featured;
pub mod install_state;
pub mod loader;
pub mod paths;
pub mod record;
pub mod tree;

pub use catalog::{Catalog, DisplayOrder};
pub use error::{DecodeError, LoadError, PreferenceError, TransportError};
pub use featured::{Feature, FeaturedCard, Rgb};
pub use install_state::{
    InstallState, JsonPreferences, MemoryPreferences, PreferenceStore, is_installed,
    mark_installed,
};
pub use loader::{CatalogFetcher, CatalogLoader, CatalogStream, HttpFetcher};
pub use record::{AppRecord, AppSource, Screenshot, current_platform};
pub use tree::{CategoryTree, FEATURED_NODE, ROOT_NODE};
