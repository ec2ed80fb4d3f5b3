//! Shared services for CapyStore.
//!
//! - `catalog` - Catalog load, platform filter, featured list
//! - `images` - Background icon/screenshot loading with staleness checks
//! - `install` - External installer invocation and install bookkeeping

pub mod catalog;
pub mod images;
pub mod install;
