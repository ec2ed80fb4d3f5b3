//! Catalog service.
//!
//! Wraps the capy-catalog crate: loads the catalog, narrows it to the
//! configured platform and resolves the featured list against it.

use crate::config::StoreConfig;
use capy_catalog::featured::build_cards;
use capy_catalog::{Catalog, CatalogLoader, FeaturedCard, LoadError};
use log::info;
use std::sync::Arc;

/// Everything a browser needs from one load cycle.
#[derive(Clone, Debug)]
pub struct LoadedCatalog {
    pub catalog: Arc<Catalog>,
    pub featured: Vec<FeaturedCard>,
}

/// Build the loader described by the config.
pub fn loader_for(config: &StoreConfig) -> CatalogLoader {
    CatalogLoader::new(config.catalog_url.clone(), config.snapshot_path())
}

/// Load, filter and resolve featured entries.
///
/// `all_platforms` skips the compatibility filter.
pub fn load(
    loader: &CatalogLoader,
    config: &StoreConfig,
    all_platforms: bool,
) -> Result<LoadedCatalog, LoadError> {
    let catalog = loader.load()?;
    let catalog = if all_platforms {
        catalog
    } else {
        let total = catalog.len();
        let filtered = catalog.filter_compatible_for(config.platform());
        info!(
            "{} of {} apps are compatible with {}",
            filtered.len(),
            total,
            config.platform()
        );
        filtered
    };

    let features = loader.fetch_featured(&config.featured_url);
    let featured = build_cards(&features, &catalog, &config.asset_base);

    Ok(LoadedCatalog {
        catalog: Arc::new(catalog),
        featured,
    })
}
