//! Catalog fetching with local snapshot fallback.
//!
//! The network is tried exactly once. If the request fails, or the body is
//! not a valid catalog, the snapshot on disk is used instead. A good network
//! body replaces the snapshot for the next offline start.

use crate::catalog::Catalog;
use crate::error::{LoadError, TransportError};
use crate::featured::{Feature, parse_featured};
use crate::paths::write_replacing;

use log::{info, warn};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Owned catalog byte stream. Released when dropped.
pub type CatalogStream = Box<dyn Read + Send>;

/// Something that can GET a URL.
pub trait CatalogFetcher: Send + Sync {
    fn get(&self, url: &str) -> Result<CatalogStream, TransportError>;
}

/// Plain HTTP(S) fetcher.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl CatalogFetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<CatalogStream, TransportError> {
        // Non-2xx statuses come back as errors too.
        match ureq::get(url).call() {
            Ok(response) => Ok(Box::new(response.into_reader())),
            Err(e) => Err(TransportError::Http {
                url: url.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

/// Loads the store catalog.
pub struct CatalogLoader {
    catalog_url: String,
    snapshot_path: PathBuf,
    fetcher: Box<dyn CatalogFetcher>,
}

impl CatalogLoader {
    /// Create a loader using HTTP for the network side.
    pub fn new(catalog_url: impl Into<String>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_url: catalog_url.into(),
            snapshot_path: snapshot_path.into(),
            fetcher: Box::new(HttpFetcher),
        }
    }

    /// Replace the network fetcher.
    pub fn with_fetcher(mut self, fetcher: impl CatalogFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Open the catalog stream, from the network or else the snapshot.
    pub fn fetch(&self) -> Result<CatalogStream, LoadError> {
        match self.fetcher.get(&self.catalog_url) {
            Ok(stream) => Ok(stream),
            Err(e) => {
                warn!("Catalog fetch failed: {}. Reading snapshot", e);
                self.open_snapshot(e.to_string())
            }
        }
    }

    /// Fetch and decode the catalog.
    ///
    /// Only the snapshot's decode error is fatal; a bad network body just
    /// sends us to the snapshot.
    pub fn load(&self) -> Result<Catalog, LoadError> {
        let reason = match self.fetch_network_body() {
            Ok(body) => match Catalog::decode_slice(&body) {
                Ok(catalog) => {
                    info!(
                        "Loaded {} apps from {}",
                        catalog.len(),
                        self.catalog_url
                    );
                    self.write_snapshot(&body);
                    return Ok(catalog);
                }
                Err(e) => {
                    warn!("Catalog from {} is not decodable: {}", self.catalog_url, e);
                    e.to_string()
                }
            },
            Err(e) => {
                warn!("Catalog fetch failed: {}. Reading snapshot", e);
                e.to_string()
            }
        };

        let stream = self.open_snapshot(reason)?;
        let catalog = Catalog::decode(stream)?;
        info!(
            "Loaded {} apps from snapshot {}",
            catalog.len(),
            self.snapshot_path.display()
        );
        Ok(catalog)
    }

    /// Fetch the featured list. Failures are logged and give an empty list.
    pub fn fetch_featured(&self, url: &str) -> Vec<Feature> {
        let stream = match self.fetcher.get(url) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to fetch featured list: {}", e);
                return Vec::new();
            }
        };

        match parse_featured(stream) {
            Ok(list) => list,
            Err(e) => {
                warn!("Failed to parse featured list: {}", e);
                Vec::new()
            }
        }
    }

    fn fetch_network_body(&self) -> Result<Vec<u8>, TransportError> {
        let mut stream = self.fetcher.get(&self.catalog_url)?;
        let mut body = Vec::new();
        stream.read_to_end(&mut body)?;
        Ok(body)
    }

    fn open_snapshot(&self, reason: String) -> Result<CatalogStream, LoadError> {
        match fs::File::open(&self.snapshot_path) {
            Ok(file) => Ok(Box::new(file)),
            Err(source) => Err(LoadError::FallbackUnavailable {
                reason,
                path: self.snapshot_path.clone(),
                source,
            }),
        }
    }

    fn write_snapshot(&self, body: &[u8]) {
        if let Err(e) = write_replacing(&self.snapshot_path, body) {
            warn!(
                "Failed to write catalog snapshot {}: {}",
                self.snapshot_path.display(),
                e
            );
        }
    }
}
