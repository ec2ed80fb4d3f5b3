//! Background icon and screenshot loading.
//!
//! Every load is fire-and-forget on its own thread and is tagged with the
//! app it was requested for plus the selection generation at request time.
//! Workers skip or drop work once the selection has moved on; views apply
//! a result only if it still matches what they show.

use crate::panels::events::StoreEvent;
use image::imageops::FilterType;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use tokio::sync::broadcast::Sender;

const ICON_SIZE: u32 = 256;
const SCREENSHOT_WIDTH: u32 = 640;
const SCREENSHOT_HEIGHT: u32 = 480;

/// Per-image failures. Never fatal: the slot shows a placeholder.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("Unsupported image location: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Decode(#[from] image::ImageError),
}

/// Where a loaded image goes in the detail view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    Icon,
    Screenshot(usize),
}

/// A load to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRequest {
    pub app_id: String,
    pub generation: u64,
    pub slot: ImageSlot,
    pub url: String,
}

/// Result of a finished load, published on the event bus.
#[derive(Clone, Debug)]
pub struct ImageLoaded {
    pub app_id: String,
    pub generation: u64,
    pub slot: ImageSlot,
    /// Cached image file, or why it could not be produced.
    pub result: Result<PathBuf, String>,
}

/// The app currently shown in the detail view.
///
/// `select` bumps the generation so in-flight loads for the previous app can
/// tell they are stale.
#[derive(Debug, Default)]
pub struct Selection {
    generation: AtomicU64,
    current: RwLock<Option<String>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `app_id` the current selection and return its generation.
    pub fn select(&self, app_id: &str) -> u64 {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(app_id.to_string());
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Nothing selected (e.g. the featured page is shown).
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a load tagged with `app_id`/`generation` is still wanted.
    pub fn is_current(&self, app_id: &str, generation: u64) -> bool {
        self.generation() == generation && self.current().as_deref() == Some(app_id)
    }
}

/// Spawns image loads and publishes their results.
#[derive(Clone)]
pub struct ImageLoader {
    cache_dir: PathBuf,
    selection: Arc<Selection>,
    events: Sender<StoreEvent>,
}

impl ImageLoader {
    pub fn new(cache_dir: PathBuf, selection: Arc<Selection>, events: Sender<StoreEvent>) -> Self {
        Self {
            cache_dir,
            selection,
            events,
        }
    }

    /// Start a background load. Nothing is spawned for empty URLs.
    pub fn request(&self, request: ImageRequest) -> Option<JoinHandle<()>> {
        if request.url.is_empty() {
            return None;
        }

        let cache_dir = self.cache_dir.clone();
        let selection = self.selection.clone();
        let events = self.events.clone();

        Some(thread::spawn(move || {
            if !selection.is_current(&request.app_id, request.generation) {
                debug!("Skipping stale image load for {}", request.app_id);
                return;
            }

            let result = load_image(&request.url, request.slot, &cache_dir);
            if let Err(e) = &result {
                warn!("Failed to load image for {}: {}", request.app_id, e);
            }

            if !selection.is_current(&request.app_id, request.generation) {
                debug!("Dropping stale image for {}", request.app_id);
                return;
            }

            let loaded = ImageLoaded {
                app_id: request.app_id,
                generation: request.generation,
                slot: request.slot,
                result: result.map_err(|e| e.to_string()),
            };
            let _ = events.send(StoreEvent::Image(Box::new(loaded)));
        }))
    }
}

/// Cache file name for a URL.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Read the raw bytes behind an http(s) or file URL.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, ImageError> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(fs::read(path)?);
    }
    if !url.starts_with("http") {
        return Err(ImageError::Unsupported(url.to_string()));
    }

    match ureq::get(url).call() {
        Ok(response) => {
            let mut bytes = Vec::new();
            response.into_reader().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
        Err(e) => Err(ImageError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Download, decode, scale and cache an image. Cached files are reused.
pub fn load_image(url: &str, slot: ImageSlot, cache_dir: &Path) -> Result<PathBuf, ImageError> {
    let path = cache_dir.join(format!("{}.png", cache_key(url)));
    if path.exists() {
        return Ok(path);
    }

    let bytes = fetch_bytes(url)?;
    let img = image::load_from_memory(&bytes)?;

    let scaled = match slot {
        ImageSlot::Icon => img.resize(ICON_SIZE, ICON_SIZE, FilterType::CatmullRom),
        ImageSlot::Screenshot(_) => {
            img.resize(SCREENSHOT_WIDTH, SCREENSHOT_HEIGHT, FilterType::Triangle)
        }
    };

    fs::create_dir_all(cache_dir)?;
    scaled.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::drain;
    use image::{Rgba, RgbaImage};
    use tokio::sync::broadcast;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> String {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .save(&path)
            .unwrap();
        format!("file://{}", path.display())
    }

    fn request(app_id: &str, generation: u64, url: &str) -> ImageRequest {
        ImageRequest {
            app_id: app_id.to_string(),
            generation,
            slot: ImageSlot::Icon,
            url: url.to_string(),
        }
    }

    #[test]
    fn test_selection_generations() {
        let selection = Selection::new();
        assert_eq!(selection.current(), None);

        let first = selection.select("a");
        assert!(selection.is_current("a", first));

        let second = selection.select("b");
        assert!(second > first);
        assert!(!selection.is_current("a", first));
        assert!(selection.is_current("b", second));

        // Re-selecting the same app still invalidates older loads.
        let third = selection.select("b");
        assert!(!selection.is_current("b", second));
        assert!(selection.is_current("b", third));

        selection.clear();
        assert!(!selection.is_current("b", third));
        assert_eq!(selection.current(), None);
    }

    #[test]
    fn test_load_image_scales_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let url = write_png(dir.path(), "big.png", 1024, 512);
        let cache = dir.path().join("cache");

        let path = load_image(&url, ImageSlot::Icon, &cache).unwrap();
        assert!(path.starts_with(&cache));
        assert_eq!(image::image_dimensions(&path).unwrap(), (256, 128));

        let again = load_image(&url, ImageSlot::Icon, &cache).unwrap();
        assert_eq!(path, again);
    }

    #[test]
    fn test_load_image_errors() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.png");
        fs::write(&garbage, b"definitely not an image").unwrap();

        let url = format!("file://{}", garbage.display());
        assert!(matches!(
            load_image(&url, ImageSlot::Icon, dir.path()),
            Err(ImageError::Decode(_))
        ));
        assert!(matches!(
            load_image("ftp://example.com/a.png", ImageSlot::Icon, dir.path()),
            Err(ImageError::Unsupported(_))
        ));
    }

    #[test]
    fn test_cache_key_is_stable_hex() {
        let key = cache_key("https://example.com/a.png");
        assert_eq!(key.len(), 64);
        assert_eq!(key, cache_key("https://example.com/a.png"));
        assert_ne!(key, cache_key("https://example.com/b.png"));
    }

    #[test]
    fn test_current_load_is_published() {
        let dir = tempfile::tempdir().unwrap();
        let url = write_png(dir.path(), "icon.png", 32, 32);
        let selection = Arc::new(Selection::new());
        let (tx, mut rx) = broadcast::channel(16);
        let loader = ImageLoader::new(dir.path().join("cache"), selection.clone(), tx);

        let generation = selection.select("a");
        loader.request(request("a", generation, &url)).unwrap().join().unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            StoreEvent::Image(loaded) => {
                assert_eq!(loaded.app_id, "a");
                assert_eq!(loaded.slot, ImageSlot::Icon);
                assert!(loaded.result.is_ok());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let url = write_png(dir.path(), "icon.png", 32, 32);
        let selection = Arc::new(Selection::new());
        let (tx, mut rx) = broadcast::channel(16);
        let loader = ImageLoader::new(dir.path().join("cache"), selection.clone(), tx);

        let stale = selection.select("a");
        selection.select("b");
        loader.request(request("a", stale, &url)).unwrap().join().unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_failed_load_is_published_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let selection = Arc::new(Selection::new());
        let (tx, mut rx) = broadcast::channel(16);
        let loader = ImageLoader::new(dir.path().to_path_buf(), selection.clone(), tx);

        let generation = selection.select("a");
        let missing = format!("file://{}", dir.path().join("missing.png").display());
        loader.request(request("a", generation, &missing)).unwrap().join().unwrap();
        assert!(loader.request(request("a", generation, "")).is_none());

        match drain(&mut rx).as_slice() {
            [StoreEvent::Image(loaded)] => assert!(loaded.result.is_err()),
            other => panic!("unexpected events {other:?}"),
        }
    }
}
