//! Error types for capy-catalog

use std::path::PathBuf;

/// Network fetch failures. Recoverable by falling back to the local snapshot.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The payload was not a well-formed catalog.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array or object of records, found {0}")]
    Shape(&'static str),

    #[error("record #{index} has an empty ID")]
    MissingId { index: usize },
}

/// Catalog load pipeline errors. All of them abort the load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("catalog unavailable ({reason}), fallback {} unreadable: {source}", .path.display())]
    FallbackUnavailable {
        reason: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Failures of the file-backed preference store.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
