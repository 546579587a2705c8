use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire backend.
/// Every fallible operation returns `FetchResult<T>`.
#[derive(Debug, Error)]
pub enum FetchError {
    // ── User input ──────────────────────────────────────
    #[error("{0}")]
    Validation(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed: HTTP {status}")]
    Api { url: String, status: u16 },

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type FetchResult<T> = Result<T, FetchError>;
