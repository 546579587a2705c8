pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::catalog::{CatalogClient, ModSummary, ModVersion, VersionFile};
pub use crate::core::downloader::{DownloadEvent, DownloadHandle, Downloader};
pub use crate::core::error::{FetchError, FetchResult};
pub use crate::core::filter::{filtered, FilterChoice, FilterOptions, FilterState, ANY_LABEL};
pub use crate::core::session::ModSession;

/// Initialize structured logging. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,modfetch=debug")),
        )
        .init();
}
