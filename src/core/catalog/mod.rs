// ─── Catalog Client ───
// Read-only wrapper over the three Modrinth v2 endpoints this tool uses.

mod models;

pub use models::{ModSummary, ModVersion, VersionFile};

use serde::Deserialize;
use tracing::{info, warn};

use crate::core::error::{FetchError, FetchResult};
use crate::core::http::build_http_client;

const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";

#[derive(Debug, Deserialize)]
struct SearchResults {
    hits: Vec<ModSummary>,
}

pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new() -> FetchResult<Self> {
        Ok(Self {
            client: build_http_client()?,
            base_url: MODRINTH_API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root. Tests use this with a
    /// loopback server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The underlying HTTP client, shared with the download worker.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Free-text project search. An empty hit list is a valid result;
    /// only transport failures and non-success statuses are errors.
    pub async fn search(&self, query: &str) -> FetchResult<Vec<ModSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FetchError::Validation("search query is empty".into()));
        }

        let url = format!("{}/search", self.base_url);
        let resp = self.client.get(&url).query(&[("query", query)]).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Api {
                url,
                status: status.as_u16(),
            });
        }

        let results: SearchResults = serde_json::from_slice(&resp.bytes().await?)?;
        info!("Search '{}' returned {} mods", query, results.hits.len());
        Ok(results.hits)
    }

    /// All versions of a project, in the server's order (newest first).
    pub async fn list_versions(&self, project_id: &str) -> FetchResult<Vec<ModVersion>> {
        let url = format!("{}/project/{}/version", self.base_url, project_id);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Api {
                url,
                status: status.as_u16(),
            });
        }

        let versions: Vec<ModVersion> = serde_json::from_slice(&resp.bytes().await?)?;
        info!("Loaded {} versions for {}", versions.len(), project_id);
        Ok(versions)
    }

    /// Best-effort icon fetch. Never fails the surrounding listing;
    /// a miss is logged and reported as `None`.
    pub async fn fetch_icon(&self, url: &str) -> Option<Vec<u8>> {
        match self.try_fetch_icon(url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Icon fetch failed for {}: {}", url, e);
                None
            }
        }
    }

    async fn try_fetch_icon(&self, url: &str) -> FetchResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Api {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_rejects_empty_query_before_any_request() {
        let client = CatalogClient::new().unwrap();

        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, FetchError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_payload_surfaces_as_a_json_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            let body = "{ this is not json";
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.ok();
            socket.shutdown().await.ok();
        });

        let client = CatalogClient::new()
            .unwrap()
            .with_base_url(format!("http://{}", addr));
        let err = client.search("sodium").await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }

    #[tokio::test]
    async fn icon_fetch_failure_is_swallowed() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CatalogClient::new().unwrap();
        let icon = client.fetch_icon(&format!("http://{}/icon.png", addr)).await;
        assert!(icon.is_none());
    }
}
