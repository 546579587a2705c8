use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::error::{FetchError, FetchResult};

/// Events emitted by a running download: zero or more `Progress`, then
/// exactly one `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Emitted after every chunk write when the response declared a
    /// content length. Non-decreasing; reaches 100 on success.
    Progress { percent: u8 },
    Completed(PathBuf),
    Failed(String),
}

/// Receiving side of one download's event stream.
pub struct DownloadHandle {
    events: mpsc::UnboundedReceiver<DownloadEvent>,
}

impl DownloadHandle {
    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }
}

/// Streams one file to disk on a background task.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Start a download and return its event stream.
    ///
    /// The transfer runs to completion or failure; there is no
    /// cancellation. Callers keep the download trigger disabled until
    /// the terminal event arrives, so at most one transfer is ever
    /// outstanding. A failed transfer leaves any partially written file
    /// at `dest` as-is.
    pub fn start(&self, url: String, dest: PathBuf) -> DownloadHandle {
        let (tx, events) = mpsc::unbounded_channel();
        let client = self.client.clone();

        tokio::spawn(async move {
            match stream_to_file(&client, &url, &dest, &tx).await {
                Ok(path) => {
                    info!("Downloaded {} -> {:?}", url, path);
                    let _ = tx.send(DownloadEvent::Completed(path));
                }
                Err(e) => {
                    let _ = tx.send(DownloadEvent::Failed(e.to_string()));
                }
            }
        });

        DownloadHandle { events }
    }
}

async fn stream_to_file(
    client: &Client,
    url: &str,
    dest: &Path,
    tx: &mpsc::UnboundedSender<DownloadEvent>,
) -> FetchResult<PathBuf> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Api {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total_bytes = response.content_length();

    // Create (truncating) only after the status check, so an error
    // response never clobbers an existing file.
    let mut file = tokio::fs::File::create(dest).await.map_err(|e| FetchError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let mut written: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await.map_err(|e| FetchError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
        written += chunk.len() as u64;

        if let Some(total) = total_bytes {
            let _ = tx.send(DownloadEvent::Progress {
                percent: percent_of(written, total),
            });
        }
    }

    file.flush().await.map_err(|e| FetchError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;
    debug!("Wrote {} bytes to {:?}", written, dest);

    Ok(dest.to_path_buf())
}

fn percent_of(written: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (written.saturating_mul(100) / total).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve one HTTP response on a loopback socket, writing the body
    /// in small slices so the client sees multiple chunks.
    async fn serve_once(status_line: &'static str, body: Vec<u8>, with_length: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            let mut head = String::new();
            head.push_str(status_line);
            if with_length {
                head.push_str(&format!("content-length: {}\r\n", body.len()));
            }
            head.push_str("connection: close\r\n\r\n");
            socket.write_all(head.as_bytes()).await.unwrap();

            for slice in body.chunks(8 * 1024) {
                socket.write_all(slice).await.unwrap();
                tokio::task::yield_now().await;
            }
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    async fn drain(handle: &mut DownloadHandle) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn percent_is_floored_and_clamped() {
        assert_eq!(percent_of(0, 1000), 0);
        assert_eq!(percent_of(999, 1000), 99);
        assert_eq!(percent_of(1000, 1000), 100);
        assert_eq!(percent_of(2000, 1000), 100);
        assert_eq!(percent_of(5, 0), 100);
    }

    #[tokio::test]
    async fn download_reports_monotonic_progress_and_completes() {
        let body: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        let base = serve_once("HTTP/1.1 200 OK\r\n", body.clone(), true).await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mod.jar");

        let downloader = Downloader::new(Client::new());
        let mut handle = downloader.start(format!("{}/mod.jar", base), dest.clone());
        let events = drain(&mut handle).await;

        let (terminal, progress) = events.split_last().unwrap();
        assert_eq!(terminal, &DownloadEvent::Completed(dest.clone()));

        let mut last = 0u8;
        for event in progress {
            match event {
                DownloadEvent::Progress { percent } => {
                    assert!(*percent >= last);
                    last = *percent;
                }
                other => panic!("unexpected event before terminal: {:?}", other),
            }
        }
        assert_eq!(last, 100);

        let written = std::fs::read(&dest).unwrap();
        assert_eq!(written, body);
    }

    /// Advertise more bytes than are sent, then drop the connection so
    /// the transfer dies mid-stream.
    async fn serve_truncated(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len() * 2
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn missing_content_length_omits_progress_but_completes() {
        let body: Vec<u8> = (0..16 * 1024).map(|i| (i % 239) as u8).collect();
        let base = serve_once("HTTP/1.1 200 OK\r\n", body.clone(), false).await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("mod.jar");

        let downloader = Downloader::new(Client::new());
        let mut handle = downloader.start(format!("{}/mod.jar", base), dest.clone());
        let events = drain(&mut handle).await;

        assert_eq!(events, vec![DownloadEvent::Completed(dest.clone())]);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[tokio::test]
    async fn midstream_disconnect_fails_and_leaves_the_partial_file() {
        let body = vec![7u8; 32 * 1024];
        let base = serve_truncated(body).await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("partial.jar");

        let downloader = Downloader::new(Client::new());
        let mut handle = downloader.start(format!("{}/partial.jar", base), dest.clone());
        let events = drain(&mut handle).await;

        let (terminal, progress) = events.split_last().unwrap();
        assert!(matches!(terminal, DownloadEvent::Failed(_)));
        for event in progress {
            assert!(matches!(event, DownloadEvent::Progress { .. }));
        }
        // No cleanup on failure: whatever was written stays on disk.
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn missing_resource_fails_without_creating_the_file() {
        let base = serve_once("HTTP/1.1 404 Not Found\r\n", b"gone".to_vec(), true).await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.jar");

        let downloader = Downloader::new(Client::new());
        let mut handle = downloader.start(format!("{}/missing.jar", base), dest.clone());
        let events = drain(&mut handle).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            DownloadEvent::Failed(message) => assert!(message.contains("404")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn unreachable_server_yields_failed() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("never.jar");

        let downloader = Downloader::new(Client::new());
        let mut handle = downloader.start(format!("http://{}/never.jar", addr), dest.clone());
        let events = drain(&mut handle).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], DownloadEvent::Failed(_)));
        assert!(!dest.exists());
    }
}
