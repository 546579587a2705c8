mod client;

pub use client::{DownloadEvent, DownloadHandle, Downloader};
