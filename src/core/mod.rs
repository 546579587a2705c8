// ─── modfetch core ───
// Backend for searching Modrinth, narrowing a mod's versions by game
// version and loader, and streaming a chosen file to disk.
//
// Architecture:
//   core/
//     catalog/    — Modrinth v2 search + version listing + icon fetch
//     filter      — pure version filtering + derived filter options
//     session     — workflow state and the triggers a shell calls
//     downloader/ — single background download with progress events

pub mod catalog;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod http;
pub mod session;
