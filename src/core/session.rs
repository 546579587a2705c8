// ─── Workflow session ───
// Explicit state behind the shell: one search result set, at most one
// selected mod with its version set, derived options and filter state.
// Each trigger replaces state wholesale rather than mutating it
// incrementally.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::catalog::{CatalogClient, ModSummary, ModVersion};
use crate::core::downloader::{DownloadHandle, Downloader};
use crate::core::error::{FetchError, FetchResult};
use crate::core::filter::{filtered, FilterChoice, FilterOptions, FilterState};

/// Everything loaded for the currently selected mod.
#[derive(Debug)]
struct Selection {
    summary: ModSummary,
    versions: Vec<ModVersion>,
    options: FilterOptions,
    filter: FilterState,
}

pub struct ModSession {
    catalog: CatalogClient,
    downloader: Downloader,
    mods: Vec<ModSummary>,
    selection: Option<Selection>,
}

impl ModSession {
    pub fn new(catalog: CatalogClient) -> Self {
        let downloader = Downloader::new(catalog.http_client().clone());
        Self {
            catalog,
            downloader,
            mods: Vec::new(),
            selection: None,
        }
    }

    /// Current search results, in the server's order.
    pub fn mods(&self) -> &[ModSummary] {
        &self.mods
    }

    /// The mod the user picked from the results, if any.
    pub fn selected_mod(&self) -> Option<&ModSummary> {
        self.selection.as_ref().map(|s| &s.summary)
    }

    /// Versions of the selected mod, unfiltered. Empty when nothing is
    /// selected.
    pub fn versions(&self) -> &[ModVersion] {
        self.selection
            .as_ref()
            .map(|s| s.versions.as_slice())
            .unwrap_or(&[])
    }

    /// Filter option sets derived from the selected mod's versions.
    pub fn filter_options(&self) -> Option<&FilterOptions> {
        self.selection.as_ref().map(|s| &s.options)
    }

    pub fn filter(&self) -> Option<&FilterState> {
        self.selection.as_ref().map(|s| &s.filter)
    }

    /// Run a search and replace the result set wholesale. Any previous
    /// selection, version set and filter state is dropped.
    pub async fn search(&mut self, query: &str) -> FetchResult<&[ModSummary]> {
        let hits = self.catalog.search(query).await?;
        self.mods = hits;
        self.selection = None;
        Ok(&self.mods)
    }

    /// Select a mod from the current result set and load its versions.
    /// Filters reset to any/any and option sets are derived fresh.
    pub async fn select_mod(&mut self, index: usize) -> FetchResult<&[ModVersion]> {
        let summary = self
            .mods
            .get(index)
            .ok_or_else(|| FetchError::Validation(format!("no mod at index {}", index)))?
            .clone();

        let versions = self.catalog.list_versions(&summary.project_id).await?;
        let options = FilterOptions::derive(&versions);
        info!(
            "Selected '{}': {} versions, {} game versions, {} loaders",
            summary.title,
            versions.len(),
            options.game_versions.len(),
            options.loaders.len()
        );

        self.selection = Some(Selection {
            summary,
            versions,
            options,
            filter: FilterState::default(),
        });
        Ok(self.versions())
    }

    /// Narrow by game version and return the recomputed filtered view.
    pub fn set_game_version_filter(&mut self, choice: FilterChoice) -> FetchResult<Vec<&ModVersion>> {
        let selection = self.selection.as_mut().ok_or_else(no_selection)?;
        selection.filter.game_version = choice;
        Ok(filtered(&selection.versions, &selection.filter))
    }

    /// Narrow by loader and return the recomputed filtered view.
    pub fn set_loader_filter(&mut self, choice: FilterChoice) -> FetchResult<Vec<&ModVersion>> {
        let selection = self.selection.as_mut().ok_or_else(no_selection)?;
        selection.filter.loader = choice;
        Ok(filtered(&selection.versions, &selection.filter))
    }

    /// Current filtered view; empty when nothing matches or nothing is
    /// selected.
    pub fn filtered_versions(&self) -> Vec<&ModVersion> {
        match &self.selection {
            Some(s) => filtered(&s.versions, &s.filter),
            None => Vec::new(),
        }
    }

    /// Start downloading the first file of the `filtered_index`-th
    /// version in the current filtered view into `dest_dir`.
    ///
    /// All validation happens before any network request. The returned
    /// handle carries progress and the terminal event; callers keep the
    /// download trigger disabled until the terminal event arrives.
    pub fn start_download(
        &self,
        filtered_index: usize,
        dest_dir: &Path,
    ) -> FetchResult<DownloadHandle> {
        let selection = self.selection.as_ref().ok_or_else(no_selection)?;
        let (url, dest) = resolve_download_target(
            &selection.versions,
            &selection.filter,
            filtered_index,
            dest_dir,
        )?;
        Ok(self.downloader.start(url, dest))
    }

    /// Best-effort icon bytes for a search hit; failures are logged and
    /// yield `None`.
    pub async fn fetch_icon(&self, url: &str) -> Option<Vec<u8>> {
        self.catalog.fetch_icon(url).await
    }
}

fn no_selection() -> FetchError {
    FetchError::Validation("no mod selected".into())
}

/// Resolve a download trigger into (url, destination path). Destination
/// checks come first so an invalid directory never reaches the network.
fn resolve_download_target(
    versions: &[ModVersion],
    filter: &FilterState,
    filtered_index: usize,
    dest_dir: &Path,
) -> FetchResult<(String, PathBuf)> {
    if !dest_dir.is_dir() {
        return Err(FetchError::Validation(format!(
            "destination directory {:?} does not exist",
            dest_dir
        )));
    }

    let view = filtered(versions, filter);
    if view.is_empty() {
        return Err(FetchError::Validation(
            "no version matches the current filters".into(),
        ));
    }

    let version = view.get(filtered_index).ok_or_else(|| {
        FetchError::Validation(format!("no filtered version at index {}", filtered_index))
    })?;
    let file = version.primary_file().ok_or_else(|| {
        FetchError::Validation(format!(
            "version '{}' has no downloadable files",
            version.name
        ))
    })?;

    Ok((file.url.clone(), dest_dir.join(&file.filename)))
}
