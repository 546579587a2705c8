// ─── Modrinth wire models ───
// Shapes mirror the Modrinth v2 API; unknown fields are ignored.

use serde::Deserialize;

/// One hit from `/v2/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModSummary {
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// A release of a mod, from `/v2/project/{id}/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModVersion {
    pub name: String,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

impl ModVersion {
    /// The file this tool downloads; Modrinth lists the primary file first.
    pub fn primary_file(&self) -> Option<&VersionFile> {
        self.files.first()
    }
}

/// A downloadable artifact attached to a version.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub size: Option<u64>,
}
