// ─── Version filtering ───
// Pure narrowing of a mod's version list by game version and loader,
// plus the derived option sets a picker offers.

use std::collections::BTreeSet;

use crate::core::catalog::ModVersion;

/// Label for the unfiltered choice in either dimension.
pub const ANY_LABEL: &str = "any";

/// One filter dimension: either "any" or a concrete value that must be
/// present in the version's compatibility set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterChoice {
    #[default]
    Any,
    Value(String),
}

impl FilterChoice {
    /// Parse a picker label back into a choice.
    pub fn from_label(label: &str) -> Self {
        if label == ANY_LABEL {
            FilterChoice::Any
        } else {
            FilterChoice::Value(label.to_string())
        }
    }

    fn admits(&self, set: &[String]) -> bool {
        match self {
            FilterChoice::Any => true,
            FilterChoice::Value(v) => set.iter().any(|s| s == v),
        }
    }
}

/// The user's current narrowing over game version and loader.
/// Defaults to any/any, which matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub game_version: FilterChoice,
    pub loader: FilterChoice,
}

/// Order-preserving subsequence of `versions` matching both dimensions.
/// An empty result is legitimate; the download trigger rejects it.
pub fn filtered<'a>(versions: &'a [ModVersion], filter: &FilterState) -> Vec<&'a ModVersion> {
    versions
        .iter()
        .filter(|v| filter.game_version.admits(&v.game_versions) && filter.loader.admits(&v.loaders))
        .collect()
}

/// Distinct game versions and loaders present in a version set, sorted
/// lexicographically. Derived fresh every time a mod is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
}

impl FilterOptions {
    pub fn derive(versions: &[ModVersion]) -> Self {
        let mut game_versions = BTreeSet::new();
        let mut loaders = BTreeSet::new();

        for v in versions {
            game_versions.extend(v.game_versions.iter().cloned());
            loaders.extend(v.loaders.iter().cloned());
        }

        Self {
            game_versions: game_versions.into_iter().collect(),
            loaders: loaders.into_iter().collect(),
        }
    }

    /// Labels for a game-version picker, `"any"` first.
    pub fn game_version_labels(&self) -> Vec<String> {
        Self::with_any(&self.game_versions)
    }

    /// Labels for a loader picker, `"any"` first.
    pub fn loader_labels(&self) -> Vec<String> {
        Self::with_any(&self.loaders)
    }

    fn with_any(values: &[String]) -> Vec<String> {
        let mut labels = Vec::with_capacity(values.len() + 1);
        labels.push(ANY_LABEL.to_string());
        labels.extend(values.iter().cloned());
        labels
    }
}
