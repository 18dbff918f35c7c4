//! Turning a branch configuration into the release builder's input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::BranchConfiguration;
use super::release_type::ReleaseType;

/// Errors that make a release strategy impossible to build.
///
/// These are configuration problems in the repository, not bot failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("repository has no detected language")]
    NoLanguage,

    #[error("unknown release type: {0}")]
    UnknownReleaseType(String),
}

/// Repository facts a strategy is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFacts<'a> {
    /// Repository name; the default package name.
    pub name: &'a str,
    /// `owner/repo`.
    pub url: &'a str,
    /// Primary language detected by GitHub.
    pub language: Option<&'a str>,
}

/// Fully resolved input to the release builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseStrategy {
    pub release_type: ReleaseType,
    /// Multi-package mode. When set, `release_type` is the `simple` sentinel
    /// unless the configuration named one explicitly.
    pub manifest: bool,
    pub package_name: String,
    pub repo_url: String,
    pub default_branch: String,
    /// `Some(true)` on scheduled runs; absent means a normal run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,
    /// Comma-joined labels for the release PR; absent means the builder's
    /// default label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub monorepo_tags: bool,
    pub bump_minor_pre_major: bool,
    pub extra_files: Vec<String>,
}

/// Infers a release type from GitHub's detected repository language.
///
/// A few languages map to the Google-flavored ("yoshi") release types;
/// anything else must be the exact (case-insensitive) name of a registered
/// release type.
pub fn release_type_from_language(
    language: Option<&str>,
    registered: &[ReleaseType],
) -> Result<ReleaseType, StrategyError> {
    let language = language.ok_or(StrategyError::NoLanguage)?;
    let lowered = language.to_lowercase();
    match lowered.as_str() {
        "java" => Ok(ReleaseType::JavaYoshi),
        "typescript" | "javascript" => Ok(ReleaseType::Node),
        "php" => Ok(ReleaseType::PhpYoshi),
        "go" => Ok(ReleaseType::GoYoshi),
        other => registered
            .iter()
            .copied()
            .find(|t| t.as_str() == other)
            .ok_or_else(|| StrategyError::UnknownReleaseType(language.to_string())),
    }
}

/// Builds the release strategy for one branch.
///
/// The release type is the configured one if set, otherwise `simple` for
/// manifest mode, otherwise inferred from the repository language.
pub fn build_strategy(
    repository: &RepositoryFacts<'_>,
    branch: &BranchConfiguration,
    snapshot: Option<bool>,
    registered: &[ReleaseType],
) -> Result<ReleaseStrategy, StrategyError> {
    let settings = &branch.settings;
    let manifest = branch.is_manifest();

    let release_type = match settings.release_type {
        Some(explicit) => explicit,
        None if manifest => ReleaseType::Simple,
        None => release_type_from_language(repository.language, registered)?,
    };

    Ok(ReleaseStrategy {
        release_type,
        manifest,
        package_name: settings
            .package_name
            .clone()
            .unwrap_or_else(|| repository.name.to_string()),
        repo_url: repository.url.to_string(),
        default_branch: branch.branch.clone(),
        snapshot,
        label: settings.release_labels.as_ref().map(|l| l.join(",")),
        path: settings.path.clone(),
        monorepo_tags: settings.monorepo_tags.unwrap_or(false),
        bump_minor_pre_major: settings.bump_minor_pre_major.unwrap_or(false),
        extra_files: settings.extra_files.clone().unwrap_or_default(),
    })
}
