//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! The interpreter in [`crate::github`] executes them against the GitHub API;
//! tests execute them against recording mocks.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, Sha};

/// A label the bot expects to exist in every repository it manages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    /// Hex color without the leading `#`.
    pub color: String,
    pub description: String,
}

/// Conclusion of a check run reported by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckConclusion {
    Success,
    Failure,
}

/// A GitHub API effect.
///
/// Effects are repo-scoped: the interpreter is constructed with a `RepoId`, so
/// effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Repository ───────────────────────────────────────────────────────────
    /// Fetch repository metadata (default branch, detected language).
    GetRepository,

    /// Fetch a file's text content.
    ///
    /// `reference` is a branch, tag or commit SHA; `None` means the default
    /// branch. A missing file is a successful `FileContents(None)` response.
    GetFileContents {
        path: String,
        reference: Option<String>,
    },

    /// Ensure every label in the set exists with the given color and
    /// description. Existing labels not in the set are left alone.
    SyncLabels { labels: Vec<LabelSpec> },

    // ─── Pull Request Labels ──────────────────────────────────────────────────
    /// Remove one label from a pull request.
    RemoveLabel { pr: PrNumber, name: String },

    /// Add labels to a pull request.
    AddLabels { pr: PrNumber, names: Vec<String> },

    // ─── Pull Request Contents ────────────────────────────────────────────────
    /// List the paths of files changed by a pull request.
    ListPrFiles { pr: PrNumber },

    /// Report a completed check run on a commit.
    CreateCheckRun {
        head_sha: Sha,
        name: String,
        conclusion: CheckConclusion,
        title: String,
        summary: String,
    },
}

impl GitHubEffect {
    /// The snake_case name of the effect, matching its serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::GetRepository => "get_repository",
            GitHubEffect::GetFileContents { .. } => "get_file_contents",
            GitHubEffect::SyncLabels { .. } => "sync_labels",
            GitHubEffect::RemoveLabel { .. } => "remove_label",
            GitHubEffect::AddLabels { .. } => "add_labels",
            GitHubEffect::ListPrFiles { .. } => "list_pr_files",
            GitHubEffect::CreateCheckRun { .. } => "create_check_run",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Repository metadata returned from the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryData {
    /// The repository's default branch.
    pub default_branch: String,
    /// The primary language GitHub detected, if any.
    pub language: Option<String>,
}

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetRepository`.
    Repository(RepositoryData),

    /// Response to `GetFileContents`; `None` when the file does not exist.
    FileContents(Option<String>),

    /// Response to `SyncLabels`.
    LabelsSynced,

    /// Response to `RemoveLabel`.
    LabelRemoved,

    /// Response to `AddLabels`.
    LabelsAdded,

    /// Response to `ListPrFiles`.
    PrFiles(Vec<String>),

    /// Response to `CreateCheckRun`.
    CheckRunCreated,
}

impl GitHubResponse {
    /// A short name for the variant, used in unexpected-response errors.
    pub fn kind(&self) -> &'static str {
        match self {
            GitHubResponse::Repository(_) => "repository",
            GitHubResponse::FileContents(_) => "file_contents",
            GitHubResponse::LabelsSynced => "labels_synced",
            GitHubResponse::LabelRemoved => "label_removed",
            GitHubResponse::LabelsAdded => "labels_added",
            GitHubResponse::PrFiles(_) => "pr_files",
            GitHubResponse::CheckRunCreated => "check_run_created",
        }
    }
}
