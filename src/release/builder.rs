//! The release builder and publisher collaborators.
//!
//! Building the release pull request and publishing a GitHub release are
//! delegated to an external release tool. The dispatcher only sees the two
//! traits below and the typed [`ReleaseError`] they fail with.

use std::future::Future;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::config::{BranchConfiguration, DEFAULT_CHANGELOG_PATH};
use super::labels::PENDING_LABEL;
use super::release_type::ReleaseType;
use super::strategy::ReleaseStrategy;

/// Exit status the release tool uses for configuration problems (`EX_CONFIG`).
pub const EXIT_CONFIGURATION: i32 = 78;

/// Exit status the release tool uses when the release already exists
/// (`EX_CANTCREAT`).
pub const EXIT_DUPLICATE_RELEASE: i32 = 73;

/// Errors reported by the release builder or publisher.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The repository's configuration makes a release impossible. Logged and
    /// dropped by the dispatcher.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The release being published already exists. Logged and dropped by the
    /// dispatcher.
    #[error("duplicate release: {0}")]
    DuplicateRelease(String),

    #[error("failed to run release tool: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode release tool input: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl ReleaseError {
    /// Returns true for failures that are a property of the repository, not
    /// of the bot.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ReleaseError::Configuration(_))
    }
}

/// Opens or updates the release pull request described by a strategy.
pub trait ReleaseBuilder: Sync {
    fn build(
        &self,
        strategy: &ReleaseStrategy,
    ) -> impl Future<Output = Result<(), ReleaseError>> + Send;

    /// Release types the builder knows how to handle; used for language
    /// inference.
    fn registered_types(&self) -> Vec<ReleaseType> {
        ReleaseType::ALL.to_vec()
    }
}

/// Creates the GitHub release for a merged release pull request.
pub trait ReleasePublisher: Sync {
    fn publish(
        &self,
        request: &PublishRequest,
    ) -> impl Future<Output = Result<(), ReleaseError>> + Send;
}

/// Input of the release publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub package_name: String,
    pub repo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_type: Option<ReleaseType>,
    pub manifest: bool,
    pub default_branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub changelog_path: String,
    pub monorepo_tags: bool,
    pub extra_files: Vec<String>,
    /// Label to apply once the release is created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_label: Option<String>,
    /// Label that marks the merged release pull request to publish.
    pub label: String,
}

impl PublishRequest {
    pub fn from_branch(
        package_name: impl Into<String>,
        repo_url: impl Into<String>,
        branch: &BranchConfiguration,
    ) -> Self {
        let settings = &branch.settings;
        PublishRequest {
            package_name: package_name.into(),
            repo_url: repo_url.into(),
            release_type: settings.release_type,
            manifest: branch.is_manifest(),
            default_branch: branch.branch.clone(),
            path: settings.path.clone(),
            changelog_path: settings
                .changelog_path
                .clone()
                .unwrap_or_else(|| DEFAULT_CHANGELOG_PATH.to_string()),
            monorepo_tags: settings.monorepo_tags.unwrap_or(false),
            extra_files: settings.extra_files.clone().unwrap_or_default(),
            release_label: settings.release_label.clone(),
            label: PENDING_LABEL.to_string(),
        }
    }
}

/// Runs an external release tool for both the builder and the publisher.
///
/// The tool is invoked as `<program> <args..> release-pr` or
/// `<program> <args..> github-release`, with the request as JSON on stdin and
/// `GITHUB_TOKEN` in its environment. Exit status 78 is a configuration error,
/// 73 a duplicate release; anything else non-zero is a failure.
#[derive(Clone)]
pub struct CommandReleaser {
    program: String,
    args: Vec<String>,
    token: String,
    api_url: Option<String>,
}

impl CommandReleaser {
    pub fn new(program: impl Into<String>, token: impl Into<String>) -> Self {
        CommandReleaser {
            program: program.into(),
            args: Vec::new(),
            token: token.into(),
            api_url: None,
        }
    }

    /// Arguments placed between the program and the subcommand.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// GitHub API base URL handed to the tool as `GITHUB_API_URL`.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    async fn run<T: Serialize>(&self, subcommand: &str, input: &T) -> Result<(), ReleaseError> {
        let input = serde_json::to_vec(input)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(subcommand)
            .env("GITHUB_TOKEN", &self.token)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(api_url) = &self.api_url {
            command.env("GITHUB_API_URL", api_url);
        }

        debug!(program = %self.program, subcommand, "Running release tool");
        let mut child = command.spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&input).await?;
        }
        let output = child.wait_with_output().await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            info!(subcommand, output = %stdout.trim(), "Release tool output");
        }

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(match output.status.code() {
            Some(EXIT_CONFIGURATION) => ReleaseError::Configuration(stderr),
            Some(EXIT_DUPLICATE_RELEASE) => ReleaseError::DuplicateRelease(stderr),
            _ => ReleaseError::Other(format!(
                "{} {subcommand} exited with {}: {stderr}",
                self.program, output.status
            )),
        })
    }
}

impl std::fmt::Debug for CommandReleaser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandReleaser")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl ReleaseBuilder for CommandReleaser {
    async fn build(&self, strategy: &ReleaseStrategy) -> Result<(), ReleaseError> {
        self.run("release-pr", strategy).await
    }
}

impl ReleasePublisher for CommandReleaser {
    async fn publish(&self, request: &PublishRequest) -> Result<(), ReleaseError> {
        self.run("github-release", request).await
    }
}
