//! Typed wrappers around single GitHub effects.
//!
//! Each function issues one effect through an interpreter and unpacks the
//! matching response variant, so callers never match on `GitHubResponse`
//! themselves.

use thiserror::Error;
use tracing::debug;

use crate::types::{PrNumber, Sha};

use super::github::{CheckConclusion, GitHubEffect, GitHubResponse, LabelSpec, RepositoryData};
use super::interpreter::GitHubInterpreter;

/// Errors from executing a single GitHub effect.
#[derive(Debug, Error)]
pub enum GitHubCallError {
    /// The interpreter failed to execute the effect.
    #[error("GitHub request `{effect}` failed: {source}")]
    Interpreter {
        effect: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The interpreter answered with a response for a different effect.
    #[error("unexpected `{response}` response to `{effect}`")]
    UnexpectedResponse {
        effect: &'static str,
        response: &'static str,
    },
}

async fn call<G: GitHubInterpreter>(
    github: &G,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubCallError> {
    let name = effect.name();
    debug!(effect = name, "Executing GitHub effect");
    github
        .interpret(effect)
        .await
        .map_err(|e| GitHubCallError::Interpreter {
            effect: name,
            source: Box::new(e),
        })
}

fn unexpected(effect: &'static str, response: &GitHubResponse) -> GitHubCallError {
    GitHubCallError::UnexpectedResponse {
        effect,
        response: response.kind(),
    }
}

/// Fetches repository metadata.
pub async fn get_repository<G: GitHubInterpreter>(
    github: &G,
) -> Result<RepositoryData, GitHubCallError> {
    const NAME: &str = "get_repository";
    match call(github, GitHubEffect::GetRepository).await? {
        GitHubResponse::Repository(data) => Ok(data),
        other => Err(unexpected(NAME, &other)),
    }
}

/// Fetches a file's contents; `Ok(None)` if it does not exist.
pub async fn get_file_contents<G: GitHubInterpreter>(
    github: &G,
    path: &str,
    reference: Option<&str>,
) -> Result<Option<String>, GitHubCallError> {
    const NAME: &str = "get_file_contents";
    let effect = GitHubEffect::GetFileContents {
        path: path.to_string(),
        reference: reference.map(str::to_string),
    };
    match call(github, effect).await? {
        GitHubResponse::FileContents(contents) => Ok(contents),
        other => Err(unexpected(NAME, &other)),
    }
}

pub async fn sync_labels<G: GitHubInterpreter>(
    github: &G,
    labels: Vec<LabelSpec>,
) -> Result<(), GitHubCallError> {
    const NAME: &str = "sync_labels";
    match call(github, GitHubEffect::SyncLabels { labels }).await? {
        GitHubResponse::LabelsSynced => Ok(()),
        other => Err(unexpected(NAME, &other)),
    }
}

pub async fn remove_label<G: GitHubInterpreter>(
    github: &G,
    pr: PrNumber,
    name: &str,
) -> Result<(), GitHubCallError> {
    const NAME: &str = "remove_label";
    let effect = GitHubEffect::RemoveLabel {
        pr,
        name: name.to_string(),
    };
    match call(github, effect).await? {
        GitHubResponse::LabelRemoved => Ok(()),
        other => Err(unexpected(NAME, &other)),
    }
}

pub async fn add_labels<G: GitHubInterpreter>(
    github: &G,
    pr: PrNumber,
    names: &[&str],
) -> Result<(), GitHubCallError> {
    const NAME: &str = "add_labels";
    let effect = GitHubEffect::AddLabels {
        pr,
        names: names.iter().map(|n| n.to_string()).collect(),
    };
    match call(github, effect).await? {
        GitHubResponse::LabelsAdded => Ok(()),
        other => Err(unexpected(NAME, &other)),
    }
}

pub async fn list_pr_files<G: GitHubInterpreter>(
    github: &G,
    pr: PrNumber,
) -> Result<Vec<String>, GitHubCallError> {
    const NAME: &str = "list_pr_files";
    match call(github, GitHubEffect::ListPrFiles { pr }).await? {
        GitHubResponse::PrFiles(files) => Ok(files),
        other => Err(unexpected(NAME, &other)),
    }
}

pub async fn create_check_run<G: GitHubInterpreter>(
    github: &G,
    head_sha: &Sha,
    name: &str,
    conclusion: CheckConclusion,
    title: &str,
    summary: String,
) -> Result<(), GitHubCallError> {
    const NAME: &str = "create_check_run";
    let effect = GitHubEffect::CreateCheckRun {
        head_sha: head_sha.clone(),
        name: name.to_string(),
        conclusion,
        title: title.to_string(),
        summary,
    };
    match call(github, effect).await? {
        GitHubResponse::CheckRunCreated => Ok(()),
        other => Err(unexpected(NAME, &other)),
    }
}
