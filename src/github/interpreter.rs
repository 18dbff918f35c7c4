//! GitHub effect interpreter using octocrab.
//!
//! This module implements the `GitHubInterpreter` trait, executing GitHub effects
//! against the real GitHub API via octocrab.
//!
//! Key implementation details:
//! - File contents are fetched raw and base64-decoded; a 404 is an absent file
//! - Label names are percent-encoded where they appear in a URL path
//! - Retry with exponential backoff for transient errors, except on check run creation
//! - Proper categorization of errors (transient vs permanent)

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::effects::{
    CheckConclusion, GitHubEffect, GitHubInterpreter, GitHubResponse, LabelSpec, RepositoryData,
};
use crate::types::{PrNumber, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

/// GitHub's maximum page size for list endpoints.
const PER_PAGE: u8 = 100;

/// GitHub stops listing pull request files after 3000 entries.
const MAX_FILE_PAGES: u32 = 30;

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        interpret_github_effect(self, effect, RetryConfig::DEFAULT).await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API.
///
/// Transient failures are retried on `retry_config`'s schedule unless the
/// effect is unsafe to repeat (see [`RetryPolicy::for_effect`]).
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
    retry_config: RetryConfig,
) -> Result<GitHubResponse, GitHubApiError> {
    let policy = RetryPolicy::for_effect(&effect);
    retry_with_backoff(retry_config, policy, || execute_effect(client, effect.clone())).await
}

/// Executes a single effect without retry logic.
///
/// This function is called by `retry_with_backoff` and handles the actual
/// API calls.
async fn execute_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetRepository => get_repository(client).await,
        GitHubEffect::GetFileContents { path, reference } => {
            get_file_contents(client, &path, reference.as_deref()).await
        }
        GitHubEffect::SyncLabels { labels } => sync_labels(client, &labels).await,
        GitHubEffect::RemoveLabel { pr, name } => remove_label(client, pr, &name).await,
        GitHubEffect::AddLabels { pr, names } => add_labels(client, pr, &names).await,
        GitHubEffect::ListPrFiles { pr } => list_pr_files(client, pr).await,
        GitHubEffect::CreateCheckRun {
            head_sha,
            name,
            conclusion,
            title,
            summary,
        } => create_check_run(client, &head_sha, &name, conclusion, &title, &summary).await,
    }
}

fn repo_path(client: &OctocrabClient) -> String {
    format!("/repos/{}/{}", client.owner(), client.repo_name())
}

// ─── Repository ───────────────────────────────────────────────────────────────

async fn get_repository(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let repository = client
        .inner()
        .repos(client.owner(), client.repo_name())
        .get()
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let default_branch = repository.default_branch.ok_or_else(|| {
        GitHubApiError::permanent_without_source(format!(
            "Repository {} has no default branch",
            client.repo()
        ))
    })?;
    let language = repository
        .language
        .as_ref()
        .and_then(|value| value.as_str())
        .map(str::to_string);

    Ok(GitHubResponse::Repository(RepositoryData {
        default_branch,
        language,
    }))
}

#[derive(Debug, Serialize)]
struct ContentsQuery<'a> {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

async fn get_file_contents(
    client: &OctocrabClient,
    path: &str,
    reference: Option<&str>,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!("{}/contents/{}", repo_path(client), encode_path(path));
    let query = ContentsQuery { reference };

    let result: Result<ContentsResponse, _> = client.inner().get(&url, Some(&query)).await;

    match result {
        Ok(response) => {
            decode_contents(path, response).map(|text| GitHubResponse::FileContents(Some(text)))
        }
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                Ok(GitHubResponse::FileContents(None))
            } else {
                Err(err)
            }
        }
    }
}

/// Percent-encodes each segment of a repository path, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_contents(path: &str, response: ContentsResponse) -> Result<String, GitHubApiError> {
    let content = response.content.unwrap_or_default();
    match response.encoding.as_deref() {
        Some("base64") => {
            let compact: String = content.split_whitespace().collect();
            let bytes = BASE64.decode(compact).map_err(|e| {
                GitHubApiError::permanent_without_source(format!(
                    "Invalid base64 content for {}: {}",
                    path, e
                ))
            })?;
            String::from_utf8(bytes).map_err(|e| {
                GitHubApiError::permanent_without_source(format!(
                    "{} is not valid UTF-8: {}",
                    path, e
                ))
            })
        }
        Some("none") | None if content.is_empty() => Err(GitHubApiError::permanent_without_source(
            format!("{} is too large to fetch through the contents API", path),
        )),
        _ => Ok(content),
    }
}

// ─── Labels ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct LabelData {
    name: String,
    color: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct PageQuery {
    per_page: u8,
    page: u32,
}

#[derive(Debug, Serialize)]
struct LabelRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    color: &'a str,
    description: &'a str,
}

async fn list_repo_labels(client: &OctocrabClient) -> Result<Vec<LabelData>, GitHubApiError> {
    let url = format!("{}/labels", repo_path(client));
    let mut page = 1u32;
    let mut all_labels = Vec::new();

    loop {
        let query = PageQuery {
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<LabelData> = client
            .inner()
            .get(&url, Some(&query))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = items.len() < usize::from(PER_PAGE);
        all_labels.extend(items);
        if is_last_page {
            return Ok(all_labels);
        }
        page += 1;
    }
}

/// What must happen to one wanted label given the labels that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelAction {
    Create,
    Update,
    Keep,
}

/// Label names compare case-insensitively on GitHub.
fn plan_label(wanted: &LabelSpec, existing: &HashMap<String, &LabelData>) -> LabelAction {
    match existing.get(&wanted.name.to_lowercase()) {
        None => LabelAction::Create,
        Some(current)
            if current.color.eq_ignore_ascii_case(&wanted.color)
                && current.description.as_deref().unwrap_or("") == wanted.description =>
        {
            LabelAction::Keep
        }
        Some(_) => LabelAction::Update,
    }
}

async fn sync_labels(
    client: &OctocrabClient,
    labels: &[LabelSpec],
) -> Result<GitHubResponse, GitHubApiError> {
    let current = list_repo_labels(client).await?;
    let existing: HashMap<String, &LabelData> = current
        .iter()
        .map(|label| (label.name.to_lowercase(), label))
        .collect();

    for label in labels {
        match plan_label(label, &existing) {
            LabelAction::Keep => {}
            LabelAction::Create => {
                let url = format!("{}/labels", repo_path(client));
                let body = LabelRequest {
                    name: Some(&label.name),
                    color: &label.color,
                    description: &label.description,
                };
                let _: serde_json::Value = client
                    .inner()
                    .post(&url, Some(&body))
                    .await
                    .map_err(GitHubApiError::from_octocrab)?;
                tracing::info!(repo = %client.repo(), label = %label.name, "Created label");
            }
            LabelAction::Update => {
                let url = format!(
                    "{}/labels/{}",
                    repo_path(client),
                    urlencoding::encode(&label.name)
                );
                let body = LabelRequest {
                    name: None,
                    color: &label.color,
                    description: &label.description,
                };
                let _: serde_json::Value = client
                    .inner()
                    .patch(&url, Some(&body))
                    .await
                    .map_err(GitHubApiError::from_octocrab)?;
                tracing::info!(repo = %client.repo(), label = %label.name, "Updated label");
            }
        }
    }

    Ok(GitHubResponse::LabelsSynced)
}

async fn remove_label(
    client: &OctocrabClient,
    pr: PrNumber,
    name: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "{}/issues/{}/labels/{}",
        repo_path(client),
        pr.0,
        urlencoding::encode(name)
    );

    let result: Result<serde_json::Value, _> = client.inner().delete(&url, None::<&()>).await;

    match result {
        Ok(_) => Ok(GitHubResponse::LabelRemoved),
        Err(e) => {
            let err = GitHubApiError::from_octocrab(e);
            if err.is_not_found() {
                // The label was already gone.
                tracing::debug!(repo = %client.repo(), %pr, label = name, "Label not present");
                Ok(GitHubResponse::LabelRemoved)
            } else {
                Err(err)
            }
        }
    }
}

async fn add_labels(
    client: &OctocrabClient,
    pr: PrNumber,
    names: &[String],
) -> Result<GitHubResponse, GitHubApiError> {
    client
        .inner()
        .issues(client.owner(), client.repo_name())
        .add_labels(pr.0, names)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::LabelsAdded)
}

// ─── Pull Request Contents ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PrFile {
    filename: String,
}

async fn list_pr_files(
    client: &OctocrabClient,
    pr: PrNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!("{}/pulls/{}/files", repo_path(client), pr.0);
    let mut page = 1u32;
    let mut all_files = Vec::new();

    loop {
        let query = PageQuery {
            per_page: PER_PAGE,
            page,
        };
        let items: Vec<PrFile> = client
            .inner()
            .get(&url, Some(&query))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        let is_last_page = items.len() < usize::from(PER_PAGE);
        all_files.extend(items.into_iter().map(|file| file.filename));

        if is_last_page {
            break;
        }
        if page >= MAX_FILE_PAGES {
            tracing::warn!(
                repo = %client.repo(),
                %pr,
                files = all_files.len(),
                "Hit pagination limit for pull request files"
            );
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::PrFiles(all_files))
}

#[derive(Debug, Serialize)]
struct CheckRunOutput<'a> {
    title: &'a str,
    summary: &'a str,
}

#[derive(Debug, Serialize)]
struct CheckRunRequest<'a> {
    name: &'a str,
    head_sha: &'a str,
    status: &'static str,
    conclusion: CheckConclusion,
    output: CheckRunOutput<'a>,
}

async fn create_check_run(
    client: &OctocrabClient,
    head_sha: &Sha,
    name: &str,
    conclusion: CheckConclusion,
    title: &str,
    summary: &str,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!("{}/check-runs", repo_path(client));
    let body = CheckRunRequest {
        name,
        head_sha: head_sha.as_str(),
        status: "completed",
        conclusion,
        output: CheckRunOutput { title, summary },
    };

    let _: serde_json::Value = client
        .inner()
        .post(&url, Some(&body))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::CheckRunCreated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str, color: &str, description: Option<&str>) -> LabelData {
        LabelData {
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(str::to_string),
        }
    }

    fn wanted(name: &str, color: &str, description: &str) -> LabelSpec {
        LabelSpec {
            name: name.to_string(),
            color: color.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn encode_path_keeps_separators() {
        assert_eq!(encode_path(".github/release-please.yml"), ".github/release-please.yml");
        assert_eq!(encode_path("docs/my notes.md"), "docs/my%20notes.md");
    }

    #[test]
    fn decodes_base64_with_line_breaks() {
        let response = ContentsResponse {
            content: Some("cmVsZWFzZVR5cGU6\nIG5vZGUK\n".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_contents("f", response).unwrap(), "releaseType: node\n");
    }

    #[test]
    fn rejects_invalid_base64() {
        let response = ContentsResponse {
            content: Some("@@@".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert!(decode_contents("f", response).is_err());
    }

    #[test]
    fn oversized_file_is_an_error() {
        let response = ContentsResponse {
            content: Some(String::new()),
            encoding: Some("none".to_string()),
        };
        assert!(decode_contents("f", response).is_err());
    }

    #[test]
    fn label_plan_compares_case_insensitively() {
        let current = [
            label("Autorelease: Pending", "EDEDED", Some("Release PR is open")),
            label("autorelease: tagged", "000000", None),
        ];
        let existing: HashMap<String, &LabelData> = current
            .iter()
            .map(|l| (l.name.to_lowercase(), l))
            .collect();

        assert_eq!(
            plan_label(&wanted("autorelease: pending", "ededed", "Release PR is open"), &existing),
            LabelAction::Keep
        );
        assert_eq!(
            plan_label(&wanted("autorelease: tagged", "ffffff", ""), &existing),
            LabelAction::Update
        );
        assert_eq!(
            plan_label(&wanted("autorelease: published", "ffffff", ""), &existing),
            LabelAction::Create
        );
    }

    #[test]
    fn check_run_request_shape() {
        let sha = Sha::parse("a".repeat(40)).unwrap();
        let body = CheckRunRequest {
            name: "checkConfigSchema",
            head_sha: sha.as_str(),
            status: "completed",
            conclusion: CheckConclusion::Failure,
            output: CheckRunOutput {
                title: "t",
                summary: "s",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["conclusion"], "failure");
        assert_eq!(json["output"]["summary"], "s");
    }
}
