//! Webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`ReleaseEvent`]
//! values. The parser is robust against unknown fields and event types.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type (and its `action`)
//! 3. Unknown event types and unhandled actions return `Ok(None)`
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoId, Sha};

use super::events::{
    ClosedEvent, LabeledEvent, PullRequestUpdatedEvent, PushEvent, ReleaseCreatedEvent,
    ReleaseEvent, ReopenedEvent, ScheduleEvent,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g., malformed SHA).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// A field the handlers need is absent.
    #[error("missing field {0}")]
    MissingField(&'static str),
}

/// Parses a webhook payload into a typed event.
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a handled event
/// * `Ok(None)` - Unknown event type or unhandled action (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use autorelease_bot::webhooks::{ReleaseEvent, parse_webhook};
///
/// let payload = br#"{
///     "ref": "refs/heads/main",
///     "repository": {
///         "name": "widgets",
///         "full_name": "acme/widgets",
///         "owner": { "login": "acme" },
///         "language": "Rust"
///     }
/// }"#;
///
/// let event = parse_webhook("push", payload).unwrap().unwrap();
/// let ReleaseEvent::Push(push) = event else { panic!() };
/// assert_eq!(push.branch, "main");
/// ```
pub fn parse_webhook(
    event_type: &str,
    payload: &[u8],
) -> Result<Option<ReleaseEvent>, ParseError> {
    match event_type {
        "push" => parse_push(payload).map(|e| Some(ReleaseEvent::Push(e))),
        "schedule.repository" => parse_schedule(payload).map(|e| Some(ReleaseEvent::Schedule(e))),
        "pull_request" => parse_pull_request(payload),
        "release" => parse_release(payload).map(|opt| opt.map(ReleaseEvent::ReleaseCreated)),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. We use Option<T> liberally to
// handle missing fields gracefully, then validate required fields explicitly.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
    full_name: Option<String>,
    owner: Option<RawOwner>,
    language: Option<String>,
    releases_url: Option<String>,
}

impl RawRepository {
    /// The owner from `owner.login`, falling back to the `full_name` prefix.
    fn repo_id(&self) -> Result<RepoId, ParseError> {
        if let Some(owner) = &self.owner {
            return Ok(RepoId::new(owner.login.clone(), self.name.clone()));
        }
        let full_name = self
            .full_name
            .as_deref()
            .ok_or(ParseError::MissingField("repository.owner"))?;
        match full_name.split_once('/') {
            Some((owner, _)) if !owner.is_empty() => Ok(RepoId::new(owner, self.name.clone())),
            _ => Err(ParseError::InvalidField {
                field: "repository.full_name",
                value: full_name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
}

// ============================================================================
// push event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    repository: RawRepository,
}

fn parse_push(payload: &[u8]) -> Result<PushEvent, ParseError> {
    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    let branch = raw
        .git_ref
        .strip_prefix("refs/heads/")
        .unwrap_or(&raw.git_ref)
        .to_string();

    Ok(PushEvent {
        repo: raw.repository.repo_id()?,
        branch,
        language: raw.repository.language,
    })
}

// ============================================================================
// schedule.repository event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawSchedulePayload {
    repository: RawRepository,
    organization: Option<RawOwner>,
}

fn parse_schedule(payload: &[u8]) -> Result<ScheduleEvent, ParseError> {
    let raw: RawSchedulePayload = serde_json::from_slice(payload)?;

    let repo = match raw.organization {
        Some(org) => RepoId::new(org.login, raw.repository.name),
        None => raw.repository.repo_id()?,
    };

    Ok(ScheduleEvent { repo })
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    merged: Option<bool>,
    #[serde(default)]
    labels: Vec<RawLabel>,
    head: Option<RawRef>,
    base: Option<RawRef>,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: Option<String>,
    #[serde(rename = "ref")]
    git_ref: Option<String>,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<ReleaseEvent>, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;
    let repo = raw.repository.repo_id()?;
    let pr = raw.pull_request;
    let pr_number = PrNumber(pr.number);
    let labels: Vec<String> = pr.labels.into_iter().map(|l| l.name).collect();

    let event = match raw.action.as_str() {
        "labeled" => {
            let base_branch = pr
                .base
                .and_then(|b| b.git_ref)
                .ok_or(ParseError::MissingField("pull_request.base.ref"))?;
            ReleaseEvent::PullRequestLabeled(LabeledEvent {
                repo,
                pr_number,
                labels,
                base_branch,
                language: raw.repository.language,
            })
        }
        "opened" | "synchronize" => {
            let sha = pr
                .head
                .and_then(|h| h.sha)
                .ok_or(ParseError::MissingField("pull_request.head.sha"))?;
            let head_sha = Sha::parse(&sha).map_err(|_| ParseError::InvalidField {
                field: "pull_request.head.sha",
                value: sha,
            })?;
            ReleaseEvent::PullRequestUpdated(PullRequestUpdatedEvent {
                repo,
                pr_number,
                head_sha,
            })
        }
        "closed" => ReleaseEvent::PullRequestClosed(ClosedEvent {
            repo,
            pr_number,
            merged: pr.merged.unwrap_or(false),
            labels,
        }),
        "reopened" => ReleaseEvent::PullRequestReopened(ReopenedEvent {
            repo,
            pr_number,
            labels,
        }),
        _ => return Ok(None),
    };

    Ok(Some(event))
}

// ============================================================================
// release event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawReleasePayload {
    action: String,
    repository: RawRepository,
}

fn parse_release(payload: &[u8]) -> Result<Option<ReleaseCreatedEvent>, ParseError> {
    let raw: RawReleasePayload = serde_json::from_slice(payload)?;
    if raw.action != "created" {
        return Ok(None);
    }

    let repo = raw.repository.repo_id()?;
    let releases_url = raw
        .repository
        .releases_url
        .ok_or(ParseError::MissingField("repository.releases_url"))?;

    Ok(Some(ReleaseCreatedEvent { repo, releases_url }))
}
