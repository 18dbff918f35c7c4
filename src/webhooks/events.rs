//! Webhook event types.
//!
//! Typed representations of the deliveries the bot reacts to, with only the
//! fields the handlers read.
//!
//! # Event Types
//!
//! | Header | Action | Variant |
//! |--------|--------|---------|
//! | `push` | | [`ReleaseEvent::Push`] |
//! | `schedule.repository` | | [`ReleaseEvent::Schedule`] |
//! | `pull_request` | `labeled` | [`ReleaseEvent::PullRequestLabeled`] |
//! | `pull_request` | `opened`, `synchronize` | [`ReleaseEvent::PullRequestUpdated`] |
//! | `pull_request` | `closed` | [`ReleaseEvent::PullRequestClosed`] |
//! | `pull_request` | `reopened` | [`ReleaseEvent::PullRequestReopened`] |
//! | `release` | `created` | [`ReleaseEvent::ReleaseCreated`] |
//!
//! `schedule.repository` is not a GitHub event: it is delivered by the
//! scheduler that drives periodic runs, signed with the same secret.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoId, Sha};

/// A parsed webhook event.
///
/// Unknown event types and unhandled actions are represented by returning
/// `None` from the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseEvent {
    Push(PushEvent),
    Schedule(ScheduleEvent),
    PullRequestLabeled(LabeledEvent),
    PullRequestUpdated(PullRequestUpdatedEvent),
    PullRequestClosed(ClosedEvent),
    PullRequestReopened(ReopenedEvent),
    ReleaseCreated(ReleaseCreatedEvent),
}

/// Stable names for event kinds, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Push,
    Schedule,
    PullRequestLabeled,
    PullRequestUpdated,
    PullRequestClosed,
    PullRequestReopened,
    ReleaseCreated,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::Schedule => "schedule.repository",
            EventKind::PullRequestLabeled => "pull_request.labeled",
            EventKind::PullRequestUpdated => "pull_request.updated",
            EventKind::PullRequestClosed => "pull_request.closed",
            EventKind::PullRequestReopened => "pull_request.reopened",
            EventKind::ReleaseCreated => "release.created",
        }
    }
}

impl ReleaseEvent {
    /// Returns the repository this event belongs to.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            ReleaseEvent::Push(e) => &e.repo,
            ReleaseEvent::Schedule(e) => &e.repo,
            ReleaseEvent::PullRequestLabeled(e) => &e.repo,
            ReleaseEvent::PullRequestUpdated(e) => &e.repo,
            ReleaseEvent::PullRequestClosed(e) => &e.repo,
            ReleaseEvent::PullRequestReopened(e) => &e.repo,
            ReleaseEvent::ReleaseCreated(e) => &e.repo,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ReleaseEvent::Push(_) => EventKind::Push,
            ReleaseEvent::Schedule(_) => EventKind::Schedule,
            ReleaseEvent::PullRequestLabeled(_) => EventKind::PullRequestLabeled,
            ReleaseEvent::PullRequestUpdated(_) => EventKind::PullRequestUpdated,
            ReleaseEvent::PullRequestClosed(_) => EventKind::PullRequestClosed,
            ReleaseEvent::PullRequestReopened(_) => EventKind::PullRequestReopened,
            ReleaseEvent::ReleaseCreated(_) => EventKind::ReleaseCreated,
        }
    }
}

/// Commits were pushed to a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub repo: RepoId,
    /// Branch name with `refs/heads/` stripped. Tag pushes keep their full ref
    /// and so never match a configured branch.
    pub branch: String,
    /// Primary language GitHub detected for the repository.
    pub language: Option<String>,
}

/// A scheduled tick for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    /// Owner taken from `organization.login`.
    pub repo: RepoId,
}

/// A label was added to a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledEvent {
    pub repo: RepoId,
    pub pr_number: PrNumber,
    /// Every label on the pull request after the change.
    pub labels: Vec<String>,
    pub base_branch: String,
    pub language: Option<String>,
}

/// A pull request was opened or its head moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestUpdatedEvent {
    pub repo: RepoId,
    pub pr_number: PrNumber,
    pub head_sha: Sha,
}

/// A pull request was closed, merged or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedEvent {
    pub repo: RepoId,
    pub pr_number: PrNumber,
    pub merged: bool,
    pub labels: Vec<String>,
}

/// A closed pull request was reopened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenedEvent {
    pub repo: RepoId,
    pub pr_number: PrNumber,
    pub labels: Vec<String>,
}

/// A GitHub release was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCreatedEvent {
    pub repo: RepoId,
    pub releases_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_id_and_kind() {
        let event = ReleaseEvent::PullRequestClosed(ClosedEvent {
            repo: RepoId::new("acme", "widgets"),
            pr_number: PrNumber(7),
            merged: false,
            labels: vec![],
        });

        assert_eq!(event.repo_id(), &RepoId::new("acme", "widgets"));
        assert_eq!(event.kind(), EventKind::PullRequestClosed);
        assert_eq!(event.kind().as_str(), "pull_request.closed");
    }

    #[test]
    fn schedule_kind_name_matches_header() {
        assert_eq!(EventKind::Schedule.as_str(), "schedule.repository");
    }
}
