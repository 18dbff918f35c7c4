//! Event handlers for webhook events.
//!
//! Each handler sequences the same steps: load the repository configuration,
//! pick the branch configuration that applies, build a release strategy, and
//! hand it to the release builder (or drive the release PR labels). All I/O
//! goes through a [`GitHubInterpreter`] and the release collaborator traits,
//! so handlers are tested against recording mocks.
//!
//! # Event Types
//!
//! | Event | Handler |
//! |-------|---------|
//! | `push` | `handle_push` - release PR for the pushed branch, optional GitHub release |
//! | `schedule.repository` | `handle_schedule` - label sync, snapshot release PRs for every branch |
//! | `pull_request.labeled` | `handle_labeled` - force-run label |
//! | `pull_request.opened` / `synchronize` | `handle_updated` - configuration schema check |
//! | `pull_request.closed` / `reopened` | `handle_closed` / `handle_reopened` - label lifecycle |
//! | `release.created` | `handle_release_created` - observation only |

mod pull_request;
mod push;
mod release;
mod schedule;

use thiserror::Error;
use tracing::{debug, info};

use crate::effects::{GitHubCallError, GitHubInterpreter};
use crate::release::{
    BranchConfiguration, ReleaseBuilder, ReleaseError, ReleasePublisher, RepositoryFacts,
    ResolveError, build_strategy,
};
use crate::webhooks::ReleaseEvent;

pub use pull_request::{handle_closed, handle_labeled, handle_reopened, handle_updated};
pub use push::handle_push;
pub use release::handle_release_created;
pub use schedule::handle_schedule;

/// Errors that fail event handling.
///
/// Configuration problems in the repository and duplicate releases are not
/// errors: they are logged and reported as a [`HandlerOutcome`].
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The configuration file could not be read or is invalid.
    #[error(transparent)]
    Config(#[from] ResolveError),

    #[error(transparent)]
    GitHub(#[from] GitHubCallError),

    /// The release builder or publisher failed.
    #[error(transparent)]
    Release(#[from] ReleaseError),

    /// One or more branches of a scheduled run failed.
    #[error("release PR failed for branches: {}", .branches.join(", "))]
    ScheduledBranches { branches: Vec<String> },
}

/// How an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler ran to completion.
    Done,
    /// The repository has no configuration file.
    NotConfigured,
    /// No configuration applies to the branch.
    NoBranchConfiguration { branch: String },
    /// The repository's configuration makes a release impossible.
    ConfigurationError,
    /// The GitHub release already exists.
    DuplicateRelease,
    /// Nothing to do for this event.
    Ignored(&'static str),
}

/// Handles a webhook event.
///
/// This is the single mapping from event kind to handler.
pub async fn handle_event<G, R>(
    github: &G,
    releaser: &R,
    event: &ReleaseEvent,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter,
    R: ReleaseBuilder + ReleasePublisher,
{
    debug!(kind = event.kind().as_str(), repo = %event.repo_id(), "Handling event");
    match event {
        ReleaseEvent::Push(e) => handle_push(github, releaser, e).await,
        ReleaseEvent::Schedule(e) => handle_schedule(github, releaser, e).await,
        ReleaseEvent::PullRequestLabeled(e) => handle_labeled(github, releaser, e).await,
        ReleaseEvent::PullRequestUpdated(e) => handle_updated(github, e).await,
        ReleaseEvent::PullRequestClosed(e) => handle_closed(github, e).await,
        ReleaseEvent::PullRequestReopened(e) => handle_reopened(github, e).await,
        ReleaseEvent::ReleaseCreated(e) => handle_release_created(github, e).await,
    }
}

/// Builds the strategy for one branch and runs the release builder.
///
/// A strategy that cannot be built is reported as
/// [`ReleaseError::Configuration`], the same as the builder's own
/// configuration errors.
async fn release_branch<R: ReleaseBuilder>(
    releaser: &R,
    repository: &RepositoryFacts<'_>,
    branch: &BranchConfiguration,
    snapshot: Option<bool>,
) -> Result<(), ReleaseError> {
    let strategy = build_strategy(repository, branch, snapshot, &releaser.registered_types())
        .map_err(|e| ReleaseError::Configuration(e.to_string()))?;

    info!(
        repo = repository.url,
        branch = %branch.branch,
        release_type = %strategy.release_type,
        snapshot = ?snapshot,
        "Running release PR"
    );
    releaser.build(&strategy).await
}
