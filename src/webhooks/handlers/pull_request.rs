//! Handlers for `pull_request` events.
//!
//! - `labeled` - the force-run label triggers a release PR run for the base branch
//! - `opened` / `synchronize` - check proposed configuration changes
//! - `closed` (not merged) - `autorelease: pending` becomes `autorelease: closed`
//! - `reopened` - `autorelease: closed` becomes `autorelease: pending`

use tracing::{info, warn};

use crate::effects::GitHubInterpreter;
use crate::effects::requests;
use crate::release::labels::{FORCE_RUN_LABEL, LabelTransition, transition};
use crate::release::{
    GuardOutcome, LifecycleEvent, ReleaseBuilder, RepositoryFacts,
    check_config_changes, find_branch_configuration, load_config, resolve_config,
};
use crate::types::PrNumber;
use crate::webhooks::events::{ClosedEvent, LabeledEvent, PullRequestUpdatedEvent, ReopenedEvent};

use super::{HandlerError, HandlerOutcome, release_branch};

/// Handles a label being added to a pull request.
///
/// Only the force-run label does anything: it is removed straight away, and
/// a release PR run follows for the pull request's base branch.
pub async fn handle_labeled<G, R>(
    github: &G,
    releaser: &R,
    event: &LabeledEvent,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter,
    R: ReleaseBuilder,
{
    if !event.labels.iter().any(|l| l == FORCE_RUN_LABEL) {
        info!(labels = %event.labels.join(", "), "Ignoring non-force label action");
        return Ok(HandlerOutcome::Ignored("no force-run label"));
    }

    let repo_url = event.repo.full_name();
    requests::remove_label(github, event.pr_number, FORCE_RUN_LABEL).await?;

    let Some(config) = resolve_config(github).await? else {
        info!(repo = %repo_url, "release-please not configured");
        return Ok(HandlerOutcome::NotConfigured);
    };

    let Some(branch) = find_branch_configuration(&event.base_branch, &config) else {
        info!(repo = %repo_url, branch = %event.base_branch, "Did not find configuration for branch");
        return Ok(HandlerOutcome::NoBranchConfiguration {
            branch: event.base_branch.clone(),
        });
    };

    info!(repo = %repo_url, pr = %event.pr_number, "pull_request.labeled");
    let repository = RepositoryFacts {
        name: &event.repo.repo,
        url: &repo_url,
        language: event.language.as_deref(),
    };
    match release_branch(releaser, &repository, &branch, None).await {
        Ok(()) => Ok(HandlerOutcome::Done),
        Err(e) if e.is_configuration() => {
            warn!(repo = %repo_url, branch = %branch.branch, error = %e, "Skipping release PR");
            Ok(HandlerOutcome::ConfigurationError)
        }
        Err(e) => Err(e.into()),
    }
}

/// Checks the configuration file as changed by an opened or updated pull
/// request.
pub async fn handle_updated<G: GitHubInterpreter>(
    github: &G,
    event: &PullRequestUpdatedEvent,
) -> Result<HandlerOutcome, HandlerError> {
    match check_config_changes(github, event.pr_number, &event.head_sha).await? {
        GuardOutcome::Untouched => Ok(HandlerOutcome::Ignored("configuration not changed")),
        GuardOutcome::Removed | GuardOutcome::Valid | GuardOutcome::Invalid { .. } => {
            Ok(HandlerOutcome::Done)
        }
    }
}

/// Marks a release PR closed without merging as `autorelease: closed`.
pub async fn handle_closed<G: GitHubInterpreter>(
    github: &G,
    event: &ClosedEvent,
) -> Result<HandlerOutcome, HandlerError> {
    if load_config(github).await?.is_none() {
        info!(repo = %event.repo, "release-please not configured");
        return Ok(HandlerOutcome::NotConfigured);
    }

    if event.merged {
        info!(pr = %event.pr_number, "Ignoring merged pull request");
        return Ok(HandlerOutcome::Ignored("merged pull request"));
    }

    match transition(event.labels.as_slice(), LifecycleEvent::Closed { merged: false }) {
        Some(t) => apply_transition(github, event.pr_number, t).await,
        None => Ok(HandlerOutcome::Ignored("not a pending release PR")),
    }
}

/// Marks a reopened release PR as `autorelease: pending` again.
pub async fn handle_reopened<G: GitHubInterpreter>(
    github: &G,
    event: &ReopenedEvent,
) -> Result<HandlerOutcome, HandlerError> {
    if load_config(github).await?.is_none() {
        info!(repo = %event.repo, "release-please not configured");
        return Ok(HandlerOutcome::NotConfigured);
    }

    match transition(event.labels.as_slice(), LifecycleEvent::Reopened) {
        Some(t) => apply_transition(github, event.pr_number, t).await,
        None => Ok(HandlerOutcome::Ignored("not a closed release PR")),
    }
}

/// Issues the two label operations of a transition concurrently.
///
/// Neither waits for nor undoes the other; if either fails the first error
/// is returned.
async fn apply_transition<G: GitHubInterpreter>(
    github: &G,
    pr: PrNumber,
    t: LabelTransition,
) -> Result<HandlerOutcome, HandlerError> {
    info!(%pr, remove = t.remove, add = t.add, "Relabeling release PR");
    let add = [t.add];
    let (removed, added) = tokio::join!(
        requests::remove_label(github, pr, t.remove),
        requests::add_labels(github, pr, &add),
    );
    removed?;
    added?;
    Ok(HandlerOutcome::Done)
}
