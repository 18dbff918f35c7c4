//! Handler for `push` events.

use tracing::{info, warn};

use crate::effects::GitHubInterpreter;
use crate::release::{
    PublishRequest, ReleaseBuilder, ReleaseError, ReleasePublisher, RepositoryFacts,
    find_branch_configuration, resolve_config,
};
use crate::webhooks::events::PushEvent;

use super::{HandlerError, HandlerOutcome, release_branch};

/// Opens or updates the release PR for the pushed branch, then publishes a
/// GitHub release if the branch opts in with `handleGHRelease`.
pub async fn handle_push<G, R>(
    github: &G,
    releaser: &R,
    event: &PushEvent,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter,
    R: ReleaseBuilder + ReleasePublisher,
{
    let repo_url = event.repo.full_name();

    let Some(config) = resolve_config(github).await? else {
        info!(repo = %repo_url, "release-please not configured");
        return Ok(HandlerOutcome::NotConfigured);
    };

    let Some(branch) = find_branch_configuration(&event.branch, &config) else {
        info!(repo = %repo_url, branch = %event.branch, "Did not find configuration for branch");
        return Ok(HandlerOutcome::NoBranchConfiguration {
            branch: event.branch.clone(),
        });
    };

    info!(repo = %repo_url, branch = %branch.branch, "push");
    let repository = RepositoryFacts {
        name: &event.repo.repo,
        url: &repo_url,
        language: event.language.as_deref(),
    };
    match release_branch(releaser, &repository, &branch, None).await {
        Ok(()) => {}
        Err(e) if e.is_configuration() => {
            warn!(repo = %repo_url, branch = %branch.branch, error = %e, "Skipping release PR");
            return Ok(HandlerOutcome::ConfigurationError);
        }
        Err(e) => return Err(e.into()),
    }

    if !branch.handles_github_release() {
        return Ok(HandlerOutcome::Done);
    }

    info!(repo = %repo_url, "Handling GitHub release");
    let package_name = branch
        .settings
        .package_name
        .clone()
        .unwrap_or_else(|| event.repo.repo.clone());
    let request = PublishRequest::from_branch(package_name, repo_url.clone(), &branch);
    match releaser.publish(&request).await {
        Ok(()) => Ok(HandlerOutcome::Done),
        Err(ReleaseError::DuplicateRelease(message)) => {
            warn!(repo = %repo_url, %message, "Release tag already exists, skipping");
            Ok(HandlerOutcome::DuplicateRelease)
        }
        Err(e) => Err(e.into()),
    }
}
