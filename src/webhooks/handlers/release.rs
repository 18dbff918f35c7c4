//! Handler for `release.created` events.

use tracing::info;

use crate::effects::GitHubInterpreter;
use crate::release::load_config;
use crate::webhooks::events::ReleaseCreatedEvent;

use super::{HandlerError, HandlerOutcome};

/// Records that a release was created in a configured repository.
///
/// Publishing is driven by pushes; this only emits the
/// `release_please.release_created` observation.
pub async fn handle_release_created<G: GitHubInterpreter>(
    github: &G,
    event: &ReleaseCreatedEvent,
) -> Result<HandlerOutcome, HandlerError> {
    if load_config(github).await?.is_none() {
        info!(repo = %event.repo, "release-please not configured");
        return Ok(HandlerOutcome::NotConfigured);
    }

    info!(
        metric = "release_please.release_created",
        repo = %event.repo,
        url = %event.releases_url,
        "Release created"
    );
    Ok(HandlerOutcome::Done)
}
