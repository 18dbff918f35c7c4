//! Handler for scheduled `schedule.repository` ticks.

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::effects::GitHubInterpreter;
use crate::effects::requests;
use crate::release::labels::release_labels;
use crate::release::{ReleaseBuilder, RepositoryFacts, merge_defaults, resolve_config};
use crate::webhooks::events::ScheduleEvent;

use super::{HandlerError, HandlerOutcome, release_branch};

/// Refreshes the release labels and runs a snapshot release PR for the
/// primary branch and then, concurrently, for every listed branch.
///
/// A failing listed branch never cancels the others. Once all have settled,
/// configuration errors are dropped and any remaining failures are reported
/// as a single [`HandlerError::ScheduledBranches`].
pub async fn handle_schedule<G, R>(
    github: &G,
    releaser: &R,
    event: &ScheduleEvent,
) -> Result<HandlerOutcome, HandlerError>
where
    G: GitHubInterpreter,
    R: ReleaseBuilder,
{
    let repo_url = event.repo.full_name();

    let Some(config) = resolve_config(github).await? else {
        info!(repo = %repo_url, "release-please not configured");
        return Ok(HandlerOutcome::NotConfigured);
    };

    // Labels are a convenience; a failure here must not block releases.
    if let Err(e) = requests::sync_labels(github, release_labels()).await {
        error!(repo = %repo_url, error = %e, "failed to sync labels");
    }

    let primary = config.primary_branch.clone().unwrap_or_default();
    info!(repo = %repo_url, branch = %primary, "schedule.repository");

    let repository_data = requests::get_repository(github).await?;
    let repository = RepositoryFacts {
        name: &event.repo.repo,
        url: &repo_url,
        language: repository_data.language.as_deref(),
    };

    let primary_config = merge_defaults(&config, primary.as_str(), &Default::default());
    match release_branch(releaser, &repository, &primary_config, Some(true)).await {
        Ok(()) => {}
        Err(e) if e.is_configuration() => {
            warn!(repo = %repo_url, branch = %primary, error = %e, "Skipping release PR");
        }
        Err(e) => return Err(e.into()),
    }

    let Some(entries) = config.branches.as_deref() else {
        return Ok(HandlerOutcome::Done);
    };

    let mut branches = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match entry.branch.as_deref() {
            Some(name) if !name.is_empty() => {
                branches.push(merge_defaults(&config, name, &entry.settings));
            }
            _ => error!(repo = %repo_url, index, "Skipping branches entry without a branch name"),
        }
    }

    let results = join_all(branches.iter().map(|branch| {
        info!(repo = %repo_url, branch = %branch.branch, "schedule.repository");
        release_branch(releaser, &repository, branch, Some(true))
    }))
    .await;

    let mut failed = Vec::new();
    for (branch, result) in branches.iter().zip(results) {
        match result {
            Ok(()) => {}
            Err(e) if e.is_configuration() => {
                warn!(repo = %repo_url, branch = %branch.branch, error = %e, "Skipping release PR");
            }
            Err(e) => {
                error!(repo = %repo_url, branch = %branch.branch, error = %e, "Release PR failed");
                failed.push(branch.branch.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(HandlerOutcome::Done)
    } else {
        Err(HandlerError::ScheduledBranches { branches: failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::GitHubEffect;
    use crate::release::ReleaseType;
    use crate::test_utils::{MockFailure, MockGitHub, MockReleaser};
    use crate::types::RepoId;

    const TWO_BRANCHES: &str = r#"
releaseType: node
branches:
  - branch: 1.x
  - branch: 2.x
    releaseType: python
"#;

    fn event() -> ScheduleEvent {
        ScheduleEvent {
            repo: RepoId::new("acme", "widgets"),
        }
    }

    fn github(config: &str) -> MockGitHub {
        MockGitHub::new()
            .with_config(config)
            .with_repository("main", Some("TypeScript"))
    }

    fn built_branches(releaser: &MockReleaser) -> Vec<String> {
        let mut branches: Vec<String> = releaser
            .built()
            .into_iter()
            .map(|s| s.default_branch)
            .collect();
        branches.sort();
        branches
    }

    #[tokio::test]
    async fn builds_primary_and_every_branch_as_snapshot() {
        let github = github(TWO_BRANCHES);
        let releaser = MockReleaser::new();

        let outcome = handle_schedule(&github, &releaser, &event()).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Done);

        let built = releaser.built();
        assert_eq!(built.len(), 3);
        assert_eq!(built[0].default_branch, "main");
        assert!(built.iter().all(|s| s.snapshot == Some(true)));
        assert_eq!(built_branches(&releaser), vec!["1.x", "2.x", "main"]);

        let two = built.iter().find(|s| s.default_branch == "2.x").unwrap();
        assert_eq!(two.release_type, ReleaseType::Python);
        // Listed branches inherit the repository-level release type.
        let one = built.iter().find(|s| s.default_branch == "1.x").unwrap();
        assert_eq!(one.release_type, ReleaseType::Node);
    }

    #[tokio::test]
    async fn syncs_labels_and_reads_language() {
        let github = github("");
        let releaser = MockReleaser::new();

        handle_schedule(&github, &releaser, &event()).await.unwrap();

        let effects = github.effects();
        assert!(matches!(effects[2], GitHubEffect::SyncLabels { ref labels } if labels.len() == 6));
        assert_eq!(effects[3], GitHubEffect::GetRepository);
        assert_eq!(releaser.built()[0].release_type, ReleaseType::Node);
    }

    #[tokio::test]
    async fn label_sync_failure_does_not_abort() {
        let github = github(TWO_BRANCHES).failing_on("sync_labels");
        let releaser = MockReleaser::new();

        let outcome = handle_schedule(&github, &releaser, &event()).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Done);
        assert_eq!(releaser.built().len(), 3);
    }

    #[tokio::test]
    async fn failing_branch_does_not_stop_siblings() {
        let github = github(TWO_BRANCHES);
        let releaser = MockReleaser::new().failing_build_on("1.x", MockFailure::Other);

        let err = handle_schedule(&github, &releaser, &event()).await.unwrap_err();

        assert_eq!(built_branches(&releaser), vec!["1.x", "2.x", "main"]);
        match err {
            HandlerError::ScheduledBranches { branches } => assert_eq!(branches, vec!["1.x"]),
            other => panic!("expected ScheduledBranches, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn configuration_errors_are_downgraded() {
        let github = github(TWO_BRANCHES);
        let releaser = MockReleaser::new()
            .failing_build_on("main", MockFailure::Configuration)
            .failing_build_on("2.x", MockFailure::Configuration);

        let outcome = handle_schedule(&github, &releaser, &event()).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Done);
        assert_eq!(releaser.built().len(), 3);
    }

    #[tokio::test]
    async fn fatal_primary_failure_skips_branches() {
        let github = github(TWO_BRANCHES);
        let releaser = MockReleaser::new().failing_build_on("main", MockFailure::Other);

        assert!(handle_schedule(&github, &releaser, &event()).await.is_err());
        assert_eq!(releaser.built().len(), 1);
    }

    #[tokio::test]
    async fn nameless_entry_is_skipped() {
        let github = github("branches:\n  - releaseType: node\n  - branch: 1.x\n");
        let releaser = MockReleaser::new();

        handle_schedule(&github, &releaser, &event()).await.unwrap();
        assert_eq!(built_branches(&releaser), vec!["1.x", "main"]);
    }

    #[tokio::test]
    async fn unconfigured_repository_is_noop() {
        let github = MockGitHub::new().with_repository("main", Some("Rust"));
        let releaser = MockReleaser::new();

        let outcome = handle_schedule(&github, &releaser, &event()).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::NotConfigured);
        assert!(github.writes().is_empty());
        assert!(releaser.built().is_empty());
    }
}
