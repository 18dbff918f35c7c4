//! Shared test utilities: recording mocks and arbitrary generators for
//! property-based testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use thiserror::Error;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, RepositoryData};
use crate::release::config::WELL_KNOWN_CONFIGURATION_FILE;
use crate::release::{
    PublishRequest, ReleaseBuilder, ReleaseError, ReleasePublisher, ReleaseStrategy, ReleaseType,
};
use crate::server::GitHubConnector;
use crate::types::{PrNumber, RepoId, Sha};

pub fn arb_pr_number() -> impl Strategy<Value = PrNumber> {
    any::<u64>().prop_map(PrNumber)
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(|s| Sha::parse(s).unwrap())
}

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9/.-]{0,30}".prop_map(String::from)
}

/// A deterministic SHA for tests.
pub fn sha(n: u64) -> Sha {
    Sha::parse(format!("{n:040x}")).unwrap()
}

/// Error returned by [`MockGitHub`] for effects it was told to fail.
#[derive(Debug, Error)]
#[error("mock GitHub failure: {0}")]
pub struct MockGitHubError(pub String);

/// A GitHub interpreter that answers from canned data and records every
/// effect it receives.
#[derive(Debug, Default)]
pub struct MockGitHub {
    repository: Option<RepositoryData>,
    files: HashMap<(String, Option<String>), String>,
    pr_files: Vec<String>,
    failing: HashSet<String>,
    effects: Mutex<Vec<GitHubEffect>>,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `text` as the configuration file on the default branch.
    pub fn with_config(self, text: &str) -> Self {
        self.with_file(WELL_KNOWN_CONFIGURATION_FILE, None, text)
    }

    /// Serves `text` as `path` at `reference`.
    pub fn with_file_at(self, path: &str, reference: &str, text: &str) -> Self {
        self.with_file(path, Some(reference), text)
    }

    fn with_file(mut self, path: &str, reference: Option<&str>, text: &str) -> Self {
        self.files.insert(
            (path.to_string(), reference.map(str::to_string)),
            text.to_string(),
        );
        self
    }

    pub fn with_repository(mut self, default_branch: &str, language: Option<&str>) -> Self {
        self.repository = Some(RepositoryData {
            default_branch: default_branch.to_string(),
            language: language.map(str::to_string),
        });
        self
    }

    pub fn with_pr_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pr_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Makes every effect with this name (see [`GitHubEffect::name`]) fail.
    pub fn failing_on(mut self, effect: &str) -> Self {
        self.failing.insert(effect.to_string());
        self
    }

    /// Every effect received so far, in order.
    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.effects.lock().unwrap().clone()
    }

    /// The effects that change repository state.
    pub fn writes(&self) -> Vec<GitHubEffect> {
        self.effects()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    GitHubEffect::SyncLabels { .. }
                        | GitHubEffect::RemoveLabel { .. }
                        | GitHubEffect::AddLabels { .. }
                        | GitHubEffect::CreateCheckRun { .. }
                )
            })
            .collect()
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = MockGitHubError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        self.effects.lock().unwrap().push(effect.clone());

        if self.failing.contains(effect.name()) {
            return Err(MockGitHubError(effect.name().to_string()));
        }

        Ok(match effect {
            GitHubEffect::GetRepository => GitHubResponse::Repository(
                self.repository
                    .clone()
                    .ok_or_else(|| MockGitHubError("no repository configured".to_string()))?,
            ),
            GitHubEffect::GetFileContents { path, reference } => {
                GitHubResponse::FileContents(self.files.get(&(path, reference)).cloned())
            }
            GitHubEffect::SyncLabels { .. } => GitHubResponse::LabelsSynced,
            GitHubEffect::RemoveLabel { .. } => GitHubResponse::LabelRemoved,
            GitHubEffect::AddLabels { .. } => GitHubResponse::LabelsAdded,
            GitHubEffect::ListPrFiles { .. } => GitHubResponse::PrFiles(self.pr_files.clone()),
            GitHubEffect::CreateCheckRun { .. } => GitHubResponse::CheckRunCreated,
        })
    }
}

/// Every repository is served by the same mock.
impl GitHubConnector for Arc<MockGitHub> {
    type Interpreter = Arc<MockGitHub>;

    fn connect(&self, _repo: &RepoId) -> Self::Interpreter {
        Arc::clone(self)
    }
}

/// How a [`MockReleaser`] call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Configuration,
    DuplicateRelease,
    Other,
}

impl MockFailure {
    fn to_error(self, context: &str) -> ReleaseError {
        match self {
            MockFailure::Configuration => ReleaseError::Configuration(context.to_string()),
            MockFailure::DuplicateRelease => ReleaseError::DuplicateRelease(context.to_string()),
            MockFailure::Other => ReleaseError::Other(context.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct MockReleaserInner {
    built: Mutex<Vec<ReleaseStrategy>>,
    published: Mutex<Vec<PublishRequest>>,
    build_failures: HashMap<String, MockFailure>,
    publish_failure: Option<MockFailure>,
    registered: Option<Vec<ReleaseType>>,
}

/// A release builder and publisher that records its inputs.
///
/// Clones share their records.
#[derive(Debug, Clone, Default)]
pub struct MockReleaser {
    inner: Arc<MockReleaserInner>,
}

impl MockReleaser {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner_mut(&mut self) -> &mut MockReleaserInner {
        Arc::get_mut(&mut self.inner).expect("configure MockReleaser before cloning it")
    }

    /// Fails builds for strategies targeting `branch`.
    pub fn failing_build_on(mut self, branch: &str, failure: MockFailure) -> Self {
        self.inner_mut()
            .build_failures
            .insert(branch.to_string(), failure);
        self
    }

    pub fn failing_publish(mut self, failure: MockFailure) -> Self {
        self.inner_mut().publish_failure = Some(failure);
        self
    }

    pub fn with_registered_types(mut self, types: Vec<ReleaseType>) -> Self {
        self.inner_mut().registered = Some(types);
        self
    }

    /// Every strategy passed to `build`, including failed ones.
    pub fn built(&self) -> Vec<ReleaseStrategy> {
        self.inner.built.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<PublishRequest> {
        self.inner.published.lock().unwrap().clone()
    }
}

impl ReleaseBuilder for MockReleaser {
    async fn build(&self, strategy: &ReleaseStrategy) -> Result<(), ReleaseError> {
        self.inner.built.lock().unwrap().push(strategy.clone());
        match self.inner.build_failures.get(&strategy.default_branch) {
            Some(failure) => Err(failure.to_error(&strategy.default_branch)),
            None => Ok(()),
        }
    }

    fn registered_types(&self) -> Vec<ReleaseType> {
        self.inner
            .registered
            .clone()
            .unwrap_or_else(|| ReleaseType::ALL.to_vec())
    }
}

impl ReleasePublisher for MockReleaser {
    async fn publish(&self, request: &PublishRequest) -> Result<(), ReleaseError> {
        self.inner.published.lock().unwrap().push(request.clone());
        match self.inner.publish_failure {
            Some(failure) => Err(failure.to_error(&request.package_name)),
            None => Ok(()),
        }
    }
}
