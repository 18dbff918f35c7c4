//! Effect interpreter trait.
//!
//! Handlers only ever talk to GitHub through this trait:
//! - `crate::github::OctocrabClient` executes effects against the API
//! - `crate::test_utils::MockGitHub` answers from canned data and records them

use std::future::Future;
use std::sync::Arc;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example
///
/// ```ignore
/// struct ConfigOnly(String);
///
/// impl GitHubInterpreter for ConfigOnly {
///     type Error = std::io::Error;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         match effect {
///             GitHubEffect::GetFileContents { .. } => {
///                 Ok(GitHubResponse::FileContents(Some(self.0.clone())))
///             }
///             other => Err(std::io::Error::other(format!("unexpected {}", other.name()))),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter: Sync {
    /// The error type returned by this interpreter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}

impl<T> GitHubInterpreter for Arc<T>
where
    T: GitHubInterpreter + Send,
{
    type Error = T::Error;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        (**self).interpret(effect)
    }
}
