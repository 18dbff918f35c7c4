//! Backoff for GitHub API calls.
//!
//! Transient failures (5xx, rate limits, dropped connections) are retried with
//! doubling delays: 2s, 4s, 8s by default, which keeps a webhook delivery well
//! inside GitHub's delivery timeout. Permanent and not-found errors return at
//! once.
//!
//! Whether an effect may be retried at all depends on what repeating it does.
//! Creating a check run is not idempotent: a POST that timed out may still have
//! landed, and repeating it leaves two `checkConfigSchema` runs on the commit.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::effects::GitHubEffect;

use super::error::GitHubApiError;

/// Backoff schedule for transient errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
    };

    /// Delay before retry number `retry` (0-indexed): the initial delay
    /// doubled `retry` times, capped at `max_delay`.
    pub fn delay_before(&self, retry: u32) -> Duration {
        self.initial_delay
            .checked_mul(2u32.saturating_pow(retry))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether transient failures of an effect are retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    #[default]
    RetryTransient,
    NoRetry,
}

impl RetryPolicy {
    /// The policy for `effect`.
    ///
    /// Reads, label edits and label syncs are safe to repeat: adding or
    /// removing a label twice leaves the same set, and a sync lists the
    /// existing labels again before writing. Check runs are created fresh
    /// on every POST.
    pub fn for_effect(effect: &GitHubEffect) -> Self {
        match effect {
            GitHubEffect::CreateCheckRun { .. } => RetryPolicy::NoRetry,
            GitHubEffect::GetRepository
            | GitHubEffect::GetFileContents { .. }
            | GitHubEffect::SyncLabels { .. }
            | GitHubEffect::RemoveLabel { .. }
            | GitHubEffect::AddLabels { .. }
            | GitHubEffect::ListPrFiles { .. } => RetryPolicy::RetryTransient,
        }
    }
}

/// Runs `operation`, retrying transient errors as `config` and `policy`
/// allow. The last error is returned once retries run out.
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, GitHubApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubApiError>>,
{
    let retries = match policy {
        RetryPolicy::RetryTransient => config.max_retries,
        RetryPolicy::NoRetry => 0,
    };

    let mut retry = 0;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.kind.is_retriable() => return Err(err),
            Err(err) => err,
        };

        if retry >= retries {
            warn!(attempts = retry + 1, error = %err, "Giving up on GitHub call");
            return Err(err);
        }

        let delay = config.delay_before(retry);
        debug!(retry, delay_ms = delay.as_millis() as u64, error = %err, "Transient GitHub error");
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
