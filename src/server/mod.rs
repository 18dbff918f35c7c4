//! HTTP server for the release bot.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitHub, validates signatures, and handles them inline
//! - Provides health checks for liveness probes
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries (returns 200 once handled)
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use octocrab::Octocrab;

use crate::effects::GitHubInterpreter;
use crate::github::OctocrabClient;
use crate::release::{ReleaseBuilder, ReleasePublisher};
use crate::types::RepoId;
use crate::webhooks::WebhookSecret;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

/// Produces a GitHub interpreter scoped to one repository.
///
/// Every delivery names its repository, so the server connects per event.
pub trait GitHubConnector: Send + Sync + 'static {
    type Interpreter: GitHubInterpreter + Send;

    fn connect(&self, repo: &RepoId) -> Self::Interpreter;
}

impl GitHubConnector for Octocrab {
    type Interpreter = OctocrabClient;

    fn connect(&self, repo: &RepoId) -> OctocrabClient {
        OctocrabClient::new(self.clone(), repo.clone())
    }
}

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
/// It holds what webhook processing needs: the signing secret, a way to
/// reach GitHub, and the release tooling.
pub struct AppState<C, R> {
    inner: Arc<AppStateInner<C, R>>,
}

struct AppStateInner<C, R> {
    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: WebhookSecret,

    github: C,

    releaser: R,
}

impl<C, R> Clone for AppState<C, R> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, R> AppState<C, R>
where
    C: GitHubConnector,
    R: ReleaseBuilder + ReleasePublisher + Send + 'static,
{
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `webhook_secret` - Secret for verifying webhook signatures
    /// * `github` - Connects to the repository named by each delivery
    /// * `releaser` - Builds release PRs and publishes GitHub releases
    pub fn new(webhook_secret: WebhookSecret, github: C, releaser: R) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret,
                github,
                releaser,
            }),
        }
    }

    /// Returns the webhook secret.
    pub fn webhook_secret(&self) -> &WebhookSecret {
        &self.inner.webhook_secret
    }

    /// Returns a GitHub interpreter scoped to `repo`.
    pub fn github_for(&self, repo: &RepoId) -> C::Interpreter {
        self.inner.github.connect(repo)
    }

    /// Returns the release tooling.
    pub fn releaser(&self) -> &R {
        &self.inner.releaser
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<C, R>(app_state: AppState<C, R>) -> axum::Router
where
    C: GitHubConnector,
    R: ReleaseBuilder + ReleasePublisher + Send + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<C, R>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
