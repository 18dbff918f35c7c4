//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates signatures, parses them into
//! release events and handles them before responding. A fatal handler error
//! answers 500 so the delivery shows as failed on GitHub.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{AppState, GitHubConnector};
use crate::release::{ReleaseBuilder, ReleasePublisher};
use crate::types::DeliveryId;
use crate::webhooks::{
    HandlerError, HandlerOutcome, ParseError, SignatureError, handle_event, parse_webhook,
};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    /// The payload does not have the shape its event type requires.
    #[error("invalid payload: {0}")]
    Parse(#[from] ParseError),

    /// Handling the event failed.
    #[error("event handling failed: {0}")]
    Handler(#[from] HandlerError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::Parse(_) => StatusCode::BAD_REQUEST,
            WebhookError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// Accepts GitHub webhook deliveries and handles them inline.
///
/// # Request
///
/// - Method: POST
/// - Required headers:
///   - `X-GitHub-Event`: Event type (e.g., "push", "pull_request")
///   - `X-GitHub-Delivery`: Unique delivery ID (UUID format)
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature of the payload
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: Event handled, or not one the bot acts on
/// - 400 Bad Request: Missing header or malformed payload
/// - 401 Unauthorized: Invalid signature
/// - 500 Internal Server Error: Handling failed
///
/// # Example
///
/// ```ignore
/// POST /webhook HTTP/1.1
/// X-GitHub-Event: push
/// X-GitHub-Delivery: 550e8400-e29b-41d4-a716-446655440000
/// X-Hub-Signature-256: sha256=...
/// Content-Type: application/json
///
/// {"ref": "refs/heads/main", "repository": {...}}
///
/// HTTP/1.1 200 OK
/// ```
pub async fn webhook_handler<C, R>(
    State(app_state): State<AppState<C, R>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    C: GitHubConnector,
    R: ReleaseBuilder + ReleasePublisher + Send + 'static,
{
    // Extract required headers
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY)?);
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    // Verify signature BEFORE any parsing or I/O.
    if let Err(e) = app_state.webhook_secret().verify(&body, &signature_header) {
        warn!(delivery_id = %delivery_id, error = %e, "Invalid webhook signature");
        return Err(e.into());
    }

    let Some(event) = parse_webhook(&event_type, &body).inspect_err(|e| {
        warn!(delivery_id = %delivery_id, error = %e, "Malformed webhook payload");
    })?
    else {
        debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring event");
        return Ok((StatusCode::OK, "Ignored"));
    };

    let github = app_state.github_for(event.repo_id());
    match handle_event(&github, app_state.releaser(), &event).await {
        Ok(outcome) => {
            info!(
                delivery_id = %delivery_id,
                repo = %event.repo_id(),
                kind = event.kind().as_str(),
                outcome = ?outcome,
                "Webhook handled"
            );
            Ok((StatusCode::OK, outcome_text(&outcome)))
        }
        Err(e) => {
            error!(
                delivery_id = %delivery_id,
                repo = %event.repo_id(),
                kind = event.kind().as_str(),
                error = %e,
                "Webhook handling failed"
            );
            Err(e.into())
        }
    }
}

fn outcome_text(outcome: &HandlerOutcome) -> &'static str {
    match outcome {
        HandlerOutcome::Done => "OK",
        HandlerOutcome::NotConfigured => "Not configured",
        HandlerOutcome::NoBranchConfiguration { .. } => "No configuration for branch",
        HandlerOutcome::ConfigurationError => "Configuration error",
        HandlerOutcome::DuplicateRelease => "Release already exists",
        HandlerOutcome::Ignored(_) => "Ignored",
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
