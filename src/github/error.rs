//! GitHub API error types.
//!
//! This module defines error types that distinguish between transient and permanent
//! GitHub API failures. The distinction is critical for retry logic:
//!
//! - **Transient** errors are retriable (5xx, rate limits, network failures)
//! - **Permanent** errors are returned to the handler (most 4xx)
//!
//! Special case:
//! - **Not found** (HTTP 404) is its own kind so that a missing configuration
//!   file can be reported as an absent file rather than a failure.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Transient error - safe to retry with backoff.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 with rate limit headers
    /// - Network timeouts
    Transient,

    /// Permanent error - retrying will not help.
    ///
    /// Examples:
    /// - HTTP 4xx (except rate limits and 404)
    /// - Authentication failures (401, 403 non-rate-limit)
    /// - Label validation failures (422)
    Permanent,

    /// The requested resource does not exist (HTTP 404).
    NotFound,
}

impl GitHubErrorKind {
    /// Returns true if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }
}

/// A GitHub API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The kind of error (transient, permanent, or not found).
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    pub fn permanent_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if the resource the request named does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == GitHubErrorKind::NotFound
    }

    /// Categorizes an octocrab error.
    ///
    /// The categorization is based on the HTTP status code when GitHub
    /// answered, and on the error message otherwise.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = match &err {
            octocrab::Error::GitHub { source, .. } => source.message.clone(),
            other => other.to_string(),
        };
        let kind = categorize(status_code, &message);

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Maps a status code and message onto an error kind.
fn categorize(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    match status_code {
        Some(404) => GitHubErrorKind::NotFound,
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// Errors GitHub answered carry the status structurally. Transport-level
/// errors occasionally mention one in their message.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }
    status_from_message(&err.to_string())
}

fn status_from_message(err_str: &str) -> Option<u16> {
    let idx = err_str.find("status: ")?;
    let digits: String = err_str[idx + 8..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Checks if an error message indicates a rate limit.
fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("api rate")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

/// Checks if an error message indicates a network-level error.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
        || message_lower.contains("timed out")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_error("API rate limit exceeded"));
        assert!(is_rate_limit_error("secondary rate limit"));
        assert!(is_rate_limit_error("abuse detection mechanism"));
        assert!(!is_rate_limit_error("Permission denied"));
    }

    #[test]
    fn network_error_detection() {
        assert!(is_network_error("connection timeout"));
        assert!(is_network_error("DNS resolution failed"));
        assert!(is_network_error("request timed out"));
        assert!(!is_network_error("Not found"));
    }

    #[test]
    fn categorizes_by_status() {
        assert_eq!(categorize(Some(404), "Not Found"), GitHubErrorKind::NotFound);
        assert_eq!(categorize(Some(429), ""), GitHubErrorKind::Transient);
        assert_eq!(categorize(Some(502), "Bad Gateway"), GitHubErrorKind::Transient);
        assert_eq!(
            categorize(Some(403), "API rate limit exceeded"),
            GitHubErrorKind::Transient
        );
        assert_eq!(
            categorize(Some(403), "Resource not accessible by integration"),
            GitHubErrorKind::Permanent
        );
        assert_eq!(
            categorize(Some(422), "Validation Failed"),
            GitHubErrorKind::Permanent
        );
    }

    #[test]
    fn categorizes_by_message_without_status() {
        assert_eq!(
            categorize(None, "error trying to connect: connection refused"),
            GitHubErrorKind::Transient
        );
        assert_eq!(categorize(None, "invalid JSON"), GitHubErrorKind::Permanent);
    }

    #[test]
    fn status_parsed_from_message() {
        assert_eq!(status_from_message("HTTP status: 503 Service"), Some(503));
        assert_eq!(status_from_message("status: 404"), Some(404));
        assert_eq!(status_from_message("no code here"), None);
    }

    #[test]
    fn error_kind_retriable() {
        assert!(GitHubErrorKind::Transient.is_retriable());
        assert!(!GitHubErrorKind::Permanent.is_retriable());
        assert!(!GitHubErrorKind::NotFound.is_retriable());
    }

    #[test]
    fn display_includes_status() {
        let err = GitHubApiError {
            kind: GitHubErrorKind::NotFound,
            status_code: Some(404),
            message: "Not Found".to_string(),
            source: None,
        };
        assert_eq!(err.to_string(), "GitHub API error (HTTP 404): Not Found");
        assert!(err.is_not_found());
    }
}
