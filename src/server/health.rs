//! Liveness endpoint.

use axum::http::StatusCode;

/// Answers `200 OK` while the process is accepting connections.
/// GitHub and the release tool are not consulted.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health_handler().await, (StatusCode::OK, "OK"));
    }
}
